use crate::models::user::User;
use uuid::Uuid;

/// An authenticated account acting on the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

/// The caller of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Authenticated(Actor),
}

impl Principal {
    #[cfg(test)]
    pub fn user(id: Uuid) -> Self {
        Principal::Authenticated(Actor {
            id,
            is_admin: false,
        })
    }

    #[cfg(test)]
    pub fn admin(id: Uuid) -> Self {
        Principal::Authenticated(Actor { id, is_admin: true })
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(actor) => Some(actor),
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.actor().map(|a| a.id)
    }

    pub fn is_admin(&self) -> bool {
        self.actor().is_some_and(|a| a.is_admin)
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal::Authenticated(Actor {
            id: user.id,
            is_admin: user.is_admin,
        })
    }
}
