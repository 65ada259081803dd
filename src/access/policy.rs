//! Ownership policy.
//!
//! Rules, first match wins:
//! 1. Anonymous callers may only read publicly readable reference data.
//! 2. Administrators may do anything, except delete their own account.
//! 3. Ordinary users may act on rows they own. Reference data is read-only to
//!    them, apart from submitting stories for moderation. Accounts are only
//!    ever deleted by an administrator.

use super::principal::Principal;
use crate::models::{
    asset::DigitalAsset,
    story::{Story, StoryStatus},
    will::DigitalWill,
};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Asset,
    Will,
    PlatformPolicy,
    Faq,
    Story,
}

impl ResourceKind {
    /// Kinds whose rows belong to a user and are subject to tenant isolation.
    pub fn is_owned(&self) -> bool {
        matches!(
            self,
            ResourceKind::User | ResourceKind::Asset | ResourceKind::Will
        )
    }

    /// Column holding the owning user's id.
    pub(crate) fn owner_column(&self) -> Option<&'static str> {
        match self {
            ResourceKind::User => Some("id"),
            ResourceKind::Asset | ResourceKind::Will => Some("user_id"),
            _ => None,
        }
    }
}

/// An explicit, typed reference to the thing being acted on.
///
/// `id` is `None` when the action creates a new row. `owner_id` is `None`
/// for unowned reference data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    /// Readable without authentication.
    pub public: bool,
}

impl ResourceRef {
    /// An account by id. An account is its own owner.
    pub fn account(id: Uuid) -> Self {
        Self {
            kind: ResourceKind::User,
            id: Some(id),
            owner_id: Some(id),
            public: false,
        }
    }

    pub fn asset(asset: &DigitalAsset) -> Self {
        Self {
            kind: ResourceKind::Asset,
            id: Some(asset.id),
            owner_id: Some(asset.user_id),
            public: false,
        }
    }

    pub fn will(will: &DigitalWill) -> Self {
        Self {
            kind: ResourceKind::Will,
            id: Some(will.id),
            owner_id: Some(will.user_id),
            public: false,
        }
    }

    /// Target of a create on an owned kind.
    pub fn new_owned(kind: ResourceKind, owner_id: Uuid) -> Self {
        Self {
            kind,
            id: None,
            owner_id: Some(owner_id),
            public: false,
        }
    }

    pub fn policy(id: Option<Uuid>) -> Self {
        Self::reference(ResourceKind::PlatformPolicy, id, true)
    }

    pub fn faq(id: Option<Uuid>) -> Self {
        Self::reference(ResourceKind::Faq, id, true)
    }

    pub fn story(story: &Story) -> Self {
        Self::reference(
            ResourceKind::Story,
            Some(story.id),
            story.status == StoryStatus::Approved,
        )
    }

    pub fn new_story() -> Self {
        Self::reference(ResourceKind::Story, None, false)
    }

    fn reference(kind: ResourceKind, id: Option<Uuid>, public: bool) -> Self {
        Self {
            kind,
            id,
            owner_id: None,
            public,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

#[cfg(test)]
impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];
}

/// Why a request was refused. Logged, never shown to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    NotOwner,
    AdminOnly,
    SelfDelete,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::Unauthenticated => "authentication required",
            DenyReason::NotOwner => "resource belongs to another user",
            DenyReason::AdminOnly => "administrator privileges required",
            DenyReason::SelfDelete => "administrators cannot delete their own account",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[cfg(test)]
impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// Pure and total: a missing resource is the caller's concern and must be
/// resolved before this is consulted.
pub fn authorize(principal: &Principal, resource: &ResourceRef, action: Action) -> Decision {
    let Some(actor) = principal.actor() else {
        return if action == Action::Read && resource.public {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::Unauthenticated)
        };
    };

    if actor.is_admin {
        let own_account = resource.kind == ResourceKind::User && resource.id == Some(actor.id);
        return if action == Action::Delete && own_account {
            Decision::Deny(DenyReason::SelfDelete)
        } else {
            Decision::Allow
        };
    }

    match resource.owner_id {
        Some(owner) if owner != actor.id => Decision::Deny(DenyReason::NotOwner),
        Some(_) if resource.kind == ResourceKind::User && action == Action::Delete => {
            Decision::Deny(DenyReason::AdminOnly)
        }
        Some(_) => Decision::Allow,
        None if action == Action::Read && resource.public => Decision::Allow,
        None if resource.kind == ResourceKind::Story && action == Action::Create => {
            Decision::Allow
        }
        None => Decision::Deny(DenyReason::AdminOnly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned_refs(owner: Uuid) -> Vec<ResourceRef> {
        vec![
            ResourceRef::account(owner),
            ResourceRef {
                kind: ResourceKind::Asset,
                id: Some(Uuid::new_v4()),
                owner_id: Some(owner),
                public: false,
            },
            ResourceRef {
                kind: ResourceKind::Will,
                id: Some(Uuid::new_v4()),
                owner_id: Some(owner),
                public: false,
            },
            ResourceRef::new_owned(ResourceKind::Asset, owner),
            ResourceRef::new_owned(ResourceKind::Will, owner),
        ]
    }

    #[test]
    fn non_owner_is_denied_every_action() {
        let user = Principal::user(Uuid::new_v4());
        for resource in owned_refs(Uuid::new_v4()) {
            for action in Action::ALL {
                assert_eq!(
                    authorize(&user, &resource, action),
                    Decision::Deny(DenyReason::NotOwner),
                    "{:?} on {:?}",
                    action,
                    resource.kind
                );
            }
        }
    }

    #[test]
    fn owner_may_act_on_own_rows_but_not_delete_own_account() {
        let id = Uuid::new_v4();
        let user = Principal::user(id);
        for resource in owned_refs(id) {
            for action in Action::ALL {
                let decision = authorize(&user, &resource, action);
                if resource.kind == ResourceKind::User && action == Action::Delete {
                    assert_eq!(decision, Decision::Deny(DenyReason::AdminOnly));
                } else {
                    assert!(decision.is_allowed(), "{:?} on {:?}", action, resource.kind);
                }
            }
        }
    }

    #[test]
    fn admin_may_delete_anything_but_itself() {
        let admin_id = Uuid::new_v4();
        let admin = Principal::admin(admin_id);
        for resource in owned_refs(Uuid::new_v4()) {
            assert_eq!(authorize(&admin, &resource, Action::Delete), Decision::Allow);
        }
        assert_eq!(
            authorize(&admin, &ResourceRef::policy(Some(Uuid::new_v4())), Action::Delete),
            Decision::Allow
        );
        assert_eq!(
            authorize(&admin, &ResourceRef::account(admin_id), Action::Delete),
            Decision::Deny(DenyReason::SelfDelete)
        );
        assert!(authorize(&admin, &ResourceRef::account(admin_id), Action::Update).is_allowed());
    }

    #[test]
    fn anonymous_reads_only_public_reference_data() {
        let anon = Principal::Anonymous;
        assert!(authorize(&anon, &ResourceRef::policy(None), Action::Read).is_allowed());
        assert!(authorize(&anon, &ResourceRef::faq(None), Action::Read).is_allowed());
        assert_eq!(
            authorize(&anon, &ResourceRef::policy(None), Action::Create),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        assert_eq!(
            authorize(&anon, &ResourceRef::new_story(), Action::Create),
            Decision::Deny(DenyReason::Unauthenticated)
        );
        for resource in owned_refs(Uuid::new_v4()) {
            for action in Action::ALL {
                assert_eq!(
                    authorize(&anon, &resource, action),
                    Decision::Deny(DenyReason::Unauthenticated)
                );
            }
        }
    }

    #[test]
    fn ordinary_users_only_read_reference_data_and_submit_stories() {
        let user = Principal::user(Uuid::new_v4());
        assert!(authorize(&user, &ResourceRef::faq(None), Action::Read).is_allowed());
        assert!(authorize(&user, &ResourceRef::new_story(), Action::Create).is_allowed());
        for action in [Action::Create, Action::Update, Action::Delete] {
            assert_eq!(
                authorize(&user, &ResourceRef::policy(Some(Uuid::new_v4())), action),
                Decision::Deny(DenyReason::AdminOnly)
            );
            assert_eq!(
                authorize(&user, &ResourceRef::faq(Some(Uuid::new_v4())), action),
                Decision::Deny(DenyReason::AdminOnly)
            );
        }
        let pending = ResourceRef {
            kind: ResourceKind::Story,
            id: Some(Uuid::new_v4()),
            owner_id: None,
            public: false,
        };
        assert_eq!(
            authorize(&user, &pending, Action::Read),
            Decision::Deny(DenyReason::AdminOnly)
        );
        assert_eq!(
            authorize(&user, &pending, Action::Update),
            Decision::Deny(DenyReason::AdminOnly)
        );
    }
}
