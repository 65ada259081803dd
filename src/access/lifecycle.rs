//! Will status state machine.
//!
//! | from             | to        | who            |
//! |------------------|-----------|----------------|
//! | draft            | confirmed | owner or admin |
//! | confirmed        | draft     | owner or admin |
//! | draft, confirmed | archived  | admin          |
//! | archived         | any       | admin          |
//!
//! Requesting the current status is an accepted no-op. Ownership is checked
//! separately by the ownership policy before a plan is made.

use super::principal::Principal;
use crate::models::will::WillStatus;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged(WillStatus),
    Move { from: WillStatus, to: WillStatus },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("only administrators may move a will from {from} to {to}")]
pub struct TransitionDenied {
    pub from: WillStatus,
    pub to: WillStatus,
}

/// Work out what moving a will from `current` to `requested` means for
/// `principal`.
pub fn plan_transition(
    current: WillStatus,
    requested: WillStatus,
    principal: &Principal,
) -> Result<Transition, TransitionDenied> {
    if current == requested {
        return Ok(Transition::Unchanged(current));
    }

    let allowed = principal.is_admin()
        || (principal.actor().is_some()
            && matches!(
                (current, requested),
                (WillStatus::Draft, WillStatus::Confirmed)
                    | (WillStatus::Confirmed, WillStatus::Draft)
            ));

    if allowed {
        Ok(Transition::Move {
            from: current,
            to: requested,
        })
    } else {
        Err(TransitionDenied {
            from: current,
            to: requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn owner_toggles_between_draft_and_confirmed() {
        let owner = Principal::user(Uuid::new_v4());
        assert_eq!(
            plan_transition(WillStatus::Draft, WillStatus::Confirmed, &owner),
            Ok(Transition::Move {
                from: WillStatus::Draft,
                to: WillStatus::Confirmed
            })
        );
        assert!(plan_transition(WillStatus::Confirmed, WillStatus::Draft, &owner).is_ok());
    }

    #[test]
    fn owner_cannot_archive_or_unarchive() {
        let owner = Principal::user(Uuid::new_v4());
        for from in [WillStatus::Draft, WillStatus::Confirmed] {
            assert!(plan_transition(from, WillStatus::Archived, &owner).is_err());
        }
        for to in [WillStatus::Draft, WillStatus::Confirmed] {
            assert_eq!(
                plan_transition(WillStatus::Archived, to, &owner),
                Err(TransitionDenied {
                    from: WillStatus::Archived,
                    to
                })
            );
        }
    }

    #[test]
    fn admin_may_make_any_move() {
        let admin = Principal::admin(Uuid::new_v4());
        for from in WillStatus::ALL {
            for to in WillStatus::ALL {
                let expected = if from == to {
                    Transition::Unchanged(to)
                } else {
                    Transition::Move { from, to }
                };
                assert_eq!(plan_transition(from, to, &admin), Ok(expected));
            }
        }
    }

    #[test]
    fn same_status_is_a_no_op_for_everyone() {
        let owner = Principal::user(Uuid::new_v4());
        for status in WillStatus::ALL {
            assert_eq!(
                plan_transition(status, status, &owner),
                Ok(Transition::Unchanged(status))
            );
        }
    }

    #[test]
    fn anonymous_callers_never_move_a_will() {
        assert!(
            plan_transition(WillStatus::Draft, WillStatus::Confirmed, &Principal::Anonymous)
                .is_err()
        );
    }
}
