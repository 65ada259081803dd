//! Authorization core.
//!
//! - [`principal`]: who is asking, passed explicitly into every call.
//! - [`policy`]: pure `authorize(principal, resource, action)` decisions.
//! - [`scope`]: narrowing collection queries to the caller's own rows.
//! - [`lifecycle`]: will status transitions and who may make them.
//!
//! Nothing in here touches the database or reads ambient request state.

pub mod lifecycle;
pub mod policy;
pub mod principal;
pub mod scope;

pub use lifecycle::{Transition, plan_transition};
pub use policy::{Action, Decision, ResourceKind, ResourceRef, authorize};
pub use principal::Principal;
pub use scope::{CollectionQuery, Page, PageRequest, scope_query};
