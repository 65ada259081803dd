//! Tenant isolation for collection queries.
//!
//! `scope_query` narrows a query over an owned kind to the caller's own rows.
//! Services render the scope into SQL before any search, filter or page
//! clause, so those can only ever shrink an already-isolated result.

use super::{policy::ResourceKind, principal::Principal};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Which owners' rows a query may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OwnerScope {
    #[default]
    All,
    Owner(Uuid),
    Nothing,
}

impl OwnerScope {
    /// Intersect with "rows owned by `id`".
    fn narrow_to(self, id: Uuid) -> Self {
        match self {
            OwnerScope::All => OwnerScope::Owner(id),
            OwnerScope::Owner(current) if current == id => self,
            OwnerScope::Owner(_) | OwnerScope::Nothing => OwnerScope::Nothing,
        }
    }

    /// Append ` AND <owner column> ...` for this scope over `kind`. The
    /// builder must already hold a `WHERE` clause. Unowned kinds add nothing.
    pub(crate) fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>, kind: ResourceKind) {
        let Some(column) = kind.owner_column() else {
            return;
        };
        match self {
            OwnerScope::All => {}
            OwnerScope::Owner(id) => {
                builder.push(format!(" AND {} = ", column));
                builder.push_bind(*id);
            }
            OwnerScope::Nothing => {
                builder.push(" AND 1 = 0");
            }
        }
    }
}

/// One-based page selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A list request over one entity kind. `F` carries the kind-specific
/// search and filter fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionQuery<F> {
    pub scope: OwnerScope,
    pub filter: F,
    pub page: PageRequest,
}

impl<F> CollectionQuery<F> {
    pub fn new(filter: F, page: PageRequest) -> Self {
        Self {
            scope: OwnerScope::All,
            filter,
            page,
        }
    }
}

/// Narrow `query` to what `principal` may list for `kind`.
///
/// Administrators get the query back unchanged. Anonymous callers see
/// nothing of an owned kind. Unowned kinds pass through. Idempotent.
pub fn scope_query<F>(
    mut query: CollectionQuery<F>,
    principal: &Principal,
    kind: ResourceKind,
) -> CollectionQuery<F> {
    if !kind.is_owned() {
        return query;
    }
    query.scope = match principal.actor() {
        None => OwnerScope::Nothing,
        Some(actor) if actor.is_admin => query.scope,
        Some(actor) => query.scope.narrow_to(actor.id),
    };
    query
}

/// One page of results plus totals.
#[derive(Serialize, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let per_page = i64::from(request.per_page);
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            pages: (total + per_page - 1) / per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> CollectionQuery<()> {
        CollectionQuery::new((), PageRequest::default())
    }

    #[test]
    fn user_scope_narrows_to_own_rows_and_is_idempotent() {
        let id = Uuid::new_v4();
        let user = Principal::user(id);
        let once = scope_query(query(), &user, ResourceKind::Asset);
        assert_eq!(once.scope, OwnerScope::Owner(id));
        let twice = scope_query(once.clone(), &user, ResourceKind::Asset);
        assert_eq!(once, twice);
    }

    #[test]
    fn admin_scope_is_unchanged_and_idempotent() {
        let admin = Principal::admin(Uuid::new_v4());
        let once = scope_query(query(), &admin, ResourceKind::Will);
        assert_eq!(once.scope, OwnerScope::All);
        assert_eq!(scope_query(once.clone(), &admin, ResourceKind::Will), once);

        let pinned = CollectionQuery {
            scope: OwnerScope::Owner(Uuid::new_v4()),
            ..query()
        };
        assert_eq!(
            scope_query(pinned.clone(), &admin, ResourceKind::Will),
            pinned
        );
    }

    #[test]
    fn anonymous_sees_nothing_owned() {
        let scoped = scope_query(query(), &Principal::Anonymous, ResourceKind::Will);
        assert_eq!(scoped.scope, OwnerScope::Nothing);
        assert_eq!(
            scope_query(scoped.clone(), &Principal::Anonymous, ResourceKind::Will),
            scoped
        );
    }

    #[test]
    fn another_users_pinned_scope_collapses_to_nothing() {
        let user = Principal::user(Uuid::new_v4());
        let pinned = CollectionQuery {
            scope: OwnerScope::Owner(Uuid::new_v4()),
            ..query()
        };
        assert_eq!(
            scope_query(pinned, &user, ResourceKind::Asset).scope,
            OwnerScope::Nothing
        );
    }

    #[test]
    fn reference_kinds_pass_through() {
        let scoped = scope_query(query(), &Principal::Anonymous, ResourceKind::Faq);
        assert_eq!(scoped.scope, OwnerScope::All);
    }

    #[test]
    fn page_request_clamps_and_counts_pages() {
        let req = PageRequest::new(Some(0), Some(500));
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
        let page = Page::new(vec![1, 2, 3], 41, PageRequest::new(Some(3), Some(20)));
        assert_eq!(page.pages, 3);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }
}
