pub mod asset_handlers;
pub mod auth;
pub mod content_handlers;
pub mod health_handlers;
pub mod stats_handlers;
pub mod user_handlers;
pub mod will_handlers;

use crate::access::PageRequest;
use serde::Deserialize;

/// Query string shared by the list endpoints. `category` and `status` are
/// parsed per endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }

    pub fn search(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}
