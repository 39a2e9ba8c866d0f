//! Query DTOs - Data Transfer Objects per query di ricerca

use crate::entities::{Priority, ThreadStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query parameters di `GET /contact?page&limit&status&priority&search`
#[derive(Serialize, Deserialize, Debug, Default, Validate)]
pub struct ContactListQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
    pub status: Option<ThreadStatus>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

impl ContactListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        ((self.page() - 1) as i64) * (self.limit() as i64)
    }

    /// Termine di ricerca non vuoto, se presente
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}
