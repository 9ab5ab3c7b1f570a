//! Pagination window for list queries.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationResult};

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 200;

/// 1-based page request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, size: 50 }
    }
}

impl Page {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Check bounds and return `(limit, offset)` for SQL.
    pub fn limit_offset(&self) -> ValidationResult<(i64, i64)> {
        if self.page < 1 {
            return Err(ValidationError::range("page", "must be at least 1"));
        }
        if self.size < 1 || self.size > MAX_PAGE_SIZE {
            return Err(ValidationError::range(
                "size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        let size = i64::from(self.size);
        Ok((size, (i64::from(self.page) - 1) * size))
    }
}
