//! Pagination and sorting parameters for list queries.

use crate::domain::validator::{in_list, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 4;
pub const DEFAULT_SORT: &str = "id";

pub const MAX_PAGE: i64 = 1000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort values accepted by the todo listing. A leading `-` means descending.
pub const TODO_SORT_SAFELIST: &[&str] = &["id", "title", "completed", "-id", "-title", "-completed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Filters with the default page, page size and sort over the given safelist.
    pub fn new(sort_safelist: &'static [&'static str]) -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
            sort_safelist,
        }
    }

    /// Column to sort by, without the descending marker.
    ///
    /// Panics if `sort` is not in the safelist. Run [`validate_filters`] first.
    pub fn sort_column(&self) -> &str {
        if in_list(self.sort.as_str(), self.sort_safelist) {
            return self.sort.strip_prefix('-').unwrap_or(&self.sort);
        }
        panic!("unsafe sort parameter: {}", self.sort);
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with('-') {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 1000");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(f.page_size <= MAX_PAGE_SIZE, "page_size", "must be a maximum of 100");

    v.check(
        in_list(f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

/// Pagination summary returned alongside a page of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
