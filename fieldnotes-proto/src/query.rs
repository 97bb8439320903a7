//! Listing query parameters: search text, status filter and page.
//!
//! Project listings use `q` / `status` / `page`; task listings use
//! `tq` / `tstatus` / `page` so both can share one URL. A status value of
//! `all` means no filter. Pages are 1-indexed and clamped to the available
//! range when applied.

use std::fmt::Display;
use std::str::FromStr;

use crate::project::{ProjectRecord, ProjectStatus};
use crate::status::TaskStatus;
use crate::task::TaskRecord;

/// Names of the query parameters for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    /// Search text parameter.
    pub search: &'static str,
    /// Status filter parameter.
    pub status: &'static str,
    /// Page number parameter.
    pub page: &'static str,
}

/// Parameter names for the project listing.
pub const PROJECT_PARAMS: QueryParams = QueryParams {
    search: "q",
    status: "status",
    page: "page",
};

/// Parameter names for the task listing.
pub const TASK_PARAMS: QueryParams = QueryParams {
    search: "tq",
    status: "tstatus",
    page: "page",
};

/// Value of the status parameter meaning "no filter".
pub const ALL_STATUSES: &str = "all";

/// A record that can be searched and filtered by status.
pub trait Listable {
    /// Status type filtered on.
    type Status: Copy + PartialEq;

    /// Current status.
    fn status(&self) -> Self::Status;

    /// Text fields matched by the search query.
    fn search_fields(&self) -> [&str; 2];
}

impl Listable for TaskRecord {
    type Status = TaskStatus;

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn search_fields(&self) -> [&str; 2] {
        [&self.title, &self.description]
    }
}

impl Listable for ProjectRecord {
    type Status = ProjectStatus;

    fn status(&self) -> ProjectStatus {
        self.status
    }

    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.description]
    }
}

/// Status filter of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    /// Show every status.
    #[default]
    All,
    /// Show a single status.
    Only(S),
}

impl<S: PartialEq> StatusFilter<S> {
    /// Whether `status` passes the filter.
    pub fn admits(&self, status: &S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// A parsed listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<S> {
    /// Case-insensitive search text; empty matches everything.
    pub search: String,
    /// Status filter.
    pub status: StatusFilter<S>,
    /// Requested page, 1-indexed.
    pub page: usize,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
        }
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<R> {
    /// Records on this page.
    pub items: Vec<R>,
    /// Page actually shown after clamping.
    pub page: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
    /// Number of records matching the query.
    pub total: usize,
}

impl<S: Copy + PartialEq + FromStr + Display> ListQuery<S> {
    /// Parses query pairs using the given parameter names.
    ///
    /// Unknown parameters are ignored. Malformed values fall back to the
    /// defaults: empty search, all statuses, page 1.
    pub fn from_pairs<'a, I>(pairs: I, params: &QueryParams) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            if key == params.search {
                query.search = value.trim().to_string();
            } else if key == params.status {
                query.status = if value.eq_ignore_ascii_case(ALL_STATUSES) {
                    StatusFilter::All
                } else {
                    value.parse().map_or(StatusFilter::All, StatusFilter::Only)
                };
            } else if key == params.page {
                query.page = value.trim().parse().ok().filter(|p| *p >= 1).unwrap_or(1);
            }
        }
        query
    }

    /// Produces query pairs, omitting parameters at their default value.
    #[must_use]
    pub fn to_pairs(&self, params: &QueryParams) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push((params.search, self.search.clone()));
        }
        if let StatusFilter::Only(status) = &self.status {
            pairs.push((params.status, status.to_string()));
        }
        if self.page > 1 {
            pairs.push((params.page, self.page.to_string()));
        }
        pairs
    }

    /// Whether a record passes the search and status filters.
    pub fn matches<R: Listable<Status = S>>(&self, record: &R) -> bool {
        if !self.status.admits(&record.status()) {
            return false;
        }
        let needle = self.search.to_lowercase();
        needle.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Filters `records` and returns the requested page.
    ///
    /// The page is clamped to `[1, total_pages]`; a `page_size` of zero is
    /// treated as one.
    pub fn apply<R>(&self, records: &[R], page_size: usize) -> Page<R>
    where
        R: Listable<Status = S> + Clone,
    {
        let page_size = page_size.max(1);
        let matching: Vec<&R> = records.iter().filter(|r| self.matches(*r)).collect();
        let total = matching.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let page = self.page.clamp(1, total_pages);
        let items = matching
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();
        Page {
            items,
            page,
            total_pages,
            total,
        }
    }
}
