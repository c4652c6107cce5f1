//! Pagination options and the page cursor.
//!
//! # Design
//! `Pagination` is a caller-owned value passed explicitly to paginated
//! calls; it is never part of the envelope until the transport writes it
//! into the query. The server reports what it actually applied in a
//! `PaginatedResult`, and `next_page` derives the following request from
//! that report.
//!
//! The next offset advances by the server's applied limit, not by the number
//! of items selected. This matches the server's fixed page size semantics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::envelope::RequestEnvelope;

/// Limit value meaning "no limit".
pub const UNBOUNDED: i64 = -1;

/// Direction of a sorted listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offset, limit and sorting requested for a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    /// Page size, or `UNBOUNDED`.
    pub limit: i64,
    /// Property name to sort by; server default when `None`.
    pub sort: Option<String>,
    pub order: SortOrder,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: UNBOUNDED,
            sort: None,
            order: SortOrder::Descending,
        }
    }
}

impl Pagination {
    /// First page of `limit` items.
    pub fn page_size(limit: i64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some(field.to_string());
        self.order = order;
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit < 0
    }

    /// Write `offset`, `limit`, `order` and, when set, `sort` into the
    /// envelope's query parameters.
    pub fn apply(&self, envelope: &mut RequestEnvelope) {
        envelope.set_query("offset", &self.offset.to_string());
        envelope.set_query("limit", &self.limit.to_string());
        if let Some(sort) = &self.sort {
            envelope.set_query("sort", sort);
        }
        envelope.set_query("order", self.order.as_str());
    }
}

/// Page header reported by list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult {
    /// Total number of matching items.
    #[serde(default)]
    pub count: i64,
    /// Number of items in this page.
    #[serde(default)]
    pub selected: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

impl PaginatedResult {
    /// True when items remain beyond this page.
    pub fn has_more(&self) -> bool {
        self.count > self.offset + self.selected
    }
}

impl AsRef<PaginatedResult> for PaginatedResult {
    fn as_ref(&self) -> &PaginatedResult {
        self
    }
}

/// Compute the request for the page after `page`.
///
/// Returns the next pagination and whether another page exists. When none
/// remains the returned pagination equals `current`. A page served without
/// a positive limit covered everything, so it never has a successor.
pub fn next_page(page: &PaginatedResult, current: &Pagination) -> (Pagination, bool) {
    if !page.has_more() || page.limit <= 0 {
        return (current.clone(), false);
    }
    let next = Pagination {
        offset: page.offset + page.limit,
        ..current.clone()
    };
    (next, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Signable;

    fn page(count: i64, limit: i64, offset: i64, selected: i64) -> PaginatedResult {
        PaginatedResult {
            count,
            selected,
            offset,
            limit,
        }
    }

    #[test]
    fn defaults_are_unbounded_descending() {
        let p = Pagination::default();
        assert_eq!(p.offset, 0);
        assert_eq!(p.limit, UNBOUNDED);
        assert!(p.is_unbounded());
        assert_eq!(p.sort, None);
        assert_eq!(p.order, SortOrder::Descending);
    }

    #[test]
    fn overlapping_page_has_no_successor() {
        let current = Pagination::default();
        let (next, more) = next_page(&page(321, 654, 528, 671), &current);
        assert!(!more);
        assert_eq!(next, current);
    }

    #[test]
    fn full_first_page_advances_by_limit() {
        let current = Pagination::page_size(100);
        let (next, more) = next_page(&page(1000, 100, 0, 100), &current);
        assert!(more);
        assert_eq!(next.offset, 100);
        assert_eq!(next.limit, 100);
    }

    #[test]
    fn offset_advances_by_limit_not_selected() {
        let current = Pagination::page_size(50);
        let (next, more) = next_page(&page(500, 50, 100, 30), &current);
        assert!(more);
        assert_eq!(next.offset, 150);
    }

    #[test]
    fn exact_end_has_no_successor() {
        let (_, more) = next_page(&page(200, 100, 100, 100), &Pagination::page_size(100));
        assert!(!more);
    }

    #[test]
    fn sorting_carries_over() {
        let current = Pagination::page_size(10).sort("start-time", SortOrder::Ascending);
        let (next, more) = next_page(&page(30, 10, 0, 10), &current);
        assert!(more);
        assert_eq!(next.sort.as_deref(), Some("start-time"));
        assert_eq!(next.order, SortOrder::Ascending);
    }

    #[test]
    fn unbounded_page_has_no_successor() {
        let (_, more) = next_page(&page(10, -1, 0, 5), &Pagination::default());
        assert!(!more);
    }

    #[test]
    fn apply_writes_query_parameters() {
        let mut env = RequestEnvelope::get("/clients");
        Pagination::default().apply(&mut env);
        assert_eq!(env.resource_with_query(), "/clients?limit=-1&offset=0&order=desc");

        let mut env = RequestEnvelope::get("/sessions").with_query("cid", "7");
        Pagination::page_size(25)
            .offset(50)
            .sort("end-time", SortOrder::Ascending)
            .apply(&mut env);
        assert_eq!(
            env.resource_with_query(),
            "/sessions?cid=7&limit=25&offset=50&order=asc&sort=end-time"
        );
    }

    #[test]
    fn paginated_result_defaults_missing_fields() {
        let r: PaginatedResult = serde_json::from_str(r#"{"count":3}"#).unwrap();
        assert_eq!(r, page(3, 0, 0, 0));
    }

    #[test]
    fn sort_order_serializes_short_names() {
        assert_eq!(serde_json::to_string(&SortOrder::Ascending).unwrap(), r#""asc""#);
        assert_eq!(SortOrder::Descending.to_string(), "desc");
    }
}
