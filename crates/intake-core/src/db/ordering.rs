//! Declared sort orders for triage queries.
//!
//! Each query shape names its sort keys up front instead of probing the
//! table layout at call time. The SQL fragments are built once.

use std::sync::LazyLock;

/// A triage sort key, always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageSortKey {
    /// Server-side creation timestamp
    CreatedAt,
    /// Recorded triage date, then wall-clock time
    DateTime,
    /// Store-assigned identifier
    Id,
}

impl TriageSortKey {
    fn sql(self) -> &'static str {
        match self {
            TriageSortKey::CreatedAt => "created_at DESC",
            TriageSortKey::DateTime => "triage_date DESC, triage_time DESC",
            TriageSortKey::Id => "id DESC",
        }
    }
}

/// Ordered list of sort keys, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageOrdering(&'static [TriageSortKey]);

impl TriageOrdering {
    /// Most recent first, for the duplicate guard. Rows without a creation
    /// timestamp sort after every row that has one.
    pub const RECENCY: Self = Self(&[
        TriageSortKey::CreatedAt,
        TriageSortKey::DateTime,
        TriageSortKey::Id,
    ]);

    /// Latest recorded measurement first, for listings.
    pub const CHRONOLOGY: Self = Self(&[
        TriageSortKey::DateTime,
        TriageSortKey::CreatedAt,
        TriageSortKey::Id,
    ]);

    pub fn keys(&self) -> &'static [TriageSortKey] {
        self.0
    }

    /// `ORDER BY` body for this ordering.
    pub fn order_by(&self) -> String {
        self.0
            .iter()
            .map(|key| key.sql())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) static RECENCY_ORDER_BY: LazyLock<String> =
    LazyLock::new(|| TriageOrdering::RECENCY.order_by());

pub(crate) static CHRONOLOGY_ORDER_BY: LazyLock<String> =
    LazyLock::new(|| TriageOrdering::CHRONOLOGY.order_by());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recency_order_by() {
        assert_eq!(
            RECENCY_ORDER_BY.as_str(),
            "created_at DESC, triage_date DESC, triage_time DESC, id DESC"
        );
    }

    #[test]
    fn test_chronology_order_by() {
        assert_eq!(
            CHRONOLOGY_ORDER_BY.as_str(),
            "triage_date DESC, triage_time DESC, created_at DESC, id DESC"
        );
    }

    #[test]
    fn test_every_ordering_ends_with_id() {
        for ordering in [TriageOrdering::RECENCY, TriageOrdering::CHRONOLOGY] {
            assert_eq!(ordering.keys().last(), Some(&TriageSortKey::Id));
        }
    }
}
