//! Filters for listing transactions and the SQL they translate to.

use crate::{category::CategoryType, database_id::CategoryId, period::DateRange};

/// Narrows down the transactions of one user.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    /// Only transactions dated within this range are included.
    pub range: DateRange,
    /// Only transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only transactions whose description contains this text, ignoring ASCII case.
    pub search: Option<String>,
    /// Only income or only expenses.
    pub category_type: Option<CategoryType>,
}

impl TransactionFilter {
    /// A filter for every transaction in `range`.
    pub fn in_range(range: DateRange) -> Self {
        Self {
            range,
            category_id: None,
            search: None,
            category_type: None,
        }
    }

    /// The search text as a `LIKE` pattern with the wildcards in it escaped.
    pub(crate) fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|search| {
            let escaped = search
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");

            format!("%{escaped}%")
        })
    }
}

/// The `FROM` and `WHERE` clauses shared by the list, count and sum queries.
///
/// Parameters: `?1` user ID, `?2`/`?3` start and end in Unix milliseconds, `?4` category ID,
/// `?5` category type, `?6` search pattern. Optional parameters match everything when NULL.
pub(crate) const FILTERED_TRANSACTIONS: &str = "FROM \"transaction\"
    INNER JOIN category ON category.id = \"transaction\".category_id
    WHERE \"transaction\".user_id = ?1
        AND \"transaction\".date BETWEEN ?2 AND ?3
        AND (?4 IS NULL OR \"transaction\".category_id = ?4)
        AND (?5 IS NULL OR category.type = ?5)
        AND (?6 IS NULL OR \"transaction\".description LIKE ?6 ESCAPE '\\')";

#[cfg(test)]
mod transaction_filter_tests {
    use time::macros::datetime;

    use crate::period::DateRange;

    use super::TransactionFilter;

    fn filter_with_search(search: &str) -> TransactionFilter {
        TransactionFilter {
            search: Some(search.to_owned()),
            ..TransactionFilter::in_range(DateRange {
                start: datetime!(2025-01-01 0:00 UTC),
                end: datetime!(2025-01-31 23:59:59.999 UTC),
            })
        }
    }

    #[test]
    fn search_pattern_wraps_text_in_wildcards() {
        assert_eq!(
            filter_with_search("coffee").search_pattern(),
            Some("%coffee%".to_owned())
        );
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(
            filter_with_search("50%_off\\").search_pattern(),
            Some("%50\\%\\_off\\\\%".to_owned())
        );
    }
}
