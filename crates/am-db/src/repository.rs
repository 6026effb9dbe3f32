//! Repository error type and listing result page

use serde::Serialize;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Rows produced by a windowed listing query carry the total match count
pub trait CountedRow {
    fn total_count(&self) -> i64;
}

/// One page of a listing plus the number of rows matching before pagination
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
    pub rows: Vec<T>,
    pub total_count: i64,
}

impl<T> ResultPage<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: CountedRow> ResultPage<T> {
    /// Read the total from the first row; no rows means nothing matched.
    ///
    /// A page past the end also yields zero rows and so reports a total of 0.
    pub fn from_counted_rows(rows: Vec<T>) -> Self {
        let total_count = rows.first().map(CountedRow::total_count).unwrap_or(0);
        Self { rows, total_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize)]
    struct Row {
        #[serde(skip)]
        total: i64,
        name: &'static str,
    }

    impl CountedRow for Row {
        fn total_count(&self) -> i64 {
            self.total
        }
    }

    #[test]
    fn test_total_read_from_first_row() {
        let page = ResultPage::from_counted_rows(vec![
            Row { total: 25, name: "a" },
            Row { total: 25, name: "b" },
        ]);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.rows.len(), 2);
    }

    #[test]
    fn test_empty_rows_mean_zero_total() {
        let page = ResultPage::<Row>::from_counted_rows(Vec::new());
        assert_eq!(page, ResultPage::empty());
        assert!(page.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let page = ResultPage::from_counted_rows(vec![Row { total: 1, name: "a" }]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({"rows": [{"name": "a"}], "totalCount": 1}));

        let empty = serde_json::to_value(ResultPage::<Row>::empty()).unwrap();
        assert_eq!(empty, serde_json::json!({"rows": [], "totalCount": 0}));
    }
}
