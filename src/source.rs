//! Table source abstraction for fetched relational rows.
//!
//! The pipeline never talks to a backend itself: the caller owns
//! connectivity, retries and caching, and hands the pipeline either
//! already-fetched record sequences or a narrow fetch capability through
//! [`TableSource`]. A fetch failure is the collaborator's problem and must
//! surface here as an empty table.

use serde_json::Value;
use std::collections::HashMap;

/// One fetched row: field name to raw cell value. Cells arrive as JSON
/// values (string, number or null) and are coerced at the assembler boundary.
pub type Record = HashMap<String, Value>;

/// Trait abstracting where table rows come from.
///
/// Implementations handle connectivity and error recovery internally; a
/// table that could not be fetched is returned as an empty sequence.
pub trait TableSource {
    /// Fetch all rows of the named table.
    fn fetch_table(&self, name: &str) -> Vec<Record>;
}

/// In-memory source backed by pre-loaded tables.
///
/// Used by tests and by callers that fetch rows themselves before invoking
/// the pipeline. Unknown table names yield an empty sequence.
#[derive(Debug, Default, Clone)]
pub struct StaticTableSource {
    tables: HashMap<String, Vec<Record>>,
}

impl StaticTableSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any previous rows under the same name.
    pub fn with_table(mut self, name: &str, rows: Vec<Record>) -> Self {
        self.tables.insert(name.to_string(), rows);
        self
    }
}

impl TableSource for StaticTableSource {
    fn fetch_table(&self, name: &str) -> Vec<Record> {
        self.tables.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_source_returns_registered_rows() {
        let mut row = Record::new();
        row.insert("id_punto".to_string(), json!(1));
        let source = StaticTableSource::new().with_table("puntos_criticos", vec![row]);

        assert_eq!(source.fetch_table("puntos_criticos").len(), 1);
    }

    #[test]
    fn test_unknown_table_is_empty() {
        let source = StaticTableSource::new();
        assert!(source.fetch_table("no_such_table").is_empty());
    }
}
