use std::sync::Arc;

use crate::error::SQLError;

/// A dynamically-typed SQL parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// One result row.
///
/// Column names are shared across all rows of a result set; lookups go by
/// name. Stores build rows, callers only read them.
#[derive(Debug, Clone)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Raw value of a column, if the result set has it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)
    }

    /// Text column. `None` when absent or of another type.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer column. `None` when absent or of another type.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// SQL execution interface over the embedded database.
pub trait SQLStore: Send + Sync {
    /// Run a SELECT and collect every row.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Run a mutating statement and report how many rows it touched.
    ///
    /// Guarded transitions build on this count: zero affected rows means the
    /// WHERE predicate no longer held and the caller lost the race.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Run several semicolon-separated statements without parameters.
    /// Schema creation goes through here.
    fn exec_batch(&self, sql: &str) -> Result<(), SQLError>;
}
