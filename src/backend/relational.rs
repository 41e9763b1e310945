//! Relational backend
//!
//! PUT becomes an upsert statement, GET a single-row select. Keys and
//! values travel as bound parameters, never spliced into the SQL text.

use std::fmt;

use super::Backend;
use crate::error::BackendError;

/// Statements the adapter issues
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Insert a row or overwrite its value column
    Upsert {
        table: String,
        key_column: String,
        value_column: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },

    /// Fetch the value column of one row
    SelectOne {
        table: String,
        key_column: String,
        value_column: String,
        key: Vec<u8>,
    },
}

impl Statement {
    /// SQL text with `?` placeholders
    pub fn sql(&self) -> String {
        match self {
            Statement::Upsert {
                table,
                key_column,
                value_column,
                ..
            } => format!(
                "INSERT INTO {table} ({key_column}, {value_column}) VALUES (?, ?) \
                 ON DUPLICATE KEY UPDATE {value_column} = VALUES({value_column})"
            ),
            Statement::SelectOne {
                table,
                key_column,
                value_column,
                ..
            } => format!("SELECT {value_column} FROM {table} WHERE {key_column} = ?"),
        }
    }

    /// Parameters, in placeholder order
    pub fn params(&self) -> Vec<&[u8]> {
        match self {
            Statement::Upsert { key, value, .. } => vec![key.as_slice(), value.as_slice()],
            Statement::SelectOne { key, .. } => vec![key.as_slice()],
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// The calls a relational driver must offer
pub trait RelationalClient {
    /// Run a statement, returning the affected row count
    fn execute(&mut self, statement: &Statement) -> Result<u64, BackendError>;

    /// Run a query, returning the first column of the first row
    fn query_one(&mut self, statement: &Statement) -> Result<Option<Vec<u8>>, BackendError>;
}

/// Adapter from a relational driver to `Backend`
pub struct RelationalBackend<C> {
    name: String,
    client: C,
    table: String,
    key_column: String,
    value_column: String,
}

impl<C: RelationalClient> RelationalBackend<C> {
    /// Adapter over `Data (name, data)`
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self::with_table(name, client, "Data", "name", "data")
    }

    pub fn with_table(
        name: impl Into<String>,
        client: C,
        table: impl Into<String>,
        key_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            table: table.into(),
            key_column: key_column.into(),
            value_column: value_column.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn upsert(&self, key: &[u8], value: &[u8]) -> Statement {
        Statement::Upsert {
            table: self.table.clone(),
            key_column: self.key_column.clone(),
            value_column: self.value_column.clone(),
            key: key.to_vec(),
            value: value.to_vec(),
        }
    }

    fn select(&self, key: &[u8]) -> Statement {
        Statement::SelectOne {
            table: self.table.clone(),
            key_column: self.key_column.clone(),
            value_column: self.value_column.clone(),
            key: key.to_vec(),
        }
    }
}

impl<C: RelationalClient> Backend for RelationalBackend<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), BackendError> {
        let statement = self.upsert(key, value);
        self.client.execute(&statement)?;
        Ok(())
    }

    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>, BackendError> {
        let statement = self.select(key);
        self.client.query_one(&statement)
    }
}
