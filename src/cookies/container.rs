//! Container readers for table-shaped cookie stores.
//!
//! A [`Container`] exposes two things: the declared tables and columns, and
//! a visitor over every record of one table in natural storage order. The
//! schema resolver uses the first, the store walker the second.
//!
//! [`SqliteContainer`] reads the Firefox and Chromium SQLite files through
//! `rusqlite`. [`MemoryContainer`] holds records directly, which lets callers
//! feed records with exotic encodings that SQLite itself never produces.

use crate::base::context::IoResultExt;
use crate::base::cookieerror::CookieError;
use crate::cookies::value::{RawValue, Record};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A declared column, in declaration order within its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Callback invoked once per record by [`Container::visit_table_records`].
///
/// Returning an error stops the visit and is handed back to the caller.
pub type RecordVisitor<'a> = dyn FnMut(Record) -> Result<(), CookieError> + 'a;

/// An opened cookie container.
pub trait Container {
    /// Enumerate declared tables with their columns.
    fn tables(&self) -> Result<Vec<TableInfo>, CookieError>;

    /// Visit every record of `table` in storage order.
    fn visit_table_records(
        &self,
        table: &str,
        visitor: &mut RecordVisitor<'_>,
    ) -> Result<(), CookieError>;

    /// Release the container.
    fn close(self: Box<Self>) -> Result<(), CookieError> {
        Ok(())
    }
}

/// Read-only view of a SQLite cookie database.
pub struct SqliteContainer {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteContainer {
    /// Open `path` read-only.
    ///
    /// The file is opened with `immutable=1`: browsers keep their cookie
    /// database locked while running, and this reader never writes. Pages
    /// still sitting in a `-wal` file are not visible.
    pub fn open(path: &Path) -> Result<Self, CookieError> {
        std::fs::metadata(path).store_context(path)?;

        let conn = Connection::open_with_flags(
            immutable_uri(path),
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(path = %path.display(), "opened cookie database");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already opened connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn, path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CookieError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}

impl Container for SqliteContainer {
    fn tables(&self) -> Result<Vec<TableInfo>, CookieError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY rowid")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        names
            .into_iter()
            .map(|name| {
                let columns = self.columns(&name)?;
                Ok(TableInfo { name, columns })
            })
            .collect()
    }

    fn visit_table_records(
        &self,
        table: &str,
        visitor: &mut RecordVisitor<'_>,
    ) -> Result<(), CookieError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT rowid, * FROM {}", quote_ident(table)))?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let row_id = row.get::<_, Option<i64>>(0)?;
            let mut values = Vec::with_capacity(column_count.saturating_sub(1));
            for idx in 1..column_count {
                values.push(raw_value(row.get_ref(idx)?));
            }
            visitor(Record { row_id, values })?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), CookieError> {
        self.conn.close().map_err(|(_, e)| CookieError::from(e))
    }
}

/// SQLite has a single integer storage class, so every integer surfaces as
/// `Int64`.
fn raw_value(value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Int64(i),
        ValueRef::Real(f) => RawValue::Real(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => RawValue::Text(s.to_string()),
            Err(_) => RawValue::Blob(bytes.to_vec()),
        },
        ValueRef::Blob(bytes) => RawValue::Blob(bytes.to_vec()),
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a `file:` URI for `path` with the `immutable` flag set.
fn immutable_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::from("file:");
    let has_drive = raw.len() >= 2 && raw.as_bytes()[1] == b':';
    if raw.starts_with('/') {
        uri.push_str("//");
    } else if has_drive {
        uri.push_str("///");
    }
    for b in raw.bytes() {
        match b {
            b'?' | b'#' | b'%' => {
                let _ = write!(uri, "%{:02X}", b);
            }
            b if b.is_ascii() => uri.push(b as char),
            b => {
                let _ = write!(uri, "%{:02X}", b);
            }
        }
    }
    uri.push_str("?immutable=1");
    uri
}

/// Records held in memory, keyed by table name.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    tables: Vec<TableInfo>,
    records: HashMap<String, Vec<Record>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table with the given column names and records.
    pub fn with_table(mut self, name: &str, columns: &[&str], records: Vec<Record>) -> Self {
        self.tables.push(TableInfo {
            name: name.to_string(),
            columns: columns.iter().map(|c| ColumnInfo::new(*c)).collect(),
        });
        self.records.insert(name.to_string(), records);
        self
    }

    /// Add records to a table without declaring column metadata for it.
    pub fn with_undeclared_table(mut self, name: &str, records: Vec<Record>) -> Self {
        self.records.insert(name.to_string(), records);
        self
    }
}

impl Container for MemoryContainer {
    fn tables(&self) -> Result<Vec<TableInfo>, CookieError> {
        Ok(self.tables.clone())
    }

    fn visit_table_records(
        &self,
        table: &str,
        visitor: &mut RecordVisitor<'_>,
    ) -> Result<(), CookieError> {
        let records = self.records.get(table).ok_or_else(|| CookieError::Database {
            message: format!("no such table: {}", table),
        })?;
        for record in records {
            visitor(record.clone())?;
        }
        Ok(())
    }
}
