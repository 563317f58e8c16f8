//! Column layout resolution for table-shaped cookie stores.
//!
//! Browsers reorder, add and drop cookie columns between releases without
//! bumping anything a reader could rely on. Each store family declares a
//! [`SchemaLayout`] of fallback positions; [`resolve`] starts from those and
//! overwrites them with whatever the container actually declares.

use crate::base::cookieerror::CookieError;
use crate::cookies::container::TableInfo;
use crate::cookies::value::{RawValue, Record};
use std::collections::HashMap;

/// Where a store family keeps its cookies, and where its columns usually are.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SchemaLayout {
    pub table: &'static str,
    /// Positions used when the container declares nothing better.
    pub fallbacks: &'static [(&'static str, usize)],
    /// Legacy column holding a precomputed base domain, if the family ever had one.
    pub base_domain_column: Option<&'static str>,
}

/// Names some container readers report for table constraints.
const PSEUDO_COLUMNS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN"];

/// Resolved positions of logical fields within one store's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    indices: HashMap<String, usize>,
    highest_index: usize,
    base_domain_removed: bool,
}

impl ColumnMap {
    pub fn highest_index(&self) -> usize {
        self.highest_index
    }

    /// True when the store lacks the legacy base-domain column, so the
    /// domain has to be derived from the host.
    pub fn base_domain_removed(&self) -> bool {
        self.base_domain_removed
    }

    pub fn contains(&self, column: &str) -> bool {
        self.indices.contains_key(column)
    }

    pub fn index(&self, column: &str) -> Result<usize, CookieError> {
        self.indices
            .get(column)
            .copied()
            .ok_or_else(|| CookieError::MissingColumn {
                column: column.to_string(),
            })
    }

    /// Reject records shorter than the declared schema.
    pub fn check_bounds(&self, record: &Record) -> Result<(), CookieError> {
        if self.highest_index >= record.len() {
            return Err(CookieError::ColumnIndexOutOfBound {
                index: self.highest_index,
                len: record.len(),
            });
        }
        Ok(())
    }

    /// Value of `column` in `record`.
    ///
    /// Fallback positions can point past a record whose schema was never
    /// declared, so the lookup is bounds-checked as well.
    pub fn get<'r>(&self, record: &'r Record, column: &str) -> Result<&'r RawValue, CookieError> {
        let index = self.index(column)?;
        record
            .values
            .get(index)
            .ok_or(CookieError::ColumnIndexOutOfBound {
                index,
                len: record.len(),
            })
    }
}

/// Build the column map for `layout` from the container's declared tables.
///
/// Never fails: missing tables or columns leave the fallbacks in place and
/// surface later as per-record decode errors.
pub(crate) fn resolve(tables: &[TableInfo], layout: &SchemaLayout) -> ColumnMap {
    let mut indices: HashMap<String, usize> = layout
        .fallbacks
        .iter()
        .map(|(name, idx)| (name.to_string(), *idx))
        .collect();
    let mut highest_index = 0;
    let mut base_domain_removed = true;
    let mut declared = 0;

    for table in tables.iter().filter(|t| t.name == layout.table) {
        for (id, column) in table.columns.iter().enumerate() {
            // constraint members may follow; none of them are data columns
            if PSEUDO_COLUMNS.contains(&column.name.as_str()) {
                break;
            }
            if Some(column.name.as_str()) == layout.base_domain_column {
                base_domain_removed = false;
            }
            highest_index = highest_index.max(id);
            indices.insert(column.name.clone(), id);
            declared += 1;
        }
    }

    tracing::debug!(
        table = layout.table,
        declared,
        highest_index,
        base_domain_removed,
        "resolved cookie table schema"
    );

    ColumnMap {
        indices,
        highest_index,
        base_domain_removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::container::ColumnInfo;

    const LAYOUT: SchemaLayout = SchemaLayout {
        table: "moz_cookies",
        fallbacks: &[("baseDomain", 1), ("name", 2), ("value", 3), ("host", 4)],
        base_domain_column: Some("baseDomain"),
    };

    fn table(name: &str, columns: &[&str]) -> TableInfo {
        TableInfo {
            name: name.to_string(),
            columns: columns.iter().map(|c| ColumnInfo::new(*c)).collect(),
        }
    }

    #[test]
    fn test_fallbacks_without_metadata() {
        let map = resolve(&[], &LAYOUT);
        assert_eq!(map.index("name").unwrap(), 2);
        assert_eq!(map.index("host").unwrap(), 4);
        assert_eq!(map.highest_index(), 0);
        assert!(map.base_domain_removed());
    }

    #[test]
    fn test_declared_columns_override_fallbacks() {
        let tables = [table("moz_cookies", &["id", "originAttributes", "host", "name", "value"])];
        let map = resolve(&tables, &LAYOUT);
        assert_eq!(map.index("host").unwrap(), 2);
        assert_eq!(map.index("name").unwrap(), 3);
        assert_eq!(map.index("value").unwrap(), 4);
        assert_eq!(map.index("originAttributes").unwrap(), 1);
        assert_eq!(map.highest_index(), 4);
        assert!(map.base_domain_removed());
    }

    #[test]
    fn test_legacy_base_domain_column_detected() {
        let tables = [table("moz_cookies", &["id", "baseDomain", "name", "value", "host"])];
        let map = resolve(&tables, &LAYOUT);
        assert!(!map.base_domain_removed());
        assert_eq!(map.index("baseDomain").unwrap(), 1);
    }

    #[test]
    fn test_pseudo_columns_skipped() {
        let tables = [table("moz_cookies", &["id", "name", "value", "CONSTRAINT"])];
        let map = resolve(&tables, &LAYOUT);
        assert!(!map.contains("CONSTRAINT"));
        assert_eq!(map.highest_index(), 2);
    }

    #[test]
    fn test_scan_stops_at_constraint() {
        let tables = [table(
            "moz_cookies",
            &["id", "name", "value", "CONSTRAINT", "name", "value", "originAttributes"],
        )];
        let map = resolve(&tables, &LAYOUT);
        assert_eq!(map.highest_index(), 2);
        assert_eq!(map.index("name").unwrap(), 1);
        assert_eq!(map.index("value").unwrap(), 2);
        assert!(!map.contains("originAttributes"));
    }

    #[test]
    fn test_other_tables_ignored() {
        let tables = [
            table("moz_meta", &["a", "b", "c", "d", "e", "f", "g"]),
            table("moz_cookies", &["id", "name"]),
        ];
        let map = resolve(&tables, &LAYOUT);
        assert_eq!(map.highest_index(), 1);
        assert_eq!(map.index("name").unwrap(), 1);
    }

    #[test]
    fn test_bounds() {
        let tables = [table("moz_cookies", &["id", "name", "value"])];
        let map = resolve(&tables, &LAYOUT);

        let short = Record::new(vec![RawValue::Int64(1), "a".into()]);
        assert!(matches!(
            map.check_bounds(&short),
            Err(CookieError::ColumnIndexOutOfBound { index: 2, len: 2 })
        ));

        let full = Record::new(vec![RawValue::Int64(1), "a".into(), "b".into()]);
        assert!(map.check_bounds(&full).is_ok());
        assert_eq!(map.get(&full, "value").unwrap(), &RawValue::from("b"));
        assert!(matches!(
            map.get(&full, "host"),
            Err(CookieError::ColumnIndexOutOfBound { index: 4, .. })
        ));
        assert!(matches!(
            map.get(&full, "expiry"),
            Err(CookieError::MissingColumn { .. })
        ));
    }
}
