//! Storage-level predicate description.

use std::fmt;

use colscan_types::{ColumnHandle, Domain, ScalarKind, ScalarValue};

/// One constrained column: which physical column, how to read it, and which
/// values are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReference {
    pub column: ColumnHandle,
    pub ordinal: usize,
    pub kind: ScalarKind,
    pub domain: Domain,
}

impl ColumnReference {
    pub fn new(column: ColumnHandle, domain: Domain) -> Self {
        Self {
            ordinal: column.ordinal(),
            kind: column.kind().clone(),
            column,
            domain,
        }
    }
}

/// Conjunction of per-column domains handed opaquely to a storage reader.
///
/// A description with no references accepts every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateDescription {
    references: Vec<ColumnReference>,
}

impl PredicateDescription {
    pub fn new(references: Vec<ColumnReference>) -> Self {
        Self { references }
    }

    /// Predicate that accepts every row.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn references(&self) -> &[ColumnReference] {
        &self.references
    }

    pub fn referenced_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.column.name()).collect()
    }

    pub fn is_accept_all(&self) -> bool {
        self.references.is_empty()
    }

    /// Reference evaluation against a probe row.
    ///
    /// `value_of` maps a column ordinal to its value in the row, `None` for
    /// null or absent. A row matches when every referenced column's value
    /// lies in its domain.
    pub fn matches<F>(&self, value_of: F) -> bool
    where
        F: Fn(usize) -> Option<ScalarValue>,
    {
        self.references
            .iter()
            .all(|r| r.domain.includes(value_of(r.ordinal).as_ref()))
    }
}

impl fmt::Display for PredicateDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.references.is_empty() {
            return f.write_str("TRUE");
        }
        for (i, r) in self.references.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{} IN {:?}", r.column, r.domain.values)?;
        }
        Ok(())
    }
}
