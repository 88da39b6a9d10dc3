use crate::predicate::PredicateDescription;

/// Column selection, predicate and tolerance flags for one read.
///
/// Built once per scan and never modified afterwards; the builder methods
/// consume and return the value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOptions {
    included_columns: Vec<String>,
    predicate: PredicateDescription,
    skip_corrupt_records: bool,
    tolerant_schema_evolution: bool,
}

impl ReadOptions {
    pub fn new(included_columns: Vec<String>, predicate: PredicateDescription) -> Self {
        Self {
            included_columns,
            predicate,
            skip_corrupt_records: false,
            tolerant_schema_evolution: false,
        }
    }

    /// Drop rows the reader cannot decode instead of failing the read.
    pub fn skip_corrupt_records(mut self, skip: bool) -> Self {
        self.skip_corrupt_records = skip;
        self
    }

    /// Surface requested columns missing from storage as nulls instead of
    /// failing the read.
    pub fn tolerant_schema_evolution(mut self, tolerant: bool) -> Self {
        self.tolerant_schema_evolution = tolerant;
        self
    }

    pub fn included_columns(&self) -> &[String] {
        &self.included_columns
    }

    pub fn predicate(&self) -> &PredicateDescription {
        &self.predicate
    }

    pub fn skips_corrupt_records(&self) -> bool {
        self.skip_corrupt_records
    }

    pub fn is_tolerant_schema_evolution(&self) -> bool {
        self.tolerant_schema_evolution
    }
}
