//! Translation of per-column constraints into a storage predicate.

use colscan_storage::{ColumnReference, PredicateDescription};
use colscan_types::TupleDomain;

/// Builds the [`PredicateDescription`] pushed down to the storage reader.
pub struct PredicateBuilder;

impl PredicateBuilder {
    /// One reference per constrained column, in constraint order.
    ///
    /// An absent or empty constraint yields a predicate that accepts every
    /// row. The constraint itself is left untouched.
    pub fn build(constraint: &TupleDomain) -> PredicateDescription {
        let references = constraint
            .domains()
            .iter()
            .map(|(column, domain)| {
                tracing::debug!(
                    column = column.name(),
                    kind = %column.kind(),
                    ordinal = column.ordinal(),
                    "pushing down column domain"
                );
                ColumnReference::new(column.clone(), domain.clone())
            })
            .collect();
        PredicateDescription::new(references)
    }
}
