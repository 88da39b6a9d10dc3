//! Value domains and per-column constraints.
//!
//! A [`Domain`] describes which values of one column may satisfy a query; a
//! [`TupleDomain`] maps columns to domains. Storage readers evaluate them;
//! the scan layer only forwards them.

use std::cmp::Ordering;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::kind::ColumnHandle;
use crate::value::ScalarValue;

/// A contiguous range of values. Unbounded ends use [`Bound::Unbounded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub low: Bound<ScalarValue>,
    pub high: Bound<ScalarValue>,
}

impl ValueRange {
    pub fn new(low: Bound<ScalarValue>, high: Bound<ScalarValue>) -> Self {
        Self { low, high }
    }

    /// Inclusive range `[low, high]`.
    pub fn closed(low: impl Into<ScalarValue>, high: impl Into<ScalarValue>) -> Self {
        Self {
            low: Bound::Included(low.into()),
            high: Bound::Included(high.into()),
        }
    }

    pub fn contains(&self, value: &ScalarValue) -> bool {
        let above_low = match &self.low {
            Bound::Unbounded => true,
            Bound::Included(lo) => matches!(
                value.partial_cmp(lo),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Bound::Excluded(lo) => matches!(value.partial_cmp(lo), Some(Ordering::Greater)),
        };
        if !above_low {
            return false;
        }
        match &self.high {
            Bound::Unbounded => true,
            Bound::Included(hi) => matches!(
                value.partial_cmp(hi),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Bound::Excluded(hi) => matches!(value.partial_cmp(hi), Some(Ordering::Less)),
        }
    }
}

/// Non-null part of a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainValues {
    /// Every non-null value.
    All,
    /// No non-null value.
    None,
    /// Union of ranges.
    Ranges(Vec<ValueRange>),
    /// Explicit set of values.
    Discrete(Vec<ScalarValue>),
}

/// Allowed values for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub values: DomainValues,
    pub null_allowed: bool,
}

impl Domain {
    /// Accept everything, including nulls.
    pub fn all() -> Self {
        Self {
            values: DomainValues::All,
            null_allowed: true,
        }
    }

    /// Reject everything, including nulls.
    pub fn none() -> Self {
        Self {
            values: DomainValues::None,
            null_allowed: false,
        }
    }

    /// Inclusive range `[low, high]`, nulls rejected.
    pub fn range(low: impl Into<ScalarValue>, high: impl Into<ScalarValue>) -> Self {
        Self {
            values: DomainValues::Ranges(vec![ValueRange::closed(low, high)]),
            null_allowed: false,
        }
    }

    pub fn ranges(ranges: Vec<ValueRange>) -> Self {
        Self {
            values: DomainValues::Ranges(ranges),
            null_allowed: false,
        }
    }

    pub fn single(value: impl Into<ScalarValue>) -> Self {
        Self::discrete(vec![value.into()])
    }

    pub fn discrete(values: Vec<ScalarValue>) -> Self {
        Self {
            values: DomainValues::Discrete(values),
            null_allowed: false,
        }
    }

    /// Only nulls.
    pub fn only_null() -> Self {
        Self {
            values: DomainValues::None,
            null_allowed: true,
        }
    }

    pub fn with_nulls(mut self, null_allowed: bool) -> Self {
        self.null_allowed = null_allowed;
        self
    }

    /// Whether `value` (`None` for SQL null) satisfies the domain.
    pub fn includes(&self, value: Option<&ScalarValue>) -> bool {
        let Some(value) = value else {
            return self.null_allowed;
        };
        match &self.values {
            DomainValues::All => true,
            DomainValues::None => false,
            DomainValues::Ranges(ranges) => ranges.iter().any(|r| r.contains(value)),
            DomainValues::Discrete(values) => values
                .iter()
                .any(|v| value.partial_cmp(v) == Some(Ordering::Equal)),
        }
    }

    pub fn is_all(&self) -> bool {
        self.null_allowed && matches!(self.values, DomainValues::All)
    }
}

/// Column-to-domain constraint for one scan.
///
/// The map may be entirely absent, which means "no restriction". A column
/// without an entry is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TupleDomain {
    domains: Option<Vec<(ColumnHandle, Domain)>>,
}

impl TupleDomain {
    /// Constraint with no map at all.
    pub fn all() -> Self {
        Self { domains: None }
    }

    pub fn from_domains(domains: impl IntoIterator<Item = (ColumnHandle, Domain)>) -> Self {
        domains
            .into_iter()
            .fold(Self::all(), |acc, (col, dom)| acc.with_domain(col, dom))
    }

    /// Add or replace the domain of `column`.
    pub fn with_domain(mut self, column: ColumnHandle, domain: Domain) -> Self {
        let domains = self.domains.get_or_insert_with(Vec::new);
        match domains.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = domain,
            None => domains.push((column, domain)),
        }
        self
    }

    /// Present entries; empty when the map is absent.
    pub fn domains(&self) -> &[(ColumnHandle, Domain)] {
        self.domains.as_deref().unwrap_or(&[])
    }

    pub fn is_absent(&self) -> bool {
        self.domains.is_none()
    }

    pub fn domain_for(&self, column: &ColumnHandle) -> Option<&Domain> {
        self.domains()
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, d)| d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ScalarKind;

    #[test]
    fn closed_range_includes_both_ends() {
        let dom = Domain::range(18, 65);
        assert!(dom.includes(Some(&18.into())));
        assert!(dom.includes(Some(&65.into())));
        assert!(!dom.includes(Some(&17.into())));
        assert!(!dom.includes(Some(&66.into())));
        assert!(!dom.includes(None));
    }

    #[test]
    fn excluded_bounds_are_respected() {
        let dom = Domain::ranges(vec![ValueRange::new(
            Bound::Excluded("b".into()),
            Bound::Unbounded,
        )]);
        assert!(!dom.includes(Some(&"b".into())));
        assert!(dom.includes(Some(&"ba".into())));
    }

    #[test]
    fn discrete_domain_matches_members_only() {
        let dom = Domain::discrete(vec![1.into(), 3.into()]).with_nulls(true);
        assert!(dom.includes(Some(&3.into())));
        assert!(!dom.includes(Some(&2.into())));
        assert!(dom.includes(None));
    }

    #[test]
    fn with_domain_replaces_existing_entry() {
        let age = ColumnHandle::new("age", ScalarKind::Integer, 1);
        let td = TupleDomain::all()
            .with_domain(age.clone(), Domain::range(0, 10))
            .with_domain(age.clone(), Domain::range(18, 65));
        assert_eq!(td.domains().len(), 1);
        assert_eq!(td.domain_for(&age), Some(&Domain::range(18, 65)));
    }

    #[test]
    fn absent_map_has_no_entries() {
        let td = TupleDomain::all();
        assert!(td.is_absent());
        assert!(td.domains().is_empty());
    }
}
