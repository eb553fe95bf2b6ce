//! Resolution results: the ordered plan and any unsatisfied requirements.

use std::fmt;

use stepwise_core::unit::VersionedUnit;
use stepwise_core::version::Version;

/// Units to apply, in order, plus the requirements the starting state
/// does not meet.
#[derive(Debug)]
pub struct VersionedItems<'m, U> {
    ordered: Vec<&'m U>,
    unsatisfied: Vec<&'m U>,
}

impl<U> Clone for VersionedItems<'_, U> {
    fn clone(&self) -> Self {
        Self {
            ordered: self.ordered.clone(),
            unsatisfied: self.unsatisfied.clone(),
        }
    }
}

impl<'m, U: VersionedUnit> VersionedItems<'m, U> {
    pub(crate) fn new(ordered: Vec<&'m U>, unsatisfied: Vec<&'m U>) -> Self {
        Self {
            ordered,
            unsatisfied,
        }
    }

    /// Units in the order they must be applied.
    pub fn ordered(&self) -> &[&'m U] {
        &self.ordered
    }

    /// Units required by the plan but newer than the starting state, in
    /// baseline order. These are not part of [`ordered`](Self::ordered).
    pub fn unsatisfied(&self) -> &[&'m U] {
        &self.unsatisfied
    }

    /// `true` when nothing is unsatisfied.
    pub fn is_valid(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn versions(&self) -> Vec<&'m Version> {
        self.ordered.iter().map(|u| u.version()).collect()
    }

    pub fn unsatisfied_versions(&self) -> Vec<&'m Version> {
        self.unsatisfied.iter().map(|u| u.version()).collect()
    }
}

impl<U: VersionedUnit> fmt::Display for VersionedItems<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ordered.is_empty() {
            writeln!(f, "Nothing to apply.")?;
        } else {
            writeln!(f, "Apply ({}):", self.ordered.len())?;
            for (i, unit) in self.ordered.iter().enumerate() {
                writeln!(f, "  {:>3}. {}", i + 1, unit.version())?;
            }
        }
        if !self.unsatisfied.is_empty() {
            writeln!(f, "Unsatisfied ({}):", self.unsatisfied.len())?;
            for unit in &self.unsatisfied {
                writeln!(f, "  {} is required but not yet applied", unit.version())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepwise_core::unit::Unit;

    fn unit(s: &str) -> Unit {
        Unit::new(Version::parse(s).unwrap())
    }

    #[test]
    fn empty_plan() {
        let items: VersionedItems<'_, Unit> = VersionedItems::new(vec![], vec![]);
        assert!(items.is_empty());
        assert!(items.is_valid());
        assert_eq!(items.to_string(), "Nothing to apply.\n");
    }

    #[test]
    fn plan_with_unsatisfied() {
        let app = unit("app-1");
        let scout = unit("scout-2");
        let items = VersionedItems::new(vec![&app], vec![&scout]);
        assert_eq!(items.len(), 1);
        assert!(!items.is_valid());
        assert_eq!(items.unsatisfied_versions()[0].to_string(), "scout-2");
        let s = items.to_string();
        assert!(s.contains("Apply (1):"));
        assert!(s.contains("  1. app-1"));
        assert!(s.contains("scout-2 is required but not yet applied"));
    }
}
