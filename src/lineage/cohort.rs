//! Cohort buckets
//!
//! Topics are only traced against topics of comparable scale. The scale is
//! the number of seeds a period was run with, snapped to a configured target.

use super::{LineageError, LineageResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortBuckets {
    targets: Vec<usize>,
}

impl CohortBuckets {
    /// Targets are sorted and de-duplicated; at least one is required
    pub fn new(targets: impl IntoIterator<Item = usize>) -> LineageResult<Self> {
        let mut targets: Vec<usize> = targets.into_iter().collect();
        targets.sort_unstable();
        targets.dedup();
        if targets.is_empty() {
            return Err(LineageError::NoCohortTargets);
        }
        Ok(CohortBuckets { targets })
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Snap a seed count to a target.
    ///
    /// Counts outside the configured range go to the nearest end. A count
    /// exactly halfway between two targets keeps `previous` when it is one of
    /// them, otherwise takes the lower one.
    pub fn snap(&self, count: usize, previous: Option<usize>) -> usize {
        let idx = match self.targets.binary_search(&count) {
            Ok(i) => return self.targets[i],
            Err(i) => i,
        };
        if idx == 0 {
            return self.targets[0];
        }
        if idx == self.targets.len() {
            return self.targets[idx - 1];
        }

        let (lo, hi) = (self.targets[idx - 1], self.targets[idx]);
        let (to_lo, to_hi) = (count - lo, hi - count);
        if to_lo < to_hi {
            lo
        } else if to_hi < to_lo {
            hi
        } else if previous == Some(hi) {
            hi
        } else {
            lo
        }
    }
}

impl Default for CohortBuckets {
    fn default() -> Self {
        CohortBuckets {
            targets: vec![5, 10, 20, 100],
        }
    }
}
