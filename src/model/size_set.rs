// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// The fixed set of widths a column may hold, largest first.
///
/// The canonical set for a 12-unit grid is `[12, 8, 6, 4]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct SizeSet {
    sizes: Vec<u32>,
}

impl SizeSet {
    pub fn new(sizes: Vec<u32>) -> Result<Self, LayoutError> {
        if sizes.is_empty() {
            return Err(LayoutError::Config("a size set must contain at least one width"));
        }
        if sizes.contains(&0) {
            return Err(LayoutError::Config("a size set cannot contain a zero width"));
        }
        if !sizes.windows(2).all(|w| w[0] > w[1]) {
            return Err(LayoutError::Config("a size set must be strictly descending"));
        }
        Ok(SizeSet { sizes })
    }

    /// The canonical 12/8/6/4 grid.
    pub fn standard() -> Self {
        SizeSet { sizes: vec![12, 8, 6, 4] }
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn is_valid(&self, size: u32) -> bool {
        self.sizes.contains(&size)
    }

    pub fn are_all_valid(&self, sizes: &[u32]) -> bool {
        sizes.iter().all(|&s| self.is_valid(s))
    }

    pub fn min_size(&self) -> u32 {
        // Non-empty by construction.
        self.sizes[self.sizes.len() - 1]
    }

    pub fn sum(&self, sizes: &[u32]) -> u32 {
        sizes.iter().sum()
    }
}

impl TryFrom<Vec<u32>> for SizeSet {
    type Error = LayoutError;

    fn try_from(sizes: Vec<u32>) -> Result<Self, Self::Error> {
        SizeSet::new(sizes)
    }
}

impl From<SizeSet> for Vec<u32> {
    fn from(set: SizeSet) -> Self {
        set.sizes
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn it_answers_membership_queries() {
        let set = SizeSet::standard();
        assert!(set.is_valid(8));
        assert!(!set.is_valid(10));
        assert!(set.are_all_valid(&[4, 4, 4]));
        assert!(!set.are_all_valid(&[4, 2]));
        assert!(set.are_all_valid(&[]));
        assert_eq!(set.min_size(), 4);
        assert_eq!(set.sum(&[8, 4]), 12);
    }

    #[test]
    fn it_rejects_malformed_sets() {
        assert!(matches!(SizeSet::new(vec![]), Err(LayoutError::Config(_))));
        assert!(matches!(SizeSet::new(vec![6, 0]), Err(LayoutError::Config(_))));
        assert!(matches!(SizeSet::new(vec![4, 8]), Err(LayoutError::Config(_))));
        assert!(matches!(SizeSet::new(vec![8, 8]), Err(LayoutError::Config(_))));
    }

    #[test]
    fn single_width_set_is_its_own_minimum() {
        let set = SizeSet::new(vec![5]).unwrap();
        assert_eq!(set.min_size(), 5);
    }
}
