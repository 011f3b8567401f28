// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::{debug, instrument};

use super::cell::{Block, CellKind};
use super::error::LayoutError;
use super::tree::{CellId, LayoutRegistry};

impl<B: Block> LayoutRegistry<B> {
    /// The difference between the leaf's width and each smaller valid size,
    /// in size set order.
    ///
    /// For width 8 on the 12/8/6/4 grid this is `[2, 4]`.
    pub(super) fn leaf_free_space(&self, leaf: CellId) -> Vec<u32> {
        let Some(width) = self.cell_width(leaf) else { return vec![] };
        self.sizes
            .sizes()
            .iter()
            .filter(|&&size| size < width)
            .map(|&size| width - size)
            .collect()
    }

    /// Whether the leaf is wide enough to be split into two columns.
    pub fn can_replace_with_columns(&self, leaf: CellId) -> bool {
        match self.cell(leaf) {
            Some(cell) if !cell.is_group() => self
                .leaf_free_space(leaf)
                .into_iter()
                .any(|space| self.sizes.is_valid(space)),
            _ => false,
        }
    }

    /// Splits `leaf` into a two-column group that takes its place in its
    /// column, with the leaf moved into the left or right half.
    ///
    /// Returns the new group.
    #[instrument(skip(self))]
    pub fn replace_with_columns(
        &mut self,
        leaf: CellId,
        place_in_right_column: bool,
    ) -> Result<CellId, LayoutError> {
        if !matches!(self.live_cell(leaf)?.kind, CellKind::Leaf(_)) {
            return Err(LayoutError::Structural("only a leaf can be split into columns"));
        }
        if !self.can_replace_with_columns(leaf) {
            return Err(LayoutError::Structural(
                "the leaf has no room to be split into columns",
            ));
        }
        // A leaf with free space always has a column.
        let Some(parent) = self.cells[leaf].parent else {
            return Err(LayoutError::Structural("the leaf has no column"));
        };

        let Some(index) = self.columns[parent].cells.iter().position(|&c| c == leaf) else {
            return Err(LayoutError::Structural("the leaf is missing from its column"));
        };
        let group = self.create_default_group()?;
        if let Err(e) = self.plan_cell_width(group, self.columns[parent].width, &mut vec![]) {
            self.delete_cell(group)?;
            return Err(e);
        }
        let target = self.group_columns(group)[usize::from(place_in_right_column)];

        // Move the leaf directly so the owning column is never seen without
        // its content, which would otherwise trigger cleanup of its group.
        self.columns[parent].cells.remove(index);
        self.columns[target].cells.push(leaf);
        self.cells[leaf].parent = Some(target);

        let before = self.columns[parent].cells.get(index).copied();
        self.add_cell(parent, group, before)?;
        debug!(?leaf, ?group, "split leaf into columns");
        Ok(group)
    }
}
