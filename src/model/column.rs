// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use tracing::debug;

use super::cell::Block;
use super::error::LayoutError;
use super::tree::{CellId, ColumnId, LayoutRegistry};

impl<B: Block> LayoutRegistry<B> {
    /// Sets the width of `column` and every cell in it.
    ///
    /// Nested groups are redistributed. Nothing is modified if any part of
    /// the subtree rejects the width.
    pub fn set_column_width(&mut self, column: ColumnId, width: u32) -> Result<(), LayoutError> {
        let mut plan = vec![];
        self.plan_column_width(column, width, &mut plan)?;
        self.apply_plan(plan);
        Ok(())
    }

    /// Inserts `cell` before `before`, or at the end if `before` is `None` or
    /// not in this column. The cell takes on the column's width.
    pub fn add_cell(
        &mut self,
        column: ColumnId,
        cell: CellId,
        before: Option<CellId>,
    ) -> Result<(), LayoutError> {
        let width = self.live_column(column)?.width;
        self.ensure_detached_cell(cell)?;
        if self.column_is_inside(column, cell) {
            return Err(LayoutError::Structural("cannot add a group to a column inside it"));
        }
        // Size the cell while it is still detached; a group measures its
        // current width from its own columns until it has a parent.
        self.set_cell_width(cell, width)?;

        let col = &mut self.columns[column];
        let index = before
            .and_then(|b| col.cells.iter().position(|&c| c == b))
            .unwrap_or(col.cells.len());
        col.cells.insert(index, cell);
        self.cells[cell].parent = Some(column);
        Ok(())
    }

    /// Removes `cell` from `column`, doing nothing if it is not there.
    ///
    /// If this leaves the column's group without content anywhere in it, the
    /// group is deleted.
    pub fn remove_cell(&mut self, column: ColumnId, cell: CellId) -> Result<(), LayoutError> {
        let Some(col) = self.columns.get_mut(column) else { return Ok(()) };
        if let Some(index) = col.cells.iter().position(|&c| c == cell) {
            col.cells.remove(index);
            if let Some(c) = self.cells.get_mut(cell) {
                c.parent = None;
            }
        }

        let Some(group) = self.columns[column].parent else { return Ok(()) };
        if !self.is_cell_deleted(group) && self.group_is_empty(group) {
            debug!(?group, "deleting column group left without content");
            self.delete_cell(group)?;
        }
        Ok(())
    }

    /// A column must be as wide as the widest minimum of its cells.
    pub fn column_min_width(&self, column: ColumnId) -> u32 {
        self.columns[column]
            .cells
            .iter()
            .map(|&c| self.cell_min_width(c))
            .max()
            .unwrap_or(0)
    }

    /// Deletes `column` and all of its cells, then detaches it from its
    /// group. Deleting an already deleted column does nothing.
    ///
    /// Fails without changing anything if the group cannot take back the
    /// column's width.
    pub fn delete_column(&mut self, column: ColumnId) -> Result<(), LayoutError> {
        let Some(col) = self.columns.get(column) else { return Ok(()) };
        if col.deleted {
            return Ok(());
        }
        if let Some(group) = col.parent.filter(|&g| !self.is_cell_deleted(g)) {
            // Removing the last content of the group deletes it instead.
            let group_survives = col.cells.is_empty()
                || self
                    .group_columns(group)
                    .iter()
                    .any(|&c| c != column && !self.column_is_empty(c));
            if group_survives {
                self.plan_donation(group, column, &mut vec![])?;
            }
        }
        let col = &mut self.columns[column];
        col.deleted = true;
        let cells = col.cells.clone();
        for &cell in cells.iter().rev() {
            self.delete_cell(cell)?;
        }
        if let Some(group) = self.columns[column].parent {
            self.remove_group_column(group, column)?;
        }
        Ok(())
    }

    pub fn column_is_empty(&self, column: ColumnId) -> bool {
        self.columns[column].cells.iter().all(|&c| self.cell_is_empty(c))
    }

    /// Widths the column could give up with every cell still at a valid size:
    /// the free space all of its cells have in common.
    ///
    /// An empty column reports nothing.
    pub fn column_free_space(&self, column: ColumnId) -> Vec<u32> {
        let mut cells = self.columns[column].cells.iter();
        let Some(&first) = cells.next() else { return vec![] };
        let mut common = self.cell_free_space(first);
        for &cell in cells {
            if common.is_empty() {
                break;
            }
            let other = self.cell_free_space(cell);
            common.retain(|space| other.contains(space));
        }
        common
    }

    pub(super) fn plan_column_width(
        &self,
        column: ColumnId,
        width: u32,
        plan: &mut Vec<(ColumnId, u32)>,
    ) -> Result<(), LayoutError> {
        if !self.sizes.is_valid(width) {
            return Err(LayoutError::InvalidSize { node: "column", width });
        }
        for &cell in &self.columns[column].cells {
            self.plan_cell_width(cell, width, plan)?;
        }
        plan.push((column, width));
        Ok(())
    }
}
