// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Cell`] sum type and the capability surface shared by both kinds of
//! cell. Column code only ever talks to cells through these methods.

use super::error::LayoutError;
use super::tree::{CellId, ColumnId, LayoutRegistry};

/// The application payload carried by a leaf.
///
/// The layout never looks inside a block; it only needs a stable identifier
/// to index it by.
pub trait Block {
    fn block_id(&self) -> &str;
}

impl Block for String {
    fn block_id(&self) -> &str {
        self
    }
}

/// A node occupying one position within a [`Column`][super::Column].
#[derive(Debug)]
pub struct Cell<B> {
    pub(super) parent: Option<ColumnId>,
    pub(super) deleted: bool,
    pub(super) kind: CellKind<B>,
}

#[derive(Debug)]
pub enum CellKind<B> {
    Leaf(LeafCell<B>),
    Group(GroupCell),
}

#[derive(Debug)]
pub struct LeafCell<B> {
    pub(super) block: B,
}

/// A cell that subdivides its width across 1 to 3 child columns.
#[derive(Debug)]
pub struct GroupCell {
    pub(super) columns: Vec<ColumnId>,
}

impl<B> Cell<B> {
    pub fn kind(&self) -> &CellKind<B> {
        &self.kind
    }

    /// The column this cell sits in, if any.
    pub fn parent(&self) -> Option<ColumnId> {
        self.parent
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, CellKind::Group(_))
    }

    pub fn block(&self) -> Option<&B> {
        match &self.kind {
            CellKind::Leaf(leaf) => Some(&leaf.block),
            CellKind::Group(_) => None,
        }
    }
}

impl GroupCell {
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }
}

impl<B: Block> LayoutRegistry<B> {
    /// A leaf's width comes from its column, so a detached leaf has none. A
    /// group always has one.
    pub fn cell_width(&self, cell: CellId) -> Option<u32> {
        match &self.cells[cell].kind {
            CellKind::Leaf(_) => self.cells[cell].parent.map(|p| self.columns[p].width),
            CellKind::Group(_) => Some(self.group_width(cell)),
        }
    }

    /// Leaves accept any width; groups redistribute it over their columns.
    pub fn set_cell_width(&mut self, cell: CellId, width: u32) -> Result<(), LayoutError> {
        let mut plan = vec![];
        self.plan_cell_width(cell, width, &mut plan)?;
        self.apply_plan(plan);
        Ok(())
    }

    pub fn cell_is_empty(&self, cell: CellId) -> bool {
        match &self.cells[cell].kind {
            // A leaf always carries its block.
            CellKind::Leaf(_) => false,
            CellKind::Group(_) => self.group_is_empty(cell),
        }
    }

    pub fn cell_min_width(&self, cell: CellId) -> u32 {
        match &self.cells[cell].kind {
            CellKind::Leaf(_) => self.sizes.min_size(),
            CellKind::Group(_) => self.group_min_width(cell),
        }
    }

    /// Widths this cell could give up while staying at a valid size.
    pub fn cell_free_space(&self, cell: CellId) -> Vec<u32> {
        match &self.cells[cell].kind {
            CellKind::Leaf(_) => self.leaf_free_space(cell),
            CellKind::Group(_) => self.group_free_space(cell),
        }
    }

    /// Deletes `cell` and everything under it, then detaches it from its
    /// column. Deleting an already deleted cell does nothing.
    pub fn delete_cell(&mut self, cell: CellId) -> Result<(), LayoutError> {
        let Some(c) = self.cells.get_mut(cell) else { return Ok(()) };
        if c.deleted {
            return Ok(());
        }
        c.deleted = true;
        let columns = match &c.kind {
            CellKind::Group(group) => group.columns.clone(),
            CellKind::Leaf(_) => vec![],
        };
        // Reverse order; each deletion splices itself out of the live list.
        for &column in columns.iter().rev() {
            self.delete_column(column)?;
        }
        if let Some(parent) = self.cells[cell].parent {
            self.remove_cell(parent, cell)?;
        }
        Ok(())
    }

    pub fn is_cell_deleted(&self, cell: CellId) -> bool {
        self.cells.get(cell).is_none_or(|c| c.deleted)
    }

    /// Records the column widths needed to give `cell` the width `width`,
    /// without touching the tree.
    pub(super) fn plan_cell_width(
        &self,
        cell: CellId,
        width: u32,
        plan: &mut Vec<(ColumnId, u32)>,
    ) -> Result<(), LayoutError> {
        match &self.cells[cell].kind {
            CellKind::Leaf(_) => Ok(()),
            CellKind::Group(_) => self.plan_group_width(cell, width, plan),
        }
    }
}
