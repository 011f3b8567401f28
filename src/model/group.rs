// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Width maintenance for column groups.
//!
//! A group keeps the widths of its columns summing to its own width. When its
//! width changes, a column is inserted, or a column is removed, the widths are
//! redistributed; when it runs out of columns it deletes or flattens itself.
//!
//! Redistribution is driven by [`column_width_combinations`], a bounded
//! search over alternative width assignments. It only explores moving one
//! column's free space to one other column, plus shrinking every column to
//! its minimum. It is not an exhaustive enumeration.
//!
//! [`column_width_combinations`]: LayoutRegistry::column_width_combinations

use std::cmp::Reverse;

use indexmap::IndexSet;
use tracing::{debug, instrument};

use super::cell::{Block, Cell, CellKind, GroupCell};
use super::error::LayoutError;
use super::tree::{CellId, ColumnId, LayoutRegistry, MAX_GROUP_COLUMNS};

/// Column widths for a group of `columns` columns resized to `width`.
///
/// Only the canonical 12/8/6/4 grid has policies. Three-column groups are
/// already minimal and only exist at full width.
fn split_policy(columns: usize, width: u32) -> Option<&'static [u32]> {
    match (columns, width) {
        (3, 12) => Some(&[]),
        (2, 12) => Some(&[6, 6]),
        (2, 8) => Some(&[4, 4]),
        _ => None,
    }
}

/// The queries in this module panic when given the id of a leaf. The
/// mutators return [`LayoutError::Structural`] instead.
impl<B: Block> LayoutRegistry<B> {
    pub fn group_columns(&self, group: CellId) -> &[ColumnId] {
        &self.group(group).columns
    }

    /// The owning column's width, or the sum of the columns for a detached
    /// group.
    pub fn group_width(&self, group: CellId) -> u32 {
        match self.cells[group].parent {
            Some(parent) => self.columns[parent].width,
            None => self.current_widths(group).iter().sum(),
        }
    }

    /// Every column has to fit at once.
    pub fn group_min_width(&self, group: CellId) -> u32 {
        self.group(group).columns.iter().map(|&c| self.column_min_width(c)).sum()
    }

    /// Redistributes the group's columns for a new width.
    ///
    /// An attached group takes its width from its column, so this is what
    /// [`set_column_width`][Self::set_column_width] calls on the way down;
    /// resize the owning column rather than calling it directly.
    pub fn set_group_width(&mut self, group: CellId, width: u32) -> Result<(), LayoutError> {
        self.live_group(group)?;
        let mut plan = vec![];
        self.plan_group_width(group, width, &mut plan)?;
        self.apply_plan(plan);
        Ok(())
    }

    pub fn group_is_empty(&self, group: CellId) -> bool {
        self.group(group).columns.iter().all(|&c| self.column_is_empty(c))
    }

    /// Whether there is room for a new column at least `min_width` wide.
    pub fn can_add_column(&self, group: CellId, min_width: u32) -> bool {
        self.group_free_space(group)
            .into_iter()
            .any(|space| space >= min_width && self.sizes.is_valid(space))
    }

    /// Whether the columns can be given any widths other than their current
    /// ones.
    pub fn can_columns_resize(&self, group: CellId) -> bool {
        self.column_width_combinations(group, None).len() > 1
    }

    /// Alternative column widths for this group, each a list of widths in
    /// column order.
    ///
    /// With `bounds` of `None` the search keeps the group's current total and
    /// moves space between columns. With `Some((min, max))` it looks for
    /// combinations whose total lies in `min..=max`, taking space away from
    /// one column at a time.
    ///
    /// Results are in discovery order: the current widths (if they qualify),
    /// then single transfers, then every column at its minimum.
    pub fn column_width_combinations(
        &self,
        group: CellId,
        bounds: Option<(u32, u32)>,
    ) -> Vec<Vec<u32>> {
        let keep_total = bounds.is_none();
        let (min_total, max_total) = bounds.unwrap_or_else(|| {
            let width = self.group_width(group);
            (width, width)
        });
        let mut combos = IndexSet::new();
        let mut consider = |combo: Vec<u32>| {
            let total = self.sizes.sum(&combo);
            if (min_total..=max_total).contains(&total) && self.sizes.are_all_valid(&combo) {
                combos.insert(combo);
            }
        };

        let current = self.current_widths(group);
        consider(current.clone());

        let columns = &self.group(group).columns;
        for (i, &column) in columns.iter().enumerate() {
            for space in self.column_free_space(column) {
                let Some(shrunk) = current[i].checked_sub(space) else { continue };
                for k in (0..columns.len()).filter(|&k| k != i) {
                    let mut combo = current.clone();
                    combo[i] = shrunk;
                    if keep_total {
                        combo[k] += space;
                    }
                    consider(combo);
                }
            }
        }

        consider(columns.iter().map(|&c| self.column_min_width(c)).collect());

        combos.into_iter().collect()
    }

    /// Widths the group could give up while staying a valid size itself.
    pub fn group_free_space(&self, group: CellId) -> Vec<u32> {
        let width = self.group_width(group);
        let Some(max_total) = width.checked_sub(1) else { return vec![] };
        let free: IndexSet<u32> = self
            .column_width_combinations(group, Some((0, max_total)))
            .iter()
            .map(|combo| self.sizes.sum(combo))
            .filter(|&total| self.sizes.is_valid(total))
            .map(|total| width - total)
            .collect();
        free.into_iter().collect()
    }

    /// Inserts the detached `column` before `before`, or at the end if
    /// `before` is `None` or not in this group, shrinking the existing
    /// columns to make room.
    #[instrument(skip(self))]
    pub fn add_group_column(
        &mut self,
        group: CellId,
        column: ColumnId,
        before: Option<ColumnId>,
    ) -> Result<(), LayoutError> {
        let columns = &self.live_group(group)?.columns;
        if columns.len() >= MAX_GROUP_COLUMNS {
            return Err(LayoutError::Structural("a column group holds at most three columns"));
        }
        let index = before
            .and_then(|b| columns.iter().position(|&c| c == b))
            .unwrap_or(columns.len());
        self.ensure_detached_column(column)?;
        if self.cell_is_inside(group, column) {
            return Err(LayoutError::Structural("cannot add a column to a group inside it"));
        }
        self.resize_columns_for_new_column(group, column, index)?;
        self.group_mut(group).columns.insert(index, column);
        self.columns[column].parent = Some(group);
        Ok(())
    }

    /// Removes `column` from the group, doing nothing if it is not there.
    ///
    /// Its width goes to the first remaining column. A group left with no
    /// columns deletes itself; a group left with one column is flattened into
    /// its owning column.
    #[instrument(skip(self))]
    pub fn remove_group_column(
        &mut self,
        group: CellId,
        column: ColumnId,
    ) -> Result<(), LayoutError> {
        let Some(Cell { kind: CellKind::Group(g), .. }) = self.cells.get(group) else {
            return Err(LayoutError::Structural("cell is not a column group"));
        };
        let Some(index) = g.columns.iter().position(|&c| c == column) else {
            return Ok(());
        };

        if self.cells[group].deleted {
            // The group is being torn down; its remaining columns go with it.
            self.group_mut(group).columns.remove(index);
            self.columns[column].parent = None;
            return Ok(());
        }

        // Check the donation before touching anything.
        let mut plan = vec![];
        self.plan_donation(group, column, &mut plan)?;

        self.group_mut(group).columns.remove(index);
        self.columns[column].parent = None;
        self.apply_plan(plan);

        match self.group(group).columns.len() {
            0 => {
                debug!(?group, "column group has no columns left");
                self.delete_cell(group)
            }
            1 => self.flatten_group(group),
            _ => Ok(()),
        }
    }

    /// Makes room for `new_column` at `index` and sizes it to fill the gap.
    ///
    /// Space is taken preferentially from the column that will sit to the
    /// right of the new one, then from the column to its left.
    pub fn resize_columns_for_new_column(
        &mut self,
        group: CellId,
        new_column: ColumnId,
        index: usize,
    ) -> Result<(), LayoutError> {
        const NO_SPACE: LayoutError =
            LayoutError::Structural("cannot make space for the additional column");

        let total = self.group_width(group);
        let needed = match self.column_min_width(new_column) {
            0 => self.sizes.min_size(),
            width => width,
        };
        let max_total = total.checked_sub(needed).ok_or(NO_SPACE)?;
        let current = self.current_widths(group);

        let mut combos = self.column_width_combinations(group, Some((0, max_total)));
        combos.retain(|combo| self.sizes.is_valid(total - self.sizes.sum(combo)));
        if combos.is_empty() {
            return Err(NO_SPACE);
        }

        let right = (index < current.len()).then_some(index);
        let left = index.checked_sub(1);
        // Prefer the largest width that actually changed; an unchanged width
        // ranks last.
        let rank = |combo: &Vec<u32>, side: Option<usize>| match side {
            Some(i) if combo[i] != current[i] => combo[i],
            _ => 0,
        };
        combos.sort_by_key(|combo| (Reverse(rank(combo, right)), Reverse(rank(combo, left))));
        let chosen = &combos[0];
        let new_width = total - self.sizes.sum(chosen);

        let mut plan = vec![];
        for (&column, &width) in self.group(group).columns.iter().zip(chosen) {
            self.plan_column_width(column, width, &mut plan)?;
        }
        self.plan_column_width(new_column, new_width, &mut plan)?;
        debug!(?group, widths = ?chosen, new_width, "resized columns for new column");
        self.apply_plan(plan);
        Ok(())
    }

    /// Plans giving the width of `column` to the first other column of
    /// `group`, as happens when it is removed.
    pub(super) fn plan_donation(
        &self,
        group: CellId,
        column: ColumnId,
        plan: &mut Vec<(ColumnId, u32)>,
    ) -> Result<(), LayoutError> {
        let columns = &self.group(group).columns;
        let Some(&first) = columns.iter().find(|&&c| c != column) else { return Ok(()) };
        let width = self.columns[first].width + self.columns[column].width;
        self.plan_column_width(first, width, plan)
    }

    pub(super) fn plan_group_width(
        &self,
        group: CellId,
        width: u32,
        plan: &mut Vec<(ColumnId, u32)>,
    ) -> Result<(), LayoutError> {
        if self.group_width(group) == width {
            return Ok(());
        }
        if !self.sizes.is_valid(width) {
            return Err(LayoutError::InvalidSize { node: "column group", width });
        }
        let columns = &self.group(group).columns;
        match columns.len() {
            1 => self.plan_column_width(columns[0], width, plan),
            count @ (2 | 3) => {
                let split = split_policy(count, width)
                    .ok_or(LayoutError::InvalidSplit { columns: count, width })?;
                for (&column, &part) in columns.iter().zip(split) {
                    self.plan_column_width(column, part, plan)?;
                }
                Ok(())
            }
            _ => Err(LayoutError::Structural("column group has an invalid number of columns")),
        }
    }

    /// Splices the cells of the group's only column into the group's owning
    /// column, in the group's place, then deletes the group.
    fn flatten_group(&mut self, group: CellId) -> Result<(), LayoutError> {
        let Some(parent) = self.cells[group].parent else {
            // A detached group has nowhere to flatten into.
            return Ok(());
        };
        let sole = self.group(group).columns[0];
        debug!(?group, ?sole, ?parent, "flattening column group");

        let moved = std::mem::take(&mut self.columns[sole].cells);
        let parent_width = self.columns[parent].width;
        let mut plan = vec![];
        for &cell in &moved {
            self.cells[cell].parent = None;
            self.plan_cell_width(cell, parent_width, &mut plan)?;
        }
        self.apply_plan(plan);

        let col = &mut self.columns[parent];
        let at = col.cells.iter().position(|&c| c == group).unwrap_or(col.cells.len());
        col.cells.splice(at..at, moved.iter().copied());
        for &cell in &moved {
            self.cells[cell].parent = Some(parent);
        }

        self.delete_cell(group)
    }

    fn current_widths(&self, group: CellId) -> Vec<u32> {
        self.group(group).columns.iter().map(|&c| self.columns[c].width).collect()
    }

    fn group(&self, group: CellId) -> &GroupCell {
        match &self.cells[group].kind {
            CellKind::Group(g) => g,
            CellKind::Leaf(_) => panic!("{group:?} is not a column group"),
        }
    }

    fn group_mut(&mut self, group: CellId) -> &mut GroupCell {
        match &mut self.cells[group].kind {
            CellKind::Group(g) => g,
            CellKind::Leaf(_) => panic!("{group:?} is not a column group"),
        }
    }
}
