// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::debug;

use super::cell::{Block, Cell, CellKind, GroupCell, LeafCell};
use super::error::LayoutError;
use super::size_set::SizeSet;
use crate::config::Config;

slotmap::new_key_type! {
    /// Identifies a [`Column`] within a [`LayoutRegistry`]. Never reused.
    pub struct ColumnId;

    /// Identifies a [`Cell`] within a [`LayoutRegistry`]. Never reused.
    pub struct CellId;
}

/// An ordered container of sibling cells that all share the column's width.
#[derive(Debug)]
pub struct Column {
    pub(super) width: u32,
    pub(super) cells: Vec<CellId>,
    pub(super) parent: Option<CellId>,
    pub(super) deleted: bool,
}

impl Column {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// The column group this column belongs to, if any.
    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Owns every column and cell of one layout, and mints them.
///
/// Nodes refer to each other by id. Parent-to-child lists own their children;
/// the `parent` back-references are plain ids and never keep a node alive.
///
/// Deleted nodes stay in the arena, flagged, until [`collect_garbage`] is
/// called. Every lookup treats them as absent. Methods that take an id and
/// return a plain value panic if the id was garbage collected or came from
/// another registry. Group queries also panic when given a leaf.
///
/// [`collect_garbage`]: LayoutRegistry::collect_garbage
pub struct LayoutRegistry<B> {
    pub(super) sizes: SizeSet,
    pub(super) columns: SlotMap<ColumnId, Column>,
    pub(super) cells: SlotMap<CellId, Cell<B>>,
    blocks: FxHashMap<String, CellId>,
    root: ColumnId,
}

impl<B: Block> LayoutRegistry<B> {
    pub fn new(sizes: SizeSet, width: u32) -> Result<Self, LayoutError> {
        if !sizes.is_valid(width) {
            return Err(LayoutError::InvalidSize { node: "root column", width });
        }
        let mut columns = SlotMap::with_key();
        let root = columns.insert(Column {
            width,
            cells: vec![],
            parent: None,
            deleted: false,
        });
        Ok(LayoutRegistry {
            sizes,
            columns,
            cells: SlotMap::with_key(),
            blocks: FxHashMap::default(),
            root,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LayoutError> {
        Self::new(config.size_set(), config.grid.width)
    }

    pub fn root(&self) -> ColumnId {
        self.root
    }

    pub fn size_set(&self) -> &SizeSet {
        &self.sizes
    }

    pub fn is_valid_size(&self, size: u32) -> bool {
        self.sizes.is_valid(size)
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id).filter(|c| !c.deleted)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell<B>> {
        self.cells.get(id).filter(|c| !c.deleted)
    }

    pub fn cell_by_block_id(&self, block_id: &str) -> Option<CellId> {
        self.blocks.get(block_id).copied().filter(|&id| self.cell(id).is_some())
    }

    /// Drops deleted nodes from the arena and the block index.
    ///
    /// Ids of dropped nodes keep resolving to nothing; slotmap keys are never
    /// handed out twice.
    pub fn collect_garbage(&mut self) {
        self.columns.retain(|_, c| !c.deleted);
        self.cells.retain(|_, c| !c.deleted);
        let cells = &self.cells;
        self.blocks.retain(|_, id| cells.contains_key(*id));
    }

    pub fn create_leaf(&mut self, block: B) -> Result<CellId, LayoutError> {
        let block_id = block.block_id().to_owned();
        if block_id.is_empty() {
            return Err(LayoutError::Config("cannot create a leaf for a block that has no id"));
        }
        if self.cell_by_block_id(&block_id).is_some() {
            return Err(LayoutError::Config("a leaf already exists for this block id"));
        }
        let id = self.cells.insert(Cell {
            parent: None,
            deleted: false,
            kind: CellKind::Leaf(LeafCell { block }),
        });
        self.blocks.insert(block_id, id);
        Ok(id)
    }

    /// Creates a detached column of `width` holding `cells`, in order.
    pub fn create_column(&mut self, width: u32, cells: &[CellId]) -> Result<ColumnId, LayoutError> {
        if !self.sizes.is_valid(width) {
            return Err(LayoutError::InvalidSize { node: "column", width });
        }
        let mut plan = vec![];
        for &cell in cells {
            self.ensure_detached_cell(cell)?;
            self.plan_cell_width(cell, width, &mut plan)?;
        }
        self.apply_plan(plan);
        let id = self.columns.insert(Column {
            width,
            cells: cells.to_vec(),
            parent: None,
            deleted: false,
        });
        for &cell in cells {
            self.cells[cell].parent = Some(id);
        }
        Ok(id)
    }

    /// Creates a detached column group over 1 to 3 detached columns.
    pub fn create_group(&mut self, columns: &[ColumnId]) -> Result<CellId, LayoutError> {
        if columns.is_empty() {
            return Err(LayoutError::Config(
                "cannot create a column group for an empty columns list",
            ));
        }
        if columns.len() > MAX_GROUP_COLUMNS {
            return Err(LayoutError::Config("a column group holds at most three columns"));
        }
        for &column in columns {
            self.ensure_detached_column(column)?;
        }
        let id = self.cells.insert(Cell {
            parent: None,
            deleted: false,
            kind: CellKind::Group(GroupCell { columns: columns.to_vec() }),
        });
        for &column in columns {
            self.columns[column].parent = Some(id);
        }
        Ok(id)
    }

    /// The two-column group a leaf is split into.
    pub fn create_default_group(&mut self) -> Result<CellId, LayoutError> {
        let left = self.create_column(6, &[])?;
        let right = self.create_column(6, &[])?;
        self.create_group(&[left, right])
    }

    /// Moves `cell` into `dest`, before `before` or at the end.
    ///
    /// Removing the cell from its current column cascades as usual, so the
    /// source group may be deleted along the way.
    #[tracing::instrument(skip(self))]
    pub fn move_cell(
        &mut self,
        cell: CellId,
        dest: ColumnId,
        before: Option<CellId>,
    ) -> Result<(), LayoutError> {
        self.live_cell(cell)?;
        self.live_column(dest)?;
        if let Some(parent) = self.cells[cell].parent {
            self.remove_cell(parent, cell)?;
        }
        if self.column(dest).is_none() {
            return Err(LayoutError::Structural(
                "the destination column was deleted while removing the cell",
            ));
        }
        self.add_cell(dest, cell, before)
    }

    /// Moves `column` into the group `dest`, before `before` or at the end.
    #[tracing::instrument(skip(self))]
    pub fn move_column(
        &mut self,
        column: ColumnId,
        dest: CellId,
        before: Option<ColumnId>,
    ) -> Result<(), LayoutError> {
        self.live_column(column)?;
        self.live_group(dest)?;
        if let Some(parent) = self.columns[column].parent {
            self.remove_group_column(parent, column)?;
        }
        if self.cell(dest).is_none() {
            return Err(LayoutError::Structural(
                "the destination group was deleted while removing the column",
            ));
        }
        self.add_group_column(dest, column, before)
    }

    /// Renders the subtree under `column` for debugging.
    pub fn draw_tree(&self, column: ColumnId) -> String {
        let mut out = String::new();
        _ = ascii_tree::write_tree(&mut out, &self.column_tree(column));
        out
    }

    fn column_tree(&self, column: ColumnId) -> ascii_tree::Tree {
        let col = &self.columns[column];
        let deleted = if col.deleted { " (deleted)" } else { "" };
        let label = format!("column {column:?} [width {}{deleted}]", col.width);
        let children = col.cells.iter().map(|&c| self.cell_tree(c)).collect();
        ascii_tree::Tree::Node(label, children)
    }

    fn cell_tree(&self, cell: CellId) -> ascii_tree::Tree {
        match &self.cells[cell].kind {
            CellKind::Leaf(leaf) => ascii_tree::Tree::Leaf(vec![format!(
                "leaf {cell:?} [block {}]",
                leaf.block.block_id()
            )]),
            CellKind::Group(group) => ascii_tree::Tree::Node(
                format!("group {cell:?} [width {}]", self.group_width(cell)),
                group.columns.iter().map(|&c| self.column_tree(c)).collect(),
            ),
        }
    }

    /// Verifies the structural invariants for every live node under `column`.
    pub fn check_invariants(&self, column: ColumnId) -> Result<(), String> {
        let col = self.column(column).ok_or_else(|| format!("{column:?} is not live"))?;
        if !self.sizes.is_valid(col.width) {
            return Err(format!("{column:?} has invalid width {}", col.width));
        }
        for &cell in &col.cells {
            let c = self.cell(cell).ok_or_else(|| format!("{cell:?} is not live"))?;
            if c.parent != Some(column) {
                return Err(format!("{cell:?} does not point back to {column:?}"));
            }
            let CellKind::Group(group) = &c.kind else { continue };
            if group.columns.len() < 2 || group.columns.len() > MAX_GROUP_COLUMNS {
                return Err(format!("{cell:?} has {} columns", group.columns.len()));
            }
            let sum: u32 = group.columns.iter().map(|&c| self.columns[c].width).sum();
            if sum != col.width {
                return Err(format!(
                    "{cell:?} columns sum to {sum}, expected {}",
                    col.width
                ));
            }
            for &child in &group.columns {
                if self.columns[child].parent != Some(cell) {
                    return Err(format!("{child:?} does not point back to {cell:?}"));
                }
                self.check_invariants(child)?;
            }
        }
        Ok(())
    }

    pub(super) fn live_column(&self, id: ColumnId) -> Result<&Column, LayoutError> {
        self.column(id).ok_or(LayoutError::Structural("column does not exist"))
    }

    pub(super) fn live_cell(&self, id: CellId) -> Result<&Cell<B>, LayoutError> {
        self.cell(id).ok_or(LayoutError::Structural("cell does not exist"))
    }

    pub(super) fn live_group(&self, id: CellId) -> Result<&GroupCell, LayoutError> {
        match &self.live_cell(id)?.kind {
            CellKind::Group(group) => Ok(group),
            CellKind::Leaf(_) => Err(LayoutError::Structural("cell is not a column group")),
        }
    }

    pub(super) fn ensure_detached_cell(&self, id: CellId) -> Result<(), LayoutError> {
        match self.live_cell(id)?.parent {
            None => Ok(()),
            Some(_) => Err(LayoutError::Structural("cell already belongs to a column")),
        }
    }

    pub(super) fn ensure_detached_column(&self, id: ColumnId) -> Result<(), LayoutError> {
        match self.live_column(id)?.parent {
            None => Ok(()),
            Some(_) => Err(LayoutError::Structural("column already belongs to a column group")),
        }
    }

    /// Whether `cell` sits somewhere under `column`.
    pub(super) fn cell_is_inside(&self, cell: CellId, column: ColumnId) -> bool {
        let mut parent = self.cells[cell].parent;
        while let Some(c) = parent {
            if c == column {
                return true;
            }
            parent = self.columns[c].parent.and_then(|g| self.cells[g].parent);
        }
        false
    }

    /// Whether `column` sits somewhere under `cell`.
    pub(super) fn column_is_inside(&self, column: ColumnId, cell: CellId) -> bool {
        let mut group = self.columns[column].parent;
        while let Some(g) = group {
            if g == cell {
                return true;
            }
            group = self.cells[g].parent.and_then(|c| self.columns[c].parent);
        }
        false
    }

    pub(super) fn apply_plan(&mut self, plan: Vec<(ColumnId, u32)>) {
        for (column, width) in plan {
            if self.columns[column].width != width {
                debug!(?column, from = self.columns[column].width, to = width, "resizing column");
            }
            self.columns[column].width = width;
        }
    }
}

/// A column group never holds more columns than this.
pub const MAX_GROUP_COLUMNS: usize = 3;

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    pub(crate) fn registry() -> LayoutRegistry<String> {
        LayoutRegistry::new(SizeSet::standard(), 12).unwrap()
    }

    pub(crate) fn leaves(reg: &mut LayoutRegistry<String>, ids: &[&str]) -> Vec<CellId> {
        ids.iter().map(|&id| reg.create_leaf(id.to_owned()).unwrap()).collect()
    }

    pub(crate) fn widths(reg: &LayoutRegistry<String>, group: CellId) -> Vec<u32> {
        reg.group_columns(group).iter().map(|&c| reg.columns[c].width).collect()
    }

    #[test]
    fn it_creates_a_root_column() {
        let reg = registry();
        let root = reg.column(reg.root()).unwrap();
        assert_eq!(root.width(), 12);
        assert!(root.cells().is_empty());
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn it_rejects_an_invalid_root_width() {
        let reg = LayoutRegistry::<String>::new(SizeSet::standard(), 10);
        assert!(matches!(reg, Err(LayoutError::InvalidSize { width: 10, .. })));
    }

    #[test]
    fn it_looks_up_leaves_by_block_id() {
        let mut reg = registry();
        let leaf = reg.create_leaf("123".to_owned()).unwrap();
        assert_eq!(reg.cell_by_block_id("123"), Some(leaf));
        assert_eq!(reg.cell_by_block_id("doesNotExist"), None);
        assert_eq!(reg.cell(leaf).unwrap().block().map(String::as_str), Some("123"));
    }

    #[test]
    fn it_rejects_blocks_without_ids() {
        let mut reg = registry();
        assert!(matches!(reg.create_leaf(String::new()), Err(LayoutError::Config(_))));
    }

    #[test]
    fn it_rejects_duplicate_block_ids_while_the_leaf_is_alive() {
        let mut reg = registry();
        let leaf = reg.create_leaf("a".to_owned()).unwrap();
        assert!(matches!(reg.create_leaf("a".to_owned()), Err(LayoutError::Config(_))));
        reg.delete_cell(leaf).unwrap();
        let again = reg.create_leaf("a".to_owned()).unwrap();
        assert_ne!(again, leaf);
        assert_eq!(reg.cell_by_block_id("a"), Some(again));
    }

    #[test]
    fn it_rejects_empty_groups() {
        let mut reg = registry();
        assert!(matches!(reg.create_group(&[]), Err(LayoutError::Config(_))));
    }

    #[test]
    fn it_creates_columns_over_existing_cells() {
        let mut reg = registry();
        let cells = leaves(&mut reg, &["1", "2"]);
        let column = reg.create_column(12, &cells).unwrap();
        assert_eq!(reg.column(column).unwrap().cells(), &cells[..]);
        for &cell in &cells {
            assert_eq!(reg.cell(cell).unwrap().parent(), Some(column));
            assert_eq!(reg.cell_width(cell), Some(12));
        }
    }

    #[test]
    fn it_refuses_to_adopt_attached_cells() {
        let mut reg = registry();
        let cells = leaves(&mut reg, &["1"]);
        reg.create_column(12, &cells).unwrap();
        assert!(matches!(reg.create_column(8, &cells), Err(LayoutError::Structural(_))));
    }

    #[test]
    fn it_moves_a_cell_to_the_middle_of_another_column() {
        let mut reg = registry();
        let a_cells = leaves(&mut reg, &["1", "2"]);
        let a = reg.create_column(6, &a_cells).unwrap();
        let b_cells = leaves(&mut reg, &["3", "4"]);
        let b = reg.create_column(6, &b_cells).unwrap();

        reg.move_cell(a_cells[1], b, Some(b_cells[1])).unwrap();

        assert_eq!(reg.column(a).unwrap().cells(), &[a_cells[0]]);
        assert_eq!(
            reg.column(b).unwrap().cells(),
            &[b_cells[0], a_cells[1], b_cells[1]]
        );
        assert_eq!(reg.cell(a_cells[1]).unwrap().parent(), Some(b));
    }

    #[test]
    fn it_moves_a_cell_within_the_same_column() {
        let mut reg = registry();
        let cells = leaves(&mut reg, &["1", "2", "3", "4"]);
        let column = reg.create_column(12, &cells).unwrap();

        reg.move_cell(cells[1], column, Some(cells[3])).unwrap();

        assert_eq!(
            reg.column(column).unwrap().cells(),
            &[cells[0], cells[2], cells[1], cells[3]]
        );
    }

    #[test]
    fn it_moves_a_column_into_another_group() {
        let mut reg = registry();
        let root = reg.root();
        let l = leaves(&mut reg, &["1", "2", "3", "4"]);
        let a_cols = [
            reg.create_column(8, &l[0..1]).unwrap(),
            reg.create_column(4, &l[1..2]).unwrap(),
        ];
        let a = reg.create_group(&a_cols).unwrap();
        let b_cols = [
            reg.create_column(8, &l[2..3]).unwrap(),
            reg.create_column(4, &l[3..4]).unwrap(),
        ];
        let b = reg.create_group(&b_cols).unwrap();
        reg.add_cell(root, a, None).unwrap();
        reg.add_cell(root, b, None).unwrap();

        reg.move_column(a_cols[1], b, Some(b_cols[1])).unwrap();

        // Group `a` collapsed to one column and was flattened into the root.
        assert!(reg.cell(a).is_none());
        assert!(reg.column(a_cols[0]).is_none());
        assert_eq!(reg.column(root).unwrap().cells(), &[l[0], b]);
        assert_eq!(reg.group_columns(b), &[b_cols[0], a_cols[1], b_cols[1]]);
        assert_eq!(widths(&reg, b), vec![4, 4, 4]);
        reg.check_invariants(root).unwrap();
    }

    #[test]
    fn it_refuses_to_move_a_column_into_its_own_subtree() {
        let mut reg = registry();
        let root = reg.root();
        let l = leaves(&mut reg, &["1"]);
        let left = reg.create_column(6, &l).unwrap();
        let right = reg.create_column(6, &[]).unwrap();
        let group = reg.create_group(&[left, right]).unwrap();
        reg.add_cell(root, group, None).unwrap();

        assert!(matches!(
            reg.move_column(root, group, None),
            Err(LayoutError::Structural(_))
        ));
        assert!(matches!(
            reg.add_group_column(group, root, Some(right)),
            Err(LayoutError::Structural(_))
        ));
        assert_eq!(reg.group_columns(group), &[left, right]);
        assert_eq!(reg.column(root).unwrap().parent(), None);
        reg.check_invariants(root).unwrap();
    }

    #[test]
    fn it_refuses_to_add_a_group_into_its_own_column() {
        let mut reg = registry();
        let left = reg.create_column(6, &[]).unwrap();
        let right = reg.create_column(6, &[]).unwrap();
        let group = reg.create_group(&[left, right]).unwrap();

        assert!(matches!(reg.add_cell(left, group, None), Err(LayoutError::Structural(_))));
        assert!(reg.column(left).unwrap().cells().is_empty());
        assert_eq!(reg.cell(group).unwrap().parent(), None);
    }

    #[test]
    fn deleting_the_root_leaves_nothing_resolvable() {
        let mut reg = registry();
        let root = reg.root();
        let l = leaves(&mut reg, &["1", "2", "3", "4", "5", "6"]);
        let mut columns = vec![];
        let mut groups = vec![];
        for pair in l.chunks(2).take(2) {
            let left = reg.create_column(6, &pair[0..1]).unwrap();
            let right = reg.create_column(6, &pair[1..2]).unwrap();
            let group = reg.create_group(&[left, right]).unwrap();
            reg.add_cell(root, group, None).unwrap();
            columns.extend([left, right]);
            groups.push(group);
        }
        reg.add_cell(root, l[4], None).unwrap();
        reg.add_cell(root, l[5], None).unwrap();
        reg.check_invariants(root).unwrap();

        reg.delete_column(root).unwrap();

        assert!(reg.column(root).is_none());
        for &column in &columns {
            assert!(reg.column(column).is_none());
        }
        for &cell in groups.iter().chain(&l) {
            assert!(reg.cell(cell).is_none());
        }
        for id in ["1", "2", "3", "4", "5", "6"] {
            assert_eq!(reg.cell_by_block_id(id), None);
        }

        reg.collect_garbage();
        assert!(reg.columns.is_empty());
        assert!(reg.cells.is_empty());
        assert!(reg.blocks.is_empty());
    }

    #[test]
    fn it_draws_the_tree() {
        let mut reg = registry();
        let root = reg.root();
        let l = leaves(&mut reg, &["hero", "body"]);
        reg.add_cell(root, l[0], None).unwrap();
        reg.add_cell(root, l[1], None).unwrap();
        reg.replace_with_columns(l[1], false).unwrap();
        let drawn = reg.draw_tree(root);
        assert!(drawn.contains("[width 12]"), "{drawn}");
        assert!(drawn.contains("[block hero]"), "{drawn}");
        assert!(drawn.contains("[block body]"), "{drawn}");
        assert!(drawn.contains("[width 6]"), "{drawn}");
    }
}
