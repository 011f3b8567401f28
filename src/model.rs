// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! This module defines the [`LayoutRegistry`] arena, on which all layout
//! logic is defined.
//!
//! A layout is a tree of [`Column`]s and [`Cell`]s. A column holds cells of
//! its own width; a cell is either a leaf carrying a [`Block`] or a column
//! group splitting its width across 1 to 3 columns.

mod cell;
mod column;
mod error;
mod group;
mod leaf;
mod size_set;
mod tree;

pub use cell::{Block, Cell, CellKind, GroupCell, LeafCell};
pub use error::LayoutError;
pub use size_set::SizeSet;
pub use tree::{CellId, Column, ColumnId, LayoutRegistry, MAX_GROUP_COLUMNS};
