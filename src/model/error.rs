// Copyright The Grid Scaffold Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Errors produced by layout tree operations.
///
/// None of these are transient; callers are expected to use the paired
/// queries (`can_columns_resize`, `can_add_column`,
/// `can_replace_with_columns`) before attempting a mutation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A construction-time dependency was missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(&'static str),
    /// A width was not a member of the size set.
    #[error("cannot set a {node} to an invalid width: {width}")]
    InvalidSize { node: &'static str, width: u32 },
    /// A column group has no redistribution policy for this width.
    #[error("invalid width for a column group with {columns} columns: {width}")]
    InvalidSplit { columns: usize, width: u32 },
    /// The operation would break a structural invariant of the tree.
    #[error("{0}")]
    Structural(&'static str),
}
