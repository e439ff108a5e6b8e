// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy shared by layout and inference.

use thiserror::Error;

/// Errors raised when a caller violates a precondition.
///
/// None of these are transient; they point at a bug in the caller or in the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A layout was built without resolvable root pixel dimensions.
    #[error("layout configuration: {0}")]
    Config(&'static str),
    /// An argument or the tree state does not satisfy the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A box would become its own ancestor.
    #[error("cannot reparent a box under itself or one of its descendants")]
    Cycle,
}
