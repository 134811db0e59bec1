// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building or querying data cubes.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;

/// Errors returned by dataset, grouping and cube operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// A grouping spec, predicate or query referenced an undeclared dimension.
    #[error("dimension `{0}` is not declared")]
    UndeclaredDimension(Arc<str>),
    /// Two dimension declarations share a name.
    #[error("dimension `{0}` is declared more than once")]
    DuplicateDimension(Arc<str>),
    /// Grouping text could not be parsed, or names a dimension twice.
    #[error("malformed grouping `{text}`: {reason}")]
    MalformedGrouping {
        /// The offending grouping text.
        text: String,
        /// What is wrong with it.
        reason: String,
    },
    /// An operation was called on a node it does not apply to.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl DataError {
    /// Returns `true` for configuration errors, which are surfaced before any layout work.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}
