// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouped, filterable data cubes for Tessera charts.
//!
//! This crate turns flat rows into a hierarchy:
//! - a shared [`Dataset`] interns every cell into per-dimension [`Atom`]s,
//! - a [`GroupingSpec`] names the levels to split by, and
//! - a [`Cube`] partitions the datums into [`Node`]s, with filtered and linked views that
//!   share the dataset instead of copying it.
//!
//! Everything is synchronous and in-memory. Atom queries are computed lazily and cached per
//! cube view.

#![no_std]

extern crate alloc;

mod cube;
mod dataset;
mod dimension;
mod error;
mod grouping;
mod log;
mod predicate;
mod value;

pub use cube::{AtomQuery, Cube, Node, NodeId, NodeKey};
pub use dataset::{Dataset, Datum, DatumId, DatumView, Row};
pub use dimension::{
    Atom, AtomId, Comparer, Dimension, DimensionId, DimensionSpec, Formatter, ValueKind,
};
pub use error::DataError;
pub use grouping::{GroupingDimension, GroupingLevel, GroupingSpec};
pub use predicate::{CompareOp, CustomPredicate, Predicate};
pub use value::Value;
