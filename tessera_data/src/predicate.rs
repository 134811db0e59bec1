// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Datum predicates used by filtered cube views.
//!
//! Predicates name dimensions by string; they are compiled against a [`Dataset`] once per
//! filter, resolving names to ids and literal values to atoms.

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use smallvec::SmallVec;

use crate::dataset::{Dataset, DatumId, DatumView};
use crate::dimension::{AtomId, DimensionId};
use crate::error::DataError;
use crate::value::Value;

/// Comparison operators for numeric predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==` (exact float equality)
    Eq,
    /// `!=` (exact float inequality)
    Ne,
}

impl CompareOp {
    /// Evaluates `lhs op rhs`.
    pub fn eval(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

/// A caller-provided predicate over a [`DatumView`].
///
/// Two custom predicates are equal only if they share the same function allocation.
#[derive(Clone)]
pub struct CustomPredicate {
    name: Arc<str>,
    f: Arc<dyn Fn(&DatumView<'_>) -> bool + Send + Sync>,
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomPredicate").field(&self.name).finish()
    }
}

/// A predicate over datums.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// The dimension's value equals `value`.
    Eq {
        /// Dimension name.
        dimension: Arc<str>,
        /// Value to match.
        value: Value,
    },
    /// The dimension's value is one of `values`.
    In {
        /// Dimension name.
        dimension: Arc<str>,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// The dimension's numeric value satisfies `value op rhs`. Non-numeric values never match.
    Compare {
        /// Dimension name.
        dimension: Arc<str>,
        /// Operator.
        op: CompareOp,
        /// Right-hand constant.
        rhs: f64,
    },
    /// The dimension's value is null.
    IsNull(Arc<str>),
    /// Negation.
    Not(Box<Predicate>),
    /// Conjunction. Empty is `true`.
    All(Vec<Predicate>),
    /// Disjunction. Empty is `false`.
    Any(Vec<Predicate>),
    /// A caller-provided function.
    Custom(CustomPredicate),
}

impl Predicate {
    /// `dimension == value`.
    pub fn eq(dimension: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        Self::Eq {
            dimension: dimension.into(),
            value: value.into(),
        }
    }

    /// `dimension in values`.
    pub fn one_of<V: Into<Value>>(
        dimension: impl Into<Arc<str>>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            dimension: dimension.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `dimension op rhs`.
    pub fn compare(dimension: impl Into<Arc<str>>, op: CompareOp, rhs: f64) -> Self {
        Self::Compare {
            dimension: dimension.into(),
            op,
            rhs,
        }
    }

    /// `dimension is null`.
    pub fn is_null(dimension: impl Into<Arc<str>>) -> Self {
        Self::IsNull(dimension.into())
    }

    /// Negates this predicate.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Wraps a function.
    pub fn custom(
        name: impl Into<Arc<str>>,
        f: impl Fn(&DatumView<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(CustomPredicate {
            name: name.into(),
            f: Arc::new(f),
        })
    }

    /// Resolves names and literals against a dataset.
    pub(crate) fn compile(&self, dataset: &Dataset) -> Result<Compiled, DataError> {
        Ok(match self {
            Self::Eq { dimension, value } => {
                let dim = dataset.dimension_id(dimension)?;
                Compiled::Atoms {
                    dim,
                    atoms: dataset.dimension(dim).lookup(value).into_iter().collect(),
                }
            }
            Self::In { dimension, values } => {
                let dim = dataset.dimension_id(dimension)?;
                let d = dataset.dimension(dim);
                Compiled::Atoms {
                    dim,
                    atoms: values.iter().filter_map(|v| d.lookup(v)).collect(),
                }
            }
            Self::Compare { dimension, op, rhs } => Compiled::Compare {
                dim: dataset.dimension_id(dimension)?,
                op: *op,
                rhs: *rhs,
            },
            Self::IsNull(dimension) => Compiled::Atoms {
                dim: dataset.dimension_id(dimension)?,
                atoms: SmallVec::from_elem(AtomId::NULL, 1),
            },
            Self::Not(inner) => Compiled::Not(Box::new(inner.compile(dataset)?)),
            Self::All(items) => Compiled::All(
                items
                    .iter()
                    .map(|p| p.compile(dataset))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Any(items) => Compiled::Any(
                items
                    .iter()
                    .map(|p| p.compile(dataset))
                    .collect::<Result<_, _>>()?,
            ),
            Self::Custom(c) => Compiled::Custom(c.f.clone()),
        })
    }
}

/// A predicate with names resolved against one dataset.
pub(crate) enum Compiled {
    Atoms {
        dim: DimensionId,
        atoms: SmallVec<[AtomId; 4]>,
    },
    Compare {
        dim: DimensionId,
        op: CompareOp,
        rhs: f64,
    },
    Not(Box<Compiled>),
    All(Vec<Compiled>),
    Any(Vec<Compiled>),
    Custom(Arc<dyn Fn(&DatumView<'_>) -> bool + Send + Sync>),
}

impl Compiled {
    pub(crate) fn eval(&self, dataset: &Dataset, datum: DatumId) -> bool {
        match self {
            Self::Atoms { dim, atoms } => atoms.contains(&dataset.datum(datum).atom(*dim)),
            Self::Compare { dim, op, rhs } => dataset
                .value_of(datum, *dim)
                .as_f64()
                .is_some_and(|v| op.eval(v, *rhs)),
            Self::Not(inner) => !inner.eval(dataset, datum),
            Self::All(items) => items.iter().all(|p| p.eval(dataset, datum)),
            Self::Any(items) => items.iter().any(|p| p.eval(dataset, datum)),
            Self::Custom(f) => f(&dataset.view(datum)),
        }
    }
}
