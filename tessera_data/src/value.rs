// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw cell values.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;

/// A raw value as supplied by one cell of an input row.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// A missing value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. `NaN` is treated as [`Value::Null`] when interned.
    Number(f64),
    /// A string.
    Text(Arc<str>),
}

impl Value {
    /// Returns `true` for [`Value::Null`] and for `NaN` numbers.
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Returns the numeric value, if this is a (non-NaN) number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Total ordering used for natural atom order.
    ///
    /// Nulls sort first, then booleans, numbers and text.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self.normalized_rank(), other.normalized_rank()) {
            (a, b) if a != b => a.cmp(&b),
            _ => match (self, other) {
                (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
                (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
                (Self::Text(a), Self::Text(b)) => a.cmp(b),
                _ => Ordering::Equal,
            },
        }
    }

    fn normalized_rank(&self) -> u8 {
        if self.is_null() {
            return 0;
        }
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Returns the hashable intern key for this value.
    pub(crate) fn key(&self) -> ValueKey {
        if self.is_null() {
            return ValueKey::Null;
        }
        match self {
            Self::Null => ValueKey::Null,
            Self::Bool(b) => ValueKey::Bool(*b),
            // `-0.0` and `0.0` intern to the same atom.
            Self::Number(n) => ValueKey::Number(if *n == 0.0 { 0 } else { n.to_bits() }),
            Self::Text(s) => ValueKey::Text(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_nan() => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Hashable identity of a [`Value`] inside one dimension's intern table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Bool(bool),
    Number(u64),
    Text(Arc<str>),
}
