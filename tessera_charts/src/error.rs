// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while resolving roles, importing extensions and building charts.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;

use tessera_data::DataError;

/// Errors raised while binding a visual role to dimensions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// The role names a dimension the dataset does not declare.
    #[error("role `{role}` references unknown dimension `{dimension}`")]
    UnknownDimension {
        /// Role name.
        role: Arc<str>,
        /// Dimension name.
        dimension: Arc<str>,
    },
    /// The role names a dimension more than once.
    #[error("role `{role}` references dimension `{dimension}` more than once")]
    DuplicateDimension {
        /// Role name.
        role: Arc<str>,
        /// Dimension name.
        dimension: Arc<str>,
    },
    /// The role binds more than one dimension, or a composite level mixes discrete and
    /// continuous dimensions.
    #[error("role `{role}` has a conflicting composite level: {reason}")]
    CompositeConflict {
        /// Role name.
        role: Arc<str>,
        /// What conflicts.
        reason: &'static str,
    },
    /// A discrete role was bound to a continuous dimension.
    #[error("role `{role}` requires a discrete dimension but `{dimension}` is continuous")]
    NotDiscrete {
        /// Role name.
        role: Arc<str>,
        /// Dimension name.
        dimension: Arc<str>,
    },
    /// A measure role was bound to a non-numeric or discrete dimension.
    #[error("role `{role}` requires a continuous numeric dimension but `{dimension}` is not")]
    NotMeasure {
        /// Role name.
        role: Arc<str>,
        /// Dimension name.
        dimension: Arc<str>,
    },
    /// A required role has no spec at any level and its default matches nothing.
    #[error("required role `{0}` is not bound and has no usable default")]
    Unbound(Arc<str>),
    /// A role spec could not be parsed.
    #[error(transparent)]
    Grouping(#[from] DataError),
}

/// Errors raised while importing extension overrides.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    /// A flat key names a property that does not exist.
    #[error("extension key `{key}` names unknown property `{property}`")]
    UnknownProperty {
        /// The full flat key.
        key: String,
        /// The property part.
        property: String,
    },
    /// A key has an empty extension id.
    #[error("extension key `{0}` has an empty extension id")]
    EmptyId(String),
}

/// Errors raised while building a chart.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Dataset, grouping or cube failure.
    #[error(transparent)]
    Data(#[from] DataError),
    /// Role resolution failure.
    #[error(transparent)]
    Role(#[from] RoleError),
    /// Extension import failure.
    #[error(transparent)]
    Extension(#[from] ExtensionError),
    /// A plot names a type the registry does not know.
    #[error("unknown plot type `{0}`")]
    UnknownPlotType(Arc<str>),
    /// Panel content references a plot or role that does not exist.
    #[error("panel `{panel}` references unknown {what} `{name}`")]
    UnknownReference {
        /// Panel name.
        panel: Arc<str>,
        /// `"plot"` or `"role"`.
        what: &'static str,
        /// The missing name.
        name: Arc<str>,
    },
}

impl Error {
    /// Returns `true` for configuration errors, which are reported before layout runs.
    ///
    /// Only [`DataError::InvalidArgument`] is raised at a call site instead.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Data(e) | Self::Role(RoleError::Grouping(e)) => e.is_configuration(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;

    use super::*;

    #[test]
    fn errors_classify_and_display() {
        let e: Error = RoleError::Unbound("value".into()).into();
        assert!(e.is_configuration());
        assert_eq!(
            e.to_string(),
            "required role `value` is not bound and has no usable default"
        );
        let e: Error = DataError::InvalidArgument("x").into();
        assert!(!e.is_configuration());
    }
}
