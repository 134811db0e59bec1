// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Plot types, keyed by a type tag.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::Error;
use crate::role::{RoleDecl, RoleSpec, RoleSpecs};

/// The mark family of a plot type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlotKind {
    /// Bars per category.
    Bar,
    /// Connected points per series.
    Line,
    /// Sectors per category.
    Pie,
    /// Points in a continuous plane.
    Point,
    /// A caller-defined plot.
    Custom,
}

/// What a plot type contributes to role resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotType {
    /// Registry tag.
    pub tag: Arc<str>,
    /// Mark family.
    pub kind: PlotKind,
    /// Role declarations, in resolution order.
    pub roles: Vec<RoleDecl>,
    /// Specs applied below chart-level specs.
    pub defaults: RoleSpecs,
}

impl PlotType {
    /// A plot type with no roles.
    pub fn new(tag: impl Into<Arc<str>>, kind: PlotKind) -> Self {
        Self {
            tag: tag.into(),
            kind,
            roles: Vec::new(),
            defaults: RoleSpecs::new(),
        }
    }

    /// Declares a role.
    pub fn with_role(mut self, decl: RoleDecl) -> Self {
        self.roles.push(decl);
        self
    }

    /// Sets the type-level default spec of a role.
    pub fn with_default(mut self, role: &str, spec: impl Into<RoleSpec>) -> Self {
        self.defaults = self.defaults.with(role, spec);
        self
    }

    /// Returns the declaration of `role`.
    pub fn role(&self, role: &str) -> Option<&RoleDecl> {
        self.roles.iter().find(|d| &*d.name == role)
    }
}

/// Known plot types.
#[derive(Clone, Debug, Default)]
pub struct PlotRegistry {
    types: HashMap<Arc<str>, PlotType>,
}

impl PlotRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in `bar`, `line`, `pie` and `point` types.
    pub fn builtin() -> Self {
        let categorical = |tag: &str, kind| {
            PlotType::new(tag, kind)
                .with_role(RoleDecl::new("category").discrete().with_default("category*"))
                .with_role(RoleDecl::new("series").discrete().with_default("series*"))
                .with_role(RoleDecl::new("value").measure().required().with_default("value*"))
        };
        let mut registry = Self::new();
        registry.register(categorical("bar", PlotKind::Bar));
        registry.register(categorical("line", PlotKind::Line));
        registry.register(
            PlotType::new("pie", PlotKind::Pie)
                .with_role(RoleDecl::new("category").discrete().with_default("category*"))
                .with_role(
                    RoleDecl::new("value")
                        .measure()
                        .required()
                        .single_dimension()
                        .with_default("value*"),
                ),
        );
        registry.register(
            PlotType::new("point", PlotKind::Point)
                .with_role(RoleDecl::new("color").discrete().with_default("series*"))
                .with_role(RoleDecl::new("x").measure().required().single_dimension())
                .with_role(RoleDecl::new("y").measure().required().single_dimension())
                .with_default("x", "x")
                .with_default("y", "y"),
        );
        registry
    }

    /// Adds or replaces a type under its tag.
    pub fn register(&mut self, plot_type: PlotType) {
        self.types.insert(plot_type.tag.clone(), plot_type);
    }

    /// Returns the type registered under `tag`.
    pub fn get(&self, tag: &str) -> Result<&PlotType, Error> {
        self.types
            .get(tag)
            .ok_or_else(|| Error::UnknownPlotType(tag.into()))
    }

    /// Iterates over registered tags in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| &**k)
    }
}
