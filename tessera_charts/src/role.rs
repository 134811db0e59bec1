// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual roles: named bindings from chart concepts to dataset dimensions.
//!
//! A plot type declares its roles with a [`RoleDecl`]. Each role is then resolved from the
//! first spec present in precedence order:
//!
//! 1. the plot's own spec,
//! 2. the chart-level spec,
//! 3. the plot type's default spec,
//! 4. the declaration's default dimension pattern.
//!
//! A spec explicitly set to [`RoleSpec::Null`] binds zero dimensions; the role is then absent
//! for that plot.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use smallvec::SmallVec;
use tessera_data::{Dataset, DimensionId, GroupingSpec};

use crate::error::RoleError;
use crate::log::debug;

/// The raw spec of one role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleSpec {
    /// Explicitly unbound.
    Null,
    /// Grouping text, parsed at resolution time.
    Text(Arc<str>),
    /// A parsed grouping.
    Grouping(GroupingSpec),
}

impl From<&str> for RoleSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<GroupingSpec> for RoleSpec {
    fn from(grouping: GroupingSpec) -> Self {
        Self::Grouping(grouping)
    }
}

/// An ordered set of role specs keyed by role name. Later entries shadow earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSpecs {
    specs: Vec<(Arc<str>, RoleSpec)>,
}

impl RoleSpecs {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a spec.
    pub fn with(mut self, role: impl Into<Arc<str>>, spec: impl Into<RoleSpec>) -> Self {
        self.specs.push((role.into(), spec.into()));
        self
    }

    /// Returns the spec for a role.
    pub fn get(&self, role: &str) -> Option<&RoleSpec> {
        self.specs
            .iter()
            .rev()
            .find(|(name, _)| &**name == role)
            .map(|(_, spec)| spec)
    }

    /// Iterates over role names in insertion order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|(name, _)| &**name)
    }
}

/// The declaration of a role by a plot type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleDecl {
    /// Role name.
    pub name: Arc<str>,
    /// Fails resolution when nothing binds.
    pub required: bool,
    /// Accepts at most one dimension.
    pub single_dimension: bool,
    /// Requires discrete dimensions.
    pub discrete: bool,
    /// Requires continuous numeric dimensions.
    pub measure: bool,
    /// Contributes its dimensions to the plot's grouping path.
    pub grouping: bool,
    /// Default dimension name. A trailing `*` matches the dimension group
    /// (`value*` matches `value`, `value2`, …).
    pub default: Option<Arc<str>>,
}

impl RoleDecl {
    /// Declares an optional role with no constraints.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            required: false,
            single_dimension: false,
            discrete: false,
            measure: false,
            grouping: false,
            default: None,
        }
    }

    /// Marks the role as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Limits the role to one dimension.
    pub fn single_dimension(mut self) -> Self {
        self.single_dimension = true;
        self
    }

    /// Requires discrete dimensions and makes the role group the data.
    pub fn discrete(mut self) -> Self {
        self.discrete = true;
        self.grouping = true;
        self
    }

    /// Requires continuous numeric dimensions.
    pub fn measure(mut self) -> Self {
        self.measure = true;
        self
    }

    /// Sets the default dimension pattern.
    pub fn with_default(mut self, pattern: impl Into<Arc<str>>) -> Self {
        self.default = Some(pattern.into());
        self
    }
}

/// Where a role's binding came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleSource {
    /// The plot's own spec.
    Plot,
    /// The chart-level spec.
    Chart,
    /// The plot type's default.
    PlotType,
    /// The declaration's default dimension pattern.
    Default,
    /// Nothing applied.
    Unbound,
}

/// The candidate specs for one role, by precedence level.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoleSources<'a> {
    /// The plot's own spec.
    pub plot: Option<&'a RoleSpec>,
    /// The chart-level spec.
    pub chart: Option<&'a RoleSpec>,
    /// The plot type's default spec.
    pub plot_type: Option<&'a RoleSpec>,
}

/// A resolved role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundRole {
    decl: RoleDecl,
    grouping: GroupingSpec,
    dimensions: SmallVec<[DimensionId; 2]>,
    source: RoleSource,
}

impl BoundRole {
    /// Returns the role name.
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Returns the declaration.
    pub fn decl(&self) -> &RoleDecl {
        &self.decl
    }

    /// Returns the bound grouping.
    pub fn grouping(&self) -> &GroupingSpec {
        &self.grouping
    }

    /// Returns the bound dimensions in grouping order.
    pub fn dimensions(&self) -> &[DimensionId] {
        &self.dimensions
    }

    /// Returns `false` when the role binds zero dimensions.
    pub fn is_bound(&self) -> bool {
        !self.dimensions.is_empty()
    }

    /// Returns where the binding came from.
    pub fn source(&self) -> RoleSource {
        self.source
    }

    fn unbound(decl: &RoleDecl, source: RoleSource) -> Self {
        Self {
            decl: decl.clone(),
            grouping: GroupingSpec::empty(),
            dimensions: SmallVec::new(),
            source,
        }
    }
}

/// Resolves one role against a dataset.
pub fn resolve(
    decl: &RoleDecl,
    sources: RoleSources<'_>,
    dataset: &Dataset,
) -> Result<BoundRole, RoleError> {
    let explicit = [
        (sources.plot, RoleSource::Plot),
        (sources.chart, RoleSource::Chart),
        (sources.plot_type, RoleSource::PlotType),
    ]
    .into_iter()
    .find_map(|(spec, source)| spec.map(|s| (s, source)));

    let (grouping, source) = match explicit {
        Some((RoleSpec::Null, source)) => return Ok(BoundRole::unbound(decl, source)),
        Some((RoleSpec::Text(text), source)) => (GroupingSpec::parse(text)?, source),
        Some((RoleSpec::Grouping(g), source)) => (g.clone(), source),
        None => (default_grouping(decl, dataset), RoleSource::Default),
    };

    if grouping.is_empty() {
        if explicit.is_none() && decl.required {
            return Err(RoleError::Unbound(decl.name.clone()));
        }
        let source = if explicit.is_some() {
            source
        } else {
            RoleSource::Unbound
        };
        return Ok(BoundRole::unbound(decl, source));
    }

    let dimensions = validate(decl, &grouping, dataset)?;
    debug!(role = %decl.name, ?source, grouping = %grouping, "resolved role");
    Ok(BoundRole {
        decl: decl.clone(),
        grouping,
        dimensions,
        source,
    })
}

/// Resolves every declared role of a plot, in declaration order.
pub fn resolve_all(
    decls: &[RoleDecl],
    plot: &RoleSpecs,
    chart: &RoleSpecs,
    plot_type: &RoleSpecs,
    dataset: &Dataset,
) -> Result<Vec<BoundRole>, RoleError> {
    decls
        .iter()
        .map(|decl| {
            let sources = RoleSources {
                plot: plot.get(&decl.name),
                chart: chart.get(&decl.name),
                plot_type: plot_type.get(&decl.name),
            };
            resolve(decl, sources, dataset)
        })
        .collect()
}

fn default_grouping(decl: &RoleDecl, dataset: &Dataset) -> GroupingSpec {
    let Some(pattern) = &decl.default else {
        return GroupingSpec::empty();
    };
    let mut names: Vec<Arc<str>> = match pattern.strip_suffix('*') {
        Some(prefix) => dataset
            .dimension_group(prefix)
            .into_iter()
            .map(|id| dataset.dimension(id).spec().name.clone())
            .collect(),
        None => dataset
            .dimension_by_name(pattern)
            .map(|d| d.spec().name.clone())
            .into_iter()
            .collect(),
    };
    if decl.single_dimension {
        names.truncate(1);
    }
    GroupingSpec::path(names)
}

fn validate(
    decl: &RoleDecl,
    grouping: &GroupingSpec,
    dataset: &Dataset,
) -> Result<SmallVec<[DimensionId; 2]>, RoleError> {
    let role = || decl.name.clone();
    let mut dimensions: SmallVec<[DimensionId; 2]> = SmallVec::new();
    for level in grouping.levels() {
        let mut discrete_seen = false;
        let mut continuous_seen = false;
        for d in &level.dimensions {
            let id = dataset
                .dimension_id(&d.name)
                .map_err(|_| RoleError::UnknownDimension {
                    role: role(),
                    dimension: d.name.clone(),
                })?;
            if dimensions.contains(&id) {
                return Err(RoleError::DuplicateDimension {
                    role: role(),
                    dimension: d.name.clone(),
                });
            }
            let spec = dataset.dimension(id).spec();
            if decl.discrete && !spec.discrete {
                return Err(RoleError::NotDiscrete {
                    role: role(),
                    dimension: d.name.clone(),
                });
            }
            if decl.measure && (spec.discrete || !spec.kind.is_numeric()) {
                return Err(RoleError::NotMeasure {
                    role: role(),
                    dimension: d.name.clone(),
                });
            }
            discrete_seen |= spec.discrete;
            continuous_seen |= !spec.discrete;
            dimensions.push(id);
        }
        if discrete_seen && continuous_seen {
            return Err(RoleError::CompositeConflict {
                role: role(),
                reason: "a composite level mixes discrete and continuous dimensions",
            });
        }
    }
    if decl.single_dimension && dimensions.len() > 1 {
        return Err(RoleError::CompositeConflict {
            role: role(),
            reason: "the role accepts a single dimension",
        });
    }
    Ok(dimensions)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use tessera_data::{DataError, DimensionSpec};

    use super::*;

    fn dataset() -> Dataset {
        Dataset::new([
            DimensionSpec::text("region"),
            DimensionSpec::text("product"),
            DimensionSpec::number("year").with_discrete(true),
            DimensionSpec::number("value"),
            DimensionSpec::number("value2"),
        ])
        .unwrap()
    }

    fn names(ds: &Dataset, role: &BoundRole) -> Vec<std::string::String> {
        role.dimensions()
            .iter()
            .map(|id| std::string::String::from(ds.dimension(*id).name()))
            .collect()
    }

    #[test]
    fn plot_spec_wins_over_chart_spec_and_defaults() {
        let ds = dataset();
        let decl = RoleDecl::new("category").discrete().with_default("year");
        let plot = RoleSpec::from("region");
        let chart = RoleSpec::from("product");
        let plot_type = RoleSpec::from("year");
        let sources = RoleSources {
            plot: Some(&plot),
            chart: Some(&chart),
            plot_type: Some(&plot_type),
        };
        let role = resolve(&decl, sources, &ds).unwrap();
        assert_eq!(names(&ds, &role), ["region"]);
        assert_eq!(role.source(), RoleSource::Plot);

        let sources = RoleSources {
            chart: Some(&chart),
            ..RoleSources::default()
        };
        assert_eq!(resolve(&decl, sources, &ds).unwrap().source(), RoleSource::Chart);

        let role = resolve(&decl, RoleSources::default(), &ds).unwrap();
        assert_eq!(names(&ds, &role), ["year"]);
        assert_eq!(role.source(), RoleSource::Default);
    }

    #[test]
    fn default_patterns_match_dimension_groups() {
        let ds = dataset();
        let decl = RoleDecl::new("value").measure().with_default("value*");
        let role = resolve(&decl, RoleSources::default(), &ds).unwrap();
        assert_eq!(names(&ds, &role), ["value", "value2"]);
        let single =
            resolve(&decl.clone().single_dimension(), RoleSources::default(), &ds).unwrap();
        assert_eq!(names(&ds, &single), ["value"]);
    }

    #[test]
    fn explicit_null_binds_nothing_even_when_required() {
        let ds = dataset();
        let decl = RoleDecl::new("series").required().with_default("region");
        let null = RoleSpec::Null;
        let chart = RoleSpec::from("product");
        let sources = RoleSources {
            plot: Some(&null),
            chart: Some(&chart),
            ..RoleSources::default()
        };
        let role = resolve(&decl, sources, &ds).unwrap();
        assert!(!role.is_bound());
        assert_eq!(role.source(), RoleSource::Plot);
    }

    #[test]
    fn explicitly_empty_specs_behave_like_null() {
        let ds = dataset();
        let decl = RoleDecl::new("value").measure().required().with_default("value*");
        let specs = [
            RoleSpec::from(""),
            RoleSpec::from("  "),
            RoleSpec::from(GroupingSpec::empty()),
        ];
        for spec in specs {
            let role = resolve(
                &decl,
                RoleSources {
                    chart: Some(&spec),
                    ..RoleSources::default()
                },
                &ds,
            )
            .unwrap();
            assert!(!role.is_bound());
            assert!(role.dimensions().is_empty());
            assert_eq!(role.source(), RoleSource::Chart);
        }
        // Without any explicit spec the default pattern still applies.
        assert!(resolve(&decl, RoleSources::default(), &ds).unwrap().is_bound());
    }

    #[test]
    fn missing_required_roles_fail_and_optional_ones_stay_unbound() {
        let ds = dataset();
        let decl = RoleDecl::new("size").with_default("size");
        let role = resolve(&decl, RoleSources::default(), &ds).unwrap();
        assert_eq!(role.source(), RoleSource::Unbound);
        assert_eq!(
            resolve(&decl.required(), RoleSources::default(), &ds).unwrap_err(),
            RoleError::Unbound("size".into())
        );
    }

    #[test]
    fn invalid_bindings_are_rejected() {
        let ds = dataset();
        let check = |decl: &RoleDecl, text: &str| {
            let spec = RoleSpec::from(text);
            resolve(
                decl,
                RoleSources {
                    plot: Some(&spec),
                    ..RoleSources::default()
                },
                &ds,
            )
            .unwrap_err()
        };
        let any = RoleDecl::new("color");
        assert!(matches!(check(&any, "nope"), RoleError::UnknownDimension { .. }));
        assert!(matches!(
            check(&any, "region, region"),
            RoleError::DuplicateDimension { .. }
        ));
        assert!(matches!(
            check(&any, "region|value"),
            RoleError::CompositeConflict { .. }
        ));
        assert!(matches!(
            check(&any.clone().single_dimension(), "region, product"),
            RoleError::CompositeConflict { .. }
        ));
        assert!(matches!(
            check(&RoleDecl::new("category").discrete(), "value"),
            RoleError::NotDiscrete { .. }
        ));
        assert!(matches!(
            check(&RoleDecl::new("value").measure(), "year"),
            RoleError::NotMeasure { .. }
        ));
        assert!(matches!(
            check(&any, "region sideways"),
            RoleError::Grouping(DataError::MalformedGrouping { .. })
        ));
    }

    #[test]
    fn resolve_all_keeps_declaration_order() {
        let ds = dataset();
        let decls = [
            RoleDecl::new("category").discrete().with_default("region"),
            RoleDecl::new("value").measure().required().with_default("value"),
        ];
        let chart = RoleSpecs::new().with("category", "product");
        let roles = resolve_all(&decls, &RoleSpecs::new(), &chart, &RoleSpecs::new(), &ds).unwrap();
        assert_eq!(roles[0].name(), "category");
        assert_eq!(names(&ds, &roles[0]), ["product"]);
        assert_eq!(names(&ds, &roles[1]), ["value"]);
    }
}
