// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene trees: render-ready nodes carrying resolved role values.
//!
//! A data scene tree mirrors a [`Cube`]: one scene per cube node, in the cube's materialized
//! child order. Each scene holds `vars` keyed by role name. Grouping roles get their var on the
//! scenes of the level that groups by their deepest dimension; datum-level roles get theirs on
//! leaf scenes. Measure roles are summed over a scene's datums on first access and cached.
//!
//! Synthetic scene trees (axis ticks, legend entries) are flat: a root with one child per tick
//! or entry.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::OnceCell;

use hashbrown::HashSet;
use peniko::Color;
use peniko::color::palette::css;
use smallvec::SmallVec;
use tessera_data::{Atom, AtomId, Cube, DataError, DimensionId, GroupingSpec, NodeId, Value};

use crate::role::BoundRole;
use crate::scale::ScaleKind;

/// The var name carried by axis tick scenes.
pub const TICK_VAR: &str = "tick";

/// Colors assigned to legend entries, cycled in order.
pub const DEFAULT_PALETTE: [Color; 8] = [
    css::CORNFLOWER_BLUE,
    css::ORANGE,
    css::MEDIUM_SEA_GREEN,
    css::CRIMSON,
    css::GOLDENROD,
    css::SLATE_BLUE,
    css::DARK_CYAN,
    css::HOT_PINK,
];

/// Index of a scene within its [`SceneTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u32);

impl SceneId {
    /// The root scene of every tree.
    pub const ROOT: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A resolved role value.
#[derive(Clone, Debug, PartialEq)]
pub struct Var {
    /// The value used for encoding.
    pub value: Value,
    /// The formatted label.
    pub label: Arc<str>,
    /// The raw source value.
    pub raw: Value,
}

impl Var {
    /// A var whose value and raw value are the same.
    pub fn new(value: Value, label: impl Into<Arc<str>>) -> Self {
        Self {
            raw: value.clone(),
            value,
            label: label.into(),
        }
    }

    fn null() -> Self {
        Self::new(Value::Null, "")
    }
}

#[derive(Debug)]
enum Slot {
    Ready(Var),
    Sum {
        dimension: DimensionId,
        cell: OnceCell<Var>,
    },
}

/// One scene node.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    parent: Option<SceneId>,
    children: Vec<SceneId>,
    index: usize,
    node: Option<NodeId>,
    vars: SmallVec<[(Arc<str>, Slot); 4]>,
    color: Option<Color>,
}

impl Scene {
    /// Returns the scene id.
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Returns the parent scene.
    pub fn parent(&self) -> Option<SceneId> {
        self.parent
    }

    /// Returns the children in order.
    pub fn children(&self) -> &[SceneId] {
        &self.children
    }

    /// Returns the position among siblings.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the cube node this scene mirrors, for data scenes.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Returns the palette color assigned to a legend entry.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns `true` if the scene has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates over the role names of this scene's own vars.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|(name, _)| &**name)
    }
}

/// An arena of scenes rooted at [`SceneId::ROOT`].
#[derive(Debug)]
pub struct SceneTree {
    scenes: Vec<Scene>,
    cube: Option<Cube>,
}

impl SceneTree {
    fn with_root(node: Option<NodeId>, cube: Option<Cube>) -> Self {
        Self {
            scenes: alloc::vec![Scene {
                id: SceneId::ROOT,
                parent: None,
                children: Vec::new(),
                index: 0,
                node,
                vars: SmallVec::new(),
                color: None,
            }],
            cube,
        }
    }

    fn push(&mut self, parent: SceneId, node: Option<NodeId>) -> SceneId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "scene counts are bounded by cube node counts"
        )]
        let id = SceneId(self.scenes.len() as u32);
        let index = self.scenes[parent.index()].children.len();
        self.scenes[parent.index()].children.push(id);
        self.scenes.push(Scene {
            id,
            parent: Some(parent),
            children: Vec::new(),
            index,
            node,
            vars: SmallVec::new(),
            color: None,
        });
        id
    }

    /// Projects a cube and its bound roles into a scene tree.
    ///
    /// Roles bound to zero dimensions are skipped.
    pub fn build(cube: &Cube, roles: &[BoundRole]) -> Self {
        let depth = cube.grouping().depth();
        let level_of = |dim: DimensionId| {
            (0..depth).find(|l| cube.level_dimensions(*l).iter().any(|(d, _)| *d == dim))
        };

        let mut plans = Vec::new();
        for role in roles.iter().filter(|r| r.is_bound()) {
            let dims = role.dimensions();
            let deepest = dims
                .iter()
                .map(|d| level_of(*d))
                .try_fold(0, |acc, l| l.map(|l| acc.max(l)));
            plans.push(match deepest {
                Some(level) => Plan::Group {
                    name: role.name().into(),
                    dims: dims.into(),
                    depth: level + 1,
                },
                None if role.decl().measure => Plan::Sum {
                    names: measure_var_names(role),
                    dims: dims.into(),
                },
                None => Plan::Datum {
                    name: role.name().into(),
                    dims: dims.into(),
                },
            });
        }

        let mut tree = Self::with_root(Some(NodeId::ROOT), Some(cube.clone()));
        tree.project(cube, &plans, NodeId::ROOT, SceneId::ROOT);
        tree
    }

    fn project(&mut self, cube: &Cube, plans: &[Plan], node: NodeId, scene: SceneId) {
        let n = cube.node(node);
        let mut vars = SmallVec::new();
        for plan in plans {
            match plan {
                Plan::Group { name, dims, depth } if *depth == n.depth() => {
                    let atoms: SmallVec<[AtomId; 2]> =
                        dims.iter().map(|d| inherited_atom(cube, node, *d)).collect();
                    vars.push((name.clone(), Slot::Ready(atom_var(cube, dims, &atoms))));
                }
                Plan::Datum { name, dims } if n.is_leaf() => {
                    let atoms: SmallVec<[AtomId; 2]> = dims
                        .iter()
                        .map(|d| shared_atom(cube, node, *d))
                        .collect();
                    vars.push((name.clone(), Slot::Ready(atom_var(cube, dims, &atoms))));
                }
                Plan::Sum { names, dims } => {
                    for (name, dim) in names.iter().zip(dims.iter()) {
                        vars.push((
                            name.clone(),
                            Slot::Sum {
                                dimension: *dim,
                                cell: OnceCell::new(),
                            },
                        ));
                    }
                }
                _ => {}
            }
        }
        self.scenes[scene.index()].vars = vars;
        for child in n.children() {
            let id = self.push(scene, Some(*child));
            self.project(cube, plans, *child, id);
        }
    }

    /// Builds a flat tree with one child scene per var, each keyed by `role`.
    pub fn from_vars(role: &str, vars: impl IntoIterator<Item = Var>) -> Self {
        let role: Arc<str> = role.into();
        let mut tree = Self::with_root(None, None);
        for var in vars {
            let id = tree.push(SceneId::ROOT, None);
            tree.scenes[id.index()].vars.push((role.clone(), Slot::Ready(var)));
        }
        tree
    }

    /// One tick scene per distinct non-null atom of `dimension`, in the order the cube's scenes
    /// show them.
    pub fn discrete_ticks(cube: &Cube, dimension: &str) -> Result<Self, DataError> {
        let dim = cube.dataset().dimension(cube.dataset().dimension_id(dimension)?);
        Ok(Self::from_vars(
            TICK_VAR,
            group_order(cube, dim.id()).into_iter().map(|a| {
                let atom = dim.atom(a);
                Var::new(atom.value.clone(), atom.label.clone())
            }),
        ))
    }

    /// One tick scene per nice tick of a continuous scale.
    pub fn continuous_ticks(kind: ScaleKind, domain: (f64, f64), count: usize) -> Self {
        let (ticks, step) = kind.ticks(domain, count);
        Self::from_vars(
            TICK_VAR,
            ticks
                .into_iter()
                .map(|t| Var::new(Value::Number(t), kind.format(t, step))),
        )
    }

    /// One legend entry per distinct non-null atom of `dimension`, keyed by `role` and colored
    /// from `palette` in order. Entries follow [`group_order`].
    pub fn legend(
        cube: &Cube,
        dimension: &str,
        role: &str,
        palette: &[Color],
    ) -> Result<Self, DataError> {
        let mut tree = Self::from_vars(role, []);
        let dim = cube.dataset().dimension_id(dimension)?;
        let dim = cube.dataset().dimension(dim);
        let role: Arc<str> = role.into();
        for (i, a) in group_order(cube, dim.id()).into_iter().enumerate() {
            let atom = dim.atom(a);
            let id = tree.push(SceneId::ROOT, None);
            let scene = &mut tree.scenes[id.index()];
            scene.vars.push((
                role.clone(),
                Slot::Ready(Var::new(atom.value.clone(), atom.label.clone())),
            ));
            scene.color = (!palette.is_empty()).then(|| palette[i % palette.len()]);
        }
        Ok(tree)
    }

    /// Returns the root id.
    pub fn root(&self) -> SceneId {
        SceneId::ROOT
    }

    /// Returns a scene.
    ///
    /// Panics if the id does not come from this tree.
    pub fn scene(&self, id: SceneId) -> &Scene {
        &self.scenes[id.index()]
    }

    /// Returns the number of scenes, root included.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Returns `true` if the tree holds only its root.
    pub fn is_empty(&self) -> bool {
        self.scenes.len() <= 1
    }

    /// Iterates over `scene` and its descendants in depth-first pre-order.
    pub fn descendants(&self, scene: SceneId) -> impl Iterator<Item = SceneId> + '_ {
        let mut stack = alloc::vec![scene];
        core::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.scene(id).children.iter().rev().copied());
            Some(id)
        })
    }

    /// Iterates over leaf scenes in order. A lone root counts as a leaf.
    pub fn leaves(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.descendants(SceneId::ROOT)
            .filter(|id| self.scene(*id).is_leaf())
    }

    /// Returns a var, inherited from the nearest ancestor that defines it.
    pub fn var(&self, scene: SceneId, role: &str) -> Option<&Var> {
        let mut current = Some(scene);
        while let Some(id) = current {
            if let Some(var) = self.own_var(id, role) {
                return Some(var);
            }
            current = self.scene(id).parent;
        }
        None
    }

    /// Returns a var defined on `scene` itself.
    pub fn own_var(&self, scene: SceneId, role: &str) -> Option<&Var> {
        let (_, slot) = self
            .scene(scene)
            .vars
            .iter()
            .find(|(name, _)| &**name == role)?;
        Some(match slot {
            Slot::Ready(var) => var,
            Slot::Sum { dimension, cell } => {
                cell.get_or_init(|| self.sum(self.scene(scene).node, *dimension))
            }
        })
    }

    /// Returns the labels of the first var of every child of the root, in order.
    pub(crate) fn entry_labels(&self) -> impl Iterator<Item = &str> {
        self.scene(SceneId::ROOT)
            .children
            .iter()
            .filter_map(|id| self.scene(*id).vars.first().map(|(name, _)| (*id, name)))
            .filter_map(|(id, name)| self.own_var(id, name).map(|v| &*v.label))
    }

    fn sum(&self, node: Option<NodeId>, dimension: DimensionId) -> Var {
        let (Some(cube), Some(node)) = (&self.cube, node) else {
            return Var::null();
        };
        let dataset = cube.dataset();
        let mut total = 0.0;
        let mut seen = false;
        for datum in cube.node(node).datums() {
            if let Some(v) = dataset.value_of(*datum, dimension).as_f64() {
                total += v;
                seen = true;
            }
        }
        if !seen {
            return Var::null();
        }
        let value = Value::Number(total);
        let label: Arc<str> = match &dataset.dimension(dimension).spec().formatter {
            Some(f) => f(&value).into(),
            None => value.to_string().into(),
        };
        Var::new(value, label)
    }
}

/// Derives a cube grouping from the grouping roles, in role order, skipping dimensions that
/// an earlier role already groups by.
pub fn grouping_for(roles: &[BoundRole]) -> GroupingSpec {
    let mut grouping = GroupingSpec::empty();
    for role in roles
        .iter()
        .filter(|r| r.is_bound() && r.decl().grouping)
    {
        grouping.extend_distinct(role.grouping());
    }
    grouping
}

enum Plan {
    Group {
        name: Arc<str>,
        dims: SmallVec<[DimensionId; 2]>,
        depth: usize,
    },
    Datum {
        name: Arc<str>,
        dims: SmallVec<[DimensionId; 2]>,
    },
    Sum {
        names: SmallVec<[Arc<str>; 2]>,
        dims: SmallVec<[DimensionId; 2]>,
    },
}

/// The distinct non-null atoms of `dimension` in the order the cube materializes them.
///
/// For a grouping dimension this is the pre-order of the group nodes, so ticks and legend
/// entries line up with the data scenes, sorted levels included. Other dimensions follow the
/// order of the cube's datums.
fn group_order(cube: &Cube, dimension: DimensionId) -> Vec<AtomId> {
    let mut seen = HashSet::new();
    let mut grouped = false;
    let mut out = Vec::new();
    for id in cube.descendants(cube.root()) {
        for (dim, atom) in cube.node(id).level_atoms() {
            if *dim != dimension {
                continue;
            }
            grouped = true;
            if !atom.is_null() && seen.insert(*atom) {
                out.push(*atom);
            }
        }
    }
    if !grouped {
        let dataset = cube.dataset();
        for datum in cube.node(cube.root()).datums() {
            let atom = dataset.datum(*datum).atom(dimension);
            if !atom.is_null() && seen.insert(atom) {
                out.push(atom);
            }
        }
    }
    out
}

/// `value`, `value2`, `value3`, … for a measure role bound to several dimensions.
fn measure_var_names(role: &BoundRole) -> SmallVec<[Arc<str>; 2]> {
    (0..role.dimensions().len())
        .map(|i| match i {
            0 => role.name().into(),
            _ => alloc::format!("{}{}", role.name(), i + 1).into(),
        })
        .collect()
}

fn inherited_atom(cube: &Cube, node: NodeId, dim: DimensionId) -> AtomId {
    let mut current = Some(node);
    while let Some(id) = current {
        let n = cube.node(id);
        if let Some((_, atom)) = n.level_atoms().iter().find(|(d, _)| *d == dim) {
            return *atom;
        }
        current = n.parent();
    }
    AtomId::NULL
}

/// The atom every datum of `node` shares for `dim`, or null when they disagree.
fn shared_atom(cube: &Cube, node: NodeId, dim: DimensionId) -> AtomId {
    let dataset = cube.dataset();
    let mut datums = cube.node(node).datums().iter();
    let Some(first) = datums.next() else {
        return AtomId::NULL;
    };
    let atom = dataset.datum(*first).atom(dim);
    if datums.all(|d| dataset.datum(*d).atom(dim) == atom) {
        atom
    } else {
        AtomId::NULL
    }
}

fn atom_var(cube: &Cube, dims: &[DimensionId], atoms: &[AtomId]) -> Var {
    let dataset = cube.dataset();
    let resolved: SmallVec<[&Atom; 2]> = dims
        .iter()
        .zip(atoms)
        .map(|(d, a)| dataset.dimension(*d).atom(*a))
        .collect();
    match resolved.as_slice() {
        [] => Var::null(),
        [atom] => Var::new(atom.value.clone(), atom.label.clone()),
        [.., last] => {
            let key: Vec<String> = resolved.iter().map(|a| a.value.to_string()).collect();
            let labels: Vec<&str> = resolved.iter().map(|a| &*a.label).collect();
            Var {
                value: Value::Text(key.join(",").into()),
                label: labels.join(" ~ ").into(),
                raw: last.value.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tessera_data::{DimensionSpec, Row};

    use super::*;
    use crate::role::{RoleDecl, RoleSources, RoleSpec, resolve};

    fn level_names(grouping: &GroupingSpec) -> Vec<Vec<&str>> {
        grouping
            .levels()
            .iter()
            .map(|l| l.dimensions.iter().map(|d| &*d.name).collect())
            .collect()
    }

    fn bind(cube: &Cube, decl: RoleDecl, spec: &str) -> BoundRole {
        let spec = RoleSpec::from(spec);
        resolve(
            &decl,
            RoleSources {
                plot: Some(&spec),
                ..RoleSources::default()
            },
            cube.dataset(),
        )
        .unwrap()
    }

    fn sales_cube(grouping: &str) -> Cube {
        let rows = [
            Row::new().with("region", "N").with("year", 2020.0).with("sales", 10.0),
            Row::new().with("region", "S").with("year", 2020.0).with("sales", 20.0),
            Row::new().with("region", "N").with("year", 2021.0).with("sales", 5.0),
        ];
        Cube::from_rows(
            [
                DimensionSpec::text("region"),
                DimensionSpec::number("year").with_discrete(true),
                DimensionSpec::number("sales"),
            ],
            &rows,
            &GroupingSpec::parse(grouping).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn one_leaf_scene_per_group_in_order() {
        let rows = [
            Row::new().with("region", "N").with("sales", 10.0),
            Row::new().with("region", "S").with("sales", 20.0),
        ];
        let cube = Cube::from_rows(
            [DimensionSpec::text("region"), DimensionSpec::number("sales")],
            &rows,
            &GroupingSpec::path(["region"]),
        )
        .unwrap();
        let category = bind(&cube, RoleDecl::new("category").discrete(), "region");
        let tree = SceneTree::build(&cube, &[category]);
        let leaves: Vec<SceneId> = tree.leaves().collect();
        assert_eq!(leaves.len(), 2);
        let values: Vec<&Value> = leaves
            .iter()
            .map(|s| &tree.var(*s, "category").unwrap().value)
            .collect();
        assert_eq!(values, [&Value::from("N"), &Value::from("S")]);
        assert_eq!(tree.scene(leaves[1]).index(), 1);
        assert!(tree.own_var(SceneId::ROOT, "category").is_none());
    }

    #[test]
    fn group_vars_sit_on_their_level_and_are_inherited() {
        let cube = sales_cube("region, year");
        let series = bind(&cube, RoleDecl::new("series").discrete(), "region");
        let category = bind(&cube, RoleDecl::new("category").discrete(), "year");
        let tree = SceneTree::build(&cube, &[series, category]);
        let north = tree.scene(SceneId::ROOT).children()[0];
        assert_eq!(tree.own_var(north, "series").unwrap().label.as_ref(), "N");
        assert!(tree.own_var(north, "category").is_none());
        let leaf = tree.scene(north).children()[1];
        assert_eq!(tree.own_var(leaf, "category").unwrap().label.as_ref(), "2021");
        assert_eq!(tree.var(leaf, "series").unwrap().label.as_ref(), "N");
    }

    #[test]
    fn measure_vars_sum_lazily_at_every_level() {
        let cube = sales_cube("region");
        let value = bind(&cube, RoleDecl::new("value").measure(), "sales");
        let tree = SceneTree::build(&cube, &[value]);
        assert_eq!(tree.var(SceneId::ROOT, "value").unwrap().value, Value::from(35.0));
        let north = tree.scene(SceneId::ROOT).children()[0];
        let var = tree.var(north, "value").unwrap();
        assert_eq!(var.value, Value::from(15.0));
        assert_eq!(var.label.as_ref(), "15");
        assert!(core::ptr::eq(var, tree.var(north, "value").unwrap()));
    }

    #[test]
    fn datum_roles_are_null_when_a_leaf_disagrees() {
        let cube = sales_cube("region");
        let year = bind(&cube, RoleDecl::new("detail"), "year");
        let tree = SceneTree::build(&cube, &[year]);
        let children = tree.scene(SceneId::ROOT).children();
        assert_eq!(tree.var(children[0], "detail").unwrap().value, Value::Null);
        assert_eq!(
            tree.var(children[1], "detail").unwrap().value,
            Value::from(2020.0)
        );
    }

    #[test]
    fn composite_roles_join_labels() {
        let cube = sales_cube("region|year");
        let category = bind(&cube, RoleDecl::new("category").discrete(), "region|year");
        let tree = SceneTree::build(&cube, &[category]);
        let first = tree.scene(SceneId::ROOT).children()[0];
        let var = tree.var(first, "category").unwrap();
        assert_eq!(var.label.as_ref(), "N ~ 2020");
        assert_eq!(var.value, Value::from("N,2020"));
        assert_eq!(var.raw, Value::from(2020.0));
    }

    #[test]
    fn unbound_roles_are_skipped() {
        let cube = sales_cube("region");
        let decl = RoleDecl::new("color");
        let null = RoleSpec::Null;
        let color = resolve(
            &decl,
            RoleSources {
                plot: Some(&null),
                ..RoleSources::default()
            },
            cube.dataset(),
        )
        .unwrap();
        let tree = SceneTree::build(&cube, &[color]);
        assert!(tree.leaves().all(|s| tree.var(s, "color").is_none()));
    }

    #[test]
    fn synthetic_trees_carry_only_their_vars() {
        let cube = sales_cube("region");
        let ticks = SceneTree::discrete_ticks(&cube, "region").unwrap();
        let labels: Vec<&str> = ticks.entry_labels().collect();
        assert_eq!(labels, ["N", "S"]);
        assert!(ticks.scene(SceneId(1)).node().is_none());

        let numeric = SceneTree::continuous_ticks(ScaleKind::Linear, (0.0, 20.0), 4);
        let labels: Vec<&str> = numeric.entry_labels().collect();
        assert_eq!(labels, ["0", "5", "10", "15", "20"]);

        let legend = SceneTree::legend(&cube, "region", "series", &DEFAULT_PALETTE).unwrap();
        let second = legend.scene(SceneId::ROOT).children()[1];
        assert_eq!(legend.scene(second).color(), Some(css::ORANGE));
        assert_eq!(legend.var(second, "series").unwrap().label.as_ref(), "S");
        assert!(legend.var(second, TICK_VAR).is_none());
    }

    #[test]
    fn ticks_and_legend_entries_follow_scene_order() {
        let rows = [
            Row::new().with("region", "S").with("year", 2021.0).with("sales", 20.0),
            Row::new().with("region", "N").with("year", 2020.0).with("sales", 10.0),
            Row::new().with("region", "S").with("year", 2020.0).with("sales", 5.0),
        ];
        let specs = || {
            [
                DimensionSpec::text("region"),
                DimensionSpec::number("year").with_discrete(true),
                DimensionSpec::number("sales"),
            ]
        };
        let cube = Cube::from_rows(specs(), &rows, &GroupingSpec::path(["region"])).unwrap();
        let category = bind(&cube, RoleDecl::new("category").discrete(), "region");
        let tree = SceneTree::build(&cube, &[category]);
        let scenes: Vec<&str> = tree
            .leaves()
            .map(|s| &*tree.var(s, "category").unwrap().label)
            .collect();
        assert_eq!(scenes, ["S", "N"]);
        let ticks = SceneTree::discrete_ticks(&cube, "region").unwrap();
        assert_eq!(ticks.entry_labels().collect::<Vec<_>>(), scenes);
        let legend = SceneTree::legend(&cube, "region", "series", &DEFAULT_PALETTE).unwrap();
        assert_eq!(legend.entry_labels().collect::<Vec<_>>(), scenes);

        // Sorted levels and second-level dimensions keep the scene order too.
        let sorted =
            Cube::from_rows(specs(), &rows, &GroupingSpec::parse("region, year desc").unwrap())
                .unwrap();
        let years = SceneTree::discrete_ticks(&sorted, "year").unwrap();
        assert_eq!(years.entry_labels().collect::<Vec<_>>(), ["2021", "2020"]);

        // A dimension the cube does not group by follows datum order.
        let years = SceneTree::discrete_ticks(&cube, "year").unwrap();
        assert_eq!(years.entry_labels().collect::<Vec<_>>(), ["2021", "2020"]);
    }

    #[test]
    fn grouping_follows_role_order_without_repeats() {
        let cube = sales_cube("");
        let series = bind(&cube, RoleDecl::new("series").discrete(), "region");
        let category = bind(&cube, RoleDecl::new("category").discrete(), "year, region");
        let value = bind(&cube, RoleDecl::new("value").measure(), "sales");
        let grouping = grouping_for(&[series, category, value]);
        assert_eq!(level_names(&grouping), vec![vec!["region"], vec!["year"]]);
    }
}
