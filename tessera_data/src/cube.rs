// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical, filterable data cubes.
//!
//! A [`Cube`] partitions the datums of a shared [`Dataset`] by a [`GroupingSpec`]. Each level of
//! the grouping splits every node of the previous level; the leaves therefore form a strict
//! partition of the cube's datums.
//!
//! Filtered and linked cubes are *views*: they own no datums, only a source datum set, a list of
//! predicates and the grouping. Their partition is re-derived by regrouping the source datums
//! that pass every predicate, so filtering twice with the same predicate is a no-op.

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::OnceCell;
use core::cmp::Ordering;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::dataset::{Dataset, DatumId, Row};
use crate::dimension::{Atom, AtomId, DimensionId, DimensionSpec};
use crate::error::DataError;
use crate::grouping::GroupingSpec;
use crate::log::{debug, warn};
use crate::predicate::Predicate;

/// Index of a node within one [`Cube`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node of every cube.
    pub const ROOT: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable identity of a group: the atoms of every level from the root down.
///
/// Keys are comparable across cubes built over the same dataset and grouping.
pub type NodeKey = SmallVec<[AtomId; 4]>;

/// One group of a cube.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    datums: Vec<DatumId>,
    depth: usize,
    index: usize,
    atoms: SmallVec<[(DimensionId, AtomId); 2]>,
    key: NodeKey,
    atom_cache: Box<[OnceCell<Arc<[AtomId]>>]>,
}

impl Node {
    /// Returns the node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in materialized (sorted) order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the datums of this group, in original row order.
    pub fn datums(&self) -> &[DatumId] {
        &self.datums
    }

    /// Returns the grouping depth: `0` for the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the position of this node among its siblings.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the atoms of this node's own grouping level.
    pub fn level_atoms(&self) -> &[(DimensionId, AtomId)] {
        &self.atoms
    }

    /// Returns the stable key of this node.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// Where a cube's datums come from.
#[derive(Clone, Debug)]
enum Source {
    /// Every datum of the dataset.
    Dataset,
    /// The datums of a node of another cube (the link parent).
    Linked {
        parent_key: NodeKey,
        datums: Arc<[DatumId]>,
    },
}

#[derive(Debug)]
struct CubeInner {
    dataset: Arc<Dataset>,
    grouping: GroupingSpec,
    levels: Vec<SmallVec<[(DimensionId, bool); 2]>>,
    source: Source,
    predicates: Vec<Predicate>,
    nodes: Vec<Node>,
    declared_cache: Box<[OnceCell<Arc<[AtomId]>>]>,
}

/// A grouped, optionally filtered view over a shared dataset.
///
/// Cloning a cube is cheap; clones share nodes and caches.
#[derive(Clone, Debug)]
pub struct Cube {
    inner: Arc<CubeInner>,
}

/// Options for [`Cube::atoms`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtomQuery {
    /// Restrict to atoms occurring in this node's subtree. `None` returns every declared atom.
    pub node: Option<NodeId>,
    /// Whether to include the null atom.
    pub include_null: bool,
}

impl AtomQuery {
    /// Every declared atom, without the null atom.
    pub fn declared() -> Self {
        Self::default()
    }

    /// Atoms occurring under `node`, without the null atom.
    pub fn within(node: NodeId) -> Self {
        Self {
            node: Some(node),
            include_null: false,
        }
    }

    /// Includes the null atom.
    pub fn with_null(mut self) -> Self {
        self.include_null = true;
        self
    }
}

impl Cube {
    /// Groups every datum of `dataset` by `grouping`.
    pub fn build(dataset: Arc<Dataset>, grouping: &GroupingSpec) -> Result<Self, DataError> {
        Self::derive(dataset, grouping.clone(), Source::Dataset, Vec::new())
    }

    /// Loads rows into a new dataset and groups them.
    pub fn from_rows<'a>(
        specs: impl IntoIterator<Item = DimensionSpec>,
        rows: impl IntoIterator<Item = &'a Row>,
        grouping: &GroupingSpec,
    ) -> Result<Self, DataError> {
        let dataset = Dataset::from_rows(specs, rows)?;
        Self::build(Arc::new(dataset), grouping)
    }

    fn derive(
        dataset: Arc<Dataset>,
        grouping: GroupingSpec,
        source: Source,
        predicates: Vec<Predicate>,
    ) -> Result<Self, DataError> {
        if let Some(name) = grouping.repeated_dimension() {
            return Err(DataError::MalformedGrouping {
                text: grouping.to_string(),
                reason: alloc::format!("dimension `{name}` appears more than once"),
            });
        }
        let mut levels = Vec::with_capacity(grouping.depth());
        for level in grouping.levels() {
            let mut dims = SmallVec::new();
            for d in &level.dimensions {
                dims.push((dataset.dimension_id(&d.name)?, d.descending));
            }
            levels.push(dims);
        }

        let compiled = predicates
            .iter()
            .map(|p| p.compile(&dataset))
            .collect::<Result<Vec<_>, _>>()?;
        let candidates: Vec<DatumId> = match &source {
            Source::Dataset => dataset.datums().iter().map(|d| d.id()).collect(),
            Source::Linked { datums, .. } => datums.to_vec(),
        };
        let datums: Vec<DatumId> = candidates
            .into_iter()
            .filter(|d| compiled.iter().all(|p| p.eval(&dataset, *d)))
            .collect();

        let dim_count = dataset.dimensions().len();
        let mut builder = NodeBuilder {
            dataset: &dataset,
            levels: &levels,
            nodes: Vec::new(),
            dim_count,
        };
        builder.push(None, datums, 0, 0, SmallVec::new(), SmallVec::new());
        builder.split(NodeId::ROOT);
        let nodes = builder.nodes;

        debug!(
            nodes = nodes.len(),
            datums = nodes[0].datums.len(),
            grouping = %grouping,
            filters = predicates.len(),
            "built cube"
        );

        Ok(Self {
            inner: Arc::new(CubeInner {
                declared_cache: empty_cache(dim_count),
                dataset,
                grouping,
                levels,
                source,
                predicates,
                nodes,
            }),
        })
    }

    /// Returns a view restricted to datums satisfying `predicate`.
    ///
    /// The view shares this cube's dataset, source and grouping. Filtering again with a
    /// predicate the view already applies returns an identical partition.
    pub fn filter(&self, predicate: Predicate) -> Result<Self, DataError> {
        let mut predicates = self.inner.predicates.clone();
        if !predicates.contains(&predicate) {
            predicates.push(predicate);
        }
        Self::derive(
            self.inner.dataset.clone(),
            self.inner.grouping.clone(),
            self.inner.source.clone(),
            predicates,
        )
    }

    /// Filters starting at `node`.
    ///
    /// Only the root can be filtered directly; a non-root node must first be promoted with
    /// [`Cube::link`], which makes it the explicit link parent of a new view.
    pub fn filter_node(&self, node: NodeId, predicate: Predicate) -> Result<Self, DataError> {
        if node != NodeId::ROOT {
            return Err(DataError::InvalidArgument(
                "cannot filter a non-root node without a link parent",
            ));
        }
        self.filter(predicate)
    }

    /// Returns a view whose source is the datums of `node`, regrouped by this cube's grouping.
    pub fn link(&self, node: NodeId) -> Result<Self, DataError> {
        let n = self.try_node(node)?;
        if n.datums.is_empty() {
            warn!(node = node.0, "linking an empty node");
        }
        Self::derive(
            self.inner.dataset.clone(),
            self.inner.grouping.clone(),
            Source::Linked {
                parent_key: n.key.clone(),
                datums: n.datums.as_slice().into(),
            },
            self.inner.predicates.clone(),
        )
    }

    /// Returns the key of the link parent, for linked views.
    pub fn link_parent(&self) -> Option<&NodeKey> {
        match &self.inner.source {
            Source::Dataset => None,
            Source::Linked { parent_key, .. } => Some(parent_key),
        }
    }

    /// Returns the predicates applied by this view.
    pub fn predicates(&self) -> &[Predicate] {
        &self.inner.predicates
    }

    /// Returns the shared dataset.
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.inner.dataset
    }

    /// Returns the grouping.
    pub fn grouping(&self) -> &GroupingSpec {
        &self.inner.grouping
    }

    /// Returns the resolved dimensions of a grouping level (0-based), with descending flags.
    pub fn level_dimensions(&self, level: usize) -> &[(DimensionId, bool)] {
        self.inner.levels.get(level).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Returns the root node id.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Returns a node.
    ///
    /// Panics if the id does not come from this cube.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.inner.nodes[id.index()]
    }

    fn try_node(&self, id: NodeId) -> Result<&Node, DataError> {
        self.inner
            .nodes
            .get(id.index())
            .ok_or(DataError::InvalidArgument("node does not belong to this cube"))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.nodes.len()
    }

    /// Iterates over leaf nodes in depth-first, materialized order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(NodeId::ROOT)
            .filter(|id| self.node(*id).is_leaf())
    }

    /// Iterates over `node` and its descendants in depth-first pre-order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = alloc::vec![node];
        core::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.node(id).children.iter().rev().copied());
            Some(id)
        })
    }

    /// Looks up a node by its key.
    pub fn find(&self, key: &[AtomId]) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        while self.node(current).key.len() < key.len() {
            current = *self
                .node(current)
                .children
                .iter()
                .find(|c| key.starts_with(&self.node(**c).key))?;
        }
        (self.node(current).key.as_slice() == key).then_some(current)
    }

    /// Returns the atom a node holds for a dimension, inherited from ancestors.
    ///
    /// Returns `None` if the dimension is undeclared or not grouped at or above `node`.
    pub fn atom(&self, node: NodeId, dimension: &str) -> Option<&Atom> {
        let dim = self.inner.dataset.dimension_id(dimension).ok()?;
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.node(id);
            if let Some((_, atom)) = n.atoms.iter().find(|(d, _)| *d == dim) {
                return Some(self.inner.dataset.dimension(dim).atom(*atom));
            }
            current = n.parent;
        }
        None
    }

    /// Returns the distinct atoms of a dimension, sorted by its comparer or natural order.
    ///
    /// Sorted lists are computed on first request and cached, per node for subtree queries.
    pub fn atoms(&self, dimension: &str, query: AtomQuery) -> Result<Vec<AtomId>, DataError> {
        let dim = self.inner.dataset.dimension_id(dimension)?;
        let sorted = match query.node {
            None => self.inner.declared_cache[dim.index()]
                .get_or_init(|| {
                    let d = self.inner.dataset.dimension(dim);
                    let mut ids: Vec<AtomId> = d.atoms().iter().map(|a| a.id).collect();
                    ids.sort_by(|a, b| d.compare_atoms(*a, *b));
                    ids.into()
                })
                .clone(),
            Some(node) => self.try_node(node)?.atom_cache[dim.index()]
                .get_or_init(|| self.sorted_subtree_atoms(node, dim))
                .clone(),
        };
        Ok(sorted
            .iter()
            .copied()
            .filter(|a| query.include_null || !a.is_null())
            .collect())
    }

    fn sorted_subtree_atoms(&self, node: NodeId, dim: DimensionId) -> Arc<[AtomId]> {
        let dataset = &self.inner.dataset;
        let d = dataset.dimension(dim);
        let mut seen = hashbrown::HashSet::new();
        let mut ids = Vec::new();
        for datum in &self.node(node).datums {
            let atom = dataset.datum(*datum).atom(dim);
            if seen.insert(atom) {
                ids.push(atom);
            }
        }
        ids.sort_by(|a, b| d.compare_atoms(*a, *b));
        ids.into()
    }
}

fn empty_cache(len: usize) -> Box<[OnceCell<Arc<[AtomId]>>]> {
    (0..len).map(|_| OnceCell::new()).collect()
}

struct NodeBuilder<'a> {
    dataset: &'a Dataset,
    levels: &'a [SmallVec<[(DimensionId, bool); 2]>],
    nodes: Vec<Node>,
    dim_count: usize,
}

impl NodeBuilder<'_> {
    fn push(
        &mut self,
        parent: Option<NodeId>,
        datums: Vec<DatumId>,
        depth: usize,
        index: usize,
        atoms: SmallVec<[(DimensionId, AtomId); 2]>,
        key: NodeKey,
    ) -> NodeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node counts are bounded by datum counts"
        )]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            parent,
            children: Vec::new(),
            datums,
            depth,
            index,
            atoms,
            key,
            atom_cache: empty_cache(self.dim_count),
        });
        id
    }

    fn split(&mut self, id: NodeId) {
        let depth = self.nodes[id.index()].depth;
        let levels = self.levels;
        let Some(level) = levels.get(depth) else {
            return;
        };

        // Group in first-occurrence order.
        let mut groups: Vec<(SmallVec<[AtomId; 2]>, Vec<DatumId>)> = Vec::new();
        let mut index: HashMap<SmallVec<[AtomId; 2]>, usize> = HashMap::new();
        for datum in &self.nodes[id.index()].datums {
            let d = self.dataset.datum(*datum);
            let key: SmallVec<[AtomId; 2]> = level.iter().map(|(dim, _)| d.atom(*dim)).collect();
            match index.get(&key) {
                Some(i) => groups[*i].1.push(*datum),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, alloc::vec![*datum]));
                }
            }
        }

        if level
            .iter()
            .any(|(dim, desc)| *desc || self.dataset.dimension(*dim).spec().comparer.is_some())
        {
            // Stable: ties keep first-occurrence order.
            groups.sort_by(|(a, _), (b, _)| self.compare_keys(level, a, b));
        }

        let parent_key = self.nodes[id.index()].key.clone();
        let mut children = Vec::with_capacity(groups.len());
        for (i, (atoms, datums)) in groups.into_iter().enumerate() {
            let mut key = parent_key.clone();
            key.extend(atoms.iter().copied());
            let level_atoms = level
                .iter()
                .zip(atoms.iter())
                .map(|((dim, _), atom)| (*dim, *atom))
                .collect();
            children.push(self.push(Some(id), datums, depth + 1, i, level_atoms, key));
        }
        self.nodes[id.index()].children.clone_from(&children);
        for child in children {
            self.split(child);
        }
    }

    fn compare_keys(
        &self,
        level: &[(DimensionId, bool)],
        a: &[AtomId],
        b: &[AtomId],
    ) -> Ordering {
        for (((dim, desc), a), b) in level.iter().zip(a).zip(b) {
            let d = self.dataset.dimension(*dim);
            let ord = match (&d.spec().comparer, *desc) {
                (Some(_), _) | (None, true) => d.compare_atoms(*a, *b),
                (None, false) => Ordering::Equal,
            };
            let ord = if *desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::dimension::Comparer;
    use crate::predicate::CompareOp;
    use crate::value::Value;

    fn rows() -> Vec<Row> {
        vec![
            Row::new().with("region", "S").with("year", 2021.0).with("sales", 5.0),
            Row::new().with("region", "N").with("year", 2020.0).with("sales", 10.0),
            Row::new().with("region", "S").with("year", 2020.0).with("sales", 20.0),
            Row::new().with("region", "N").with("year", 2021.0).with("sales", 7.0),
            Row::new().with("year", 2022.0).with("sales", 1.0),
        ]
    }

    fn specs() -> Vec<DimensionSpec> {
        vec![
            DimensionSpec::text("region"),
            DimensionSpec::number("year").with_discrete(true),
            DimensionSpec::number("sales"),
        ]
    }

    fn labels(cube: &Cube, ids: &[NodeId], dim: &str) -> Vec<std::string::String> {
        ids.iter()
            .map(|id| {
                cube.atom(*id, dim)
                    .map(|a| std::string::ToString::to_string(&*a.label))
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn groups_follow_first_occurrence_without_a_comparer() {
        let cube = Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["region"])).unwrap();
        let root = cube.node(cube.root());
        assert_eq!(labels(&cube, root.children(), "region"), ["S", "N", ""]);
        assert_eq!(cube.node(root.children()[0]).datums(), &[DatumId(0), DatumId(2)]);
    }

    #[test]
    fn comparer_sorts_groups() {
        let specs = vec![
            DimensionSpec::text("region").with_comparer(Comparer::Ascending),
            DimensionSpec::number("year"),
            DimensionSpec::number("sales"),
        ];
        let cube = Cube::from_rows(specs, &rows(), &GroupingSpec::path(["region"])).unwrap();
        let root = cube.node(cube.root());
        // Null sorts first under the natural comparer.
        assert_eq!(labels(&cube, root.children(), "region"), ["", "N", "S"]);
    }

    #[test]
    fn descending_flag_orders_without_a_comparer() {
        let grouping = GroupingSpec::parse("year desc").unwrap();
        let cube = Cube::from_rows(specs(), &rows(), &grouping).unwrap();
        let root = cube.node(cube.root());
        assert_eq!(labels(&cube, root.children(), "year"), ["2022", "2021", "2020"]);
    }

    #[test]
    fn multi_level_grouping_partitions_and_inherits_atoms() {
        let cube =
            Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["region", "year"])).unwrap();
        let leaves: Vec<NodeId> = cube.leaves().collect();
        assert_eq!(leaves.len(), 5);
        let mut all: Vec<DatumId> = leaves
            .iter()
            .flat_map(|l| cube.node(*l).datums().iter().copied())
            .collect();
        all.sort();
        assert_eq!(all, (0..5).map(DatumId).collect::<Vec<_>>());
        let first = leaves[0];
        assert_eq!(cube.atom(first, "region").unwrap().value, Value::from("S"));
        assert_eq!(cube.atom(first, "year").unwrap().value, Value::from(2021.0));
        assert!(cube.atom(first, "sales").is_none());
        assert_eq!(cube.find(cube.node(first).key()), Some(first));
    }

    #[test]
    fn composite_levels_group_by_atom_tuples() {
        let grouping = GroupingSpec::parse("region|year").unwrap();
        let cube = Cube::from_rows(specs(), &rows(), &grouping).unwrap();
        let root = cube.node(cube.root());
        assert_eq!(root.children().len(), 5);
        assert_eq!(cube.node(root.children()[0]).level_atoms().len(), 2);
    }

    #[test]
    fn undeclared_and_repeated_dimensions_are_configuration_errors() {
        let err = Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["nope"])).unwrap_err();
        assert_eq!(err, DataError::UndeclaredDimension("nope".into()));
        let err =
            Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["year", "year"])).unwrap_err();
        assert!(matches!(err, DataError::MalformedGrouping { .. }));
    }

    #[test]
    fn filter_restricts_and_is_idempotent() {
        let cube = Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["region"])).unwrap();
        let p = Predicate::eq("year", 2020.0);
        let once = cube.filter(p.clone()).unwrap();
        let twice = once.filter(p).unwrap();
        assert_eq!(once.node(NodeId::ROOT).datums(), &[DatumId(1), DatumId(2)]);
        assert_eq!(
            once.node(NodeId::ROOT).datums(),
            twice.node(NodeId::ROOT).datums()
        );
        assert_eq!(twice.predicates().len(), 1);
        assert_eq!(labels(&once, once.node(NodeId::ROOT).children(), "region"), ["N", "S"]);
    }

    #[test]
    fn filtering_a_non_root_node_needs_a_link_parent() {
        let cube = Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["region"])).unwrap();
        let south = cube.node(cube.root()).children()[0];
        let err = cube
            .filter_node(south, Predicate::eq("year", 2020.0))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument(_)));
        assert!(!err.is_configuration());

        let linked = cube.link(south).unwrap();
        assert_eq!(linked.link_parent(), Some(cube.node(south).key()));
        let filtered = linked
            .filter_node(linked.root(), Predicate::eq("year", 2020.0))
            .unwrap();
        assert_eq!(filtered.node(NodeId::ROOT).datums(), &[DatumId(2)]);
    }

    #[test]
    fn linking_then_filtering_matches_filtering_the_source() {
        let grouping = GroupingSpec::path(["region", "year"]);
        let cube = Cube::from_rows(specs(), &rows(), &grouping).unwrap();
        let p = Predicate::compare("sales", CompareOp::Ge, 7.0);
        let filtered = cube.filter(p.clone()).unwrap();
        let leaves = |c: &Cube| -> Vec<(NodeKey, Vec<DatumId>)> {
            c.leaves()
                .map(|l| (c.node(l).key().clone(), c.node(l).datums().to_vec()))
                .filter(|(_, datums)| !datums.is_empty())
                .collect()
        };
        for group in cube.node(cube.root()).children() {
            let key = cube.node(*group).key();
            let linked = cube.link(*group).unwrap().filter(p.clone()).unwrap();
            let expected: Vec<_> = leaves(&filtered)
                .into_iter()
                .filter(|(k, _)| k.starts_with(key))
                .collect();
            assert_eq!(leaves(&linked), expected);
            assert_eq!(linked.predicates(), filtered.predicates());
        }
        // South keeps only its 2020 row; the region-less row is filtered out entirely.
        let south = cube.node(cube.root()).children()[0];
        let linked = cube.link(south).unwrap().filter(p.clone()).unwrap();
        assert_eq!(linked.node(NodeId::ROOT).datums(), &[DatumId(2)]);
        let nulls = cube.node(cube.root()).children()[2];
        let linked = cube.link(nulls).unwrap().filter(p).unwrap();
        assert!(linked.node(NodeId::ROOT).datums().is_empty());
    }

    #[test]
    fn atom_queries_sort_and_cache() {
        let cube = Cube::from_rows(specs(), &rows(), &GroupingSpec::path(["region"])).unwrap();
        let dataset = cube.dataset().clone();
        let year = dataset.dimension_by_name("year").unwrap();
        let declared = cube.atoms("year", AtomQuery::declared()).unwrap();
        let values: Vec<&Value> = declared.iter().map(|a| &year.atom(*a).value).collect();
        assert_eq!(values, [&Value::from(2020.0), &Value::from(2021.0), &Value::from(2022.0)]);

        let north = cube.node(cube.root()).children()[1];
        let within = cube.atoms("year", AtomQuery::within(north)).unwrap();
        assert_eq!(within.len(), 2);
        assert_eq!(cube.atoms("year", AtomQuery::within(north)).unwrap(), within);

        let regions = cube.atoms("region", AtomQuery::declared().with_null()).unwrap();
        assert_eq!(regions[0], AtomId::NULL);
        assert!(cube.atoms("nope", AtomQuery::declared()).is_err());
    }
}
