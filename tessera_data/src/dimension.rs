// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dimension declarations and per-dimension atom interning.
//!
//! Every distinct raw value of a dimension is interned exactly once into an [`Atom`], addressed
//! by a stable [`AtomId`]. Handle `0` is always the dimension's null atom.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;

use crate::value::{Value, ValueKey};

/// Index of a dimension inside a [`crate::Dataset`] schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub u32);

impl DimensionId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable handle of an interned atom within one dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub u32);

impl AtomId {
    /// The null atom every dimension owns.
    pub const NULL: Self = Self(0);

    /// Returns `true` for the null atom.
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of values a dimension holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Free text, discrete by default.
    Text,
    /// Numbers, continuous by default.
    Number,
    /// Booleans, discrete by default.
    Bool,
    /// Time as numeric seconds, continuous by default.
    Time,
}

impl ValueKind {
    /// Returns `true` if values of this kind are numeric.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Time)
    }
}

/// Ordering applied to a dimension's atoms.
#[derive(Clone)]
pub enum Comparer {
    /// Natural value order, nulls first.
    Ascending,
    /// Reverse natural value order, nulls last.
    Descending,
    /// A caller-provided total order over raw values.
    Custom(Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>),
}

impl Comparer {
    /// Wraps a comparison function.
    pub fn custom(f: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Compares two raw values.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            Self::Ascending => a.total_cmp(b),
            Self::Descending => b.total_cmp(a),
            Self::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for Comparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => f.write_str("Ascending"),
            Self::Descending => f.write_str("Descending"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Formats a raw value into an atom label.
pub type Formatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Declaration of one dataset dimension.
#[derive(Clone)]
pub struct DimensionSpec {
    /// Dimension name, as used by rows, grouping specs and roles.
    pub name: Arc<str>,
    /// Value kind.
    pub kind: ValueKind,
    /// Whether values are treated as discrete categories.
    pub discrete: bool,
    /// Optional comparer. When set, groups at a level using this dimension are sorted.
    pub comparer: Option<Comparer>,
    /// Optional label formatter. Defaults to the value's `Display`.
    pub formatter: Option<Formatter>,
}

impl DimensionSpec {
    /// Declares a dimension of the given kind.
    pub fn new(name: impl Into<Arc<str>>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            discrete: !kind.is_numeric(),
            comparer: None,
            formatter: None,
        }
    }

    /// Declares a discrete text dimension.
    pub fn text(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, ValueKind::Text)
    }

    /// Declares a continuous number dimension.
    pub fn number(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, ValueKind::Number)
    }

    /// Overrides discreteness.
    pub fn with_discrete(mut self, discrete: bool) -> Self {
        self.discrete = discrete;
        self
    }

    /// Sets the comparer.
    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = Some(comparer);
        self
    }

    /// Sets the label formatter.
    pub fn with_formatter(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    fn label(&self, value: &Value) -> Arc<str> {
        match &self.formatter {
            Some(f) => f(value).into(),
            None => value.to_string().into(),
        }
    }
}

impl fmt::Debug for DimensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("discrete", &self.discrete)
            .field("comparer", &self.comparer)
            .field("formatter", &self.formatter.as_ref().map(|_| ".."))
            .finish()
    }
}

/// An interned `(value, label)` pair scoped to one dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Atom {
    /// The atom handle.
    pub id: AtomId,
    /// The owning dimension.
    pub dimension: DimensionId,
    /// The raw value.
    pub value: Value,
    /// The formatted label.
    pub label: Arc<str>,
}

/// A declared dimension together with its intern table.
#[derive(Debug)]
pub struct Dimension {
    id: DimensionId,
    spec: DimensionSpec,
    atoms: Vec<Atom>,
    lookup: HashMap<ValueKey, AtomId>,
}

impl Dimension {
    pub(crate) fn new(id: DimensionId, spec: DimensionSpec) -> Self {
        let null = Atom {
            id: AtomId::NULL,
            dimension: id,
            value: Value::Null,
            label: spec.label(&Value::Null),
        };
        let mut lookup = HashMap::new();
        lookup.insert(ValueKey::Null, AtomId::NULL);
        Self {
            id,
            spec,
            atoms: alloc::vec![null],
            lookup,
        }
    }

    /// Returns the dimension id.
    pub fn id(&self) -> DimensionId {
        self.id
    }

    /// Returns the dimension name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Returns the declaration.
    pub fn spec(&self) -> &DimensionSpec {
        &self.spec
    }

    /// Returns the atom for a handle.
    ///
    /// Handles from another dimension resolve to the null atom.
    pub fn atom(&self, id: AtomId) -> &Atom {
        self.atoms.get(id.index()).unwrap_or(&self.atoms[0])
    }

    /// Returns all atoms in intern (first occurrence) order, null first.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Looks up the atom of a raw value without interning it.
    pub fn lookup(&self, value: &Value) -> Option<AtomId> {
        self.lookup.get(&value.key()).copied()
    }

    /// Interns a raw value, returning the existing handle for equal values.
    pub(crate) fn intern(&mut self, value: Value) -> AtomId {
        let key = value.key();
        if let Some(id) = self.lookup.get(&key) {
            return *id;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "atom tables are bounded by row counts well below u32::MAX"
        )]
        let id = AtomId(self.atoms.len() as u32);
        let label = self.spec.label(&value);
        self.atoms.push(Atom {
            id,
            dimension: self.id,
            value,
            label,
        });
        self.lookup.insert(key, id);
        id
    }

    /// Compares two atoms using the declared comparer, or natural order (null first).
    pub fn compare_atoms(&self, a: AtomId, b: AtomId) -> Ordering {
        let (a, b) = (&self.atom(a).value, &self.atom(b).value);
        match &self.spec.comparer {
            Some(comparer) => comparer.compare(a, b),
            None => a.total_cmp(b),
        }
    }
}
