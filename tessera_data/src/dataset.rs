// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows, datums and the shared dataset that owns them.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::dimension::{Atom, AtomId, Dimension, DimensionId, DimensionSpec};
use crate::error::DataError;
use crate::log::debug;
use crate::value::Value;

/// One input row: an ordered list of `(dimension name, raw value)` cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    cells: Vec<(Arc<str>, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell.
    pub fn with(mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Adds a cell. A later cell with the same name shadows an earlier one.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: impl Into<Value>) {
        self.cells.push((name.into(), value.into()));
    }

    /// Returns the value of a cell, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells
            .iter()
            .rev()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    /// Iterates over cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(n, v)| (&**n, v))
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Index of a datum in its [`Dataset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatumId(pub u32);

impl DatumId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One immutable source row, stored as one atom per declared dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Datum {
    id: DatumId,
    atoms: SmallVec<[AtomId; 8]>,
}

impl Datum {
    /// Returns the datum id (its original row position).
    pub fn id(&self) -> DatumId {
        self.id
    }

    /// Returns the atom this datum holds for a dimension.
    pub fn atom(&self, dimension: DimensionId) -> AtomId {
        self.atoms
            .get(dimension.index())
            .copied()
            .unwrap_or(AtomId::NULL)
    }
}

/// The shared owner of dimensions and datums.
///
/// Cubes and filtered views reference a dataset through an `Arc` and never copy datums.
#[derive(Debug)]
pub struct Dataset {
    dimensions: Vec<Dimension>,
    by_name: HashMap<Arc<str>, DimensionId>,
    datums: Vec<Datum>,
}

impl Dataset {
    /// Creates an empty dataset with the given dimension declarations.
    pub fn new(specs: impl IntoIterator<Item = DimensionSpec>) -> Result<Self, DataError> {
        let mut dimensions = Vec::new();
        let mut by_name = HashMap::new();
        for spec in specs {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "dimension counts are tiny"
            )]
            let id = DimensionId(dimensions.len() as u32);
            if by_name.insert(spec.name.clone(), id).is_some() {
                return Err(DataError::DuplicateDimension(spec.name));
            }
            dimensions.push(Dimension::new(id, spec));
        }
        Ok(Self {
            dimensions,
            by_name,
            datums: Vec::new(),
        })
    }

    /// Creates a dataset and loads every row.
    pub fn from_rows<'a>(
        specs: impl IntoIterator<Item = DimensionSpec>,
        rows: impl IntoIterator<Item = &'a Row>,
    ) -> Result<Self, DataError> {
        let mut dataset = Self::new(specs)?;
        for row in rows {
            dataset.push_row(row);
        }
        debug!(
            datums = dataset.datums.len(),
            dimensions = dataset.dimensions.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Appends a row, interning each declared cell. Undeclared cells are ignored.
    pub fn push_row(&mut self, row: &Row) -> DatumId {
        let mut atoms: SmallVec<[AtomId; 8]> =
            SmallVec::from_elem(AtomId::NULL, self.dimensions.len());
        for (name, value) in row.iter() {
            match self.by_name.get(name) {
                Some(id) => {
                    atoms[id.index()] = self.dimensions[id.index()].intern(value.clone());
                }
                None => debug!(cell = name, "ignoring undeclared cell"),
            }
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "datasets are bounded well below u32::MAX rows"
        )]
        let id = DatumId(self.datums.len() as u32);
        self.datums.push(Datum { id, atoms });
        id
    }

    /// Resolves a dimension name.
    pub fn dimension_id(&self, name: &str) -> Result<DimensionId, DataError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| DataError::UndeclaredDimension(name.into()))
    }

    /// Returns a dimension by id.
    ///
    /// Panics if the id does not come from this dataset.
    pub fn dimension(&self, id: DimensionId) -> &Dimension {
        &self.dimensions[id.index()]
    }

    /// Returns a dimension by name.
    pub fn dimension_by_name(&self, name: &str) -> Option<&Dimension> {
        self.by_name.get(name).map(|id| self.dimension(*id))
    }

    /// Returns all dimensions in declaration order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Returns the dimensions of a dimension group, in group order.
    ///
    /// The group `value` holds `value`, `value2`, `value3`, … and stops at the first gap.
    pub fn dimension_group(&self, prefix: &str) -> Vec<DimensionId> {
        let mut out = Vec::new();
        if let Some(id) = self.by_name.get(prefix) {
            out.push(*id);
        } else {
            return out;
        }
        for n in 2_u32.. {
            let name = alloc::format!("{prefix}{n}");
            match self.by_name.get(name.as_str()) {
                Some(id) => out.push(*id),
                None => break,
            }
        }
        out
    }

    /// Returns all datums in row order.
    pub fn datums(&self) -> &[Datum] {
        &self.datums
    }

    /// Returns a datum.
    ///
    /// Panics if the id does not come from this dataset.
    pub fn datum(&self, id: DatumId) -> &Datum {
        &self.datums[id.index()]
    }

    /// Returns the atom a datum holds for a dimension.
    pub fn atom_of(&self, datum: DatumId, dimension: DimensionId) -> &Atom {
        self.dimension(dimension)
            .atom(self.datum(datum).atom(dimension))
    }

    /// Returns the raw value a datum holds for a dimension.
    pub fn value_of(&self, datum: DatumId, dimension: DimensionId) -> &Value {
        &self.atom_of(datum, dimension).value
    }

    /// Returns a read-only view of one datum with name-based access.
    pub fn view(&self, datum: DatumId) -> DatumView<'_> {
        DatumView {
            dataset: self,
            datum,
        }
    }
}

/// A datum paired with its dataset, for name-based value access.
#[derive(Clone, Copy, Debug)]
pub struct DatumView<'a> {
    dataset: &'a Dataset,
    datum: DatumId,
}

impl<'a> DatumView<'a> {
    /// Returns the datum id.
    pub fn id(&self) -> DatumId {
        self.datum
    }

    /// Returns the atom for a dimension name, if declared.
    pub fn atom(&self, name: &str) -> Option<&'a Atom> {
        let dim = self.dataset.dimension_id(name).ok()?;
        Some(self.dataset.atom_of(self.datum, dim))
    }

    /// Returns the raw value for a dimension name, if declared.
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.atom(name).map(|a| &a.value)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn specs() -> Vec<DimensionSpec> {
        vec![
            DimensionSpec::text("region"),
            DimensionSpec::number("value"),
            DimensionSpec::number("value2"),
            DimensionSpec::number("value4"),
        ]
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let err = Dataset::new([DimensionSpec::text("a"), DimensionSpec::text("a")]).unwrap_err();
        assert_eq!(err, DataError::DuplicateDimension("a".into()));
        assert!(err.is_configuration());
    }

    #[test]
    fn undeclared_cells_are_ignored_and_missing_cells_are_null() {
        let rows = [Row::new().with("region", "N").with("other", 1.0)];
        let ds = Dataset::from_rows(specs(), &rows).unwrap();
        let region = ds.dimension_id("region").unwrap();
        let value = ds.dimension_id("value").unwrap();
        assert_eq!(ds.value_of(DatumId(0), region), &Value::from("N"));
        assert!(ds.value_of(DatumId(0), value).is_null());
        assert!(ds.dimension_id("other").is_err());
    }

    #[test]
    fn dimension_groups_stop_at_the_first_gap() {
        let ds = Dataset::new(specs()).unwrap();
        let group = ds.dimension_group("value");
        assert_eq!(group, vec![DimensionId(1), DimensionId(2)]);
        assert!(ds.dimension_group("series").is_empty());
    }

    #[test]
    fn datum_view_reads_by_name() {
        let rows = [Row::new().with("region", "S").with("value", 3.0)];
        let ds = Dataset::from_rows(specs(), &rows).unwrap();
        let view = ds.view(DatumId(0));
        assert_eq!(view.value("value"), Some(&Value::from(3.0)));
        assert_eq!(view.atom("region").map(|a| &*a.label), Some("S"));
        assert!(view.value("missing").is_none());
    }
}
