// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping specifications.
//!
//! A grouping is an ordered list of levels; each level groups by one or more dimensions.
//! The text form separates levels with `,` and the dimensions of one level with `|`, each
//! optionally followed by `asc` or `desc`:
//!
//! ```text
//! series, category|year desc
//! ```

extern crate alloc;

use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use smallvec::SmallVec;

use crate::error::DataError;

/// One dimension reference inside a grouping level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupingDimension {
    /// The dimension name.
    pub name: Arc<str>,
    /// Whether groups are ordered in reverse.
    pub descending: bool,
}

impl GroupingDimension {
    /// An ascending reference to `name`.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            descending: false,
        }
    }

    /// Marks the reference as descending.
    pub fn desc(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// One grouping level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupingLevel {
    /// Dimensions grouped together at this level.
    pub dimensions: SmallVec<[GroupingDimension; 2]>,
}

impl GroupingLevel {
    /// A single-dimension level.
    pub fn single(dimension: GroupingDimension) -> Self {
        let mut dimensions = SmallVec::new();
        dimensions.push(dimension);
        Self { dimensions }
    }

    /// Returns `true` if the level groups by more than one dimension.
    pub fn is_composite(&self) -> bool {
        self.dimensions.len() > 1
    }
}

/// An ordered list of grouping levels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GroupingSpec {
    levels: Vec<GroupingLevel>,
}

impl GroupingSpec {
    /// The empty grouping: a single root group.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One single-dimension level per name.
    pub fn path<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self {
            levels: names
                .into_iter()
                .map(|n| GroupingLevel::single(GroupingDimension::new(n)))
                .collect(),
        }
    }

    /// Builds a grouping from explicit levels.
    pub fn from_levels(levels: impl IntoIterator<Item = GroupingLevel>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    /// Parses the text form.
    pub fn parse(text: &str) -> Result<Self, DataError> {
        let malformed = |reason: &str| DataError::MalformedGrouping {
            text: text.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }
        let mut levels = Vec::new();
        for level_text in trimmed.split(',') {
            let mut level = GroupingLevel::default();
            for dim_text in level_text.split('|') {
                let mut words = dim_text.split_whitespace();
                let Some(name) = words.next() else {
                    return Err(malformed("empty dimension reference"));
                };
                let descending = match words.next() {
                    None => false,
                    Some(w) if w.eq_ignore_ascii_case("asc") => false,
                    Some(w) if w.eq_ignore_ascii_case("desc") => true,
                    Some(_) => return Err(malformed("expected `asc` or `desc` after a name")),
                };
                if words.next().is_some() {
                    return Err(malformed("unexpected text after sort direction"));
                }
                level.dimensions.push(GroupingDimension {
                    name: name.into(),
                    descending,
                });
            }
            levels.push(level);
        }
        Ok(Self { levels })
    }

    /// Returns `true` if there are no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the levels.
    pub fn levels(&self) -> &[GroupingLevel] {
        &self.levels
    }

    /// Returns the number of levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Iterates over every dimension reference, level by level.
    pub fn dimensions(&self) -> impl Iterator<Item = &GroupingDimension> {
        self.levels.iter().flat_map(|l| l.dimensions.iter())
    }

    /// Returns `true` if any level is composite.
    pub fn has_composite_level(&self) -> bool {
        self.levels.iter().any(GroupingLevel::is_composite)
    }

    /// Returns the first dimension name referenced more than once, if any.
    pub fn repeated_dimension(&self) -> Option<&str> {
        let names: Vec<&str> = self.dimensions().map(|d| &*d.name).collect();
        names
            .iter()
            .enumerate()
            .find(|&(i, n)| names[..i].contains(n))
            .map(|(_, n)| *n)
    }

    /// Appends the levels of `other`, skipping dimensions this grouping already contains.
    ///
    /// Levels left empty by the skip are dropped.
    pub fn extend_distinct(&mut self, other: &Self) {
        for level in &other.levels {
            let mut kept = GroupingLevel::default();
            for dim in &level.dimensions {
                if !self.dimensions().any(|d| d.name == dim.name)
                    && !kept.dimensions.iter().any(|d| d.name == dim.name)
                {
                    kept.dimensions.push(dim.clone());
                }
            }
            if !kept.dimensions.is_empty() {
                self.levels.push(kept);
            }
        }
    }
}

impl FromStr for GroupingSpec {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GroupingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, level) in self.levels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, dim) in level.dimensions.iter().enumerate() {
                if j > 0 {
                    f.write_str("|")?;
                }
                f.write_str(&dim.name)?;
                if dim.descending {
                    f.write_str(" desc")?;
                }
            }
        }
        Ok(())
    }
}
