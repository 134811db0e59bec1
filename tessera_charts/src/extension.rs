// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extension points: a cascade of named, overridable properties.
//!
//! Every element advertises extension ids from most specific to most general, for example
//! `["title", "chartTitle"]`. Resolving a property walks those ids in order and returns the
//! first override found. When nothing matches, the caller falls back to the element's own
//! default.
//!
//! Overrides live in an immutable [`Extensions`] mapping keyed by `(id, Property)`. Function
//! overrides are invoked at each resolution with a [`RenderContext`], so they can vary per scene.
//! Nothing is memoized.

extern crate alloc;

use alloc::string::ToString;
use alloc::sync::Arc;
use core::fmt;

use hashbrown::HashMap;
use kurbo::{Insets, Rect};
use peniko::Color;

use crate::error::ExtensionError;
use crate::panel::{Align, Length};
use crate::scene::{SceneId, SceneTree, Var};

/// A property an extension point can override.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// The element's primary value (flat key: the id alone).
    Primary,
    /// Size along the panel's docking axis.
    Size,
    /// Width.
    Width,
    /// Height.
    Height,
    /// Minimum size along the docking axis.
    MinSize,
    /// Maximum size along the docking axis.
    MaxSize,
    /// Outer margins.
    Margins,
    /// Inner paddings.
    Paddings,
    /// Visibility.
    Visible,
    /// Cross-axis alignment.
    Align,
    /// Fill color.
    FillStyle,
    /// Stroke color.
    StrokeStyle,
    /// Stroke width.
    LineWidth,
    /// Font size.
    FontSize,
    /// Text content.
    Text,
    /// A property outside the known set. Only reachable through the structured API.
    Custom(Arc<str>),
}

impl Property {
    const NAMED: [(&'static str, Self); 14] = [
        ("size", Self::Size),
        ("width", Self::Width),
        ("height", Self::Height),
        ("minSize", Self::MinSize),
        ("maxSize", Self::MaxSize),
        ("margins", Self::Margins),
        ("paddings", Self::Paddings),
        ("visible", Self::Visible),
        ("align", Self::Align),
        ("fillStyle", Self::FillStyle),
        ("strokeStyle", Self::StrokeStyle),
        ("lineWidth", Self::LineWidth),
        ("fontSize", Self::FontSize),
        ("text", Self::Text),
    ];

    /// Parses a known property name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p.clone())
    }

    /// Returns the property name used in flat keys.
    pub fn name(&self) -> &str {
        match self {
            Self::Primary => "",
            Self::Custom(name) => name.as_ref(),
            known => Self::NAMED
                .iter()
                .find(|(_, p)| p == known)
                .map_or("", |(n, _)| *n),
        }
    }
}

/// A literal override value.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtensionValue {
    /// A plain number.
    Number(f64),
    /// An absolute or percentage length.
    Length(Length),
    /// Text.
    Text(Arc<str>),
    /// A flag.
    Bool(bool),
    /// A color.
    Color(Color),
    /// Per-side lengths.
    Insets(Insets),
    /// An alignment.
    Align(Align),
}

impl ExtensionValue {
    /// Numbers and lengths as lengths.
    pub fn as_length(&self) -> Option<Length> {
        match self {
            Self::Number(n) => Some(Length::Abs(*n)),
            Self::Length(l) => Some(*l),
            _ => None,
        }
    }

    /// Insets, or a number applied to every side.
    pub fn as_insets(&self) -> Option<Insets> {
        match self {
            Self::Number(n) => Some(Insets::uniform(*n)),
            Self::Insets(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the alignment.
    pub fn as_align(&self) -> Option<Align> {
        match self {
            Self::Align(a) => Some(*a),
            _ => None,
        }
    }

    /// Returns the color.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<f64> for ExtensionValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Length> for ExtensionValue {
    fn from(v: Length) -> Self {
        Self::Length(v)
    }
}

impl From<bool> for ExtensionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ExtensionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<Color> for ExtensionValue {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Insets> for ExtensionValue {
    fn from(v: Insets) -> Self {
        Self::Insets(v)
    }
}

impl From<Align> for ExtensionValue {
    fn from(v: Align) -> Self {
        Self::Align(v)
    }
}

/// What an override function can see.
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    /// Name of the panel being resolved, if any.
    pub panel: &'a str,
    /// The panel's rectangle from the latest layout pass.
    pub rect: Rect,
    /// The scene tree attached to the element.
    pub scenes: Option<&'a SceneTree>,
    /// The current scene within `scenes`.
    pub scene: SceneId,
}

impl<'a> RenderContext<'a> {
    /// A context for `panel` laid out at `rect`, with no scene.
    pub fn new(panel: &'a str, rect: Rect) -> Self {
        Self {
            panel,
            rect,
            scenes: None,
            scene: SceneId::ROOT,
        }
    }

    /// Points the context at a scene.
    pub fn with_scene(mut self, scenes: &'a SceneTree, scene: SceneId) -> Self {
        self.scenes = Some(scenes);
        self.scene = scene;
        self
    }

    /// Returns a var of the current scene, inherited from ancestors.
    pub fn var(&self, role: &str) -> Option<&'a Var> {
        self.scenes?.var(self.scene, role)
    }
}

/// A function override.
pub type OverrideFn = Arc<dyn Fn(&RenderContext<'_>) -> ExtensionValue + Send + Sync>;

/// One override: a literal, or a function evaluated per resolution.
#[derive(Clone)]
pub enum Override {
    /// A literal value.
    Value(ExtensionValue),
    /// Evaluated lazily with the current render context.
    Function(OverrideFn),
}

impl Override {
    /// Produces the value for `ctx`.
    pub fn evaluate(&self, ctx: &RenderContext<'_>) -> ExtensionValue {
        match self {
            Self::Value(v) => v.clone(),
            Self::Function(f) => f(ctx),
        }
    }
}

impl fmt::Debug for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// The immutable override mapping.
#[derive(Clone, Debug, Default)]
pub struct Extensions {
    map: HashMap<Arc<str>, HashMap<Property, Override>>,
}

impl Extensions {
    /// Starts a builder.
    pub fn builder() -> ExtensionsBuilder {
        ExtensionsBuilder::default()
    }

    /// Returns the number of overrides.
    pub fn len(&self) -> usize {
        self.map.values().map(HashMap::len).sum()
    }

    /// Returns `true` if there are no overrides.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the first override of `property` along `ids`, most specific first.
    pub fn lookup<S: AsRef<str>>(&self, ids: &[S], property: &Property) -> Option<&Override> {
        ids.iter()
            .find_map(|id| self.map.get(id.as_ref())?.get(property))
    }

    /// Resolves `property` along `ids`, evaluating function overrides with `ctx`.
    pub fn resolve<S: AsRef<str>>(
        &self,
        ids: &[S],
        property: &Property,
        ctx: &RenderContext<'_>,
    ) -> Option<ExtensionValue> {
        self.lookup(ids, property).map(|o| o.evaluate(ctx))
    }
}

/// Collects overrides, then freezes them into [`Extensions`].
#[derive(Clone, Debug, Default)]
pub struct ExtensionsBuilder {
    map: HashMap<Arc<str>, HashMap<Property, Override>>,
}

impl ExtensionsBuilder {
    /// Sets a literal override. A later override of the same key replaces the earlier one.
    pub fn set(
        self,
        id: impl Into<Arc<str>>,
        property: Property,
        value: impl Into<ExtensionValue>,
    ) -> Self {
        self.insert(id.into(), property, Override::Value(value.into()))
    }

    /// Sets a function override.
    pub fn set_fn(
        self,
        id: impl Into<Arc<str>>,
        property: Property,
        f: impl Fn(&RenderContext<'_>) -> ExtensionValue + Send + Sync + 'static,
    ) -> Self {
        self.insert(id.into(), property, Override::Function(Arc::new(f)))
    }

    /// Imports a legacy flat key of the form `id_property`, or `id` for the primary value.
    ///
    /// The key splits on its last `_`; the suffix must be a known property name.
    pub fn import(
        self,
        key: &str,
        value: impl Into<ExtensionValue>,
    ) -> Result<Self, ExtensionError> {
        let (id, property) = match key.rsplit_once('_') {
            None => (key, Property::Primary),
            Some((id, name)) => {
                let property =
                    Property::from_name(name).ok_or_else(|| ExtensionError::UnknownProperty {
                        key: key.to_string(),
                        property: name.to_string(),
                    })?;
                (id, property)
            }
        };
        if id.is_empty() {
            return Err(ExtensionError::EmptyId(key.to_string()));
        }
        Ok(self.set(id, property, value))
    }

    fn insert(mut self, id: Arc<str>, property: Property, value: Override) -> Self {
        self.map.entry(id).or_default().insert(property, value);
        self
    }

    /// Freezes the overrides.
    pub fn build(self) -> Extensions {
        Extensions { map: self.map }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use peniko::color::palette::css;
    use tessera_data::Value;

    use super::*;

    fn ctx() -> RenderContext<'static> {
        RenderContext::new("test", Rect::ZERO)
    }

    #[test]
    fn first_id_with_an_override_wins() {
        let ext = Extensions::builder()
            .set("b", Property::Size, 30.0)
            .set("c", Property::Size, 40.0)
            .build();
        assert_eq!(
            ext.resolve(&["a", "b", "c"], &Property::Size, &ctx()),
            Some(ExtensionValue::Number(30.0))
        );
        assert_eq!(ext.resolve(&["a"], &Property::Size, &ctx()), None);
        assert_eq!(ext.resolve(&["b"], &Property::Width, &ctx()), None);
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn flat_keys_split_on_the_last_underscore() {
        let ext = Extensions::builder()
            .import("xAxis_minSize", 20.0)
            .unwrap()
            .import("title", "Sales")
            .unwrap()
            .build();
        assert_eq!(
            ext.resolve(&["xAxis"], &Property::MinSize, &ctx())
                .and_then(|v| v.as_length()),
            Some(Length::Abs(20.0))
        );
        assert_eq!(
            ext.resolve(&["title"], &Property::Primary, &ctx())
                .as_ref()
                .and_then(ExtensionValue::as_str),
            Some("Sales")
        );
    }

    #[test]
    fn unknown_flat_properties_are_rejected() {
        let err = Extensions::builder().import("title_sise", 1.0).unwrap_err();
        assert_eq!(
            err,
            ExtensionError::UnknownProperty {
                key: "title_sise".into(),
                property: "sise".into(),
            }
        );
        assert!(matches!(
            Extensions::builder().import("_size", 1.0),
            Err(ExtensionError::EmptyId(_))
        ));
    }

    #[test]
    fn functions_run_per_scene() {
        let tree = SceneTree::from_vars(
            "series",
            [
                Var::new(Value::from("a"), "a"),
                Var::new(Value::from("b"), "b"),
            ],
        );
        let ext = Extensions::builder()
            .set_fn("bar", Property::FillStyle, |ctx| {
                match ctx.var("series").map(|v| v.label.as_ref()) {
                    Some("a") => css::RED.into(),
                    _ => css::BLUE.into(),
                }
            })
            .build();
        let children = tree.scene(SceneId::ROOT).children();
        let colors: std::vec::Vec<_> = children
            .iter()
            .map(|s| {
                let ctx = ctx().with_scene(&tree, *s);
                ext.resolve(&["bar"], &Property::FillStyle, &ctx)
                    .and_then(|v| v.as_color())
            })
            .collect();
        assert_eq!(colors, [Some(css::RED), Some(css::BLUE)]);
    }

    #[test]
    fn property_names_round_trip() {
        assert_eq!(Property::from_name("maxSize"), Some(Property::MaxSize));
        assert_eq!(Property::MaxSize.name(), "maxSize");
        assert_eq!(Property::Custom("glow".into()).name(), "glow");
        assert_eq!(Property::from_name("glow"), None);
    }
}
