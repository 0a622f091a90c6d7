//! Minimal inline style hoisting.
//!
//! Clipboard consumers do not load stylesheets, so the visual properties that
//! matter for code have to be written inline. Only a small set of font and
//! color properties is considered, and values equal to a property's default
//! are never written.
//!
//! The root container's styles are captured into a [`RootStyleSnapshot`]
//! value owned by the caller. Elements synthesized during line reconstruction
//! have no original counterpart and receive the snapshot instead.

pub mod css;
pub mod selector;
pub mod sheet;

pub use css::Declaration;
pub use selector::SelectorGroup;
pub use sheet::{SheetStyleResolver, Stylesheet};

use crate::dom::set_style_property;
use markup5ever_rcdom::Handle;
use std::collections::BTreeMap;
use std::fmt;

/// A CSS property worth inlining on copied markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleProperty {
    Color,
    FontFamily,
    FontSize,
    FontStyle,
    FontVariant,
    FontWeight,
}

impl StyleProperty {
    /// Every relevant property, in the order they are written.
    pub const ALL: [StyleProperty; 6] = [
        StyleProperty::Color,
        StyleProperty::FontFamily,
        StyleProperty::FontSize,
        StyleProperty::FontStyle,
        StyleProperty::FontVariant,
        StyleProperty::FontWeight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::FontFamily => "font-family",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::FontVariant => "font-variant",
            StyleProperty::FontWeight => "font-weight",
        }
    }

    /// Value that never needs to be written inline. `None` means every
    /// present value is written.
    pub fn default_value(self) -> Option<&'static str> {
        match self {
            StyleProperty::Color => Some("rgb(0, 0, 0)"),
            StyleProperty::FontFamily | StyleProperty::FontSize => None,
            StyleProperty::FontStyle | StyleProperty::FontVariant => Some("normal"),
            StyleProperty::FontWeight => Some("400"),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        StyleProperty::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether `value` has to be written inline for this property.
    pub fn is_significant(self, value: &str) -> bool {
        !value.is_empty() && self.default_value() != Some(value)
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computed-style capability.
///
/// Implementations report the value an element would have after the
/// cascade and inheritance, normalized the way a browser reports it.
pub trait StyleResolver {
    fn computed_value(&self, element: &Handle, property: StyleProperty) -> Option<String>;
}

impl<R: StyleResolver + ?Sized> StyleResolver for &R {
    fn computed_value(&self, element: &Handle, property: StyleProperty) -> Option<String> {
        (**self).computed_value(element, property)
    }
}

/// Styles of the copied container, captured once per copy operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootStyleSnapshot {
    properties: BTreeMap<StyleProperty, String>,
}

impl RootStyleSnapshot {
    /// Capture the significant styles of `element`. Each call produces a fresh
    /// snapshot, nothing carries over from earlier captures.
    pub fn capture<R: StyleResolver + ?Sized>(resolver: &R, element: &Handle) -> Self {
        let properties = StyleProperty::ALL
            .into_iter()
            .filter_map(|property| {
                let value = resolver.computed_value(element, property)?;
                property
                    .is_significant(&value)
                    .then_some((property, value))
            })
            .collect();
        RootStyleSnapshot { properties }
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.properties.get(&property).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleProperty, &str)> {
        self.properties.iter().map(|(p, v)| (*p, v.as_str()))
    }

    /// Write the captured styles inline on a synthesized element.
    pub fn apply_to(&self, element: &Handle) {
        for (property, value) in self.iter() {
            if property.is_significant(value) {
                set_style_property(element, property.name(), value);
            }
        }
    }
}

/// Copy the significant computed styles of `original` inline onto `cloned`.
///
/// Existing inline styles on `cloned` are kept unless overwritten by one of
/// the relevant properties.
pub fn apply_element_styles<R: StyleResolver + ?Sized>(
    resolver: &R,
    original: &Handle,
    cloned: &Handle,
) {
    for property in StyleProperty::ALL {
        if let Some(value) = resolver.computed_value(original, property) {
            if property.is_significant(&value) {
                set_style_property(cloned, property.name(), &value);
            }
        }
    }
}
