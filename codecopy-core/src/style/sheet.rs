//! A stylesheet cascade standing in for browser computed styles.
//!
//! Stylesheets are parsed with `cssparser` and matched with `selectors`.
//! Declarations compete the way they do in an author stylesheet: importance
//! first, then inline `style` over rules, then selector specificity, then
//! source order. Unset properties inherit from the parent element and the
//! document root falls back to initial values.

use super::css::{parse_style_rules, Declaration};
use super::selector::SelectorGroup;
use super::{StyleProperty, StyleResolver};
use crate::dom::{inline_declarations, is_element, parent_element};
use markup5ever_rcdom::Handle;
use std::collections::BTreeMap;

/// Rank of a competing declaration, highest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Precedence {
    important: bool,
    inline: bool,
    specificity: u32,
    rule: usize,
    position: usize,
}

#[derive(Debug, Clone)]
struct Rule {
    selectors: SelectorGroup,
    declarations: Vec<Declaration>,
}

/// Parsed style rules in source order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse CSS text. At-rules are skipped, as are rules none of whose
    /// selectors this cascade can match.
    pub fn parse(css: &str) -> Self {
        let mut sheet = Stylesheet::default();
        sheet.add_css(css);
        sheet
    }

    /// Append the rules of `css` after the existing ones.
    pub fn add_css(&mut self, css: &str) {
        self.rules
            .extend(parse_style_rules(css).into_iter().map(|rule| Rule {
                selectors: rule.selectors,
                declarations: rule.declarations,
            }));
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Winning declared value for `property` on `element`, ignoring inline
    /// styles and inheritance.
    pub fn cascaded_value(&self, element: &Handle, property: &str) -> Option<String> {
        self.winning_declaration(element, property)
            .map(|(_, value)| value.to_string())
    }

    fn winning_declaration(&self, element: &Handle, property: &str) -> Option<(Precedence, &str)> {
        self.rules
            .iter()
            .enumerate()
            .filter_map(|(rule, entry)| {
                let specificity = entry.selectors.specificity_for(element)?;
                Some((rule, specificity, entry))
            })
            .flat_map(|(rule, specificity, entry)| {
                entry
                    .declarations
                    .iter()
                    .enumerate()
                    .filter(move |(_, declaration)| declaration.name == property)
                    .map(move |(position, declaration)| {
                        let precedence = Precedence {
                            important: declaration.important,
                            inline: false,
                            specificity,
                            rule,
                            position,
                        };
                        (precedence, declaration.value.as_str())
                    })
            })
            .max_by_key(|(precedence, _)| *precedence)
    }
}

/// [`StyleResolver`] evaluating a [`Stylesheet`] against the tree.
#[derive(Debug, Clone)]
pub struct SheetStyleResolver {
    sheet: Stylesheet,
    initial: BTreeMap<StyleProperty, String>,
}

impl SheetStyleResolver {
    pub fn new(sheet: Stylesheet) -> Self {
        let initial = [
            (StyleProperty::Color, "rgb(0, 0, 0)"),
            (StyleProperty::FontFamily, "monospace"),
            (StyleProperty::FontSize, "13px"),
            (StyleProperty::FontStyle, "normal"),
            (StyleProperty::FontVariant, "normal"),
            (StyleProperty::FontWeight, "400"),
        ]
        .into_iter()
        .map(|(p, v)| (p, v.to_string()))
        .collect();
        SheetStyleResolver { sheet, initial }
    }

    pub fn from_css(css: &str) -> Self {
        Self::new(Stylesheet::parse(css))
    }

    /// Override the value used when nothing in the tree sets `property`.
    pub fn with_initial(mut self, property: StyleProperty, value: &str) -> Self {
        self.initial.insert(property, normalize_value(property, value));
        self
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.sheet
    }
}

impl Default for SheetStyleResolver {
    fn default() -> Self {
        Self::new(Stylesheet::default())
    }
}

impl SheetStyleResolver {
    /// The cascade winner for `property` among the element's inline
    /// declarations and the stylesheet rules matching it.
    fn specified_value(&self, element: &Handle, property: StyleProperty) -> Option<String> {
        let inline = inline_declarations(element)
            .into_iter()
            .enumerate()
            .filter(|(_, declaration)| declaration.name == property.name())
            .map(|(position, declaration)| {
                let precedence = Precedence {
                    important: declaration.important,
                    inline: true,
                    specificity: 0,
                    rule: 0,
                    position,
                };
                (precedence, declaration.value)
            })
            .max_by_key(|(precedence, _)| *precedence);
        let sheet = self
            .sheet
            .winning_declaration(element, property.name())
            .map(|(precedence, value)| (precedence, value.to_string()));

        [inline, sheet]
            .into_iter()
            .flatten()
            .max_by_key(|(precedence, _)| *precedence)
            .map(|(_, value)| value)
    }
}

impl StyleResolver for SheetStyleResolver {
    fn computed_value(&self, element: &Handle, property: StyleProperty) -> Option<String> {
        if !is_element(element) {
            return None;
        }
        let specified = self.specified_value(element, property);
        match specified.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("initial") => self.initial.get(&property).cloned(),
            // Every relevant property inherits, so `unset` behaves like `inherit`.
            Some(v) if !v.eq_ignore_ascii_case("inherit") && !v.eq_ignore_ascii_case("unset") => {
                Some(normalize_value(property, v))
            }
            _ => match parent_element(element) {
                Some(parent) => self.computed_value(&parent, property),
                None => self.initial.get(&property).cloned(),
            },
        }
    }
}

/// Normalize a specified value into the form a browser reports as computed.
pub fn normalize_value(property: StyleProperty, value: &str) -> String {
    let value = value.trim();
    match property {
        StyleProperty::Color => normalize_color(value).unwrap_or_else(|| value.to_ascii_lowercase()),
        StyleProperty::FontWeight => match value.to_ascii_lowercase().as_str() {
            "normal" => "400".to_string(),
            "bold" => "700".to_string(),
            other => other.to_string(),
        },
        StyleProperty::FontFamily => value.to_string(),
        _ => value.to_ascii_lowercase(),
    }
}

/// Convert hex, `rgb()`/`rgba()` and a few named colors into
/// `rgb(r, g, b)` or `rgba(r, g, b, a)`.
pub fn normalize_color(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let (r, g, b, a) = if let Some(hex) = lower.strip_prefix('#') {
        parse_hex(hex)?
    } else if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
    {
        parse_rgb_args(args.strip_suffix(')')?)?
    } else {
        named_color(&lower)?
    };
    Some(format_rgb(r, g, b, a))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8, f64)> {
    let digits: Vec<u8> = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    let channel = |hi: u8, lo: u8| hi * 16 + lo;
    match digits.as_slice() {
        [r, g, b] => Some((r * 17, g * 17, b * 17, 1.0)),
        [r, g, b, a] => Some((r * 17, g * 17, b * 17, f64::from(a * 17) / 255.0)),
        [r1, r2, g1, g2, b1, b2] => {
            Some((channel(*r1, *r2), channel(*g1, *g2), channel(*b1, *b2), 1.0))
        }
        [r1, r2, g1, g2, b1, b2, a1, a2] => Some((
            channel(*r1, *r2),
            channel(*g1, *g2),
            channel(*b1, *b2),
            f64::from(channel(*a1, *a2)) / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<(u8, u8, u8, f64)> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let channel = |raw: &str| -> Option<u8> {
        let v: f64 = raw.parse().ok()?;
        Some(v.round().clamp(0.0, 255.0) as u8)
    };
    match parts.as_slice() {
        [r, g, b] => Some((channel(r)?, channel(g)?, channel(b)?, 1.0)),
        [r, g, b, a] => {
            let alpha = match a.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => a.parse::<f64>().ok()?,
            };
            Some((channel(r)?, channel(g)?, channel(b)?, alpha.clamp(0.0, 1.0)))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<(u8, u8, u8, f64)> {
    let rgb = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "maroon" => (128, 0, 0),
        "purple" => (128, 0, 128),
        "navy" => (0, 0, 128),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "orange" => (255, 165, 0),
        "yellow" => (255, 255, 0),
        "transparent" => return Some((0, 0, 0, 0.0)),
        _ => return None,
    };
    Some((rgb.0, rgb.1, rgb.2, 1.0))
}

fn format_rgb(r: u8, g: u8, b: u8, alpha: f64) -> String {
    if alpha >= 1.0 {
        format!("rgb({r}, {g}, {b})")
    } else {
        let alpha = (alpha * 100.0).round() / 100.0;
        format!("rgba({r}, {g}, {b}, {alpha})")
    }
}
