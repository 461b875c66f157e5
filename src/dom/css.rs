//! Inline style application with vendor-prefix resolution.
//!
//! Style property names are handled in their scripting form (`transformOrigin`,
//! `WebkitTransform`) and converted to CSS names only when serialized.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::dom::DomNode;

const VENDOR_PREFIXES: &[&str] = &["Webkit", "Moz", "O", "ms", "Khtml"];

/// Default font size when a font shorthand carries none.
pub const DEFAULT_FONT_PX: f64 = 16.0;

/// Resolves a standard style property name to the name the host understands.
///
/// Results are memoized per property, including negative results.
#[derive(Debug, Clone)]
pub struct PrefixResolver {
    /// Property names the host exposes. `None` accepts every unprefixed name.
    known: Option<HashSet<String>>,
    memory: RefCell<HashMap<String, Option<String>>>,
}

impl PrefixResolver {
    /// A host that supports every standard property unprefixed.
    pub fn standard() -> Self {
        Self {
            known: None,
            memory: RefCell::new(HashMap::new()),
        }
    }

    /// A host exposing exactly the given property names.
    pub fn with_properties<I, S>(props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Some(props.into_iter().map(Into::into).collect()),
            memory: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, prop: &str) -> Option<String> {
        if let Some(hit) = self.memory.borrow().get(prop) {
            return hit.clone();
        }

        let resolved = self.probe(prop);
        log::trace!("pfx {} -> {:?}", prop, resolved);
        self.memory
            .borrow_mut()
            .insert(prop.to_string(), resolved.clone());
        resolved
    }

    /// Number of memoized lookups.
    pub fn cached(&self) -> usize {
        self.memory.borrow().len()
    }

    fn probe(&self, prop: &str) -> Option<String> {
        let known = match self.known {
            None => return Some(prop.to_string()),
            Some(ref known) => known,
        };
        if known.contains(prop) {
            return Some(prop.to_string());
        }
        let uc_prop = upper_first(prop);
        VENDOR_PREFIXES
            .iter()
            .map(|p| format!("{}{}", p, uc_prop))
            .find(|candidate| known.contains(candidate))
    }
}

impl Default for PrefixResolver {
    fn default() -> Self {
        Self::standard()
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Apply style declarations, skipping properties the host cannot resolve.
pub fn apply_css(node: &mut DomNode, props: &[(&str, String)], resolver: &PrefixResolver) {
    for (prop, value) in props {
        match resolver.resolve(prop) {
            Some(pkey) => node.set_style(&pkey, value.clone()),
            None => log::debug!("style property {} unsupported, skipped", prop),
        }
    }
}

/// `transformOrigin` -> `transform-origin`, `WebkitTransform` -> `-webkit-transform`.
pub fn css_property_name(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len() + 2);
    if prop.len() > 2 && prop.starts_with("ms") && prop[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
        out.push('-');
    }
    for ch in prop.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Format a number the way a script engine stringifies it (`600`, `0.5`,
/// `1.7e-7`, `1e+21`, never `-0`).
pub fn js_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if v == 0.0 {
        return "0".into();
    }
    let magnitude = v.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exp = format!("{:e}", v);
        return match exp.split_once('e') {
            Some((mantissa, e)) if !e.starts_with('-') => format!("{}e+{}", mantissa, e),
            _ => exp,
        };
    }
    format!("{}", v)
}

pub fn px(v: f64) -> String {
    format!("{}px", js_number(v))
}

/// Build a `scale(...)` transform value.
pub fn scale(s: f64) -> String {
    format!("scale({})", js_number(s))
}

/// Extract the font size in pixels from a CSS `font` shorthand.
///
/// Accepts `px`, `pt` and `em`/`rem` (relative to 16px); a trailing
/// `/line-height` is ignored.
pub fn parse_font_size(font: &str) -> Option<f64> {
    font.split_whitespace()
        .map(|token| token.split('/').next().unwrap_or(token))
        .find_map(parse_css_size)
}

fn parse_css_size(val: &str) -> Option<f64> {
    let v = val.trim().to_lowercase();
    let (num, factor) = if let Some(n) = v.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = v.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else if let Some(n) = v.strip_suffix("rem") {
        (n, DEFAULT_FONT_PX)
    } else if let Some(n) = v.strip_suffix("em") {
        (n, DEFAULT_FONT_PX)
    } else {
        return None;
    };
    num.parse::<f64>().ok().filter(|n| *n > 0.0).map(|n| n * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_resolver_accepts_everything() {
        let r = PrefixResolver::standard();
        assert_eq!(r.resolve("perspective").as_deref(), Some("perspective"));
        assert_eq!(r.resolve("transformOrigin").as_deref(), Some("transformOrigin"));
    }

    #[test]
    fn resolves_vendor_prefix() {
        let r = PrefixResolver::with_properties(["WebkitPerspective", "msTransform", "width"]);
        assert_eq!(r.resolve("perspective").as_deref(), Some("WebkitPerspective"));
        assert_eq!(r.resolve("transform").as_deref(), Some("msTransform"));
        assert_eq!(r.resolve("width").as_deref(), Some("width"));
        assert_eq!(r.resolve("font"), None);
    }

    #[test]
    fn memoizes_negative_results() {
        let r = PrefixResolver::with_properties(["width"]);
        assert_eq!(r.resolve("perspective"), None);
        assert_eq!(r.resolve("perspective"), None);
        assert_eq!(r.cached(), 1);
    }

    #[test]
    fn apply_skips_unresolved() {
        let r = PrefixResolver::with_properties(["width", "MozTransform"]);
        let mut node = DomNode::element("div", Vec::new(), Vec::new());
        apply_css(
            &mut node,
            &[
                ("width", px(600.0)),
                ("transform", scale(2.0)),
                ("font", "normal 36px serif".into()),
            ],
            &r,
        );
        assert_eq!(node.style("width"), Some("600px"));
        assert_eq!(node.style("MozTransform"), Some("scale(2)"));
        assert_eq!(node.style("font"), None);
    }

    #[test]
    fn css_names() {
        assert_eq!(css_property_name("transformOrigin"), "transform-origin");
        assert_eq!(css_property_name("WebkitTransform"), "-webkit-transform");
        assert_eq!(css_property_name("msTransform"), "-ms-transform");
        assert_eq!(css_property_name("OTransform"), "-o-transform");
        assert_eq!(css_property_name("width"), "width");
    }

    #[test]
    fn numbers_format_like_script() {
        assert_eq!(js_number(600.0), "600");
        assert_eq!(js_number(-300.0), "-300");
        assert_eq!(js_number(0.5), "0.5");
        assert_eq!(js_number(-0.0), "0");
        assert_eq!(scale(6.0), "scale(6)");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(js_number(0.000001), "0.000001");
        assert_eq!(js_number(1.7e-7), "1.7e-7");
        assert_eq!(js_number(-2.5e-9), "-2.5e-9");
        assert_eq!(js_number(1e21), "1e+21");
        assert_eq!(js_number(1.5e300), "1.5e+300");
        assert_eq!(js_number(123456789012345680000.0), "123456789012345680000");
        assert_eq!(scale(1.7e-7), "scale(1.7e-7)");
    }

    #[test]
    fn font_size_from_shorthand() {
        assert_eq!(parse_font_size(r#"normal 36px "PT Serif", georgia, serif"#), Some(36.0));
        assert_eq!(parse_font_size("bold 12pt/1.5 sans-serif"), Some(16.0));
        assert_eq!(parse_font_size("2em serif"), Some(32.0));
        assert_eq!(parse_font_size("italic serif"), None);
    }
}
