pub mod parser;
pub mod css;

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are written out verbatim.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
}

/// Internal DOM node representation.
///
/// Attributes and inline style declarations keep insertion order so that a
/// re-serialized page is stable from run to run.
#[derive(Debug, Clone, PartialEq)]
pub struct DomNode {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    /// Inline style set through [`css::apply_css`], keyed by resolved property name.
    pub style: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
}

impl DomNode {
    pub fn element(
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            style: Vec::new(),
            text: String::new(),
            children,
            node_type: NodeType::Element,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: Vec::new(),
            style: Vec::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Collect all text content recursively
    pub fn collect_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text_inner(&mut buf);
        buf
    }

    fn collect_text_inner(&self, buf: &mut String) {
        if !self.text.trim().is_empty() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(self.text.trim());
        }
        for child in &self.children {
            child.collect_text_inner(buf);
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{} {}", existing.trim(), class)
            }
            _ => class.to_string(),
        };
        self.set_attr("class", classes);
    }

    /// `dataset`-style write: `set_data("x", "10")` sets `data-x="10"`.
    pub fn set_data(&mut self, key: &str, value: impl Into<String>) {
        self.set_attr(&format!("data-{}", key), value);
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{}", key))
    }

    pub fn set_style(&mut self, prop: &str, value: impl Into<String>) {
        let value = value.into();
        match self.style.iter_mut().find(|(k, _)| k == prop) {
            Some(slot) => slot.1 = value,
            None => self.style.push((prop.to_string(), value)),
        }
    }

    pub fn style(&self, prop: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(k, _)| k == prop)
            .map(|(_, v)| v.as_str())
    }

    pub fn element_children(&self) -> impl Iterator<Item = &DomNode> {
        self.children.iter().filter(|c| c.is_element())
    }

    pub fn find_by_id(&self, id: &str) -> Option<&DomNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    pub fn find_tag_mut(&mut self, tag: &str) -> Option<&mut DomNode> {
        if self.is_element() && self.tag == tag {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_tag_mut(tag))
    }

    /// Serialize the children of this node.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = RAW_TEXT_TAGS.contains(&self.tag.as_str());
        for child in &self.children {
            child.write_html(&mut out, raw);
        }
        out
    }

    /// Serialize this node including its own tag.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }

    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self.node_type {
            NodeType::Text => {
                if raw_text {
                    out.push_str(&self.text);
                } else {
                    out.push_str(&escape_text(&self.text));
                }
            }
            NodeType::Element => {
                out.push('<');
                out.push_str(&self.tag);
                let inline_style = self.style_attr();
                for (k, v) in &self.attributes {
                    if k == "style" && inline_style.is_some() {
                        continue;
                    }
                    out.push_str(&format!(" {}=\"{}\"", k, escape_attr(v)));
                }
                if let Some(style) = inline_style {
                    out.push_str(&format!(" style=\"{}\"", escape_attr(&style)));
                }
                out.push('>');
                if VOID_TAGS.contains(&self.tag.as_str()) {
                    return;
                }
                out.push_str(&self.inner_html());
                out.push_str("</");
                out.push_str(&self.tag);
                out.push('>');
            }
        }
    }

    /// Merged `style` attribute: parsed inline style first, then applied declarations.
    fn style_attr(&self) -> Option<String> {
        if self.style.is_empty() {
            return None;
        }
        let mut decls: Vec<String> = Vec::new();
        if let Some(existing) = self.attr("style") {
            let existing = existing.trim().trim_end_matches(';');
            if !existing.is_empty() {
                decls.push(existing.to_string());
            }
        }
        for (prop, value) in &self.style {
            decls.push(format!("{}: {}", css::css_property_name(prop), value));
        }
        Some(format!("{};", decls.join("; ")))
    }
}

/// Parsed DOM tree with metadata
#[derive(Debug, Clone)]
pub struct DomTree {
    pub root: DomNode,
    pub doctype: Option<String>,
    pub title: String,
}

impl DomTree {
    pub fn find_by_id(&self, id: &str) -> Option<&DomNode> {
        self.root.find_by_id(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        self.root.find_by_id_mut(id)
    }

    /// Serialize the whole page back to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(ref doctype) = self.doctype {
            out.push_str(&format!("<!DOCTYPE {}>\n", doctype));
        }
        out.push_str(&self.root.outer_html());
        out.push('\n');
        out
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elem(tag: &str, text: &str) -> DomNode {
        DomNode::element(tag, Vec::new(), vec![DomNode::text(text)])
    }

    #[test]
    fn class_list_does_not_duplicate() {
        let mut node = elem("div", "");
        node.add_class("step");
        node.add_class("step");
        node.add_class("active");
        assert_eq!(node.attr("class"), Some("step active"));
        assert!(node.has_class("active"));
    }

    #[test]
    fn dataset_writes_data_attributes() {
        let mut node = elem("div", "");
        node.set_data("x", "900");
        node.set_data("x", "600");
        assert_eq!(node.attr("data-x"), Some("600"));
        assert_eq!(node.data("x"), Some("600"));
        assert_eq!(node.attributes.len(), 1);
    }

    #[test]
    fn serializes_escaped_text_and_void_tags() {
        let node = DomNode::element(
            "p",
            vec![("title".into(), "a \"b\"".into())],
            vec![
                DomNode::text("1 < 2 & 3"),
                DomNode::element("br", Vec::new(), Vec::new()),
            ],
        );
        assert_eq!(
            node.outer_html(),
            "<p title=\"a &quot;b&quot;\">1 &lt; 2 &amp; 3<br></p>"
        );
    }

    #[test]
    fn script_text_is_raw() {
        let node = elem("script", "if (a < b) { go(); }");
        assert_eq!(node.inner_html(), "if (a < b) { go(); }");
    }

    #[test]
    fn style_merges_with_parsed_attribute() {
        let mut node = DomNode::element(
            "div",
            vec![("style".into(), "color: red;".into())],
            Vec::new(),
        );
        node.set_style("width", "600px");
        node.set_style("WebkitTransform", "scale(2)");
        assert_eq!(
            node.outer_html(),
            "<div style=\"color: red; width: 600px; -webkit-transform: scale(2);\"></div>"
        );
    }

    #[test]
    fn find_by_id_descends() {
        let mut root = DomNode::element("html", Vec::new(), vec![DomNode::element(
            "body",
            Vec::new(),
            vec![DomNode::element(
                "div",
                vec![("id".into(), "storyspin".into())],
                Vec::new(),
            )],
        )]);
        assert!(root.find_by_id("storyspin").is_some());
        root.find_by_id_mut("storyspin").unwrap().set_attr("id", "impress");
        assert!(root.find_by_id("storyspin").is_none());
        assert!(root.find_by_id("impress").is_some());
    }
}
