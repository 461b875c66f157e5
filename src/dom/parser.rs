use crate::dom::{DomNode, DomTree};
use scraper::{ElementRef, Html, Node};

/// Containers whose whitespace-only text children are source formatting
const STRUCTURAL_TAGS: &[&str] = &[
    "html", "head", "body", "ul", "ol", "dl", "table", "thead", "tbody", "tfoot", "tr",
];

/// Parse a full HTML page into a DomTree
pub fn parse_html(html: &str) -> DomTree {
    let document = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let doctype = document.tree.root().children().find_map(|n| match n.value() {
        Node::Doctype(d) => Some(d.name().to_string()),
        _ => None,
    });

    let root = convert_element(document.root_element());

    DomTree {
        root,
        doctype,
        title: title.trim().to_string(),
    }
}

/// Parse an HTML fragment (converter output) into its top-level nodes.
/// Every text node is kept.
pub fn parse_fragment(html: &str) -> Vec<DomNode> {
    let fragment = Html::parse_fragment(html);
    convert_children(fragment.root_element(), true)
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: Vec<(String, String)> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let keep_whitespace = !STRUCTURAL_TAGS.contains(&tag.as_str());
    DomNode::element(tag, attributes, convert_children(el, keep_whitespace))
}

fn convert_children(el: ElementRef<'_>, keep_whitespace: bool) -> Vec<DomNode> {
    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if keep_whitespace || !s.trim().is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    children
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_html() {
        let html = r#"<!DOCTYPE html>
        <html>
            <head><title>Test Story</title></head>
            <body>
                <div id="storyspin"># Hello</div>
            </body>
        </html>
        "#;

        let tree = parse_html(html);
        assert_eq!(tree.title, "Test Story");
        assert_eq!(tree.doctype.as_deref(), Some("html"));
        let root = tree.find_by_id("storyspin").unwrap();
        assert_eq!(root.collect_text(), "# Hello");
    }

    #[test]
    fn keeps_script_text() {
        let html = r#"
        <html><body>
            <p>Visible</p>
            <script>impress().init();</script>
        </body></html>
        "#;

        let tree = parse_html(html);
        let out = tree.to_html();
        assert!(out.contains("<p>Visible</p>"));
        assert!(out.contains("<script>impress().init();</script>"));
    }

    #[test]
    fn fragment_yields_top_level_blocks() {
        let nodes = parse_fragment("<h1>A</h1>\n<h2>B</h2>\n<p>C <em>c</em></p>\n");
        let tags: Vec<&str> = nodes
            .iter()
            .filter(|n| n.is_element())
            .map(|n| n.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["h1", "h2", "p"]);
        assert_eq!(nodes[2].children[1].tag, "em");
    }

    #[test]
    fn space_between_inline_elements_survives() {
        let nodes = parse_fragment("<p>some <em>b</em> <strong>c</strong> end</p>\n");
        assert_eq!(nodes[0].inner_html(), "some <em>b</em> <strong>c</strong> end");

        let tree = parse_html("<html><body>\n  <p><em>x</em> <em>y</em></p>\n</body></html>");
        let out = tree.to_html();
        assert!(out.contains("<body><p><em>x</em> <em>y</em></p></body>"));
    }

    #[test]
    fn pre_keeps_whitespace() {
        let nodes = parse_fragment("<pre><code>fn main() {\n    go();\n}\n</code></pre>");
        assert_eq!(nodes[0].collect_text(), "fn main() {\n    go();\n}");
        assert!(nodes[0].inner_html().contains("    go();"));
    }
}
