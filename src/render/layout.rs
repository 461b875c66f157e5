use crate::dom::css::{parse_font_size, DEFAULT_FONT_PX};
use crate::dom::{DomNode, NodeType};

/// Rendering collaborator: attaches an element at a block width and reports
/// its rendered height.
///
/// One call is one synchronous attach-and-measure step; callers block on it.
pub trait LayoutHost {
    fn attach_and_measure(&mut self, element: &DomNode, width: f64, font: &str) -> f64;
}

/// Bounding box for a laid-out DOM node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A DOM node with computed layout
#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub tag: String,
    pub bounds: LayoutBox,
    pub children: Vec<LayoutNode>,
    pub is_block: bool,
    pub font_size: f64,
    /// Wrapped line count of the node's own inline content.
    pub lines: usize,
}

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "thead", "tbody",
    "tr", "td", "th", "section", "article", "header", "footer", "blockquote", "pre", "figure",
    "figcaption", "hr", "dl", "dt", "dd",
];

/// Font size relative to the parent.
fn tag_font_scale(tag: &str) -> f64 {
    match tag {
        "h1" => 2.0,
        "h2" => 1.5,
        "h3" => 1.17,
        "h5" | "small" => 0.83,
        "h6" => 0.67,
        "pre" | "code" => 0.875,
        _ => 1.0,
    }
}

/// Per-tag vertical margins (top, bottom) in em of the node's own font.
fn tag_margins(tag: &str) -> (f64, f64) {
    match tag {
        "h1" => (0.67, 0.67),
        "h2" => (0.83, 0.83),
        "h3" => (1.0, 1.0),
        "h4" => (1.33, 1.33),
        "h5" => (1.67, 1.67),
        "h6" => (2.33, 2.33),
        "p" | "ul" | "ol" | "blockquote" | "pre" | "dl" | "table" | "figure" => (1.0, 1.0),
        "hr" => (0.5, 0.5),
        _ => (0.0, 0.0),
    }
}

/// Horizontal inset (px) taken from the available width.
fn tag_inset(tag: &str) -> f64 {
    match tag {
        "ul" | "ol" | "dd" => 40.0,
        "blockquote" | "figure" => 80.0,
        "td" | "th" => 2.0,
        _ => 0.0,
    }
}

/// Block-flow text measurer.
///
/// Estimates rendered heights from font size, line height and greedy word
/// wrapping at an average glyph advance. No font files are read.
#[derive(Debug, Clone)]
pub struct TextMeasurer {
    /// Average glyph advance in em.
    pub glyph_advance: f64,
    /// Line height in em.
    pub line_height: f64,
    /// Height of an image without a `height` attribute.
    pub default_image_height: f64,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self {
            glyph_advance: 0.5,
            line_height: 1.2,
            default_image_height: 150.0,
        }
    }
}

impl LayoutHost for TextMeasurer {
    fn attach_and_measure(&mut self, element: &DomNode, width: f64, font: &str) -> f64 {
        let base = parse_font_size(font).unwrap_or(DEFAULT_FONT_PX);
        let laid_out = self.compute_layout(element, width, base);
        log::trace!(
            "measured <{}> at {}px: {}px ({} lines)",
            element.tag,
            width,
            laid_out.bounds.height,
            laid_out.lines
        );
        laid_out.bounds.height
    }
}

impl TextMeasurer {
    /// Lay out `root` as a block of the given width. The root's own margins
    /// are not part of its height.
    pub fn compute_layout(&self, root: &DomNode, width: f64, base_font: f64) -> LayoutNode {
        let mut cursor_y = 0.0;
        self.layout_node(root, 0.0, &mut cursor_y, width, base_font, true)
    }

    fn layout_node(
        &self,
        node: &DomNode,
        x: f64,
        cursor_y: &mut f64,
        available_width: f64,
        parent_font_size: f64,
        is_root: bool,
    ) -> LayoutNode {
        let font_size = parent_font_size * tag_font_scale(&node.tag);
        let is_block = is_root || is_block_node(node);
        let (margin_top, margin_bottom) = tag_margins(&node.tag);

        if is_block && !is_root {
            *cursor_y += margin_top * font_size;
        }
        let start_y = *cursor_y;

        let inset = tag_inset(&node.tag);
        let child_x = x + inset;
        let child_width = (available_width - inset).max(0.0);

        let mut children = Vec::new();
        let mut lines = 0;

        match node.tag.as_str() {
            "img" => {
                *cursor_y += node
                    .attr("height")
                    .and_then(|h| h.trim_end_matches("px").parse::<f64>().ok())
                    .unwrap_or(self.default_image_height);
            }
            "hr" => *cursor_y += 2.0,
            _ => {
                // Consecutive inline children flow together as one run.
                let mut run = String::new();
                for child in &node.children {
                    if child.node_type == NodeType::Element && is_block_node(child) {
                        lines += self.flush_run(&mut run, cursor_y, child_width, font_size, node);
                        children.push(self.layout_node(
                            child,
                            child_x,
                            cursor_y,
                            child_width,
                            font_size,
                            false,
                        ));
                    } else if child.node_type == NodeType::Text {
                        run.push_str(&child.text);
                    } else if child.tag == "br" {
                        run.push('\n');
                    } else if child.tag == "img" {
                        lines += self.flush_run(&mut run, cursor_y, child_width, font_size, node);
                        children.push(self.layout_node(
                            child,
                            child_x,
                            cursor_y,
                            child_width,
                            font_size,
                            false,
                        ));
                    } else {
                        run.push_str(&inline_text(child));
                    }
                }
                lines += self.flush_run(&mut run, cursor_y, child_width, font_size, node);
            }
        }

        let height = *cursor_y - start_y;

        if is_block && !is_root {
            *cursor_y += margin_bottom * font_size;
        }

        LayoutNode {
            tag: node.tag.clone(),
            bounds: LayoutBox {
                x,
                y: start_y,
                width: available_width,
                height,
            },
            children,
            is_block,
            font_size,
            lines,
        }
    }

    /// Wrap and consume a pending inline run, advancing the cursor.
    fn flush_run(
        &self,
        run: &mut String,
        cursor_y: &mut f64,
        width: f64,
        font_size: f64,
        owner: &DomNode,
    ) -> usize {
        if run.trim().is_empty() {
            run.clear();
            return 0;
        }
        let preformatted = owner.tag == "pre";
        let lines = self.wrap_lines(run, width, font_size, preformatted);
        *cursor_y += lines as f64 * font_size * self.line_height;
        run.clear();
        lines
    }

    /// Number of lines `text` occupies at `width`.
    pub fn wrap_lines(&self, text: &str, width: f64, font_size: f64, preformatted: bool) -> usize {
        let advance = font_size * self.glyph_advance;
        if preformatted {
            return text.trim_end_matches('\n').lines().count().max(1);
        }

        let mut total = 0;
        for paragraph in text.split('\n') {
            let mut lines = 1;
            let mut line_width = 0.0;
            for word in paragraph.split_whitespace() {
                let word_width = word.chars().count() as f64 * advance;
                let needed = if line_width > 0.0 { advance + word_width } else { word_width };
                if line_width > 0.0 && line_width + needed > width {
                    lines += 1;
                    line_width = word_width;
                } else {
                    line_width += needed;
                }
                // Overlong words break across lines.
                while line_width > width && width > advance {
                    lines += 1;
                    line_width -= width;
                }
            }
            total += lines;
        }
        total
    }
}

fn is_block_node(node: &DomNode) -> bool {
    node.node_type == NodeType::Element && BLOCK_TAGS.contains(&node.tag.as_str())
}

fn inline_text(node: &DomNode) -> String {
    let mut buf = String::new();
    for child in &node.children {
        match child.node_type {
            NodeType::Text => buf.push_str(&child.text),
            _ if child.tag == "br" => buf.push('\n'),
            _ => buf.push_str(&inline_text(child)),
        }
    }
    buf
}
