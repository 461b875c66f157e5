use pulldown_cmark::{html, Options, Parser};

/// Converts raw markdown into an HTML fragment.
pub trait MarkdownConverter {
    fn make_html(&self, markdown: &str) -> String;
}

/// CommonMark converter with tables and strikethrough.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkConverter;

impl MarkdownConverter for CmarkConverter {
    fn make_html(&self, markdown: &str) -> String {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_STRIKETHROUGH);

        let parser = Parser::new_ext(markdown, opts);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Undo the entity escaping a page serializer applies to markdown text
/// (`&gt;` would otherwise never start a blockquote).
pub fn decode_page_text(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Strip the common leading indentation of an embedded markdown block, so a
/// story indented inside page markup does not turn into one code block.
pub fn dedent(s: &str) -> String {
    let indent = s
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    s.lines()
        .map(|l| if l.len() >= indent && l.is_char_boundary(indent) { &l[indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_become_blocks() {
        let html = CmarkConverter.make_html("# A\n\n## B\n\n### C");
        assert_eq!(html, "<h1>A</h1>\n<h2>B</h2>\n<h3>C</h3>\n");
    }

    #[test]
    fn empty_markdown_is_empty_html() {
        assert_eq!(CmarkConverter.make_html(""), "");
        assert_eq!(CmarkConverter.make_html("   \n\n"), "");
    }

    #[test]
    fn tables_enabled() {
        let html = CmarkConverter.make_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.starts_with("<table>"));
    }

    #[test]
    fn decodes_escaped_page_text() {
        assert_eq!(decode_page_text("&gt; quote &amp;lt;"), "> quote &lt;");
    }

    #[test]
    fn dedent_removes_shared_indent() {
        let md = "\n        # Title\n\n        Body text\n            code\n";
        assert_eq!(dedent(md), "\n# Title\n\nBody text\n    code");
    }
}
