use std::path::Path;

use crate::capability::Environment;
use crate::config::Options;
use crate::dom::parser::{parse_fragment, parse_html};
use crate::dom::{DomNode, DomTree};
use crate::markdown::{decode_page_text, dedent, CmarkConverter, MarkdownConverter};
use crate::net::fetch::{fetch_url, is_remote};
use crate::render::fit::FitOutcome;
use crate::render::layout::LayoutHost;
use crate::render::showcase::{layout_showcases, Showcase, ShowcaseGeometry};

/// Root id the presentation engine looks for.
pub const IMPRESS_ROOT_ID: &str = "impress";

/// Error at the edges of the pipeline (reading, fetching, writing)
#[derive(Debug)]
pub struct StoryError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for StoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for StoryError {}

/// Presentation collaborator that takes over a laid-out document.
pub trait PresentationEngine {
    type Output;

    fn init(&mut self, document: DomTree) -> Self::Output;
}

/// Emits a standalone impress.js page: the document with the engine script
/// and its `impress().init()` call appended to `<body>`.
#[derive(Debug, Clone)]
pub struct ImpressPage {
    pub script_src: String,
}

impl ImpressPage {
    pub fn new(script_src: impl Into<String>) -> Self {
        Self {
            script_src: script_src.into(),
        }
    }
}

impl PresentationEngine for ImpressPage {
    type Output = String;

    fn init(&mut self, mut document: DomTree) -> String {
        let scripts = vec![
            DomNode::element(
                "script",
                vec![("src".into(), self.script_src.clone())],
                Vec::new(),
            ),
            DomNode::element(
                "script",
                Vec::new(),
                vec![DomNode::text("impress().init();")],
            ),
        ];

        match document.root.find_tag_mut("body") {
            Some(body) => body.children.extend(scripts),
            None => document
                .root
                .children
                .push(DomNode::element("body", Vec::new(), scripts)),
        }
        document.to_html()
    }
}

/// A laid-out story, ready for the presentation engine.
#[derive(Debug, Clone)]
pub struct Deck {
    pub document: DomTree,
    pub geometry: Vec<ShowcaseGeometry>,
    pub fits: Vec<FitOutcome>,
}

impl Deck {
    /// The step containers, in story order.
    pub fn steps(&self) -> Vec<&DomNode> {
        self.document
            .find_by_id(IMPRESS_ROOT_ID)
            .map(|root| root.element_children().collect())
            .unwrap_or_default()
    }
}

/// Outcome of [`Storyspin::init`].
#[derive(Debug, Clone)]
pub enum Launch {
    Ready(Deck),
    /// The host cannot run the layout; the document holds the converted
    /// story untouched.
    Unsupported(DomTree),
}

impl Launch {
    pub fn is_supported(&self) -> bool {
        matches!(self, Launch::Ready(_))
    }

    pub fn geometry(&self) -> &[ShowcaseGeometry] {
        match self {
            Launch::Ready(deck) => &deck.geometry,
            Launch::Unsupported(_) => &[],
        }
    }

    pub fn document(&self) -> &DomTree {
        match self {
            Launch::Ready(deck) => &deck.document,
            Launch::Unsupported(doc) => doc,
        }
    }

    pub fn into_document(self) -> DomTree {
        match self {
            Launch::Ready(deck) => deck.document,
            Launch::Unsupported(doc) => doc,
        }
    }

    /// Hand the deck to the presentation engine. Does nothing (and returns
    /// `None`) when unsupported or when the story has no showcases.
    pub fn impress<E: PresentationEngine>(self, engine: &mut E) -> Option<E::Output> {
        match self {
            Launch::Ready(deck) if !deck.geometry.is_empty() => Some(engine.init(deck.document)),
            _ => {
                log::info!("nothing to present, presentation engine not started");
                None
            }
        }
    }
}

/// A story bound to its page, converted and waiting for [`Storyspin::init`].
#[derive(Debug, Clone)]
pub struct Storyspin {
    document: DomTree,
    options: Options,
    env: Environment,
    supported: bool,
}

/// Build a story from a page, converting the root's markdown with CommonMark.
pub fn storyspin(document: DomTree, options: Options, env: Environment) -> Storyspin {
    Storyspin::with_converter(document, options, env, &CmarkConverter)
}

impl Storyspin {
    /// Read the markdown held by the root element once, clear it, and fill
    /// the root with the converted HTML.
    pub fn with_converter(
        mut document: DomTree,
        options: Options,
        env: Environment,
        converter: &dyn MarkdownConverter,
    ) -> Self {
        let options = options.normalized();
        match document.find_by_id_mut(&options.root_id) {
            Some(root) => {
                let markdown = dedent(&decode_page_text(&root.inner_html()));
                root.children.clear();
                let html = converter.make_html(&markdown);
                root.children = parse_fragment(&html);
                log::debug!(
                    "converted #{}: {} bytes markdown -> {} nodes",
                    options.root_id,
                    markdown.len(),
                    root.children.len()
                );
            }
            None => log::warn!("no element with id \"{}\", story is empty", options.root_id),
        }

        let supported = env.supports_storyspin();
        if !supported {
            log::info!(
                "environment unsupported (user agent \"{}\"), layout disabled",
                env.user_agent
            );
        }

        Self {
            document,
            options,
            env,
            supported,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn document(&self) -> &DomTree {
        &self.document
    }

    /// Lay out every story element as a showcase and prepare the root for
    /// the presentation engine.
    pub fn init(self, host: &mut dyn LayoutHost) -> Launch {
        let Storyspin {
            mut document,
            options,
            env,
            supported,
        } = self;

        if !supported {
            return Launch::Unsupported(document);
        }

        let config = options.fitting();
        let (geometry, fits) = match document.find_by_id_mut(&options.root_id) {
            Some(root) => {
                // Stray text between blocks is dropped with the rest of the old markup.
                let elements: Vec<DomNode> =
                    root.children.drain(..).filter(|n| n.is_element()).collect();
                log::info!("laying out {} showcases", elements.len());

                let showcases = layout_showcases(elements, &config, &env.styles, host);
                let geometry: Vec<ShowcaseGeometry> = showcases.iter().map(|s| s.geometry).collect();
                let fits: Vec<FitOutcome> = showcases.iter().map(|s| s.fit).collect();
                root.children = showcases.into_iter().map(Showcase::into_node).collect();
                root.set_attr("id", IMPRESS_ROOT_ID);
                (geometry, fits)
            }
            None => (Vec::new(), Vec::new()),
        };

        Launch::Ready(Deck {
            document,
            geometry,
            fits,
        })
    }
}

/// Minimal page carrying `markdown` in the root element.
pub fn story_page(title: &str, markdown: &str, root_id: &str) -> String {
    let escape = |s: &str| {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    };
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n<div id=\"{}\">{}</div>\n</body>\n</html>\n",
        escape(title),
        root_id.replace('"', ""),
        escape(markdown)
    )
}

fn is_markdown_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".md") || lower.ends_with(".markdown")
}

/// Load a story page from a local file or URL. Markdown sources are wrapped
/// in a page with the configured root element.
pub fn load_source(input: &str, root_id: &str) -> Result<DomTree, StoryError> {
    let (body, markdown, title) = if is_remote(input) {
        let fetched = fetch_url(input).map_err(|e| StoryError {
            message: e.message,
            phase: "fetch",
        })?;
        let markdown =
            is_markdown_name(&fetched.url) || fetched.content_type.starts_with("text/markdown");
        (fetched.body, markdown, fetched.url)
    } else {
        let body = std::fs::read_to_string(input).map_err(|e| StoryError {
            message: format!("{}: {}", input, e),
            phase: "read",
        })?;
        let title = Path::new(input)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("storyspin")
            .to_string();
        (body, is_markdown_name(input), title)
    };

    let page = if markdown {
        story_page(&title, &body, root_id)
    } else {
        body
    };
    Ok(parse_html(&page))
}
