use crawl_logging::{crawl_debug, crawl_warn};
use docmap_core::{default_content_selectors, ContentBlock, CrawlConfig, PageExtraction};
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::links::LinkCollector;

/// Tags that never carry page content.
const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "nav", "footer", "header",
    "aside", "form",
];

const STRIPPED_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "search"];

/// Class/id words (after splitting on `-` and `_`) that mark navigation chrome.
const BOILERPLATE_WORDS: &[&str] = &[
    "nav",
    "navbar",
    "navigation",
    "sidebar",
    "footer",
    "menu",
    "toc",
    "breadcrumb",
    "breadcrumbs",
];

/// Elements whose whole text is appended to the open block's body.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "li", "pre", "blockquote", "dd", "dt", "td", "th", "figcaption", "h4", "h5", "h6",
];

/// Elements that separate words when their text is flattened.
const TEXT_BREAK_TAGS: &[&str] = &[
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "th", "dd", "dt", "pre", "blockquote",
    "table", "section", "figcaption",
];

pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &str) -> PageExtraction;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSettings {
    /// Tried in order; the first match bounds block extraction.
    pub content_selectors: Vec<String>,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            content_selectors: default_content_selectors(),
        }
    }
}

impl ExtractSettings {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            content_selectors: config.content_selectors.clone(),
        }
    }
}

/// Turns a page into `h1`..`h3` blocks with their following paragraph text.
///
/// - blocks come from the content root (first matching content selector,
///   else `<body>`), with navigation, header/footer and script elements
///   skipped;
/// - links come from the whole document, since site navigation is what
///   drives the crawl.
#[derive(Debug, Clone)]
pub struct HeadingExtractor {
    content_selectors: Vec<Selector>,
}

impl HeadingExtractor {
    pub fn new(settings: ExtractSettings) -> Self {
        let content_selectors = settings
            .content_selectors
            .iter()
            .filter_map(|raw| match Selector::parse(raw) {
                Ok(selector) => Some(selector),
                Err(err) => {
                    crawl_warn!("ignoring invalid content selector '{raw}': {err}");
                    None
                }
            })
            .collect();
        Self { content_selectors }
    }

    fn content_root<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        self.content_selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
            .or_else(|| {
                document
                    .root_element()
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "body")
            })
            .unwrap_or_else(|| document.root_element())
    }
}

impl Default for HeadingExtractor {
    fn default() -> Self {
        Self::new(ExtractSettings::default())
    }
}

impl ContentExtractor for HeadingExtractor {
    fn extract(&self, html: &str, page_url: &str) -> PageExtraction {
        let document = Html::parse_document(html);

        let mut links = LinkCollector::new(page_url);
        for element in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            if element.value().name() == "a" {
                if let Some(href) = element.value().attr("href") {
                    links.add(href);
                }
            }
        }

        let mut blocks = BlockBuilder::new(page_url);
        visit_children(self.content_root(&document), &mut blocks);

        PageExtraction {
            blocks: blocks.into_blocks(),
            links: links.into_links(),
        }
    }
}

fn visit_children(element: ElementRef, blocks: &mut BlockBuilder) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                blocks.append_body(&text);
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    visit_element(child, blocks);
                }
            }
            _ => {}
        }
    }
}

fn visit_element(element: ElementRef, blocks: &mut BlockBuilder) {
    if is_boilerplate(&element) {
        return;
    }
    let name = element.value().name();
    match name {
        "h1" | "h2" | "h3" => {
            let level = if name == "h1" {
                1
            } else if name == "h2" {
                2
            } else {
                3
            };
            blocks.open(level, visible_text(element));
        }
        _ if PARAGRAPH_TAGS.contains(&name) => blocks.append_body(&visible_text(element)),
        _ => visit_children(element, blocks),
    }
}

fn is_boilerplate(element: &ElementRef) -> bool {
    let el = element.value();
    if STRIPPED_TAGS.contains(&el.name()) {
        return true;
    }
    if let Some(role) = el.attr("role") {
        let role = role.trim();
        if STRIPPED_ROLES.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            return true;
        }
    }
    if el
        .attr("data-md-component")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("toc"))
    {
        return true;
    }
    el.classes().chain(el.id()).any(is_boilerplate_token)
}

fn is_boilerplate_token(token: &str) -> bool {
    token
        .split(['-', '_'])
        .any(|part| BOILERPLATE_WORDS.iter().any(|w| part.eq_ignore_ascii_case(w)))
}

/// Whitespace-collapsed text of `element`, without stripped descendants or
/// heading permalink anchors.
fn visible_text(element: ElementRef) -> String {
    let mut raw = String::new();
    collect_text(*element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let Some(element) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_boilerplate(&element) || is_permalink(el) {
                    continue;
                }
                let breaks = TEXT_BREAK_TAGS.contains(&el.name());
                if breaks {
                    out.push(' ');
                }
                collect_text(child, out);
                if breaks {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn is_permalink(el: &scraper::node::Element) -> bool {
    el.name() == "a" && el.classes().any(|c| c == "headerlink" || c == "anchor-link")
}

struct BlockBuilder {
    source_url: String,
    blocks: Vec<ContentBlock>,
}

impl BlockBuilder {
    fn new(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            blocks: Vec::new(),
        }
    }

    fn open(&mut self, level: u8, heading: String) {
        if heading.is_empty() {
            crawl_debug!("{}: dropping empty h{level}", self.source_url);
            return;
        }
        self.blocks
            .push(ContentBlock::new(level, heading, "", self.source_url.clone()));
    }

    /// Text before the first heading has no block to go to and is dropped.
    fn append_body(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(block) = self.blocks.last_mut() {
            if !block.body.is_empty() {
                block.body.push(' ');
            }
            block.body.push_str(text);
        }
    }

    fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }
}
