//! Markdown rendering with syntax highlighting
//!
//! Every element the blog styles is named by [`Element`] and turned into
//! markup by a [`RenderRules`] implementation. Everything else (emphasis,
//! lists, table rows, footnotes) is left to pulldown-cmark's HTML writer.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag};
use std::collections::HashSet;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::SiteConfig;
use crate::helpers::html_escape;

/// Where a link points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Absolute URL on another site
    External,
    /// Relative path, fragment or non-web scheme
    Internal,
}

impl LinkKind {
    pub fn of(url: &str) -> Self {
        let url = url.trim();
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
            LinkKind::External
        } else {
            LinkKind::Internal
        }
    }
}

/// Element kinds with a dedicated rendering rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element<'a> {
    Heading { level: u8, id: &'a str },
    Paragraph,
    CodeSpan,
    CodeBlock { language: Option<&'a str> },
    Link { kind: LinkKind, href: &'a str, title: &'a str },
    Image { src: &'a str, alt: &'a str, title: &'a str },
    Table,
    ListItem,
    Blockquote,
    Rule,
}

/// Markup emitted around each element kind
///
/// `open` and `close` wrap the element's rendered children. For code
/// blocks the children are the highlighted code; images and rules have
/// none.
pub trait RenderRules: Send + Sync {
    fn open(&self, element: &Element<'_>) -> String;
    fn close(&self, element: &Element<'_>) -> String;
}

/// The blog's standard rule table
#[derive(Debug, Clone)]
pub struct DefaultRules {
    /// Open external links in a new browsing context
    pub external_links_new_tab: bool,
}

impl Default for DefaultRules {
    fn default() -> Self {
        Self {
            external_links_new_tab: true,
        }
    }
}

impl RenderRules for DefaultRules {
    fn open(&self, element: &Element<'_>) -> String {
        match element {
            Element::Heading { level, id } => {
                format!(r#"<h{} id="{}" class="post-heading">"#, level, html_escape(id))
            }
            Element::Paragraph => "<p>".to_string(),
            Element::CodeSpan => r#"<code class="inline-code">"#.to_string(),
            Element::CodeBlock { language } => format!(
                r#"<figure class="highlight {}">"#,
                html_escape(language.unwrap_or("text"))
            ),
            Element::Link { kind, href, title } => {
                let mut tag = format!(r#"<a href="{}""#, html_escape(href));
                if !title.is_empty() {
                    tag.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                match kind {
                    LinkKind::External if self.external_links_new_tab => tag.push_str(
                        r#" class="post-link external" target="_blank" rel="noopener noreferrer">"#,
                    ),
                    LinkKind::External => tag.push_str(r#" class="post-link external">"#),
                    LinkKind::Internal => tag.push_str(r#" class="post-link">"#),
                }
                tag
            }
            Element::Image { src, alt, title } => {
                let mut tag = format!(
                    r#"<img class="post-image" src="{}" alt="{}""#,
                    html_escape(src),
                    html_escape(alt)
                );
                if !title.is_empty() {
                    tag.push_str(&format!(r#" title="{}""#, html_escape(title)));
                }
                tag.push_str(r#" loading="lazy" />"#);
                tag
            }
            Element::Table => r#"<div class="table-wrapper">"#.to_string(),
            Element::ListItem => "<li>".to_string(),
            Element::Blockquote => r#"<blockquote class="post-quote">"#.to_string(),
            Element::Rule => r#"<hr class="post-rule" />"#.to_string(),
        }
    }

    fn close(&self, element: &Element<'_>) -> String {
        match element {
            Element::Heading { level, .. } => format!("</h{}>\n", level),
            Element::Paragraph => "</p>\n".to_string(),
            Element::CodeSpan => "</code>".to_string(),
            Element::CodeBlock { .. } => "</figure>\n".to_string(),
            Element::Link { .. } => "</a>".to_string(),
            Element::Image { .. } => String::new(),
            Element::Table => "</div>\n".to_string(),
            Element::ListItem => "</li>\n".to_string(),
            Element::Blockquote => "</blockquote>\n".to_string(),
            Element::Rule => "\n".to_string(),
        }
    }
}

/// A heading collected while rendering, for tables of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Output of one render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub html: String,
    pub headings: Vec<HeadingEntry>,
}

/// Open element on the render stack
enum Frame {
    /// Left to the HTML writer
    Passthrough,
    Heading {
        level: u8,
        explicit_id: Option<String>,
        /// Position in the output where the opening tag goes
        start: usize,
        text: String,
    },
    Paragraph,
    ListItem,
    Blockquote,
    Table,
    Link {
        kind: LinkKind,
        href: String,
        title: String,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Image {
        src: String,
        title: String,
        alt: String,
    },
}

impl Frame {
    fn from_tag(tag: &Tag<'_>, position: usize) -> Self {
        match tag {
            Tag::Heading { level, id, .. } => Frame::Heading {
                level: *level as u8,
                explicit_id: id.as_ref().map(|id| id.to_string()),
                start: position,
                text: String::new(),
            },
            Tag::Paragraph => Frame::Paragraph,
            Tag::Item => Frame::ListItem,
            Tag::BlockQuote(_) => Frame::Blockquote,
            Tag::Table(_) => Frame::Table,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                kind: LinkKind::of(dest_url),
                href: dest_url.to_string(),
                title: title.to_string(),
            },
            Tag::CodeBlock(kind) => Frame::CodeBlock {
                language: match kind {
                    CodeBlockKind::Fenced(info) => code_language(info),
                    CodeBlockKind::Indented => None,
                },
                code: String::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                src: dest_url.to_string(),
                title: title.to_string(),
                alt: String::new(),
            },
            _ => Frame::Passthrough,
        }
    }

    /// The element of a frame that opens immediately on its start tag
    fn element(&self) -> Option<Element<'_>> {
        match self {
            Frame::Paragraph => Some(Element::Paragraph),
            Frame::ListItem => Some(Element::ListItem),
            Frame::Blockquote => Some(Element::Blockquote),
            Frame::Link { kind, href, title } => Some(Element::Link {
                kind: *kind,
                href,
                title,
            }),
            _ => None,
        }
    }

    /// Frames whose children are collected as text instead of rendered
    fn captures(&self) -> bool {
        matches!(self, Frame::CodeBlock { .. } | Frame::Image { .. })
    }
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
    rules: Box<dyn RenderRules>,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(theme) {
            Some(theme) => Some(theme),
            None => {
                tracing::warn!("Unknown highlight theme `{}`, using a default", theme);
                theme_set.themes.into_values().next()
            }
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers,
            rules: Box::new(DefaultRules::default()),
        }
    }

    /// Create from the site configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::with_options(&config.highlight.theme, config.highlight.line_number).with_rules(
            DefaultRules {
                external_links_new_tab: config.external_link.enable,
            },
        )
    }

    /// Replace the element rule table
    pub fn with_rules(mut self, rules: impl RenderRules + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    /// Render markdown to HTML
    ///
    /// Never fails: markdown that cannot be fully understood renders as
    /// far as pulldown-cmark makes sense of it.
    pub fn render(&self, markdown: &str) -> RenderedPost {
        // Front-matter is split off before rendering, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;
        let parsed: Vec<Event> = Parser::new_ext(markdown, options).collect();

        let mut events: Vec<Event> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut headings = Vec::new();
        // Explicit ids are claimed up front so earlier automatic anchors avoid them
        let mut anchors = Anchors::with_explicit(parsed.iter().filter_map(|event| match event {
            Event::Start(Tag::Heading { id: Some(id), .. }) => Some(id.to_string()),
            _ => None,
        }));

        for event in parsed {
            let capturing = stack.iter().any(Frame::captures);

            match event {
                Event::Start(tag) => {
                    if capturing {
                        stack.push(Frame::Passthrough);
                        continue;
                    }

                    let frame = Frame::from_tag(&tag, events.len());
                    match &frame {
                        Frame::Passthrough => events.push(Event::Start(tag)),
                        Frame::Table => {
                            events.push(self.html(self.rules.open(&Element::Table)));
                            events.push(Event::Start(tag));
                        }
                        Frame::Heading { .. } | Frame::CodeBlock { .. } | Frame::Image { .. } => {}
                        other => {
                            if let Some(element) = other.element() {
                                events.push(self.html(self.rules.open(&element)));
                            }
                        }
                    }
                    stack.push(frame);
                }

                Event::End(end) => match stack.pop() {
                    None | Some(Frame::Passthrough) => {
                        if !stack.iter().any(Frame::captures) {
                            events.push(Event::End(end));
                        }
                    }
                    Some(Frame::Table) => {
                        events.push(Event::End(end));
                        events.push(self.html(self.rules.close(&Element::Table)));
                    }
                    Some(Frame::Heading {
                        level,
                        explicit_id,
                        start,
                        text,
                    }) => {
                        let text = text.trim().to_string();
                        let id = match explicit_id {
                            Some(id) => id,
                            None => anchors.unique(&text),
                        };
                        let element = Element::Heading { level, id: &id };
                        events.insert(start, self.html(self.rules.open(&element)));
                        events.push(self.html(self.rules.close(&element)));
                        headings.push(HeadingEntry { level, id, text });
                    }
                    Some(Frame::CodeBlock { language, code }) => {
                        let element = Element::CodeBlock {
                            language: language.as_deref(),
                        };
                        let mut markup = self.rules.open(&element);
                        markup.push_str(&self.highlight_code(&code, language.as_deref()));
                        markup.push_str(&self.rules.close(&element));
                        events.push(self.html(markup));
                    }
                    Some(Frame::Image { src, title, alt }) => {
                        let element = Element::Image {
                            src: &src,
                            alt: alt.trim(),
                            title: &title,
                        };
                        let mut markup = self.rules.open(&element);
                        markup.push_str(&self.rules.close(&element));
                        events.push(self.html(markup));
                    }
                    Some(frame) => {
                        if let Some(element) = frame.element() {
                            events.push(self.html(self.rules.close(&element)));
                        }
                    }
                },

                Event::Text(text) => {
                    if let Some(frame) = capture_frame(&mut stack) {
                        match frame {
                            Frame::CodeBlock { code, .. } => code.push_str(&text),
                            Frame::Image { alt, .. } => alt.push_str(&text),
                            _ => {}
                        }
                        continue;
                    }
                    if let Some(heading) = heading_text(&mut stack) {
                        heading.push_str(&text);
                    }
                    events.push(Event::Text(text));
                }

                Event::Code(code) => {
                    if let Some(Frame::Image { alt, .. }) = capture_frame(&mut stack) {
                        alt.push_str(&code);
                        continue;
                    }
                    if let Some(heading) = heading_text(&mut stack) {
                        heading.push_str(&code);
                    }
                    let element = Element::CodeSpan;
                    let mut markup = self.rules.open(&element);
                    markup.push_str(&html_escape(&code));
                    markup.push_str(&self.rules.close(&element));
                    events.push(self.html(markup));
                }

                Event::Rule => {
                    if !capturing {
                        let element = Element::Rule;
                        let mut markup = self.rules.open(&element);
                        markup.push_str(&self.rules.close(&element));
                        events.push(self.html(markup));
                    }
                }

                Event::SoftBreak | Event::HardBreak if capturing => {
                    if let Some(Frame::Image { alt, .. }) = capture_frame(&mut stack) {
                        alt.push(' ');
                    }
                }

                other => {
                    if !capturing {
                        events.push(other);
                    }
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        RenderedPost {
            html: html_output,
            headings,
        }
    }

    fn html<'a>(&self, markup: String) -> Event<'a> {
        Event::Html(CowStr::from(markup))
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let lines = self
            .theme
            .as_ref()
            .and_then(|theme| {
                let mut highlighter = HighlightLines::new(syntax, theme);
                LinesWithEndings::from(code)
                    .map(|line| {
                        let regions = highlighter.highlight_line(line, &self.syntax_set).ok()?;
                        styled_line_to_highlighted_html(&regions[..], IncludeBackground::No).ok()
                    })
                    .collect::<Option<Vec<String>>>()
            })
            // Fallback to plain code
            .unwrap_or_else(|| {
                LinesWithEndings::from(code)
                    .map(html_escape)
                    .collect::<Vec<String>>()
            });

        if self.line_numbers {
            self.add_line_numbers(&lines)
        } else {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                html_escape(lang),
                lines.concat()
            )
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, lines: &[String]) -> String {
        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");
        let code = lines
            .iter()
            .map(|l| l.trim_end_matches(['\n', '\r']))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table>"#,
            gutter, code
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Innermost code block or image collecting text
fn capture_frame(stack: &mut [Frame]) -> Option<&mut Frame> {
    stack.iter_mut().rev().find(|f| f.captures())
}

/// Text buffer of the innermost open heading
fn heading_text(stack: &mut [Frame]) -> Option<&mut String> {
    stack.iter_mut().rev().find_map(|f| match f {
        Frame::Heading { text, .. } => Some(text),
        _ => None,
    })
}

/// First word of a fence info string, e.g. `rust` in "rust,ignore"
fn code_language(info: &str) -> Option<String> {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Heading anchors, unique within one document
///
/// Explicit `{#id}` anchors are used verbatim; generated ones skip every id
/// already issued or claimed explicitly, suffixing `-1`, `-2`, ...
#[derive(Default)]
struct Anchors {
    issued: HashSet<String>,
}

impl Anchors {
    fn with_explicit(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            issued: ids.into_iter().collect(),
        }
    }

    fn unique(&mut self, text: &str) -> String {
        let base = match slug::slugify(text) {
            s if s.is_empty() => "section".to_string(),
            s => s,
        };

        let mut id = base.clone();
        let mut n = 0;
        while self.issued.contains(&id) {
            n += 1;
            id = format!("{}-{}", base, n);
        }
        self.issued.insert(id.clone());
        id
    }
}
