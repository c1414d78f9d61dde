use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::slug::slug;
use crate::toc::TocNode;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Output of rendering one markdown body.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    pub html: String,
    /// Every heading in document order, flat. Feed to [`crate::toc::nest`].
    pub headings: Vec<TocNode>,
}

/// Render markdown to HTML, highlighting fenced code and giving every
/// heading an `id` anchor.
pub fn render_markdown(source: &str) -> Rendered {
    let parser = Parser::new_ext(source, Options::all());
    let events: Vec<Event> = parser.collect();

    let mut processed_events = Vec::with_capacity(events.len());
    let mut headings = Vec::new();
    let mut anchors = AnchorSlugger::default();
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                // Collect all text events until the end of the code block
                let mut code_content = String::new();
                i += 1;

                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code_content.push_str(text),
                        _ => {}
                    }
                    i += 1;
                }

                processed_events.push(Event::Html(highlight(lang, &code_content).into()));
            }
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let text = heading_text(&events[i + 1..]);
                let anchor = match id {
                    Some(explicit) => explicit.to_string(),
                    None => anchors.anchor_for(&text),
                };

                headings.push(TocNode::leaf(*level as u8, anchor.clone(), text));
                processed_events.push(Event::Start(Tag::Heading {
                    level: *level,
                    id: Some(CowStr::from(anchor)),
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            other => processed_events.push(other.clone()),
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed_events.into_iter());

    Rendered {
        html: out,
        headings,
    }
}

fn heading_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

fn highlight(lang: &str, code: &str) -> String {
    let syntax = SYNTAX_SET.find_syntax_by_token(lang).or_else(|| {
        // Fallback mappings for unsupported languages
        match lang {
            "nix" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
            "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
            "svelte" | "vue" => SYNTAX_SET.find_syntax_by_name("HTML"),
            _ => None,
        }
    });

    let plain = || format!("<pre><code>{}</code></pre>", html_escape::encode_text(code));

    match (syntax, THEME_SET.themes.get(DEFAULT_THEME)) {
        (Some(syntax), Some(theme)) => {
            highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain())
        }
        _ => plain(),
    }
}

/// Hands out unique anchors within one document: `setup`, `setup-2`, ...
#[derive(Debug, Default)]
struct AnchorSlugger {
    occurrences: HashMap<String, usize>,
}

impl AnchorSlugger {
    fn anchor_for(&mut self, heading: &str) -> String {
        let base = slug(heading);
        let count = self.occurrences.entry(base.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base
        } else {
            format!("{base}-{count}")
        }
    }
}
