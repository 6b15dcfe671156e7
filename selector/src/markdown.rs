//! Markdown rendering for model answers.
//!
//! Answers come back from the completion engine as markdown and are shown in
//! the page as HTML. The model is untrusted, so sanitizing happens on the
//! parser's event stream: raw HTML is emitted as escaped text and link or
//! image targets with a non-allowlisted scheme are replaced with `#`.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Rendered answer, keeping the source text alongside the HTML.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAnswer {
    pub raw: String,
    pub html: String,
    /// Whether any raw HTML or unsafe link was neutralized.
    pub sanitized: bool,
}

pub fn render_answer(input: &str) -> RenderedAnswer {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut sanitized = false;
    let events = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => {
            sanitized = true;
            Event::Text(raw)
        }
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => {
            sanitized = true;
            Event::Start(Tag::Link {
                link_type,
                dest_url: CowStr::Borrowed("#"),
                title,
                id,
            })
        }
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => {
            sanitized = true;
            Event::Start(Tag::Image {
                link_type,
                dest_url: CowStr::Borrowed("#"),
                title,
                id,
            })
        }
        other => other,
    });

    let mut rendered = String::with_capacity(input.len() * 2);
    html::push_html(&mut rendered, events);

    RenderedAnswer {
        raw: input.to_string(),
        html: rendered,
        sanitized,
    }
}

pub fn render_to_html(input: &str) -> String {
    let rendered = render_answer(input);
    if rendered.sanitized {
        tracing::warn!("Answer contained raw HTML or unsafe links; neutralized");
    }
    rendered.html
}

/// Relative URLs and allowlisted schemes only.
///
/// Browsers drop ASCII whitespace and control characters inside a scheme, so
/// they are removed before the scheme is read.
fn is_safe_url(url: &str) -> bool {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.find(':') {
        None => true,
        Some(idx) => {
            let scheme = &compact[..idx];
            scheme.contains(|c| matches!(c, '/' | '?' | '#')) || SAFE_SCHEMES.contains(&scheme)
        }
    }
}
