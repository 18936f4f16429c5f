//! Sanitized HTML rendering.
//!
//! Markdown is parsed with pulldown-cmark, then the resulting HTML is run
//! through ammonia, which strips everything capable of script execution:
//! `<script>` elements, event-handler attributes, `javascript:` URLs. Plain
//! content skips the Markdown parser but goes through the same sanitizer,
//! since the remote assistant (or the user) can embed hostile HTML either
//! way.

use pulldown_cmark::{Options, Parser, html};

use super::Renderer;

/// HTML that has been through the sanitizer and is safe to hand to a host
/// page for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renderer producing [`SafeHtml`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn markdown_to_html(text: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        let parser = Parser::new_ext(text, options);
        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}

impl Renderer for HtmlRenderer {
    type Output = SafeHtml;

    fn render(&self, text: &str, as_markdown: bool) -> SafeHtml {
        let raw = if as_markdown {
            Self::markdown_to_html(text)
        } else {
            text.to_string()
        };
        SafeHtml(ammonia::clean(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_renders_structure() {
        let rendered = HtmlRenderer::new().render("# Title\n\nsome *emphasis*", true);
        assert!(rendered.as_str().contains("<h1>"));
        assert!(rendered.as_str().contains("<em>emphasis</em>"));
    }

    #[test]
    fn test_code_fence_renders_pre_block() {
        let rendered = HtmlRenderer::new().render("```rust\nfn main() {}\n```", true);
        assert!(rendered.as_str().contains("<pre>"));
        assert!(rendered.as_str().contains("fn main()"));
    }

    #[test]
    fn test_event_handler_is_stripped() {
        for as_markdown in [true, false] {
            let rendered =
                HtmlRenderer::new().render("<img src=x onerror=alert(1)>", as_markdown);
            assert!(
                !rendered.as_str().contains("onerror"),
                "onerror survived with as_markdown={as_markdown}: {rendered}"
            );
        }
    }

    #[test]
    fn test_script_element_is_stripped() {
        let rendered = HtmlRenderer::new().render("<script>alert(1)</script>hello", false);
        assert!(!rendered.as_str().contains("<script"));
        assert!(rendered.as_str().contains("hello"));
    }

    #[test]
    fn test_javascript_url_is_stripped() {
        let rendered = HtmlRenderer::new().render("[click](javascript:alert(1))", true);
        assert!(!rendered.as_str().contains("javascript:"));
    }

    #[test]
    fn test_plain_text_keeps_benign_markup() {
        let rendered = HtmlRenderer::new().render("a <b>bold</b> claim", false);
        assert!(rendered.as_str().contains("<b>bold</b>"));
    }

    #[test]
    fn test_plain_text_is_not_parsed_as_markdown() {
        let rendered = HtmlRenderer::new().render("# not a heading", false);
        assert!(!rendered.as_str().contains("<h1>"));
    }
}
