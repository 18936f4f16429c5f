//! Terminal markdown rendering with syntax-highlighted code blocks.
//!
//! `TermRenderer` combines `termimad` for prose and `syntect` for code
//! block highlighting, and implements the engine's [`Renderer`] seam so the
//! typewriter can repaint partially revealed Markdown on every tick. Plain
//! (non-Markdown) content is passed through untouched.

use std::sync::Arc;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

use parley_core::render::Renderer;

/// Display theme for the terminal skin and highlight palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermTheme {
    Dark,
    Light,
}

impl TermTheme {
    /// Parse a persisted theme value, defaulting to dark.
    pub fn from_profile(value: &str) -> Self {
        match value {
            "light" => TermTheme::Light,
            _ => TermTheme::Dark,
        }
    }

    fn syntect_theme(self) -> &'static str {
        match self {
            TermTheme::Dark => "base16-ocean.dark",
            TermTheme::Light => "InspiredGitHub",
        }
    }
}

struct RendererInner {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: TermTheme,
}

/// Terminal markdown renderer with syntax highlighting.
///
/// Cheap to clone; the syntax and theme sets are shared.
#[derive(Clone)]
pub struct TermRenderer {
    inner: Arc<RendererInner>,
}

impl TermRenderer {
    pub fn new(theme: TermTheme) -> Self {
        let mut skin = match theme {
            TermTheme::Dark => MadSkin::default_dark(),
            TermTheme::Light => MadSkin::default_light(),
        };
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            inner: Arc::new(RendererInner {
                skin,
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme_set: ThemeSet::load_defaults(),
                theme,
            }),
        }
    }

    /// Render markdown with syntax-highlighted code blocks.
    ///
    /// Code fences with a language tag are highlighted via syntect;
    /// everything else is rendered through termimad. An unclosed trailing
    /// fence is rendered as if closed, so partial reveals stay legible.
    fn render_markdown(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") && !in_code_block {
                in_code_block = true;
                code_lang = line.trim_start_matches('`').trim().to_string();
                code_buf.clear();
            } else if line.starts_with("```") && in_code_block {
                in_code_block = false;
                output.push_str(&self.highlight_code(&code_buf, &code_lang));
                output.push('\n');
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                let rendered = self.inner.skin.term_text(line);
                output.push_str(&format!("{rendered}"));
            }
        }

        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    /// Highlight a code block using syntect.
    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.inner.syntax_set.find_syntax_plain_text()
        } else {
            self.inner
                .syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.inner.syntax_set.find_syntax_plain_text())
        };

        let theme = &self.inner.theme_set.themes[self.inner.theme.syntect_theme()];
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::new();
        if !lang.is_empty() {
            output.push_str(&format!(
                "  {}\n",
                console::style(format!("--- {lang} ---")).dim()
            ));
        }

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.inner.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

impl Renderer for TermRenderer {
    type Output = String;

    fn render(&self, text: &str, as_markdown: bool) -> String {
        if as_markdown {
            self.render_markdown(text)
        } else {
            text.to_string()
        }
    }
}
