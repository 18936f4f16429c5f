//! Terminal implementation of the engine's view seams.
//!
//! `TerminalPane` is the conversation view: it prints completed messages,
//! owns the thinking spinner shown while an exchange is in flight, and
//! hands out `TerminalNode`s for typewriter reveals. A node repaints its
//! growing block in place by moving the cursor back over what it drew last
//! tick.

use std::io::{Write, stdout};
use std::time::Duration;

use console::style;
use crossterm::{cursor, execute, terminal};
use indicatif::{ProgressBar, ProgressStyle};

use parley_core::controller::ConversationView;
use parley_core::render::Renderer;
use parley_core::render::typewriter::RevealTarget;
use parley_types::chat::Sender;

use super::renderer::TermRenderer;

/// Message list rendered straight into the terminal.
pub struct TerminalPane {
    renderer: TermRenderer,
    spinner: Option<ProgressBar>,
}

impl TerminalPane {
    pub fn new(renderer: TermRenderer) -> Self {
        Self {
            renderer,
            spinner: None,
        }
    }

    fn print_label(sender: &Sender) {
        let label = match sender {
            Sender::User => style("You").green().bold().to_string(),
            Sender::Assistant(name) => style(name.as_str()).cyan().bold().to_string(),
            Sender::Error => style("Error").red().bold().to_string(),
        };
        println!("\n  {label}");
    }

    fn print_block(text: &str) {
        for line in text.trim_end_matches('\n').lines() {
            println!("  {line}");
        }
    }
}

impl ConversationView for TerminalPane {
    type Node = TerminalNode;

    fn push_message(&mut self, sender: &Sender, text: &str, is_markdown: bool) {
        Self::print_label(sender);
        let rendered = self.renderer.render(text, is_markdown);
        Self::print_block(&rendered);
    }

    fn push_pending(&mut self, assistant_name: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("{assistant_name} is thinking..."));
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    fn remove_pending(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn begin_reveal(&mut self, assistant_name: &str) -> TerminalNode {
        Self::print_label(&Sender::Assistant(assistant_name.to_string()));
        TerminalNode::new()
    }

    fn clear(&mut self) {
        let _ = execute!(
            stdout(),
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        );
    }
}

/// One message block being revealed; repaints in place each tick.
pub struct TerminalNode {
    lines_drawn: u16,
}

impl TerminalNode {
    fn new() -> Self {
        Self { lines_drawn: 0 }
    }
}

impl RevealTarget<String> for TerminalNode {
    fn set_content(&mut self, content: String) {
        let mut out = stdout();
        if self.lines_drawn > 0 {
            let _ = execute!(
                out,
                cursor::MoveUp(self.lines_drawn),
                terminal::Clear(terminal::ClearType::FromCursorDown)
            );
        }

        let text = content.trim_end_matches('\n');
        let mut lines = 0u16;
        for line in text.lines() {
            let _ = writeln!(out, "  {line}");
            lines += 1;
        }
        let _ = out.flush();
        self.lines_drawn = lines;
    }

    // The terminal viewport follows the cursor; an append-only pane is
    // always at its bottom edge.
    fn near_bottom(&self) -> bool {
        true
    }

    fn scroll_to_bottom(&mut self) {}

    fn finalize(&mut self) {}
}
