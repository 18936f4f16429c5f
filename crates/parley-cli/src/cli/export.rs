//! Export a conversation as a sanitized HTML transcript.
//!
//! Every message body goes through the same Markdown-and-sanitize pipeline
//! the engine uses, so an exported transcript is safe to open even when the
//! history contains hostile markup.

use std::path::PathBuf;

use console::style;

use parley_core::render::Renderer;
use parley_core::render::html::HtmlRenderer;
use parley_types::chat::Sender;

use crate::state::AppState;

use super::chats::resolve_chat;

pub async fn export_chat(
    state: &AppState,
    reference: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let chat = resolve_chat(state, reference).await?;
    let history = state.chat_store().history(&chat.id).await?;

    let renderer = HtmlRenderer::new();
    let mut body = String::new();
    for message in &history {
        let class = match &message.sender {
            Sender::User => "user",
            Sender::Assistant(_) => "assistant",
            Sender::Error => "error",
        };
        let sender = renderer.render(message.sender.as_str(), false);
        let content = renderer.render(&message.text, message.is_markdown);
        body.push_str(&format!(
            "    <div class=\"message {class}\">\n      <strong>{sender}</strong>\n      <div class=\"content\">{content}</div>\n    </div>\n"
        ));
    }

    let title = renderer.render(&chat.name, false);
    let document = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{title}</title>\n  <style>\n    body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}\n    .message {{ margin: 1rem 0; }}\n    .user strong {{ color: #2a7; }}\n    .error strong {{ color: #c33; }}\n    pre {{ background: #f4f4f4; padding: 0.5rem; overflow-x: auto; }}\n  </style>\n</head>\n<body>\n  <h1>{title}</h1>\n{body}</body>\n</html>\n"
    );

    let path = out.unwrap_or_else(|| {
        let slug: String = chat
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        PathBuf::from(format!("{}.html", slug.trim_matches('-')))
    });

    tokio::fs::write(&path, document).await?;
    println!(
        "\n  {} Exported {} messages to {}\n",
        style("✓").green(),
        history.len(),
        style(path.display()).bold()
    );
    Ok(())
}
