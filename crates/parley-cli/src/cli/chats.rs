//! Conversation management commands: list, rename, delete, clear.

use anyhow::bail;
use console::style;
use uuid::Uuid;

use parley_types::chat::ChatMeta;

use crate::state::AppState;

/// Resolve a user-supplied conversation reference: a full UUID or a
/// 1-based index into the list.
pub async fn resolve_chat(state: &AppState, reference: &str) -> anyhow::Result<ChatMeta> {
    let store = state.chat_store();
    let list = store.list_chats().await?;

    if let Ok(id) = Uuid::parse_str(reference) {
        if let Some(meta) = list.into_iter().find(|c| c.id == id) {
            return Ok(meta);
        }
        bail!("no conversation with id {id}");
    }

    if let Ok(index) = reference.parse::<usize>() {
        if index >= 1 && index <= list.len() {
            return Ok(list[index - 1].clone());
        }
        bail!("index {index} out of range (1..={})", list.len());
    }

    bail!("'{reference}' is neither a conversation id nor a list index");
}

pub async fn list_chats(state: &AppState, json: bool) -> anyhow::Result<()> {
    let store = state.chat_store();
    let list = store.list_chats().await?;
    let current = store.current_chat().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.is_empty() {
        println!("\n  {}\n", style("No conversations yet. Run `parley` to start one.").dim());
        return Ok(());
    }

    println!();
    for (index, chat) in list.iter().enumerate() {
        let marker = if current == Some(chat.id) {
            style("*").cyan().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {marker} {}. {}  {}",
            index + 1,
            style(&chat.name).bold(),
            style(chat.id).dim()
        );
    }
    println!();
    Ok(())
}

pub async fn rename_chat(
    state: &AppState,
    reference: &str,
    name: &str,
    json: bool,
) -> anyhow::Result<()> {
    let chat = resolve_chat(state, reference).await?;
    state.chat_store().rename_chat(&chat.id, name).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"id": chat.id, "name": name})
        );
    } else {
        println!(
            "\n  {} Renamed '{}' to '{}'\n",
            style("✓").green(),
            style(&chat.name).dim(),
            style(name).bold()
        );
    }
    Ok(())
}

pub async fn delete_chat(
    state: &AppState,
    reference: &str,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let chat = resolve_chat(state, reference).await?;

    if !force {
        println!(
            "\n  {} This deletes '{}' and its whole history. Re-run with {} to confirm.\n",
            style("!").yellow().bold(),
            style(&chat.name).bold(),
            style("--force").cyan()
        );
        return Ok(());
    }

    let next = state.chat_store().delete_chat(&chat.id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": chat.id, "current": next.id})
        );
    } else {
        println!(
            "\n  {} Deleted '{}'; '{}' is now current\n",
            style("✓").green(),
            style(&chat.name).dim(),
            style(&next.name).bold()
        );
    }
    Ok(())
}

pub async fn clear_chat(state: &AppState, reference: &str, json: bool) -> anyhow::Result<()> {
    let chat = resolve_chat(state, reference).await?;
    state.chat_store().clear_history(&chat.id).await?;

    if json {
        println!("{}", serde_json::json!({"cleared": chat.id}));
    } else {
        println!(
            "\n  {} Cleared history of '{}'\n",
            style("✓").green(),
            style(&chat.name).bold()
        );
    }
    Ok(())
}
