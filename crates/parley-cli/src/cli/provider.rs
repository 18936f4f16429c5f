//! Provider command: show or switch the backend's active provider.
//!
//! Switching asks the backend first; only a successful `POST
//! /change-provider` persists the new selection locally and reloads the
//! assistant identity derived from it. A rejected switch surfaces the
//! response body as the error message.

use console::style;

use parley_core::exchange::client::BackendTransport;
use parley_infra::http::backend::HttpBackend;
use parley_types::provider::assistant_display_name;

use crate::state::AppState;

pub async fn provider(state: &AppState, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let profile = state.profile();

    let Some(name) = name else {
        let current = profile.provider().await?;
        let assistant = assistant_display_name(&current, &state.model);
        if json {
            println!(
                "{}",
                serde_json::json!({"provider": current, "assistant": assistant})
            );
        } else {
            println!(
                "\n  Provider: {}  (assistant: {})\n",
                style(&current).bold(),
                style(assistant).cyan()
            );
        }
        return Ok(());
    };

    let backend = HttpBackend::new(state.backend_url.clone());
    match backend.change_provider(name).await {
        Ok(()) => {
            profile.set_provider(name).await?;
            let assistant = assistant_display_name(name, &state.model);
            if json {
                println!(
                    "{}",
                    serde_json::json!({"provider": name, "assistant": assistant})
                );
            } else {
                println!(
                    "\n  {} Switched to {} -- you are now talking to {}\n",
                    style("✓").green(),
                    style(name).bold(),
                    style(assistant).cyan()
                );
            }
        }
        Err(error) => {
            println!(
                "\n  {} Could not switch provider: {}\n",
                style("!").red().bold(),
                error
            );
        }
    }
    Ok(())
}
