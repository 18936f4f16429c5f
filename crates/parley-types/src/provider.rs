//! Provider identifiers and the assistant display identity they imply.
//!
//! The backend exposes providers by uppercase name (`STACKSPOT`, `OPENAI`).
//! The display name shown as the message sender is derived from the active
//! provider and model.

/// Default provider when nothing has been persisted yet.
pub const DEFAULT_PROVIDER: &str = "STACKSPOT";

/// Default model when the host supplies none.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Resolve the assistant's display name from the active provider and model.
///
/// Unknown providers fall back to a generic label so the sender column is
/// never empty.
pub fn assistant_display_name(provider: &str, model: &str) -> &'static str {
    match provider {
        "STACKSPOT" => "StackSpotAI",
        "OPENAI" => match model {
            "gpt-4" => "GPT-4",
            "gpt-3.5-turbo" => "ChatGPT",
            "gpt-4o-mini" => "GPT-4o-mini",
            _ => "OpenAI Assistant",
        },
        _ => "Assistant",
    }
}
