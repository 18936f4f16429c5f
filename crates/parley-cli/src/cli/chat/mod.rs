//! Interactive chat session: input loop, slash commands, terminal pane.

pub mod commands;
pub mod loop_runner;
pub mod pane;
pub mod renderer;
