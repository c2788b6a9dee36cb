//! hookguard — pre-execution guard hooks for agent tool calls.
//!
//! The [`safety`] classifier decides allow/block for a proposed tool call; [`hook`]
//! wraps it in the stdin/exit-status contract and [`audit`] records each request.
//! [`config`] and [`tts`] provide optional spoken notifications.

pub mod audit;
pub mod config;
pub mod hook;
pub mod init;
pub mod safety;
pub mod tts;
