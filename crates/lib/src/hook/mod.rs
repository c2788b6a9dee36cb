//! Hook invocation contract: request model and the pre-tool-use runner.

pub mod input;
pub mod runner;

pub use input::ToolInvocationRequest;
pub use runner::{run_pre_tool_use, HookOutcome, BLOCK_EXIT_CODE, PRE_TOOL_USE};
