//! Pre-tool-use hook: read one JSON request, classify it, audit it if allowed.
//!
//! Fail-open: anything that goes wrong here resolves to [`HookOutcome::Allow`].
//! Only a policy match blocks.

use serde_json::Value;
use std::io::Read;

use super::input::ToolInvocationRequest;
use crate::audit::AuditLog;
use crate::safety::{self, Category, Decision};

/// Exit status that tells the runtime the tool call was intentionally blocked.
pub const BLOCK_EXIT_CODE: i32 = 2;

/// Hook name; also the audit log file stem.
pub const PRE_TOOL_USE: &str = "pre_tool_use";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Allow,
    Block(Category),
}

impl HookOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            HookOutcome::Allow => 0,
            HookOutcome::Block(_) => BLOCK_EXIT_CODE,
        }
    }

    /// Message for the error stream; empty on allow.
    pub fn message(&self) -> Option<String> {
        match self {
            HookOutcome::Allow => None,
            HookOutcome::Block(category) => Some(category.to_string()),
        }
    }
}

/// Run the hook over `input`. Allowed requests are appended verbatim to `audit`;
/// blocked ones are not. Audit failures are logged at debug and otherwise ignored,
/// so an allowed call never produces output.
pub fn run_pre_tool_use<R: Read>(mut input: R, audit: &AuditLog) -> HookOutcome {
    let mut raw = String::new();
    if let Err(e) = input.read_to_string(&mut raw) {
        log::debug!("could not read hook input: {}", e);
        return HookOutcome::Allow;
    }
    let value: Value = match serde_json::from_str(&raw) {
        Ok(v @ Value::Object(_)) => v,
        Ok(_) => {
            log::debug!("hook input is not a JSON object, allowing");
            return HookOutcome::Allow;
        }
        Err(e) => {
            log::debug!("hook input is not valid JSON ({}), allowing", e);
            return HookOutcome::Allow;
        }
    };

    let request = ToolInvocationRequest::from_value(&value);
    let decision = safety::classify(&request);

    match decision {
        Decision::Allow => {
            log::debug!("allowed {} request", request.tool_name);
            if let Err(e) = audit.append(&value) {
                log::debug!("failed to write audit log: {}", e);
            }
            HookOutcome::Allow
        }
        Decision::Block(category) => {
            log::info!("blocked {} request: {}", request.tool_name, category.label());
            HookOutcome::Block(category)
        }
    }
}
