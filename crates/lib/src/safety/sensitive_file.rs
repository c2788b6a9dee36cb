//! Sensitive environment file check (`.env` and friends, but never `.env.sample`).

use regex::Regex;
use std::sync::LazyLock;

use crate::hook::input::ToolInvocationRequest;

const ENV_MARKER: &str = ".env";
const TEMPLATE_SUFFIX: &str = ".env.sample";

/// A `.env` token that ends at a word boundary (`.env`, `.env.local`, `app.env`),
/// so `.envrc` and `dotenv` are not mentions.
static ENV_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.env\b").expect("env mention pattern"));

/// True if the request would touch a sensitive environment file.
///
/// File tools are judged on `file_path`, `Bash` on the command text. Every other
/// tool name is ignored.
pub fn is_env_file_access(request: &ToolInvocationRequest) -> bool {
    if request.is_file_tool() {
        return is_sensitive_path(request.file_path());
    }
    if request.is_bash() {
        return mentions_env_file(request.command());
    }
    false
}

/// Path rule for file tools: any `.env` substring, except a `.env.sample` template.
pub fn is_sensitive_path(path: &str) -> bool {
    path.contains(ENV_MARKER) && !path.ends_with(TEMPLATE_SUFFIX)
}

/// Command rule: any `.env` mention not immediately continued by `.sample`.
///
/// Covers direct mention as well as `cat .env`, `echo x > .env`, `touch`, `cp`
/// and `mv`, since all of them name the file.
pub fn mentions_env_file(command: &str) -> bool {
    ENV_MENTION
        .find_iter(command)
        .any(|m| !command[m.end()..].starts_with(".sample"))
}
