//! Command safety classifier: decides whether a proposed tool call is blocked.
//!
//! Pure and stateless. The sensitive-file check runs first for every tool;
//! `Bash` commands then go through the category checks in a fixed order and
//! the first match names the block reason.

pub mod rules;
pub mod sensitive_file;

use std::fmt;

use crate::hook::input::ToolInvocationRequest;

/// Why a request was blocked. One variant per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    SensitiveFile,
    Deletion,
    EnvExposure,
    DiskDamage,
    DownloadExecute,
    SystemControl,
    PermissionChange,
    GitDestructive,
    PackageRemoval,
}

impl Category {
    /// Short machine-friendly label (used in logs and `check` output).
    pub fn label(self) -> &'static str {
        match self {
            Category::SensitiveFile => "sensitive-file",
            Category::Deletion => "deletion",
            Category::EnvExposure => "env-exposure",
            Category::DiskDamage => "disk-damage",
            Category::DownloadExecute => "download-execute",
            Category::SystemControl => "system-control",
            Category::PermissionChange => "permission-change",
            Category::GitDestructive => "git-destructive",
            Category::PackageRemoval => "package-removal",
        }
    }

    /// Headline shown to the invoking agent.
    pub fn headline(self) -> &'static str {
        match self {
            Category::SensitiveFile => {
                "BLOCKED: Access to .env files containing sensitive data is prohibited"
            }
            Category::Deletion => "BLOCKED: Dangerous rm command detected and prevented",
            Category::EnvExposure => "BLOCKED: Command could expose sensitive environment variables",
            Category::DiskDamage => "BLOCKED: Command could damage disk or filesystem",
            Category::DownloadExecute => "BLOCKED: Download-and-execute pattern detected",
            Category::SystemControl => "BLOCKED: System control command detected",
            Category::PermissionChange => "BLOCKED: Dangerous permission change detected",
            Category::GitDestructive => "BLOCKED: Destructive git operation detected",
            Category::PackageRemoval => "BLOCKED: Package removal command detected",
        }
    }

    /// Follow-up line explaining the policy.
    pub fn detail(self) -> &'static str {
        match self {
            Category::SensitiveFile => "Use .env.sample for template files instead",
            Category::Deletion => "File deletion (rm, rmdir, unlink) cannot be undone and is prohibited",
            Category::EnvExposure => "Environment variable access is prohibited for security",
            Category::DiskDamage => "Disk operations like dd, mkfs, fdisk are prohibited",
            Category::DownloadExecute => "Piping downloads directly to interpreters is prohibited",
            Category::SystemControl => "Commands that could affect system stability are prohibited",
            Category::PermissionChange => "Unsafe chmod/chown operations are prohibited",
            Category::GitDestructive => {
                "Force push, hard reset, and history rewriting are prohibited"
            }
            Category::PackageRemoval => "Removing system packages or tools is prohibited",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.headline(), self.detail())
    }
}

/// Classifier verdict. A block always carries exactly one reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Block(Category),
}

impl Decision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Block(_))
    }

    pub fn reason(&self) -> Option<Category> {
        match self {
            Decision::Allow => None,
            Decision::Block(category) => Some(*category),
        }
    }
}

/// Bash category checks in priority order.
pub const COMMAND_CHECKS: [(Category, fn(&str) -> bool); 8] = [
    (Category::Deletion, rules::is_deletion),
    (Category::EnvExposure, rules::is_env_exposure),
    (Category::DiskDamage, rules::is_disk_damage),
    (Category::DownloadExecute, rules::is_download_execute),
    (Category::SystemControl, rules::is_system_control),
    (Category::PermissionChange, rules::is_permission_change),
    (Category::GitDestructive, rules::is_git_destructive),
    (Category::PackageRemoval, rules::is_package_removal),
];

/// First matching category for a raw shell command, if any.
pub fn classify_command(command: &str) -> Option<Category> {
    let normalized = rules::normalize(command);
    COMMAND_CHECKS
        .iter()
        .find(|(_, check)| check(&normalized))
        .map(|(category, _)| *category)
}

/// Decide whether `request` may proceed.
pub fn classify(request: &ToolInvocationRequest) -> Decision {
    if sensitive_file::is_env_file_access(request) {
        return Decision::Block(Category::SensitiveFile);
    }
    if request.is_bash() {
        if let Some(category) = classify_command(request.command()) {
            return Decision::Block(category);
        }
    }
    Decision::Allow
}
