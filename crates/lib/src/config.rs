//! Notification configuration types and loading.
//!
//! Config is loaded once from a JSON file (e.g. `~/.hookguard/tts_config.json`) and
//! passed by reference to whatever needs it. A missing or corrupted file yields the
//! defaults: notifications must never fail because of their config.
//!
//! The local engine provider is called `offline`; configs written for the older
//! `pyttsx3` name still work, in `providers` and in `provider_priority`. Its
//! `voice_index` setting is kept for file compatibility but not used: the engines
//! speak with their default voice.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Provider names understood by the config.
pub const ELEVENLABS: &str = "elevenlabs";
pub const OPENAI: &str = "openai";
pub const OFFLINE: &str = "offline";

/// Former name of the [`OFFLINE`] provider.
pub const OFFLINE_LEGACY: &str = "pyttsx3";

/// Map a legacy provider name to its current one.
pub fn canonical_provider(name: &str) -> &str {
    if name == OFFLINE_LEGACY {
        OFFLINE
    } else {
        name
    }
}

/// Top-level speech notification config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Master switch for all speech notifications.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Playback volume, 0.0 to 1.0. Read through [`TtsConfig::volume`], which clamps.
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Providers in order of preference.
    #[serde(default = "default_provider_priority")]
    pub provider_priority: Vec<String>,

    /// Per-provider settings keyed by provider name.
    #[serde(default = "default_providers")]
    pub providers: BTreeMap<String, ProviderConfig>,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub quiet_hours: QuietHoursConfig,
}

/// One provider: an enabled flag plus free-form settings (voice, model, rate, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ProviderConfig {
    fn with(enabled: bool, settings: Value) -> Self {
        Self {
            enabled,
            settings: settings.as_object().cloned().unwrap_or_default(),
        }
    }

    /// Integer setting, if present and numeric.
    pub fn u64_setting(&self, key: &str) -> Option<u64> {
        self.settings.get(key).and_then(|v| v.as_u64())
    }

    pub fn str_setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }
}

/// Which events produce a spoken notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub on_task_complete: bool,
    #[serde(default = "default_true")]
    pub on_user_input_needed: bool,
    #[serde(default = "default_true")]
    pub on_subagent_complete: bool,
    #[serde(default)]
    pub on_error: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            on_task_complete: true,
            on_user_input_needed: true,
            on_subagent_complete: true,
            on_error: false,
        }
    }
}

/// Daily window (local time, `HH:MM`) during which notifications stay silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuietHoursConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_quiet_start")]
    pub start: String,
    #[serde(default = "default_quiet_end")]
    pub end: String,
}

impl Default for QuietHoursConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start: default_quiet_start(),
            end: default_quiet_end(),
        }
    }
}

/// Events a notification can be raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    TaskComplete,
    UserInput,
    SubagentComplete,
    Error,
}

impl NotificationEvent {
    /// Parse an event name (`task_complete`, `user_input`, `subagent_complete`, `error`;
    /// dashes are accepted in place of underscores).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().replace('-', "_").as_str() {
            "task_complete" => Some(Self::TaskComplete),
            "user_input" => Some(Self::UserInput),
            "subagent_complete" => Some(Self::SubagentComplete),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Event for a command-line name. Unknown names map to `None`, which always
    /// notifies (subject to the master switch and quiet hours).
    pub fn from_arg(name: &str) -> Option<Self> {
        let event = Self::from_name(name);
        if event.is_none() {
            log::debug!("unknown notification event {:?}, treating as generic", name);
        }
        event
    }
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f64 {
    0.7
}

fn default_provider_priority() -> Vec<String> {
    vec![ELEVENLABS.to_string(), OFFLINE.to_string()]
}

fn default_providers() -> BTreeMap<String, ProviderConfig> {
    let mut providers = BTreeMap::new();
    providers.insert(
        ELEVENLABS.to_string(),
        ProviderConfig::with(
            true,
            serde_json::json!({ "voice_id": "default", "model": "eleven_monolingual_v1" }),
        ),
    );
    providers.insert(
        OPENAI.to_string(),
        ProviderConfig::with(false, serde_json::json!({ "voice": "alloy", "model": "tts-1" })),
    );
    providers.insert(
        OFFLINE.to_string(),
        ProviderConfig::with(true, serde_json::json!({ "rate": 150, "voice_index": 0 })),
    );
    providers
}

fn default_quiet_start() -> String {
    "22:00".to_string()
}

fn default_quiet_end() -> String {
    "08:00".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            provider_priority: default_provider_priority(),
            providers: default_providers(),
            notifications: NotificationsConfig::default(),
            quiet_hours: QuietHoursConfig::default(),
        }
    }
}

/// Environment variable holding the API key a provider needs, if any.
pub fn provider_api_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        ELEVENLABS => Some("ELEVENLABS_API_KEY"),
        OPENAI => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

impl TtsConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured volume clamped to [0.0, 1.0].
    pub fn volume(&self) -> f64 {
        if self.volume.is_nan() {
            return default_volume();
        }
        self.volume.clamp(0.0, 1.0)
    }

    /// False when speech is globally disabled or the provider is unknown.
    pub fn is_provider_enabled(&self, provider: &str) -> bool {
        self.enabled && self.provider_config(provider).is_some_and(|p| p.enabled)
    }

    /// Settings for `provider`; the offline provider is also found under its legacy key.
    pub fn provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        let provider = canonical_provider(provider);
        self.providers.get(provider).or_else(|| {
            if provider == OFFLINE {
                self.providers.get(OFFLINE_LEGACY)
            } else {
                None
            }
        })
    }

    /// True if `time` falls inside the quiet window. Windows whose start is later
    /// than their end wrap past midnight. Bounds are inclusive; an unparsable
    /// window is never quiet.
    pub fn is_quiet_at(&self, time: NaiveTime) -> bool {
        let q = &self.quiet_hours;
        if !q.enabled {
            return false;
        }
        let (Ok(start), Ok(end)) = (
            NaiveTime::parse_from_str(q.start.trim(), "%H:%M"),
            NaiveTime::parse_from_str(q.end.trim(), "%H:%M"),
        ) else {
            log::debug!("ignoring unparsable quiet hours {}-{}", q.start, q.end);
            return false;
        };
        if start > end {
            time >= start || time <= end
        } else {
            start <= time && time <= end
        }
    }

    /// Whether `event` should be announced at local time `time`.
    pub fn should_notify_at(&self, event: Option<NotificationEvent>, time: NaiveTime) -> bool {
        if !self.enabled || self.is_quiet_at(time) {
            return false;
        }
        let n = &self.notifications;
        match event {
            Some(NotificationEvent::TaskComplete) => n.on_task_complete,
            Some(NotificationEvent::UserInput) => n.on_user_input_needed,
            Some(NotificationEvent::SubagentComplete) => n.on_subagent_complete,
            Some(NotificationEvent::Error) => n.on_error,
            None => true,
        }
    }

    /// [`Self::should_notify_at`] for the current local time.
    pub fn should_notify(&self, event: Option<NotificationEvent>) -> bool {
        self.should_notify_at(event, chrono::Local::now().time())
    }

    /// First enabled provider in priority order whose API key (if it needs one) is
    /// available through `lookup_env`.
    pub fn preferred_provider_with<F>(&self, lookup_env: F) -> Option<&str>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.enabled {
            return None;
        }
        self.provider_priority
            .iter()
            .map(|p| canonical_provider(p))
            .filter(|p| self.is_provider_enabled(p))
            .find(|p| match provider_api_key_var(p) {
                Some(var) => lookup_env(var).is_some_and(|v| !v.trim().is_empty()),
                None => true,
            })
    }

    /// [`Self::preferred_provider_with`] against the process environment.
    pub fn preferred_provider(&self) -> Option<&str> {
        self.preferred_provider_with(|k| std::env::var(k).ok())
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("HOOKGUARD_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".hookguard").join("tts_config.json"))
                .unwrap_or_else(|| PathBuf::from("tts_config.json"))
        })
}

/// Load config from `path` (or the default path). Missing or corrupted file => defaults.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> (TtsConfig, PathBuf) {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return (TtsConfig::default(), path);
    }
    match read_config(&path) {
        Ok(config) => (config, path),
        Err(e) => {
            log::warn!("{:#}; using defaults", e);
            (TtsConfig::default(), path)
        }
    }
}

fn read_config(path: &Path) -> Result<TtsConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
