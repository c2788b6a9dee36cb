//! Local speech engines, run as child processes with an argument list (no shell).

use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

use crate::config::{TtsConfig, OFFLINE};

const DEFAULT_RATE: u64 = 150;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("no speech engine found on PATH (tried {0})")]
    NoEngine(String),
    #[error("{engine} failed: {message}")]
    Failed { engine: &'static str, message: String },
    #[error("{0} timed out")]
    Timeout(&'static str),
}

/// A speech binary and how to pass rate and volume to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Espeak,
    EspeakNg,
    Say,
}

/// Engines in the order they are tried.
pub const ENGINES: [Engine; 3] = [Engine::Espeak, Engine::EspeakNg, Engine::Say];

impl Engine {
    pub fn binary(self) -> &'static str {
        match self {
            Engine::Espeak => "espeak",
            Engine::EspeakNg => "espeak-ng",
            Engine::Say => "say",
        }
    }

    /// Argument list for speaking `text` at `rate` words per minute and `volume` in [0, 1].
    pub fn args(self, text: &str, rate: u64, volume: f64) -> Vec<String> {
        match self {
            Engine::Espeak | Engine::EspeakNg => {
                // espeak amplitude is 0..=200, 100 being normal
                let amplitude = (volume.clamp(0.0, 1.0) * 200.0).round() as u32;
                vec![
                    "-s".to_string(),
                    rate.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                    text.to_string(),
                ]
            }
            Engine::Say => vec!["-r".to_string(), rate.to_string(), text.to_string()],
        }
    }

    fn locate(self) -> Option<PathBuf> {
        which::which(self.binary()).ok()
    }
}

/// Speaks text with the first working local engine. Built from the loaded config.
#[derive(Debug, Clone)]
pub struct Speaker {
    rate: u64,
    volume: f64,
    timeout: Duration,
    engines: Vec<Engine>,
}

impl Speaker {
    pub fn from_config(config: &TtsConfig) -> Self {
        let rate = config
            .provider_config(OFFLINE)
            .and_then(|p| p.u64_setting("rate"))
            .unwrap_or(DEFAULT_RATE);
        Self {
            rate,
            volume: config.volume(),
            timeout: DEFAULT_TIMEOUT,
            engines: ENGINES.to_vec(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_engines(mut self, engines: Vec<Engine>) -> Self {
        self.engines = engines;
        self
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Speak `text`, falling back through the engine list. Returns the engine used.
    pub async fn speak(&self, text: &str) -> Result<Engine, SpeechError> {
        let mut last_err = None;
        for &engine in &self.engines {
            let Some(path) = engine.locate() else {
                log::debug!("{} not on PATH", engine.binary());
                continue;
            };
            match self.run(engine, path, text).await {
                Ok(()) => return Ok(engine),
                Err(e) => {
                    log::warn!("{}, trying next engine", e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            let tried: Vec<_> = self.engines.iter().map(|e| e.binary()).collect();
            SpeechError::NoEngine(tried.join(", "))
        }))
    }

    async fn run(&self, engine: Engine, path: PathBuf, text: &str) -> Result<(), SpeechError> {
        let mut cmd = Command::new(path);
        cmd.args(engine.args(text, self.rate, self.volume))
            .kill_on_drop(true);
        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| SpeechError::Timeout(engine.binary()))?
            .map_err(|e| SpeechError::Failed {
                engine: engine.binary(),
                message: e.to_string(),
            })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(SpeechError::Failed {
            engine: engine.binary(),
            message: format!("exit {}: {}", output.status, stderr.trim()),
        })
    }
}
