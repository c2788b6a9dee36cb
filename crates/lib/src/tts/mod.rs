//! Spoken notifications through a local speech engine.
//!
//! Online providers (ElevenLabs, OpenAI) only exist in configuration; speech is
//! always produced offline by the first engine found on PATH.

mod engine;

pub use engine::{Engine, SpeechError, Speaker, ENGINES};

/// Phrases used when no text is given.
pub const COMPLETION_MESSAGES: &[&str] = &[
    "Work complete!",
    "All done!",
    "Task finished!",
    "Job complete!",
    "Ready for next task!",
];

/// Pick a completion phrase at random; falls back to the first on RNG failure.
pub fn random_completion_message() -> &'static str {
    let mut buf = [0u8; 1];
    let idx = match getrandom::getrandom(&mut buf) {
        Ok(()) => buf[0] as usize % COMPLETION_MESSAGES.len(),
        Err(e) => {
            log::debug!("getrandom failed: {}", e);
            0
        }
    };
    COMPLETION_MESSAGES[idx]
}

/// Text to speak: the joined arguments, else trimmed `stdin_text`, else a random
/// completion phrase.
pub fn resolve_text(args: &[String], stdin_text: Option<&str>) -> String {
    if !args.is_empty() {
        return args.join(" ");
    }
    match stdin_text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => random_completion_message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_prefers_args_then_stdin() {
        let args = vec!["build".to_string(), "finished".to_string()];
        assert_eq!(resolve_text(&args, Some("ignored")), "build finished");
        assert_eq!(resolve_text(&[], Some("  from stdin \n")), "from stdin");
    }

    #[test]
    fn empty_input_uses_completion_phrase() {
        let text = resolve_text(&[], Some("   "));
        assert!(COMPLETION_MESSAGES.contains(&text.as_str()));
        let text = resolve_text(&[], None);
        assert!(COMPLETION_MESSAGES.contains(&text.as_str()));
    }
}
