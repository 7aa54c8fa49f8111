//! Answer timing measured on the client.
//!
//! The server enforces time limits; the elapsed value sent along with an
//! answer is informational only.

use std::time::Instant;

/// Remembers when the current question was shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestionTimer {
    shown_at: Option<Instant>,
}

impl QuestionTimer {
    /// Start timing a freshly received question.
    pub fn start(&mut self, now: Instant) {
        self.shown_at = Some(now);
    }

    /// Whole seconds between the question being shown and `now`.
    ///
    /// Never negative: a `now` earlier than the start counts as zero, as does
    /// a timer that was never started.
    pub fn elapsed_secs(&self, now: Instant) -> u32 {
        let Some(shown_at) = self.shown_at else {
            return 0;
        };

        let secs = now.saturating_duration_since(shown_at).as_secs();
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}
