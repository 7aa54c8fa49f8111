//! Client session state.
//!
//! `SessionState` is derived only from the server messages received since the
//! last reset. The client owns the single writer; everything else reads
//! snapshots.

use std::time::Instant;

use crate::protocol::{AnswerResult, GameEnd, Question, ScoreUpdate, ServerMessage};

use super::timing::QuestionTimer;

/// Score and streak of the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub score: i32,
    pub streak: u32,
}

/// Final outcome of a game, seen from the local player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// `None` on a draw or when there is no winner to report.
    pub winner: Option<String>,
    pub final_score: i32,
    pub correct_answers: u32,
}

/// Observable state of one game session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    current_question: Option<Question>,
    answer_result: Option<AnswerResult>,
    score: Option<Score>,
    game_end: Option<GameSummary>,
    time_limit: Option<u32>,
    last_message: Option<String>,
    timer: QuestionTimer,
}

impl SessionState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded server message into the state.
    ///
    /// `raw` is the frame text the message was decoded from and `now` is the
    /// instant it arrived.
    pub fn apply(&mut self, msg: ServerMessage, raw: &str, now: Instant) {
        self.last_message = Some(raw.to_string());

        match msg {
            ServerMessage::Question(question) => self.show_question(question, now),
            ServerMessage::AnswerResult(result) => {
                self.answer_result = Some(result);
            }
            ServerMessage::ScoreUpdate(update) => self.update_score(update),
            ServerMessage::GameEnd(end) => self.end_game(end),
        }
    }

    fn show_question(&mut self, question: Question, now: Instant) {
        // 0 and absent both mean no limit
        self.time_limit = question.time_limit.filter(|&secs| secs > 0);
        self.current_question = Some(question);
        self.answer_result = None;
        self.timer.start(now);
    }

    fn update_score(&mut self, update: ScoreUpdate) {
        // Single player: only the first record is ours.
        if let Some(player) = update.players.first() {
            self.score = Some(Score {
                score: player.score,
                streak: player.streak,
            });
        }
    }

    fn end_game(&mut self, end: GameEnd) {
        let player = end.final_scores.first();
        let correct_answers = player
            .and_then(|p| end.correct_answers.get(&p.name))
            .copied()
            .unwrap_or(0);

        self.game_end = Some(GameSummary {
            winner: end.winner,
            final_score: player.map(|p| p.score).unwrap_or(0),
            correct_answers,
        });
    }

    /// Drop everything, including the question timer.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Result for the current question, if it has arrived.
    pub fn answer_result(&self) -> Option<&AnswerResult> {
        self.answer_result.as_ref()
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn game_end(&self) -> Option<&GameSummary> {
        self.game_end.as_ref()
    }

    /// Seconds allowed for the current question, `None` when unlimited.
    pub fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    /// Raw text of the last message that was applied.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Whole seconds since the current question arrived.
    pub fn elapsed_secs(&self, now: Instant) -> u32 {
        self.timer.elapsed_secs(now)
    }

    /// True once a game has ended and no new game has started since.
    pub fn is_game_over(&self) -> bool {
        self.game_end.is_some()
    }
}
