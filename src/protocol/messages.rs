//! Protocol messages for client-server communication.
//!
//! All messages are serialized as JSON over WebSocket, one object per text
//! frame, tagged by a `type` field.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Configure and start a new game.
    CreateTrivia(CreateTrivia),

    /// Answer the current question.
    Answer(Answer),
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Next question to answer.
    Question(Question),

    /// Verdict for the last submitted answer.
    AnswerResult(AnswerResult),

    /// Running scores for every player.
    ScoreUpdate(ScoreUpdate),

    /// Game is over.
    GameEnd(GameEnd),
}

impl ServerMessage {
    /// The discriminator this message is tagged with on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            ServerMessage::Question(_) => "Question",
            ServerMessage::AnswerResult(_) => "AnswerResult",
            ServerMessage::ScoreUpdate(_) => "ScoreUpdate",
            ServerMessage::GameEnd(_) => "GameEnd",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrivia {
    pub mode: GameMode,
    pub questions: u32,
    pub categories: Vec<Category>,
    pub difficulty: Difficulty,
    /// Seconds per question, 0 for no limit.
    pub time_limit: u32,
    pub turn_mode: TurnMode,
    pub player_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    /// 0-based index into the question's options.
    pub selected_option: usize,
    /// Whole seconds since the question was shown, measured locally.
    pub time_elapsed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// 1-based position within the game.
    pub index: u32,
    pub total: u32,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub correct: bool,
    pub points: i32,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub players: Vec<PlayerScore>,
}

/// Running score of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub name: String,
    pub score: i32,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEnd {
    pub winner: Option<String>,
    pub final_scores: Vec<FinalScore>,
    #[serde(default)]
    pub correct_answers: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub name: String,
    pub score: i32,
}

/// Declares a wire enum whose tags are SCREAMING_SNAKE_CASE and which parses
/// case-insensitively from the same names.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(&wanted))
                    .ok_or_else(|| {
                        let names: Vec<_> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} `{}`, expected one of {}", stringify!($name), s, names.join(", "))
                    })
            }
        }
    };
}

wire_enum! {
    /// Who plays.
    GameMode {
        /// Single player against the server.
        Pve => "PVE",
        /// Two players taking turns.
        Pvp => "PVP",
    }
}

wire_enum! {
    Difficulty {
        Easy => "EASY",
        Medium => "MEDIUM",
        Hard => "HARD",
        /// Let the server pick per question.
        Mixed => "MIXED",
    }
}

wire_enum! {
    /// When control passes to the next player in two-player games.
    TurnMode {
        Timed => "TIMED",
    }
}

wire_enum! {
    Category {
        Science => "SCIENCE",
        History => "HISTORY",
        Geography => "GEOGRAPHY",
        Art => "ART",
        ArtLiterature => "ART_LITERATURE",
        Entertainment => "ENTERTAINMENT",
        Technology => "TECHNOLOGY",
        Sports => "SPORTS",
        General => "GENERAL",
    }
}

/// Checks a game request before it is sent.
///
/// Returns `Ok(())` if valid, or `Err` with an error message.
pub fn validate_create_trivia(request: &CreateTrivia) -> Result<(), &'static str> {
    if request.categories.is_empty() {
        return Err("At least one category must be selected");
    }

    if request.questions == 0 {
        return Err("A game needs at least one question");
    }

    if request.player_name.trim().is_empty() {
        return Err("Player name must not be empty");
    }

    Ok(())
}

/// Checks that `selected_option` points into `question`'s options.
pub fn validate_answer(question: &Question, selected_option: usize) -> Result<(), &'static str> {
    if selected_option >= question.options.len() {
        return Err("Selected option is out of range");
    }

    Ok(())
}
