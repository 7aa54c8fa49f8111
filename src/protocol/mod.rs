//! Wire protocol shared with the trivia server.

mod codec;
mod messages;

pub use codec::{decode, encode, TYPE_FIELD};
pub use messages::{
    validate_answer, validate_create_trivia, Answer, AnswerResult, Category, ClientMessage,
    CreateTrivia, Difficulty, FinalScore, GameEnd, GameMode, PlayerScore, Question, ScoreUpdate,
    ServerMessage, TurnMode,
};
