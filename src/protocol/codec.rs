//! JSON text framing for protocol messages.

use serde_json::Value;

use crate::error::ProtocolError;

use super::messages::{ClientMessage, ServerMessage};

/// Name of the discriminator field carried by every message.
pub const TYPE_FIELD: &str = "type";

/// Decode one inbound text frame.
///
/// Unknown fields are ignored. An unknown discriminator, or a known one with
/// missing or mistyped fields, is an error.
pub fn decode(text: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(ProtocolError::Malformed("expected a JSON object".to_string()));
    };

    let tag = match object.get(TYPE_FIELD) {
        Some(Value::String(tag)) => tag.clone(),
        Some(_) | None => return Err(ProtocolError::MissingType),
    };

    // The set of known tags is whatever `ServerMessage` derives, so serde
    // reports an unrecognized one as an unknown variant.
    serde_json::from_value(value).map_err(|e| {
        let reason = e.to_string();
        if reason.starts_with("unknown variant") {
            ProtocolError::UnknownType(tag)
        } else {
            ProtocolError::InvalidFields {
                message_type: tag,
                reason,
            }
        }
    })
}

/// Encode one outbound command as a text frame.
pub fn encode(msg: &ClientMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Answer, Category};

    #[test]
    fn test_decode_question_ignores_unknown_fields() {
        let text = r#"{
            "type": "Question",
            "id": "q1",
            "question": "Which planet is the largest?",
            "options": ["Mars", "Jupiter", "Venus"],
            "index": 1,
            "total": 5,
            "category": "SCIENCE",
            "timeLimit": 10,
            "hint": "gas giant"
        }"#;

        let ServerMessage::Question(q) = decode(text).unwrap() else {
            panic!("expected a question");
        };
        assert_eq!(q.id, "q1");
        assert_eq!(q.options.len(), 3);
        assert_eq!(q.category, Category::Science);
        assert_eq!(q.time_limit, Some(10));
    }

    #[test]
    fn test_decode_question_without_time_limit() {
        let text = r#"{"type":"Question","id":"q2","question":"?","options":["A"],"index":2,"total":5,"category":"GENERAL"}"#;
        let ServerMessage::Question(q) = decode(text).unwrap() else {
            panic!("expected a question");
        };
        assert_eq!(q.time_limit, None);
    }

    #[test]
    fn test_decode_game_end_with_draw() {
        let text = r#"{
            "type": "GameEnd",
            "winner": null,
            "finalScores": [{"name": "Player1", "score": 300}, {"name": "Player2", "score": 300}],
            "correctAnswers": {"Player1": 3, "Player2": 3}
        }"#;

        let ServerMessage::GameEnd(end) = decode(text).unwrap() else {
            panic!("expected game end");
        };
        assert_eq!(end.winner, None);
        assert_eq!(end.final_scores.len(), 2);
        assert_eq!(end.correct_answers.get("Player2"), Some(&3));
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = decode(r#"{"type":"Chat","text":"hi"}"#).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("Chat".to_string()));
    }

    #[test]
    fn test_decode_every_variant_tag_is_known() {
        let frames = [
            r#"{"type":"Question","id":"q","question":"?","options":[],"index":1,"total":1,"category":"ART"}"#,
            r#"{"type":"AnswerResult","correct":true,"points":10,"explanation":""}"#,
            r#"{"type":"ScoreUpdate","players":[]}"#,
            r#"{"type":"GameEnd","winner":null,"finalScores":[]}"#,
        ];

        for frame in frames {
            let msg = decode(frame).unwrap();
            assert!(frame.contains(&format!("\"{}\"", msg.type_name())));
        }
    }

    #[test]
    fn test_decode_unknown_type_with_known_fields() {
        let err = decode(r#"{"type":"Question2","correct":true,"points":1,"explanation":""}"#)
            .unwrap_err();
        assert_eq!(err, ProtocolError::UnknownType("Question2".to_string()));
    }

    #[test]
    fn test_decode_missing_type() {
        assert_eq!(decode(r#"{"correct":true}"#).unwrap_err(), ProtocolError::MissingType);
        assert_eq!(decode(r#"{"type":7}"#).unwrap_err(), ProtocolError::MissingType);
    }

    #[test]
    fn test_decode_missing_or_mistyped_fields() {
        let err = decode(r#"{"type":"AnswerResult","correct":true}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFields { ref message_type, .. } if message_type == "AnswerResult"));

        let err = decode(r#"{"type":"AnswerResult","correct":"yes","points":1,"explanation":""}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFields { .. }));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode("not json").unwrap_err(), ProtocolError::Malformed(_)));
        assert!(matches!(decode("[1,2]").unwrap_err(), ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_encode_answer() {
        let text = encode(&ClientMessage::Answer(Answer {
            question_id: "q1".to_string(),
            selected_option: 1,
            time_elapsed: 4,
        }))
        .unwrap();
        assert!(text.contains("\"type\":\"Answer\""));
        assert!(text.contains("\"questionId\":\"q1\""));
    }
}
