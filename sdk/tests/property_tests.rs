use proptest::prelude::*;
use sdk::errors::{EngineError, ErrorExt};
use sdk::{ConversationTurn, Message, Sender};

// User hints never echo the raw error payload
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-zA-Z0-9_]{12,40}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::MissingApiKey(error_str.clone()),
            EngineError::LLMProvider(error_str.clone()),
            EngineError::Export(error_str.clone()),
            EngineError::Io(std::io::Error::other(error_str.clone())),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Conversation turns keep their text verbatim through JSON
proptest! {
    #[test]
    fn test_conversation_turn_json_is_verbatim(user in "\\PC*", bot in "\\PC*") {
        let turn = ConversationTurn::new(user.clone(), bot.clone());
        let value = serde_json::to_value(&turn).unwrap();

        prop_assert_eq!(value["user"].as_str().unwrap(), user.as_str());
        prop_assert_eq!(value["bot"].as_str().unwrap(), bot.as_str());
    }

    #[test]
    fn test_messages_get_distinct_ids(text in "\\PC{1,40}") {
        let a = Message::user(text.clone());
        let b = Message::bot(text);

        prop_assert_ne!(&a.id, &b.id);
        prop_assert_eq!(a.sender, Sender::User);
        prop_assert_eq!(b.sender, Sender::Bot);
    }
}
