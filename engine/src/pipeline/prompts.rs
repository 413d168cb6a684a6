//! Prompt templates, decision parsing and user-facing fallback replies

/// Returned when a run is attempted without a live chat session
pub const MISSING_SESSION_REPLY: &str = "Low-key, chat session is MIA. Try refreshing? 💀";

/// Returned when the translation stage fails
pub const TRANSLATION_FAILED_REPLY: &str = "Sorry, translation mein kuch issue aa gaya. 😥";

/// Returned when the response stage fails
pub const RESPONSE_FAILED_REPLY: &str = "Low-key, AI se connect nahi ho pa raha. Try again later?";

/// Output of the search stage when the decision was NO
pub const SEARCH_SKIPPED_OUTPUT: &str = "Search not required for this query.";

pub fn translation_prompt(query: &str) -> String {
    format!(
        "Translate the following Hinglish message to simple, clear English. Only provide the translation. Message: \"{}\"",
        query
    )
}

pub fn decision_prompt(translated: &str) -> String {
    format!(
        "Does the following query require real-time information from the web (e.g., about recent events, scores, weather, stock prices)? Answer only with YES or NO.\n\nQuery: \"{}\"",
        translated
    )
}

/// Instruction for the response stage when search produced something
pub fn augmented_instruction(search_result: &str, original_query: &str) -> String {
    format!(
        "Here's some info from a web search: \"{}\".\n\nNow, answer my original question in a friendly, Gen-Z Hinglish tone: \"{}\"",
        search_result, original_query
    )
}

/// True if the reply contains `YES` anywhere, ignoring case.
pub fn needs_search(decision_reply: &str) -> bool {
    decision_reply.trim().to_uppercase().contains("YES")
}

pub fn decision_output(needs_search: bool) -> String {
    format!(
        "Requires Search: {}",
        if needs_search { "YES" } else { "NO" }
    )
}
