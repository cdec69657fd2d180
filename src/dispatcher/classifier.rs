//! Message classification heuristics
//!
//! Matching is token-exact and case-insensitive. Only `?` is stripped before
//! tokenizing; every other punctuation mark stays part of its token.

use serde::Serialize;

/// Tokens that mark an explicit weather question
pub const WEATHER_KEYWORDS: [&str; 4] = ["weather", "temperature", "degree", "climate"];

/// Tokens that are never read as a city name
pub const STOP_WORDS: [&str; 17] = [
    "hi", "hello", "hey", "thanks", "thank", "ok", "okay", "yes", "no", "please", "sorry", "help",
    "who", "what", "why", "how", "when",
];

/// What a message is asking for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Contains a weather keyword; `city` is the extracted candidate
    WeatherQuery { city: String },
    /// One or two words including a greeting, acknowledgement or question word
    SmallTalk,
    /// A single capitalized word, most likely someone's name
    ProbableName,
    /// One or two plain words that may name a city
    CandidateCity { city: String },
    /// Anything else
    General,
}

impl Intent {
    /// Label used in logs
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Intent::WeatherQuery { .. } => "weather_query",
            Intent::SmallTalk => "small_talk",
            Intent::ProbableName => "probable_name",
            Intent::CandidateCity { .. } => "candidate_city",
            Intent::General => "general",
        }
    }
}

/// A classified message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The message with surrounding whitespace removed, case preserved
    pub original: String,
    /// Lower-cased, `?`-stripped, whitespace-split tokens
    pub tokens: Vec<String>,
    pub intent: Intent,
}

/// Trim, lower-case, drop `?` and split on whitespace
#[must_use]
pub fn tokenize(message: &str) -> Vec<String> {
    message
        .trim()
        .to_lowercase()
        .replace('?', "")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Pick the city candidate of a weather question: the token after the first
/// `in`, else the token after the first `of`, else the last token.
#[must_use]
pub fn extract_city(tokens: &[String]) -> Option<String> {
    let following = |marker: &str| {
        tokens
            .iter()
            .position(|token| token == marker)
            .and_then(|index| tokens.get(index + 1))
    };

    following("in")
        .or_else(|| following("of"))
        .or_else(|| tokens.last())
        .cloned()
}

fn is_weather_keyword(token: &str) -> bool {
    WEATHER_KEYWORDS.contains(&token)
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

fn is_word(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphabetic)
}

/// Classify a raw message. The first matching rule wins.
#[must_use]
pub fn classify(message: &str) -> Classification {
    let original = message.trim().to_string();
    let tokens = tokenize(message);
    let intent = classify_tokens(&original, &tokens);

    Classification {
        original,
        tokens,
        intent,
    }
}

fn classify_tokens(original: &str, tokens: &[String]) -> Intent {
    if tokens.iter().any(|token| is_weather_keyword(token)) {
        if let Some(city) = extract_city(tokens) {
            return Intent::WeatherQuery { city };
        }
    }

    let short_plain_words =
        !tokens.is_empty() && tokens.len() <= 2 && tokens.iter().all(|token| is_word(token));
    if !short_plain_words {
        return Intent::General;
    }

    if tokens.iter().any(|token| is_stop_word(token)) {
        return Intent::SmallTalk;
    }

    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if tokens.len() == 1 && starts_upper {
        return Intent::ProbableName;
    }

    Intent::CandidateCity {
        city: tokens.join(" "),
    }
}
