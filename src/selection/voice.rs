//! Mapping of final speech transcripts to selection commands.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    Confirm,
    Cancel,
    /// 1-based ordinal; range checking is left to the caller.
    Select(usize),
}

const NUMBER_WORDS: [(&str, usize); 9] = [
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
];

/// Parse a transcript such as "click three", "select 2" or "cancel".
///
/// "confirm" is recognised only while a confirmation is pending. Words are
/// matched whole, so "someone" does not select 1.
pub fn parse_voice_command(transcript: &str, awaiting_confirmation: bool) -> Option<VoiceCommand> {
    let lower = transcript.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();

    if awaiting_confirmation && tokens.contains(&"confirm") {
        return Some(VoiceCommand::Confirm);
    }

    if tokens.iter().any(|token| *token == "cancel" || *token == "stop") {
        return Some(VoiceCommand::Cancel);
    }

    let word = tokens.iter().find_map(|token| {
        NUMBER_WORDS
            .iter()
            .find(|(word, _)| word == token)
            .map(|(_, number)| *number)
    });
    if let Some(number) = word {
        return Some(VoiceCommand::Select(number));
    }

    tokens
        .iter()
        .find(|token| token.chars().all(|c| c.is_ascii_digit()))
        .and_then(|digits| digits.parse::<usize>().ok())
        .filter(|number| *number > 0)
        .map(VoiceCommand::Select)
}
