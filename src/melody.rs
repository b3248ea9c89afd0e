//! Parsing of free-form melody-service replies into validated melodies.
//!
//! The service returns untrusted free text that is supposed to look like:
//!
//! ```text
//! MESSAGE: Happy plant!
//! MELODY: C4,0.5,E4,0.5,G4,0.5
//! ```
//!
//! Deviations are the norm, not the exception, so [`parse`] is total: every
//! input string, including empty or garbage bytes, produces a usable
//! (melody, message) pair. Recovery steps degrade field by field; the
//! [`ParseOutcome`] reports how much of the reply actually survived.

use tracing::{debug, warn};

use crate::models::ToneStep;

// ---

/// Character budget of one display line.
pub const MAX_MESSAGE_CHARS: usize = 16;

/// Message substituted when the reply carries none.
pub const DEFAULT_MESSAGE: &str = "Plant status updated";

/// Duration substituted for unparseable or non-positive durations.
pub const DEFAULT_NOTE_DURATION: f32 = 0.5;

/// How much of the reply survived parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Message and melody both parsed from the reply.
    Complete,
    /// Exactly one field parsed; the other was defaulted.
    Partial,
    /// Neither field found; both defaulted.
    Defaulted,
}

/// Result of parsing one reply. Always usable; never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    // ---
    pub melody: Vec<ToneStep>,
    pub message: String,
    pub outcome: ParseOutcome,
}

// ---

/// Equal-temperament pitch table, C3 through C7 with sharps, integer Hz.
/// `R` is a rest (0 Hz). Unknown tokens also resolve to rests.
const NOTE_TABLE: &[(&str, u32)] = &[
    ("C3", 131),
    ("C#3", 139),
    ("D3", 147),
    ("D#3", 156),
    ("E3", 165),
    ("F3", 175),
    ("F#3", 185),
    ("G3", 196),
    ("G#3", 208),
    ("A3", 220),
    ("A#3", 233),
    ("B3", 247),
    ("C4", 262),
    ("C#4", 277),
    ("D4", 294),
    ("D#4", 311),
    ("E4", 330),
    ("F4", 349),
    ("F#4", 370),
    ("G4", 392),
    ("G#4", 415),
    ("A4", 440),
    ("A#4", 466),
    ("B4", 494),
    ("C5", 523),
    ("C#5", 554),
    ("D5", 587),
    ("D#5", 622),
    ("E5", 659),
    ("F5", 698),
    ("F#5", 740),
    ("G5", 784),
    ("G#5", 831),
    ("A5", 880),
    ("A#5", 932),
    ("B5", 988),
    ("C6", 1047),
    ("C#6", 1109),
    ("D6", 1175),
    ("D#6", 1245),
    ("E6", 1319),
    ("F6", 1397),
    ("F#6", 1480),
    ("G6", 1568),
    ("G#6", 1661),
    ("A6", 1760),
    ("A#6", 1865),
    ("B6", 1976),
    ("C7", 2093),
    ("R", 0),
];

/// Look up a pitch name (already uppercased and trimmed).
fn note_frequency(token: &str) -> Option<u32> {
    // ---
    NOTE_TABLE
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, hz)| *hz)
}

/// The fallback melody: C4, E4, G4 at half a second each.
pub fn default_melody() -> Vec<ToneStep> {
    // ---
    vec![
        ToneStep::new(262, DEFAULT_NOTE_DURATION),
        ToneStep::new(330, DEFAULT_NOTE_DURATION),
        ToneStep::new(392, DEFAULT_NOTE_DURATION),
    ]
}

// ---

/// Parse a raw reply into a validated (melody, message) pair.
pub fn parse(raw: &str) -> ParsedReply {
    // ---
    let mut message_text = "";
    let mut melody_text = "";

    for line in raw.trim().lines() {
        if let Some(rest) = line.strip_prefix("MESSAGE:") {
            message_text = rest.trim();
        } else if let Some(rest) = line.strip_prefix("MELODY:") {
            melody_text = rest.trim();
        }
    }

    // Heuristic recovery: some replies skip the MELODY: marker and put the
    // note list on a bare line.
    if melody_text.is_empty() {
        for line in raw.trim().lines() {
            if line.contains(',')
                && line
                    .chars()
                    .any(|c| matches!(c, 'C' | 'D' | 'E' | 'F' | 'G' | 'A' | 'B' | 'R'))
            {
                debug!(line, "recovered melody from unmarked line");
                melody_text = line.trim();
                break;
            }
        }
    }

    let message_found = !message_text.is_empty();
    let message = if message_found {
        truncate_message(message_text)
    } else {
        truncate_message(DEFAULT_MESSAGE)
    };

    let (melody, melody_parsed) = match parse_melody(melody_text) {
        Some(steps) => (steps, true),
        None => (default_melody(), false),
    };

    let outcome = match (message_found, melody_parsed) {
        (true, true) => ParseOutcome::Complete,
        (false, false) => ParseOutcome::Defaulted,
        (true, false) | (false, true) => ParseOutcome::Partial,
    };

    if outcome != ParseOutcome::Complete {
        warn!(?outcome, "melody reply did not parse cleanly, defaults substituted");
    }

    ParsedReply {
        melody,
        message,
        outcome,
    }
}

/// Tokenize a `note,duration,note,duration,...` string.
///
/// Returns `None` when the string is empty or has an odd token count (the
/// caller substitutes the default melody). Within a well-paired string,
/// bad tokens degrade individually: unknown pitch names become rests and
/// unparseable durations become [`DEFAULT_NOTE_DURATION`].
fn parse_melody(text: &str) -> Option<Vec<ToneStep>> {
    // ---
    if text.trim().is_empty() {
        return None;
    }

    let tokens: Vec<&str> = text.split(',').map(str::trim).collect();
    if tokens.len() % 2 != 0 {
        warn!(
            token_count = tokens.len(),
            "odd melody token count, expected note,duration pairs"
        );
        return None;
    }

    let mut steps = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks(2) {
        let note = pair[0].to_uppercase();
        let frequency = match note_frequency(&note) {
            Some(hz) => hz,
            None => {
                debug!(token = %pair[0], "unknown note token, substituting rest");
                0
            }
        };

        let duration = pair[1]
            .parse::<f32>()
            .ok()
            .filter(|d| *d > 0.0)
            .unwrap_or_else(|| {
                debug!(token = %pair[1], "bad duration token, substituting default");
                DEFAULT_NOTE_DURATION
            });

        steps.push(ToneStep::new(frequency, duration));
    }

    Some(steps)
}

/// Cap a message at the display budget: longer messages keep the first 13
/// characters plus a three-character ellipsis marker.
fn truncate_message(message: &str) -> String {
    // ---
    if message.chars().count() > MAX_MESSAGE_CHARS {
        let head: String = message.chars().take(MAX_MESSAGE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn well_formed_reply_round_trips() {
        // ---
        let reply = parse("MESSAGE: Happy\nMELODY: C4,0.5,E4,0.5,G4,0.5");
        assert_eq!(reply.message, "Happy");
        assert_eq!(reply.outcome, ParseOutcome::Complete);
        assert_eq!(reply.melody.len(), 3);
        assert_eq!(reply.melody[0], ToneStep::new(262, 0.5));
        assert_eq!(reply.melody[1], ToneStep::new(330, 0.5));
        assert_eq!(reply.melody[2], ToneStep::new(392, 0.5));
    }

    #[test]
    fn parse_is_total_on_arbitrary_input() {
        // ---
        for input in [
            "",
            "   \n\n  ",
            "no markers at all",
            "MESSAGE:",
            "MELODY:",
            "\u{0}\u{1}garbage\u{fffd}bytes,,,",
            "MESSAGE: ok\nMELODY: ,,,,",
        ] {
            let reply = parse(input);
            assert!(!reply.melody.is_empty(), "input {input:?} produced empty melody");
            assert!(!reply.message.is_empty(), "input {input:?} produced empty message");
            assert!(reply.message.chars().count() <= MAX_MESSAGE_CHARS);
        }
    }

    #[test]
    fn empty_input_defaults_both_fields() {
        // ---
        let reply = parse("");
        assert_eq!(reply.outcome, ParseOutcome::Defaulted);
        assert_eq!(reply.melody, default_melody());
        // Default message is itself subject to the display budget.
        assert_eq!(reply.message, "Plant status ...");
    }

    #[test]
    fn last_marker_line_wins() {
        // ---
        let reply = parse("MESSAGE: first\nMESSAGE: second\nMELODY: C4,0.5,E4,0.5");
        assert_eq!(reply.message, "second");
    }

    #[test]
    fn unmarked_note_line_is_recovered() {
        // ---
        let reply = parse("The plant feels great!\nC4,0.25,G4,0.25");
        assert_eq!(reply.melody.len(), 2);
        assert_eq!(reply.melody[0].frequency, 262);
        assert_eq!(reply.melody[1].frequency, 392);
        // No MESSAGE: marker, so the message side was defaulted.
        assert_eq!(reply.outcome, ParseOutcome::Partial);
        assert_eq!(reply.message, "Plant status ...");
    }

    #[test]
    fn long_message_truncates_to_budget() {
        // ---
        let thirty = "a plant message of 30 chars!!!";
        assert_eq!(thirty.chars().count(), 30);

        let reply = parse(&format!("MESSAGE: {thirty}\nMELODY: C4,0.5,E4,0.5"));
        assert_eq!(reply.message.chars().count(), 16);
        assert_eq!(reply.message, "a plant messa...");
    }

    #[test]
    fn sixteen_char_message_is_untouched() {
        // ---
        let reply = parse("MESSAGE: exactly 16 chars\nMELODY: C4,0.5,E4,0.5");
        assert_eq!(reply.message, "exactly 16 chars");
    }

    #[test]
    fn odd_token_count_defaults_melody_keeps_message() {
        // ---
        let reply = parse("MESSAGE: Happy\nMELODY: C4,0.5,E4");
        assert_eq!(reply.outcome, ParseOutcome::Partial);
        assert_eq!(reply.message, "Happy");
        assert_eq!(reply.melody, default_melody());
    }

    #[test]
    fn unknown_note_becomes_rest() {
        // ---
        let reply = parse("MESSAGE: hm\nMELODY: X9,0.5");
        assert_eq!(reply.outcome, ParseOutcome::Complete);
        assert_eq!(reply.melody, vec![ToneStep::rest(0.5)]);
    }

    #[test]
    fn bad_duration_becomes_default() {
        // ---
        let reply = parse("MESSAGE: hm\nMELODY: C4,fast,E4,-1.0");
        assert_eq!(reply.melody[0].duration, DEFAULT_NOTE_DURATION);
        assert_eq!(reply.melody[1].duration, DEFAULT_NOTE_DURATION);
        assert!(reply.melody.iter().all(|s| s.duration > 0.0));
    }

    #[test]
    fn note_tokens_are_case_insensitive() {
        // ---
        let reply = parse("MESSAGE: hm\nMELODY: c4,0.5,r,0.25,a#5,0.5");
        assert_eq!(reply.melody[0].frequency, 262);
        assert_eq!(reply.melody[1].frequency, 0);
        assert_eq!(reply.melody[2].frequency, 932);
    }

    #[test]
    fn pitch_table_spans_c3_to_c7() {
        // ---
        assert_eq!(note_frequency("C3"), Some(131));
        assert_eq!(note_frequency("A4"), Some(440));
        assert_eq!(note_frequency("C7"), Some(2093));
        assert_eq!(note_frequency("R"), Some(0));
        assert_eq!(note_frequency("C8"), None);
        assert_eq!(note_frequency("H4"), None);
    }
}
