// Token model, emission and budget truncation

use std::collections::HashMap;
use std::fmt;

use super::timeline::Timeline;
use super::{ConvertError, Result};
use crate::config::Config;

/// Separates tokens in the serialized script
pub const DELIMITER: char = '|';

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `!speed@<bpm>`, always first
    Speed(f64),
    /// `!stop@<gap>`, wait before the next group
    Stop(f64),
    /// `!combine`, joins two notes of one group
    Combine,
    /// `<instrument>@<pitch>`
    Note { instrument: String, pitch: i32 },
}

impl Token {
    /// True for tokens that are incomplete when nothing follows them
    pub fn expects_successor(&self) -> bool {
        matches!(self, Token::Stop(_) | Token::Combine)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Speed(bpm) => write!(f, "!speed@{}", format_number(*bpm)),
            Token::Stop(gap) => write!(f, "!stop@{}", format_number(*gap)),
            Token::Combine => f.write_str("!combine"),
            Token::Note { instrument, pitch } => write!(f, "{}@{}", instrument, pitch),
        }
    }
}

/// Render a number the way the sequencer scripts expect: shortest
/// round-trip digits, no trailing `.0`, and `e+`/`e-` exponents outside
/// `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return value.to_string();
    }

    let exp_form = format!("{:e}", value);
    match exp_form.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => exp_form,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Last token if it is a `!stop` or `!combine` with nothing after it
    pub fn dangling_tail(&self) -> Option<&Token> {
        self.tokens.last().filter(|t| t.expects_successor())
    }

    /// Keep only the first `max_tokens` tokens and return how many were dropped.
    ///
    /// This is a plain positional cut. A `!stop` or `!combine` left at the
    /// end is not repaired, only reported.
    pub fn truncate(&mut self, max_tokens: usize) -> usize {
        let dropped = self.tokens.len().saturating_sub(max_tokens);
        if dropped == 0 {
            return 0;
        }

        self.tokens.truncate(max_tokens);
        log::info!(
            "Token budget of {} reached, dropped {} tokens",
            max_tokens,
            dropped
        );
        if let Some(tail) = self.dangling_tail() {
            log::warn!("Truncated script ends with a dangling '{}' token", tail);
        }

        dropped
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DELIMITER)?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// Serialize a timeline into the full, untruncated token stream.
pub fn emit(config: &Config, timeline: &Timeline) -> Result<TokenStream> {
    let instruments: HashMap<usize, &str> = config
        .tracks
        .iter()
        .map(|m| (m.index, m.instrument.as_str()))
        .collect();

    let mut stream = TokenStream::default();
    stream.push(Token::Speed(config.bpm));

    let mut previous = 0.0;
    for (time, notes) in timeline.groups() {
        stream.push(Token::Stop(time - previous));

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                stream.push(Token::Combine);
            }
            let instrument = instruments
                .get(&note.track)
                .ok_or(ConvertError::UnmappedTrack(note.track))?;
            stream.push(Token::Note {
                instrument: instrument.to_string(),
                pitch: note.pitch,
            });
        }

        previous = time;
    }

    Ok(stream)
}
