//! Token scanning for sync responses.
//!
//! A sync response is a run of `(tag:value)` groups. Scanning works directly
//! over the received bytes: every search is bounded by the end of the slice, so
//! a truncated or garbled response can only ever produce fewer tokens.

use std::str::FromStr;

use crate::error::{ProtocolError, ProtocolResult, TokenError};
use crate::tag::Tag;

/// Byte opening a group.
pub const GROUP_OPEN: u8 = b'(';

/// Byte separating the tag from the value.
pub const TAG_SEPARATOR: u8 = b':';

/// Byte closing a group.
pub const GROUP_CLOSE: u8 = b')';

/// Longest raw value accepted, a full `AA:BB:CC:DD:EE:FF` MAC address.
pub const MAX_VALUE_LEN: usize = 17;

/// The undecoded value of a group, borrowed from the response buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawValue<'a>(&'a [u8]);

impl<'a> RawValue<'a> {
    /// Wrap raw value bytes.
    pub fn new(bytes: &'a [u8]) -> Self {
        RawValue(bytes)
    }

    /// The value bytes exactly as received.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Number of bytes in the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the value is empty, as in `(5:)`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value as text.
    pub fn as_str(&self) -> ProtocolResult<&'a str> {
        std::str::from_utf8(self.0).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Parse the value as a decimal number.
    pub fn parse<T: FromStr>(&self) -> ProtocolResult<T> {
        let text = self.as_str()?.trim();
        text.parse()
            .map_err(|_| ProtocolError::InvalidNumber(text.to_string()))
    }
}

/// One parsed `(tag:value)` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    code: u32,
    value: RawValue<'a>,
}

impl<'a> Token<'a> {
    /// The numeric tag as received.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// The known tag, or `None` if the code is not one we mirror.
    pub fn tag(&self) -> Option<Tag> {
        Tag::from_code(self.code)
    }

    /// The raw value.
    pub fn value(&self) -> RawValue<'a> {
        self.value
    }
}

/// Result of scanning one group together with the cursor to continue from.
pub type ScanOutcome<'a> = (Result<Token<'a>, TokenError>, usize);

/// Scan the group starting at `cursor`.
///
/// Returns `None` when the byte at `cursor` is not `(` or when the `:` or `)`
/// delimiter is missing before the end of `input`. Otherwise returns the token
/// (or the reason it was rejected) and the cursor to resume from: just past the
/// closing `)` for a well-formed group or an over-long value, and `cursor + 1`
/// for an unparseable tag so that a stray `(` cannot swallow the next group.
pub fn next_token(input: &[u8], cursor: usize) -> Option<ScanOutcome<'_>> {
    if input.get(cursor) != Some(&GROUP_OPEN) {
        return None;
    }

    let tag_start = cursor + 1;
    let separator = tag_start + find_byte(input.get(tag_start..)?, TAG_SEPARATOR)?;
    let value_start = separator + 1;
    let close = value_start + find_byte(input.get(value_start..)?, GROUP_CLOSE)?;
    let next = close + 1;

    let tag_bytes = &input[tag_start..separator];
    let code = match parse_tag(tag_bytes) {
        Some(code) => code,
        None => {
            let text = String::from_utf8_lossy(tag_bytes).into_owned();
            return Some((Err(TokenError::InvalidTag(text)), tag_start));
        }
    };

    let value = &input[value_start..close];
    if value.len() > MAX_VALUE_LEN {
        return Some((
            Err(TokenError::ValueTooLong {
                max: MAX_VALUE_LEN,
                actual: value.len(),
            }),
            next,
        ));
    }

    Some((
        Ok(Token {
            code,
            value: RawValue(value),
        }),
        next,
    ))
}

fn find_byte(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Iterator over every group in a response, skipping noise between groups.
///
/// Bytes before each `(` (echoed command, banner text, the trailing prompt) are
/// discarded. Iteration stops for good once a group is missing a delimiter.
#[derive(Debug, Clone)]
pub struct TokenIter<'a> {
    input: &'a [u8],
    cursor: usize,
}

impl<'a> TokenIter<'a> {
    /// Start scanning `input` from the beginning.
    pub fn new(input: &'a [u8]) -> Self {
        TokenIter { input, cursor: 0 }
    }

    /// Current scan position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Result<Token<'a>, TokenError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.input.get(self.cursor..)?;
        let start = self.cursor + find_byte(rest, GROUP_OPEN)?;

        match next_token(self.input, start) {
            Some((result, next)) => {
                self.cursor = next;
                Some(result)
            }
            None => {
                self.cursor = self.input.len();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_token_simple() {
        let (token, next) = next_token(b"(6:5)(7:1)", 0).unwrap();
        let token = token.unwrap();
        assert_eq!(token.code(), 6);
        assert_eq!(token.tag(), Some(Tag::AttackPackets));
        assert_eq!(token.value().as_bytes(), b"5");
        assert_eq!(next, 5);

        let (token, next) = next_token(b"(6:5)(7:1)", next).unwrap();
        assert_eq!(token.unwrap().code(), 7);
        assert_eq!(next, 10);
        assert!(next_token(b"(6:5)(7:1)", next).is_none());
    }

    #[test]
    fn test_value_keeps_colons() {
        let (token, _) = next_token(b"(5:40:91:51:BB:AC:7D)", 0).unwrap();
        assert_eq!(token.unwrap().value().as_str().unwrap(), "40:91:51:BB:AC:7D");
    }

    #[test]
    fn test_empty_value() {
        let (token, next) = next_token(b"(5:)", 0).unwrap();
        let token = token.unwrap();
        assert!(token.value().is_empty());
        assert_eq!(next, 4);
    }

    #[test]
    fn test_not_at_open_paren() {
        assert!(next_token(b"sync\n(1:2)", 0).is_none());
        assert!(next_token(b"", 0).is_none());
        assert!(next_token(b"(1:2)", 99).is_none());
    }

    #[test]
    fn test_missing_delimiters_fail_closed() {
        assert!(next_token(b"(", 0).is_none());
        assert!(next_token(b"(12", 0).is_none());
        assert!(next_token(b"(12:", 0).is_none());
        assert!(next_token(b"(12:345", 0).is_none());
    }

    #[test]
    fn test_invalid_tag_resumes_after_open() {
        let (token, next) = next_token(b"(ab:1)", 0).unwrap();
        assert_eq!(token, Err(TokenError::InvalidTag("ab".to_string())));
        assert_eq!(next, 1);

        let (token, _) = next_token(b"(:1)", 0).unwrap();
        assert!(matches!(token, Err(TokenError::InvalidTag(_))));

        let (token, _) = next_token(b"(-3:1)", 0).unwrap();
        assert!(matches!(token, Err(TokenError::InvalidTag(_))));
    }

    #[test]
    fn test_value_too_long() {
        let (token, next) = next_token(b"(5:40:91:51:BB:AC:7D:00)", 0).unwrap();
        assert_eq!(
            token,
            Err(TokenError::ValueTooLong { max: MAX_VALUE_LEN, actual: 20 })
        );
        assert_eq!(next, 24);
    }

    #[test]
    fn test_iter_skips_noise() {
        let input = b"sync\r\n(0:1)  (4:11)\r\nGRAVITY> ";
        let codes: Vec<u32> = TokenIter::new(input)
            .map(|t| t.unwrap().code())
            .collect();
        assert_eq!(codes, vec![0, 4]);
    }

    #[test]
    fn test_iter_recovers_from_stray_paren() {
        let input = b"(oops (4:11)(8:1)";
        let results: Vec<_> = TokenIter::new(input).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert_eq!(results[1].as_ref().unwrap().code(), 4);
        assert_eq!(results[2].as_ref().unwrap().code(), 8);
    }

    #[test]
    fn test_iter_stops_on_truncated_group() {
        let results: Vec<_> = TokenIter::new(b"(4:11)(8:").collect();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_raw_value_parse() {
        assert_eq!(RawValue::new(b"-100").parse::<i32>(), Ok(-100));
        assert_eq!(RawValue::new(b"14").parse::<u8>(), Ok(14));
        assert!(RawValue::new(b"x1").parse::<u8>().is_err());
        assert!(RawValue::new(b"").parse::<u8>().is_err());
    }
}
