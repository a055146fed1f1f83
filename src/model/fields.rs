//! Field values pulled out of a single message before they are persisted.

use chrono::{DateTime, Utc};

/// A body payload as handed over by an archive decoder.
///
/// Decoders that already know the charset return `Text`; anything else is
/// returned as `Bytes` and decoded here with U+FFFD replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawBody {
    /// Decode the payload as text. Never fails: invalid UTF-8 sequences are
    /// replaced.
    pub fn into_text(self) -> String {
        match self {
            RawBody::Text(text) => text,
            RawBody::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            },
        }
    }
}

/// Outcome of reading one body variant from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyText {
    /// The message carries this body (possibly empty).
    Present(String),
    /// The message has no body of this kind.
    Absent,
    /// The accessor failed.
    Unreadable,
}

impl BodyText {
    /// The body text if present and non-empty.
    pub fn non_empty(&self) -> Option<&str> {
        match self {
            BodyText::Present(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// The five fields of a message after per-field failure handling.
///
/// Text fields already hold their sentinel when the accessor failed, so a
/// value of this type always describes a complete, writable message.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub subject: String,
    pub sender: String,
    /// Delivery time, else creation time. `None` when neither could be read.
    pub received_at: Option<DateTime<Utc>>,
    pub html_body: BodyText,
    pub plain_body: BodyText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_decode_with_replacement() {
        let raw = RawBody::Bytes(vec![b'h', b'i', 0xFF, b'!']);
        assert_eq!(raw.into_text(), "hi\u{FFFD}!");
    }

    #[test]
    fn test_valid_bytes_decode_unchanged() {
        let raw = RawBody::Bytes("café".as_bytes().to_vec());
        assert_eq!(raw.into_text(), "café");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(BodyText::Present("x".into()).non_empty(), Some("x"));
        assert_eq!(BodyText::Present(String::new()).non_empty(), None);
        assert_eq!(BodyText::Absent.non_empty(), None);
        assert_eq!(BodyText::Unreadable.non_empty(), None);
    }
}
