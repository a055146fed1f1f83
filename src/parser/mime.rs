//! MIME message decoding for the mail-tree decoder.

use mail_parser::{MessageParser, PartType};

use crate::model::fields::RawBody;
use crate::parser::header::HeaderFields;
use crate::parser::mbox::skip_from_line;

/// Owned view of the parts of a message the extractor asks for.
///
/// Date headers are kept raw so that a present-but-malformed date can be
/// told apart from a missing one when the accessor runs.
#[derive(Debug, Clone, Default)]
pub struct DecodedMessage {
    pub subject: Option<String>,
    pub sender: Option<String>,
    /// Raw `Date:` header value.
    pub date: Option<String>,
    /// Raw value of the topmost `Received:` header.
    pub received: Option<String>,
    /// First `text/html` part; `None` when the message has no real HTML part.
    pub html: Option<RawBody>,
    /// First `text/plain` part.
    pub text: Option<RawBody>,
}

/// Parse a complete raw message (headers + body).
///
/// A leading MBOX `From ` line is skipped. Returns `None` when `mail-parser`
/// cannot make anything of the bytes.
pub fn decode_message(raw_message: &[u8]) -> Option<DecodedMessage> {
    let message_bytes = skip_from_line(raw_message);
    let parsed = MessageParser::default().parse(message_bytes)?;
    let headers = HeaderFields::parse(message_bytes);

    let subject = parsed.subject().map(|s| s.trim().to_string());

    let sender = parsed
        .from()
        .and_then(|from| from.first())
        .and_then(|addr| {
            addr.name()
                .filter(|name| !name.trim().is_empty())
                .or_else(|| addr.address())
        })
        .map(|s| s.trim().to_string());

    // mail-parser mirrors text parts into the HTML list (and vice versa), so
    // only the part's real type counts.
    let html = parsed.html_part(0).and_then(|part| match &part.body {
        PartType::Html(html) => Some(RawBody::Text(html.to_string())),
        _ => None,
    });

    let text = parsed.text_part(0).and_then(|part| match &part.body {
        PartType::Text(text) => Some(RawBody::Text(text.to_string())),
        PartType::Binary(bytes) | PartType::InlineBinary(bytes) => {
            Some(RawBody::Bytes(bytes.to_vec()))
        }
        _ => None,
    });

    Some(DecodedMessage {
        subject,
        sender,
        date: headers.get("date").map(str::to_string),
        received: headers.get("received").map(str::to_string),
        html,
        text,
    })
}
