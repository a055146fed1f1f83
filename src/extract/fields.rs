//! Per-field resilient extraction from a [`MessageHandle`].

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::archive::{FieldResult, MessageHandle};
use crate::config::ExtractConfig;
use crate::model::fields::{BodyText, ExtractedFields, RawBody};

/// Pulls the five indexed fields out of a message.
///
/// Every accessor is called, and each failure is replaced by its sentinel
/// without affecting the others.
pub struct FieldExtractor<'a> {
    config: &'a ExtractConfig,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(config: &'a ExtractConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, message: &dyn MessageHandle) -> ExtractedFields {
        ExtractedFields {
            subject: text_or_sentinel("subject", message.subject(), &self.config.subject_sentinel),
            sender: text_or_sentinel(
                "sender",
                message.sender_name(),
                &self.config.sender_sentinel,
            ),
            received_at: received_at(message),
            html_body: body_text("html body", message.html_body()),
            plain_body: body_text("plain body", message.plain_text_body()),
        }
    }
}

/// Absent text becomes empty; a failed accessor becomes the sentinel.
fn text_or_sentinel(field: &str, value: FieldResult<String>, sentinel: &str) -> String {
    match value {
        Ok(text) => text.unwrap_or_default(),
        Err(e) => {
            debug!(field, error = %e, "Unreadable field");
            sentinel.to_string()
        }
    }
}

/// Delivery time, else creation time.
///
/// An unreadable delivery time also falls through to the creation time;
/// `None` means neither yielded a timestamp.
fn received_at(message: &dyn MessageHandle) -> Option<DateTime<Utc>> {
    match message.delivery_time() {
        Ok(Some(dt)) => return Some(dt),
        Ok(None) => {}
        Err(e) => debug!(field = "delivery time", error = %e, "Unreadable field"),
    }
    match message.creation_time() {
        Ok(dt) => dt,
        Err(e) => {
            debug!(field = "creation time", error = %e, "Unreadable field");
            None
        }
    }
}

fn body_text(field: &str, value: FieldResult<RawBody>) -> BodyText {
    match value {
        Ok(Some(raw)) => BodyText::Present(raw.into_text()),
        Ok(None) => BodyText::Absent,
        Err(e) => {
            debug!(field, error = %e, "Unreadable field");
            BodyText::Unreadable
        }
    }
}
