use crate::{error::ReceiptReadError, model::ReceiptDocument};
use billbear_domain::{Participant, ParticipantId, SelectionMap};
use std::collections::HashMap;

/// Raw receipt payload handed over by whatever captured it.
pub struct ReceiptSource<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> ReceiptSource<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            filename: None,
            content_type: None,
        }
    }
}

pub trait ReceiptReader: Send + Sync {
    fn read(&self, source: &ReceiptSource<'_>) -> Result<ReceiptDocument, ReceiptReadError>;
}

pub trait ParticipantDirectory: Send + Sync {
    fn display_name(&self, participant: ParticipantId) -> Option<&str>;
}

impl ParticipantDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, participant: ParticipantId) -> Option<&str> {
        self.get(&participant).map(String::as_str)
    }
}

impl ParticipantDirectory for [Participant] {
    fn display_name(&self, participant: ParticipantId) -> Option<&str> {
        self.iter()
            .find(|p| p.id == participant)
            .map(|p| p.name.as_str())
    }
}

impl ParticipantDirectory for SelectionMap {
    fn display_name(&self, participant: ParticipantId) -> Option<&str> {
        self.participants().display_name(participant)
    }
}
