//! Per-user upload state: the latest normalized image for each card side.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upload position on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Front,
    Back,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Front, Slot::Back];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// A normalized image ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    slot: Slot,
    base64: String,
}

impl ImagePayload {
    pub fn new(slot: Slot, base64: String) -> Self {
        Self { slot, base64 }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    pub fn is_empty(&self) -> bool {
        self.base64.is_empty()
    }
}

/// Holds at most one payload per slot. Lives for one user session only.
#[derive(Debug, Default, Clone)]
pub struct UploadSession {
    front: Option<ImagePayload>,
    back: Option<ImagePayload>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under its slot, returning the one it replaced.
    pub fn store(&mut self, payload: ImagePayload) -> Option<ImagePayload> {
        let cell = self.cell_mut(payload.slot());
        cell.replace(payload)
    }

    /// The stored payload for `slot`, if present and non-empty.
    pub fn payload(&self, slot: Slot) -> Option<&ImagePayload> {
        let cell = match slot {
            Slot::Front => &self.front,
            Slot::Back => &self.back,
        };
        cell.as_ref().filter(|p| !p.is_empty())
    }

    pub fn clear(&mut self, slot: Slot) -> Option<ImagePayload> {
        self.cell_mut(slot).take()
    }

    /// Slots without a usable payload, in `Slot::ALL` order.
    pub fn missing_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| self.payload(*slot).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_slots().is_empty()
    }

    fn cell_mut(&mut self, slot: Slot) -> &mut Option<ImagePayload> {
        match slot {
            Slot::Front => &mut self.front,
            Slot::Back => &mut self.back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_missing_both_slots() {
        let session = UploadSession::new();
        assert_eq!(session.missing_slots(), vec![Slot::Front, Slot::Back]);
        assert!(!session.is_complete());
    }

    #[test]
    fn store_replaces_prior_payload() {
        let mut session = UploadSession::new();
        assert!(session
            .store(ImagePayload::new(Slot::Front, "first".into()))
            .is_none());
        let prior = session.store(ImagePayload::new(Slot::Front, "second".into()));
        assert_eq!(prior.unwrap().base64(), "first");
        assert_eq!(session.payload(Slot::Front).unwrap().base64(), "second");
        assert!(session.payload(Slot::Back).is_none());
    }

    #[test]
    fn empty_payload_does_not_count() {
        let mut session = UploadSession::new();
        session.store(ImagePayload::new(Slot::Front, "abc".into()));
        session.store(ImagePayload::new(Slot::Back, String::new()));
        assert_eq!(session.missing_slots(), vec![Slot::Back]);
        assert!(!session.is_complete());
    }

    #[test]
    fn complete_when_both_sides_present() {
        let mut session = UploadSession::new();
        session.store(ImagePayload::new(Slot::Front, "f".into()));
        session.store(ImagePayload::new(Slot::Back, "b".into()));
        assert!(session.is_complete());

        session.clear(Slot::Back);
        assert_eq!(session.missing_slots(), vec![Slot::Back]);
    }

    #[test]
    fn slot_display_and_serde_are_lowercase() {
        assert_eq!(Slot::Front.to_string(), "front");
        assert_eq!(serde_json::to_string(&Slot::Back).unwrap(), "\"back\"");
    }
}
