//! Append-only courtroom transcript.
//!
//! Messages are never edited or removed once appended. The transcript is
//! the single source of record for scoring, oracle context windows and
//! presentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::case::EmotionState;

/// Who is speaking in a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    Player,
    Witness,
    Prosecutor,
    Judge,
    System,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtroomMessage {
    /// Sequential id, assigned by the transcript
    pub id: u64,

    /// When the entry was appended
    pub timestamp: DateTime<Utc>,

    pub role: SpeakerRole,

    /// Display name of the speaker
    pub speaker: String,

    pub content: String,

    /// Emotion tag, if the speaker carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionState>,

    /// Jury impact folded into sentiment for this entry, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jury_impact: Option<i32>,

    /// Pivotal entries (lock break, witness breakdown) for scoring/UI
    #[serde(default)]
    pub is_key_moment: bool,
}

/// Draft for a message about to be appended.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    role: SpeakerRole,
    speaker: String,
    content: String,
    emotion: Option<EmotionState>,
    jury_impact: Option<i32>,
    is_key_moment: bool,
}

impl MessageDraft {
    /// Start a draft with the mandatory fields.
    pub fn new(role: SpeakerRole, speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role,
            speaker: speaker.into(),
            content: content.into(),
            emotion: None,
            jury_impact: None,
            is_key_moment: false,
        }
    }

    /// Shorthand for a system-authored entry.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(SpeakerRole::System, "Court", content)
    }

    pub fn with_emotion(mut self, emotion: EmotionState) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn with_jury_impact(mut self, impact: i32) -> Self {
        self.jury_impact = Some(impact);
        self
    }

    pub fn key_moment(mut self) -> Self {
        self.is_key_moment = true;
        self
    }
}

/// The append-only message sequence for one trial.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<CourtroomMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. This is the only mutating operation; the id it
    /// returns is unique and strictly increasing.
    pub fn append(&mut self, draft: MessageDraft) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(CourtroomMessage {
            id,
            timestamp: Utc::now(),
            role: draft.role,
            speaker: draft.speaker,
            content: draft.content,
            emotion: draft.emotion,
            jury_impact: draft.jury_impact,
            is_key_moment: draft.is_key_moment,
        });
        id
    }

    pub fn entries(&self) -> &[CourtroomMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` entries, oldest first. Used as the oracle's
    /// context window.
    pub fn recent(&self, n: usize) -> &[CourtroomMessage] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Entries flagged as pivotal.
    pub fn key_moments(&self) -> impl Iterator<Item = &CourtroomMessage> {
        self.entries.iter().filter(|m| m.is_key_moment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sequential() {
        let mut transcript = Transcript::new();
        let a = transcript.append(MessageDraft::system("court in session"));
        let b = transcript.append(MessageDraft::new(
            SpeakerRole::Player,
            "Defense",
            "Objection.",
        ));
        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_append_preserves_existing_entries() {
        let mut transcript = Transcript::new();
        transcript.append(MessageDraft::system("first"));
        let before = transcript.entries()[0].clone();

        for i in 0..10 {
            transcript.append(MessageDraft::system(format!("entry {}", i)));
        }

        let after = &transcript.entries()[0];
        assert_eq!(after.id, before.id);
        assert_eq!(after.content, before.content);
        assert_eq!(after.timestamp, before.timestamp);
    }

    #[test]
    fn test_recent_window() {
        let mut transcript = Transcript::new();
        for i in 0..5 {
            transcript.append(MessageDraft::system(format!("entry {}", i)));
        }

        let window = transcript.recent(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].content, "entry 3");
        assert_eq!(window[1].content, "entry 4");

        // Window larger than the transcript returns everything.
        assert_eq!(transcript.recent(100).len(), 5);
    }

    #[test]
    fn test_key_moments_filter() {
        let mut transcript = Transcript::new();
        transcript.append(MessageDraft::system("mundane"));
        transcript.append(MessageDraft::system("pivotal").key_moment());

        let key: Vec<_> = transcript.key_moments().collect();
        assert_eq!(key.len(), 1);
        assert_eq!(key[0].content, "pivotal");
    }

    #[test]
    fn test_draft_builder() {
        let mut transcript = Transcript::new();
        transcript.append(
            MessageDraft::new(SpeakerRole::Witness, "Tom Brandt", "I was home.")
                .with_emotion(crate::case::EmotionState::Nervous)
                .with_jury_impact(-3),
        );
        let entry = &transcript.entries()[0];
        assert_eq!(entry.jury_impact, Some(-3));
        assert!(!entry.is_key_moment);
    }
}
