//! Capsule domain model.
//!
//! # Responsibility
//! - Define the leaf content unit and its slide/question payload.
//! - Validate payload shape before persistence.
//!
//! # Invariants
//! - A capsule belongs to exactly one set; `subject_id` and `theme_id` are
//!   denormalized copies of that set's ancestry.
//! - `intent_tags` holds no duplicates.
//! - A poll carries at least two non-blank options.

use crate::model::hierarchy::{CapsuleSet, Subject};
use crate::model::ids::{new_content_id, CapsuleId, IntentId, SetId, SubjectId, ThemeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

const MIN_POLL_OPTIONS: usize = 2;
const DEFAULT_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideKind {
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(rename = "type")]
    pub kind: SlideKind,
    pub content: String,
}

impl Slide {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: SlideKind::Text,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Question,
    Poll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub option_text: String,
    pub votes: u64,
}

/// Closing prompt shown after the last slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOrPoll {
    #[serde(rename = "type")]
    pub kind: PromptKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poll_options: Vec<PollOption>,
}

impl QuestionOrPoll {
    pub fn question(content: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Question,
            content: content.into(),
            poll_options: Vec::new(),
        }
    }

    pub fn poll<I, S>(content: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: PromptKind::Poll,
            content: content.into(),
            poll_options: options
                .into_iter()
                .map(|text| PollOption {
                    option_text: text.into(),
                    votes: 0,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapsuleMetadata {
    pub author: String,
    pub estimated_read_minutes: Option<u32>,
    /// Number of times users saved this capsule. Drives trending fallbacks.
    pub save_count: u64,
    pub view_count: u64,
}

impl Default for CapsuleMetadata {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            estimated_read_minutes: None,
            save_count: 0,
            view_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capsule {
    pub id: CapsuleId,
    pub title: String,
    pub slides: Vec<Slide>,
    pub intent_tags: Vec<IntentId>,
    pub theme_id: ThemeId,
    pub subject_id: SubjectId,
    pub set_id: SetId,
    pub tags: Vec<String>,
    pub metadata: CapsuleMetadata,
    pub question_or_poll: QuestionOrPoll,
}

/// Payload violations detected before a capsule is stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapsuleValidationError {
    #[error("capsule title must not be blank")]
    BlankTitle,
    #[error("capsule must contain at least one slide")]
    NoSlides,
    #[error("slide content is required at index {0}")]
    BlankSlide(usize),
    #[error("question or poll content is required")]
    BlankPrompt,
    #[error("poll must have at least 2 options, got {0}")]
    TooFewPollOptions(usize),
    #[error("option text is required for poll option at index {0}")]
    BlankPollOption(usize),
    #[error("intent tag listed more than once: {0}")]
    DuplicateIntentTag(IntentId),
}

impl Capsule {
    /// Creates a capsule placed in `set`, inheriting ancestry from `subject`.
    pub fn new(
        subject: &Subject,
        set: &CapsuleSet,
        title: impl Into<String>,
        question_or_poll: QuestionOrPoll,
    ) -> Self {
        Self::with_id(new_content_id(), subject, set, title, question_or_poll)
    }

    pub fn with_id(
        id: CapsuleId,
        subject: &Subject,
        set: &CapsuleSet,
        title: impl Into<String>,
        question_or_poll: QuestionOrPoll,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            slides: Vec::new(),
            intent_tags: Vec::new(),
            theme_id: subject.theme_id,
            subject_id: set.subject_id,
            set_id: set.id,
            tags: Vec::new(),
            metadata: CapsuleMetadata::default(),
            question_or_poll,
        }
    }

    pub fn validate(&self) -> Result<(), CapsuleValidationError> {
        if self.title.trim().is_empty() {
            return Err(CapsuleValidationError::BlankTitle);
        }
        if self.slides.is_empty() {
            return Err(CapsuleValidationError::NoSlides);
        }
        if let Some(index) = self
            .slides
            .iter()
            .position(|slide| slide.content.trim().is_empty())
        {
            return Err(CapsuleValidationError::BlankSlide(index));
        }

        let prompt = &self.question_or_poll;
        if prompt.content.trim().is_empty() {
            return Err(CapsuleValidationError::BlankPrompt);
        }
        if prompt.kind == PromptKind::Poll {
            if prompt.poll_options.len() < MIN_POLL_OPTIONS {
                return Err(CapsuleValidationError::TooFewPollOptions(
                    prompt.poll_options.len(),
                ));
            }
            if let Some(index) = prompt
                .poll_options
                .iter()
                .position(|option| option.option_text.trim().is_empty())
            {
                return Err(CapsuleValidationError::BlankPollOption(index));
            }
        }

        let mut seen = HashSet::new();
        for intent_id in &self.intent_tags {
            if !seen.insert(*intent_id) {
                return Err(CapsuleValidationError::DuplicateIntentTag(*intent_id));
            }
        }

        Ok(())
    }
}
