//! Checks and attempts: validation and the open/closed lifecycle.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::vocabulary::{AttemptResult, CheckType, Difficulty, Skill};

pub const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid type {0}")]
    InvalidType(i64),
    #[error("invalid skill {0}")]
    InvalidSkill(i64),
    #[error("invalid difficulty {0}")]
    InvalidDifficulty(i64),
    #[error("incomplete metadata")]
    IncompleteMetadata,
    #[error("invalid result {0}")]
    InvalidResult(i64),
    #[error("description is empty")]
    EmptyDescription,
    #[error("description is longer than {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("check {0} is already closed")]
    CheckClosed(i64),
}

/// Where a check or attempt came from. Zero means unknown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Origin {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
}

/// Unvalidated check as assembled from callback fields and a description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckDraft {
    pub kind: i64,
    pub skill: i64,
    pub difficulty: i64,
    pub description: String,
    pub origin: Origin,
}

impl CheckDraft {
    /// Checks type, skill, difficulty, metadata and description in that order
    /// and reports the first violation only.
    pub fn validate(self, created_at: DateTime<Utc>) -> Result<Check, ValidationError> {
        let kind = CheckType::from_id(self.kind).ok_or(ValidationError::InvalidType(self.kind))?;
        let skill = Skill::from_id(self.skill).ok_or(ValidationError::InvalidSkill(self.skill))?;
        let difficulty = Difficulty::from_id(self.difficulty)
            .ok_or(ValidationError::InvalidDifficulty(self.difficulty))?;
        if self.origin.user_id == 0 || self.origin.chat_id == 0 || self.origin.message_id == 0 {
            return Err(ValidationError::IncompleteMetadata);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_CHARS,
            });
        }
        Ok(Check {
            id: 0,
            kind,
            skill,
            difficulty,
            description: description.to_string(),
            origin: self.origin,
            created_at,
            attempts: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    /// Zero until the store assigns one.
    pub id: i64,
    pub kind: CheckType,
    pub skill: Skill,
    pub difficulty: Difficulty,
    pub description: String,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
    /// Chronological.
    pub attempts: Vec<Attempt>,
}

impl Check {
    /// A red check closes on its first attempt. A white check closes only
    /// when its latest attempt is a cancel or a success.
    pub fn closed(&self) -> bool {
        match self.kind {
            CheckType::NonRetriable => !self.attempts.is_empty(),
            CheckType::Retriable => matches!(
                self.latest_result(),
                Some(AttemptResult::Cancel) | Some(AttemptResult::Success)
            ),
        }
    }

    pub fn ensure_open(&self) -> Result<(), ValidationError> {
        if self.closed() {
            Err(ValidationError::CheckClosed(self.id))
        } else {
            Ok(())
        }
    }

    pub fn latest_result(&self) -> Option<AttemptResult> {
        self.attempts.last().map(|attempt| attempt.result)
    }

    /// Latest attempt time, or creation time when there are no attempts.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.attempts
            .iter()
            .map(|attempt| attempt.created_at)
            .max()
            .unwrap_or(self.created_at)
    }

    /// `🟦 Logic/Medium`
    pub fn headline(&self) -> String {
        format!("{}/{}", self.skill.name(), self.difficulty.name())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttemptDraft {
    pub check_id: i64,
    pub result: i64,
    pub chat_id: i64,
    pub message_id: i64,
}

impl AttemptDraft {
    pub fn validate(self, created_at: DateTime<Utc>) -> Result<Attempt, ValidationError> {
        let result =
            AttemptResult::from_id(self.result).ok_or(ValidationError::InvalidResult(self.result))?;
        if self.check_id == 0 || self.chat_id == 0 || self.message_id == 0 {
            return Err(ValidationError::IncompleteMetadata);
        }
        Ok(Attempt {
            id: 0,
            check_id: self.check_id,
            result,
            chat_id: self.chat_id,
            message_id: self.message_id,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempt {
    pub id: i64,
    pub check_id: i64,
    pub result: AttemptResult,
    pub chat_id: i64,
    pub message_id: i64,
    pub created_at: DateTime<Utc>,
}
