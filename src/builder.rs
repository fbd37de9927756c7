//! In-flight check builders, one per user.
//!
//! Only the single update-processing path touches this store, so it needs no
//! locking of its own beyond the state mutex it lives in.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::checks::{Check, CheckDraft, Origin, ValidationError};
use crate::vocabulary::CheckType;

/// Choices made so far. The type is fixed by the command that started the
/// builder; skill and difficulty hold raw callback values, range-checked when
/// the builder completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuilderSession {
    pub kind: CheckType,
    pub skill: Option<i64>,
    pub difficulty: Option<i64>,
}

impl BuilderSession {
    pub fn awaiting_description(&self) -> bool {
        self.skill.is_some() && self.difficulty.is_some()
    }
}

#[derive(Debug, Default)]
pub struct BuilderSessions {
    sessions: HashMap<i64, BuilderSession>,
}

impl BuilderSessions {
    pub fn begin(&mut self, user_id: i64, kind: CheckType) {
        self.sessions.insert(
            user_id,
            BuilderSession {
                kind,
                skill: None,
                difficulty: None,
            },
        );
    }

    /// `None` when the user has no builder. Picking a skill again resets the
    /// difficulty.
    pub fn set_skill(&mut self, user_id: i64, skill: i64) -> Option<BuilderSession> {
        let session = self.sessions.get_mut(&user_id)?;
        session.skill = Some(skill);
        session.difficulty = None;
        Some(*session)
    }

    /// `None` when the user has no builder or has not picked a skill yet.
    pub fn set_difficulty(&mut self, user_id: i64, difficulty: i64) -> Option<BuilderSession> {
        let session = self.sessions.get_mut(&user_id)?;
        session.skill?;
        session.difficulty = Some(difficulty);
        Some(*session)
    }

    pub fn get(&self, user_id: i64) -> Option<&BuilderSession> {
        self.sessions.get(&user_id)
    }

    /// Returns `None` when the user has no builder waiting for a description.
    /// Otherwise the session is consumed whether or not validation passes.
    pub fn complete(
        &mut self,
        user_id: i64,
        description: &str,
        origin: Origin,
        now: DateTime<Utc>,
    ) -> Option<Result<Check, ValidationError>> {
        if !self.get(user_id)?.awaiting_description() {
            return None;
        }
        let session = self.sessions.remove(&user_id)?;
        let draft = CheckDraft {
            kind: session.kind.id(),
            skill: session.skill.unwrap_or_default(),
            difficulty: session.difficulty.unwrap_or_default(),
            description: description.to_string(),
            origin,
        };
        Some(draft.validate(now))
    }

    pub fn clear(&mut self, user_id: i64) {
        self.sessions.remove(&user_id);
    }
}
