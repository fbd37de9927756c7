//! Fixed vocabulary: skills, difficulties, check types and attempt results.
//!
//! Every value has a stable integer id that travels in callback data and is
//! persisted in the database, plus a display name. Ids are never reused.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillCategory {
    Intellect,
    Psyche,
    Physique,
    Motorics,
}

impl SkillCategory {
    pub fn marker(self) -> &'static str {
        match self {
            SkillCategory::Intellect => "🟦",
            SkillCategory::Psyche => "🟪",
            SkillCategory::Physique => "🟥",
            SkillCategory::Motorics => "🟨",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Skill {
    Logic = 1,
    Encyclopedia,
    Rhetoric,
    Drama,
    Conceptualization,
    VisualCalculus,
    Volition,
    InlandEmpire,
    Empathy,
    Authority,
    EspritDeCorps,
    Suggestion,
    Endurance,
    PainThreshold,
    PhysicalInstrument,
    Electrochemistry,
    Shivers,
    HalfLight,
    HandEyeCoordination,
    Perception,
    ReactionSpeed,
    SavoirFaire,
    Interfacing,
    Composure,
}

impl Skill {
    pub const ALL: [Skill; 24] = [
        Skill::Logic,
        Skill::Encyclopedia,
        Skill::Rhetoric,
        Skill::Drama,
        Skill::Conceptualization,
        Skill::VisualCalculus,
        Skill::Volition,
        Skill::InlandEmpire,
        Skill::Empathy,
        Skill::Authority,
        Skill::EspritDeCorps,
        Skill::Suggestion,
        Skill::Endurance,
        Skill::PainThreshold,
        Skill::PhysicalInstrument,
        Skill::Electrochemistry,
        Skill::Shivers,
        Skill::HalfLight,
        Skill::HandEyeCoordination,
        Skill::Perception,
        Skill::ReactionSpeed,
        Skill::SavoirFaire,
        Skill::Interfacing,
        Skill::Composure,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        if id < 1 {
            return None;
        }
        Self::ALL.get((id - 1) as usize).copied()
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn category(self) -> SkillCategory {
        match self.id() {
            1..=6 => SkillCategory::Intellect,
            7..=12 => SkillCategory::Psyche,
            13..=18 => SkillCategory::Physique,
            _ => SkillCategory::Motorics,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Skill::Logic => "Logic",
            Skill::Encyclopedia => "Encyclopedia",
            Skill::Rhetoric => "Rhetoric",
            Skill::Drama => "Drama",
            Skill::Conceptualization => "Conceptualization",
            Skill::VisualCalculus => "Visual Calculus",
            Skill::Volition => "Volition",
            Skill::InlandEmpire => "Inland Empire",
            Skill::Empathy => "Empathy",
            Skill::Authority => "Authority",
            Skill::EspritDeCorps => "Esprit De Corps",
            Skill::Suggestion => "Suggestion",
            Skill::Endurance => "Endurance",
            Skill::PainThreshold => "Pain Threshold",
            Skill::PhysicalInstrument => "Physical Instrument",
            Skill::Electrochemistry => "Electrochemistry",
            Skill::Shivers => "Shivers",
            Skill::HalfLight => "Half Light",
            Skill::HandEyeCoordination => "Hand/Eye Coordination",
            Skill::Perception => "Perception",
            Skill::ReactionSpeed => "Reaction Speed",
            Skill::SavoirFaire => "Savoir Faire",
            Skill::Interfacing => "Interfacing",
            Skill::Composure => "Composure",
        }
    }

    /// Display name prefixed with the category marker, e.g. `🟦 Logic`.
    pub fn name(self) -> String {
        format!("{} {}", self.category().marker(), self.title())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Trivial = 1,
    Easy,
    Medium,
    Challenging,
    Formidable,
    Legendary,
    Heroic,
    Godly,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 9] = [
        Difficulty::Trivial,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Challenging,
        Difficulty::Formidable,
        Difficulty::Legendary,
        Difficulty::Heroic,
        Difficulty::Godly,
        Difficulty::Impossible,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        if id < 1 {
            return None;
        }
        Self::ALL.get((id - 1) as usize).copied()
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Trivial => "Trivial",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Challenging => "Challenging",
            Difficulty::Formidable => "Formidable",
            Difficulty::Legendary => "Legendary",
            Difficulty::Heroic => "Heroic",
            Difficulty::Godly => "Godly",
            Difficulty::Impossible => "Impossible",
        }
    }
}

/// Whether a failed attempt leaves the check open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CheckType {
    /// White check: stays open across failures.
    Retriable = 1,
    /// Red check: the first attempt of any outcome closes it.
    NonRetriable = 2,
}

impl CheckType {
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(CheckType::Retriable),
            2 => Some(CheckType::NonRetriable),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            CheckType::Retriable => "White check",
            CheckType::NonRetriable => "Red check",
        }
    }

    /// Command and callback action that starts a builder for this type.
    pub fn command(self) -> &'static str {
        match self {
            CheckType::Retriable => "white",
            CheckType::NonRetriable => "red",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttemptResult {
    Cancel = 1,
    Failure = 2,
    Success = 3,
}

impl AttemptResult {
    pub const ALL: [AttemptResult; 3] = [
        AttemptResult::Cancel,
        AttemptResult::Failure,
        AttemptResult::Success,
    ];

    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(AttemptResult::Cancel),
            2 => Some(AttemptResult::Failure),
            3 => Some(AttemptResult::Success),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            AttemptResult::Cancel => "Cancel 🚫",
            AttemptResult::Failure => "Failure 🔴",
            AttemptResult::Success => "Success 🟢",
        }
    }
}
