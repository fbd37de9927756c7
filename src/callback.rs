//! Callback data carried on inline buttons.
//!
//! Wire format: `<action>/<int>/<int>...`, e.g. `white/1/3/5`. The raw codec
//! ([`encode`], [`decode`]) only joins and splits; [`CallbackAction::parse`]
//! turns a token list into one of a closed set of shapes so handlers never
//! count tokens themselves.

use thiserror::Error;

use crate::pagination::Direction;
use crate::vocabulary::CheckType;

pub const LIST_ACTION: &str = "top";
const SEPARATOR: char = '/';
const MIN_TOKENS: usize = 3;

pub fn encode(action: &str, ints: &[i64]) -> String {
    let mut out = String::from(action);
    for value in ints {
        out.push(SEPARATOR);
        out.push_str(&value.to_string());
    }
    out
}

/// Splits on `/` without collapsing empty fields.
pub fn decode(data: &str) -> Vec<&str> {
    data.split(SEPARATOR).collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("callback data has fewer than {MIN_TOKENS} fields")]
    TooShort,
    #[error("unknown callback action {0:?}")]
    UnknownAction(String),
    #[error("callback field {0:?} is not an integer")]
    BadInteger(String),
    #[error("unexpected callback shape")]
    BadShape,
}

/// Op-codes of the list action, second field of `top/...`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListOp {
    Detail = 0,
    Older = 1,
    Newer = 2,
    Record = 3,
    Back = 4,
    Exhausted = 5,
}

impl ListOp {
    fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(ListOp::Detail),
            1 => Some(ListOp::Older),
            2 => Some(ListOp::Newer),
            3 => Some(ListOp::Record),
            4 => Some(ListOp::Back),
            5 => Some(ListOp::Exhausted),
            _ => None,
        }
    }

    fn id(self) -> i64 {
        self as i64
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// `white/<type>/<skill>`: skill picked, difficulty prompt next. The
    /// type field must match the action name.
    SkillChosen { flow: CheckType, skill: i64 },
    /// `white/<type>/<skill>/<difficulty>`: description prompt next.
    DifficultyChosen {
        flow: CheckType,
        skill: i64,
        difficulty: i64,
    },
    /// `top/0/<check>`
    ShowCheck { check_id: i64 },
    /// `top/1/<anchor>` (older) or `top/2/<anchor>` (newer).
    Page { direction: Direction, anchor: i64 },
    /// `top/3/<check>/<result>`
    RecordAttempt { check_id: i64, result: i64 },
    /// `top/4/0`: back to the first list page.
    BackToList,
    /// `top/5/0`: placeholder button of an exhausted direction.
    Exhausted,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Result<Self, CallbackError> {
        let tokens = decode(data);
        if tokens.len() < MIN_TOKENS {
            return Err(CallbackError::TooShort);
        }
        let ints = tokens[1..]
            .iter()
            .map(|token| {
                token
                    .parse::<i64>()
                    .map_err(|_| CallbackError::BadInteger(token.to_string()))
            })
            .collect::<Result<Vec<i64>, _>>()?;

        let action = tokens[0];
        if action == LIST_ACTION {
            return Self::parse_list(&ints);
        }
        let flow = match action {
            "white" => CheckType::Retriable,
            "red" => CheckType::NonRetriable,
            other => return Err(CallbackError::UnknownAction(other.to_string())),
        };
        match ints.as_slice() {
            [kind, skill] if *kind == flow.id() => Ok(CallbackAction::SkillChosen {
                flow,
                skill: *skill,
            }),
            [kind, skill, difficulty] if *kind == flow.id() => {
                Ok(CallbackAction::DifficultyChosen {
                    flow,
                    skill: *skill,
                    difficulty: *difficulty,
                })
            }
            _ => Err(CallbackError::BadShape),
        }
    }

    fn parse_list(ints: &[i64]) -> Result<Self, CallbackError> {
        let op = ListOp::from_id(ints[0]).ok_or(CallbackError::BadShape)?;
        match (op, &ints[1..]) {
            (ListOp::Detail, [check_id]) => Ok(CallbackAction::ShowCheck {
                check_id: *check_id,
            }),
            (ListOp::Older, [anchor]) => Ok(CallbackAction::Page {
                direction: Direction::Older,
                anchor: *anchor,
            }),
            (ListOp::Newer, [anchor]) => Ok(CallbackAction::Page {
                direction: Direction::Newer,
                anchor: *anchor,
            }),
            (ListOp::Record, [check_id, result]) => Ok(CallbackAction::RecordAttempt {
                check_id: *check_id,
                result: *result,
            }),
            (ListOp::Back, [0]) => Ok(CallbackAction::BackToList),
            (ListOp::Exhausted, [_]) => Ok(CallbackAction::Exhausted),
            _ => Err(CallbackError::BadShape),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            CallbackAction::SkillChosen { flow, skill } => {
                encode(flow.command(), &[flow.id(), *skill])
            }
            CallbackAction::DifficultyChosen {
                flow,
                skill,
                difficulty,
            } => encode(flow.command(), &[flow.id(), *skill, *difficulty]),
            CallbackAction::ShowCheck { check_id } => {
                encode(LIST_ACTION, &[ListOp::Detail.id(), *check_id])
            }
            CallbackAction::Page { direction, anchor } => {
                let op = match direction {
                    Direction::Older => ListOp::Older,
                    Direction::Newer => ListOp::Newer,
                };
                encode(LIST_ACTION, &[op.id(), *anchor])
            }
            CallbackAction::RecordAttempt { check_id, result } => {
                encode(LIST_ACTION, &[ListOp::Record.id(), *check_id, *result])
            }
            CallbackAction::BackToList => encode(LIST_ACTION, &[ListOp::Back.id(), 0]),
            CallbackAction::Exhausted => encode(LIST_ACTION, &[ListOp::Exhausted.id(), 0]),
        }
    }
}
