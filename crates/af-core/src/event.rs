//! Action events fed into the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;

/// The kind of combined action an event belonged to.
///
/// `None` is a real category for diversity purposes: a stream of plain,
/// ungrouped actions is as monotonous as a stream of identical groups.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[default]
    None,
    MajorTriad,
    MinorTriad,
    Diminished,
    Augmented,
    Suspended,
    Dominant7,
    Major7,
    Minor7,
}

impl GroupType {
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::MajorTriad,
        Self::MinorTriad,
        Self::Diminished,
        Self::Augmented,
        Self::Suspended,
        Self::Dominant7,
        Self::Major7,
        Self::Minor7,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MajorTriad => "major_triad",
            Self::MinorTriad => "minor_triad",
            Self::Diminished => "diminished",
            Self::Augmented => "augmented",
            Self::Suspended => "suspended",
            Self::Dominant7 => "dominant7",
            Self::Major7 => "major7",
            Self::Minor7 => "minor7",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single discrete action taken by the tracked subject.
///
/// When deserialized, `is_grouped` may be omitted and is then derived from
/// `group_type`; if present it must agree with it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActionEvent")]
pub struct ActionEvent {
    /// When the action happened, in seconds. Must not go backwards.
    pub timestamp: f64,
    /// Which of the twelve categories was used.
    pub category: Category,
    /// Whether the action was part of a larger combined action.
    #[serde(default)]
    pub is_grouped: bool,
    /// The kind of combination, or `GroupType::None`.
    #[serde(default)]
    pub group_type: GroupType,
}

impl ActionEvent {
    /// A plain, ungrouped action.
    #[must_use]
    pub const fn single(timestamp: f64, category: Category) -> Self {
        Self {
            timestamp,
            category,
            is_grouped: false,
            group_type: GroupType::None,
        }
    }

    /// An action that was part of a combination of the given kind.
    #[must_use]
    pub const fn grouped(timestamp: f64, category: Category, group_type: GroupType) -> Self {
        Self {
            timestamp,
            category,
            is_grouped: !matches!(group_type, GroupType::None),
            group_type,
        }
    }
}

/// The grouping flag contradicts the group type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("is_grouped is {is_grouped} but group_type is {group_type}")]
pub struct InconsistentGroup {
    pub is_grouped: bool,
    pub group_type: GroupType,
}

#[derive(Deserialize)]
struct RawActionEvent {
    timestamp: f64,
    category: Category,
    #[serde(default)]
    is_grouped: Option<bool>,
    #[serde(default)]
    group_type: GroupType,
}

impl TryFrom<RawActionEvent> for ActionEvent {
    type Error = InconsistentGroup;

    fn try_from(raw: RawActionEvent) -> Result<Self, Self::Error> {
        let event = Self::grouped(raw.timestamp, raw.category, raw.group_type);
        match raw.is_grouped {
            Some(is_grouped) if is_grouped != event.is_grouped => Err(InconsistentGroup {
                is_grouped,
                group_type: raw.group_type,
            }),
            _ => Ok(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_with_defaults() {
        let json = r#"{"timestamp": 1.5, "category": "F#"}"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event, ActionEvent::single(1.5, Category::Fs));
        assert!(!event.is_grouped);
    }

    #[test]
    fn grouped_event_parses_snake_case_group() {
        let json = r#"{
            "timestamp": 2.0,
            "category": "C",
            "is_grouped": true,
            "group_type": "major_triad"
        }"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ActionEvent::grouped(2.0, Category::C, GroupType::MajorTriad)
        );
    }

    #[test]
    fn event_rejects_unknown_category() {
        let json = r#"{"timestamp": 0.0, "category": "Z"}"#;
        let result: Result<ActionEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn group_flag_is_derived_when_omitted() {
        let json = r#"{"timestamp": 1.0, "category": "E", "group_type": "suspended"}"#;
        let event: ActionEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_grouped);
    }

    #[test]
    fn contradictory_group_fields_are_rejected() {
        let flagged = r#"{"timestamp": 0.0, "category": "C", "is_grouped": true}"#;
        let err = serde_json::from_str::<ActionEvent>(flagged).unwrap_err();
        assert!(
            err.to_string().contains("is_grouped is true but group_type is none"),
            "{err}"
        );

        let unflagged = r#"{
            "timestamp": 0.0,
            "category": "C",
            "is_grouped": false,
            "group_type": "major_triad"
        }"#;
        assert!(serde_json::from_str::<ActionEvent>(unflagged).is_err());
    }

    #[test]
    fn grouped_with_none_is_not_grouped() {
        let event = ActionEvent::grouped(0.0, Category::A, GroupType::None);
        assert!(!event.is_grouped);
    }
}
