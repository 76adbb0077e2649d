//! Action categories as the single source of truth for category strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which row of the keyboard a category sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Base actions.
    White,
    /// Modifier actions.
    Black,
}

/// The twelve action categories a player can choose from.
///
/// Ordering follows the chromatic scale, which also fixes the iteration order
/// used wherever categories are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl Category {
    /// Every category, in chromatic order.
    pub const ALL: [Self; 12] = [
        Self::C,
        Self::Cs,
        Self::D,
        Self::Ds,
        Self::E,
        Self::F,
        Self::Fs,
        Self::G,
        Self::Gs,
        Self::A,
        Self::As,
        Self::B,
    ];

    /// Size of the category alphabet.
    pub const COUNT: usize = Self::ALL.len();

    /// Display name, e.g. `"C#"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cs => "C#",
            Self::D => "D",
            Self::Ds => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::Fs => "F#",
            Self::G => "G",
            Self::Gs => "G#",
            Self::A => "A",
            Self::As => "A#",
            Self::B => "B",
        }
    }

    #[must_use]
    pub const fn kind(self) -> KeyKind {
        match self {
            Self::Cs | Self::Ds | Self::Fs | Self::Gs | Self::As => KeyKind::Black,
            _ => KeyKind::White,
        }
    }

    #[must_use]
    pub const fn is_white(self) -> bool {
        matches!(self.kind(), KeyKind::White)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::C),
            "C#" | "Db" => Ok(Self::Cs),
            "D" => Ok(Self::D),
            "D#" | "Eb" => Ok(Self::Ds),
            "E" => Ok(Self::E),
            "F" => Ok(Self::F),
            "F#" | "Gb" => Ok(Self::Fs),
            "G" => Ok(Self::G),
            "G#" | "Ab" => Ok(Self::Gs),
            "A" => Ok(Self::A),
            "A#" | "Bb" => Ok(Self::As),
            "B" => Ok(Self::B),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown category strings.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_variants() {
        for category in Category::ALL {
            let s = category.to_string();
            let parsed: Category = s.parse().expect("should parse");
            assert_eq!(parsed, category, "roundtrip failed for {category:?}");
        }
    }

    #[test]
    fn flat_aliases_parse() {
        let db: Category = "Db".parse().expect("should parse");
        assert_eq!(db, Category::Cs);

        let bb: Category = "Bb".parse().expect("should parse");
        assert_eq!(bb, Category::As);
    }

    #[test]
    fn unknown_category_errors() {
        let result: Result<Category, _> = "H".parse();
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "unknown category: H");
    }

    #[test]
    fn seven_white_five_black() {
        let white = Category::ALL.iter().filter(|c| c.is_white()).count();
        assert_eq!(white, 7);
        assert_eq!(Category::COUNT - white, 5);
        assert_eq!(Category::Fs.kind(), KeyKind::Black);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Category::Gs).unwrap();
        assert_eq!(json, "\"G#\"");
        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Category::Gs);
    }
}
