use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type CategoryId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Step through `any -> easy -> medium -> hard -> any`.
    pub fn cycle(current: Option<Difficulty>, forward: bool) -> Option<Difficulty> {
        let mut slots: Vec<Option<Difficulty>> = vec![None];
        slots.extend(Self::ALL.iter().copied().map(Some));
        let idx = slots.iter().position(|d| *d == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % slots.len()
        } else if idx == 0 {
            slots.len() - 1
        } else {
            idx - 1
        };
        slots[next]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, medium or hard)")),
        }
    }
}

/// The key a session is requested under. Any difference in either field is a
/// different session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionParameters {
    pub category: CategoryId,
    pub difficulty: Option<Difficulty>,
}

impl SessionParameters {
    pub fn new(category: CategoryId, difficulty: Option<Difficulty>) -> Self {
        Self {
            category,
            difficulty,
        }
    }
}

impl fmt::Display for SessionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty {
            Some(d) => write!(f, "category {} ({d})", self.category),
            None => write!(f, "category {} (any difficulty)", self.category),
        }
    }
}
