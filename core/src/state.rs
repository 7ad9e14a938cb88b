use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// One resolved turn. A `None` player choice marks a timeout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub player_choice: Option<Card>,
    pub cpu_choice: Option<Card>,
    pub winner: Outcome,
}

impl Round {
    pub const fn played(player: Card, cpu: Card) -> Self {
        Self {
            player_choice: Some(player),
            cpu_choice: Some(cpu),
            winner: player.against(cpu),
        }
    }

    pub const fn is_timeout(&self) -> bool {
        self.player_choice.is_none()
    }
}

/// Whole game state. This is also the snapshot shape written to storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub player_name: String,
    pub player_hand: Vec<Card>,
    pub cpu_hand: Vec<Card>,
    pub player_score: u32,
    pub cpu_score: u32,
    pub rounds: Vec<Round>,
    pub is_active: bool,
    #[serde(with = "blank")]
    pub last_player_choice: Option<Card>,
    #[serde(with = "blank")]
    pub last_cpu_choice: Option<Card>,
    #[serde(with = "blank")]
    pub last_winner: Option<Outcome>,
    pub last_message: String,
}

impl GameState {
    pub fn hands_exhausted(&self) -> bool {
        self.player_hand.is_empty() && self.cpu_hand.is_empty()
    }

    /// A session ends as soon as either side runs out of cards.
    pub fn either_hand_empty(&self) -> bool {
        self.player_hand.is_empty() || self.cpu_hand.is_empty()
    }

    pub fn counts(&self) -> CardCounts {
        CardCounts::from_hand(&self.player_hand)
    }

    pub fn summary(&self) -> Option<Summary> {
        (!self.is_active && self.last_winner == Some(Outcome::Finished)).then(|| Summary {
            message: self.last_message.clone(),
            player_score: self.player_score,
            cpu_score: self.cpu_score,
        })
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_name: String::from(DEFAULT_PLAYER_NAME),
            player_hand: Vec::new(),
            cpu_hand: Vec::new(),
            player_score: 0,
            cpu_score: 0,
            rounds: Vec::new(),
            is_active: false,
            last_player_choice: None,
            last_cpu_choice: None,
            last_winner: None,
            last_message: String::new(),
        }
    }
}

/// Final result of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub message: String,
    pub player_score: u32,
    pub cpu_score: u32,
}

/// Trims and truncates to `max_chars`, falling back to the default name when nothing is left.
pub fn sanitize_name(raw: &str, max_chars: usize) -> String {
    let name: String = raw.trim().chars().take(max_chars).collect();
    if name.is_empty() {
        String::from(DEFAULT_PLAYER_NAME)
    } else {
        name
    }
}

pub fn sanitize_player_name(raw: &str) -> String {
    sanitize_name(raw, MAX_NAME_LEN)
}

/// Sanitizes like [`sanitize_player_name`] and also refuses the computer's own name.
pub fn validate_player_name(raw: &str) -> Result<String> {
    let name = sanitize_player_name(raw);
    if name.trim().eq_ignore_ascii_case(RESERVED_NAME) {
        Err(GameError::ReservedName)
    } else {
        Ok(name)
    }
}

/// Serializes `None` as an empty string, and reads anything unparseable back as `None`.
mod blank {
    use alloc::string::String;
    use core::str::FromStr;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|raw| raw.parse().ok()))
    }
}
