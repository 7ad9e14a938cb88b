//! Boundary between untrusted stored JSON and the typed game records.
//!
//! Each persisted shape has one function here. A record that is not a JSON object is refused with `None`; any other
//! mismatch is repaired field by field and the result is tagged [`Sanitized::Fallback`].

use alloc::string::String;
use alloc::vec::Vec;
use core::str::FromStr;
use serde_json::{Map, Value};

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sanitized<T> {
    /// Every field was present and well-formed.
    Valid(T),
    /// At least one field was replaced by its default.
    Fallback(T),
}

impl<T> Sanitized<T> {
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Valid(value) | Self::Fallback(value) => value,
        }
    }

    pub fn as_inner(&self) -> &T {
        match self {
            Self::Valid(value) | Self::Fallback(value) => value,
        }
    }
}

/// Field reader that remembers whether anything had to be defaulted.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    fallback: bool,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Self {
            map,
            fallback: false,
        })
    }

    fn finish<T>(self, value: T) -> Sanitized<T> {
        if self.fallback {
            Sanitized::Fallback(value)
        } else {
            Sanitized::Valid(value)
        }
    }

    fn text(&mut self, key: &str) -> Option<&'a str> {
        let text = self.map.get(key).and_then(Value::as_str);
        self.fallback |= text.is_none();
        text
    }

    fn name(&mut self, key: &str, max_chars: usize) -> String {
        sanitize_name(self.text(key).unwrap_or_default(), max_chars)
    }

    fn count(&mut self, key: &str) -> u32 {
        match self.map.get(key).and_then(Value::as_u64) {
            Some(count) => u32::try_from(count).unwrap_or(u32::MAX),
            None => {
                self.fallback = true;
                0
            }
        }
    }

    fn flag(&mut self, key: &str) -> bool {
        let flag = self.map.get(key).and_then(Value::as_bool);
        self.fallback |= flag.is_none();
        flag.unwrap_or(false)
    }

    fn hand(&mut self, key: &str) -> Vec<Card> {
        let Some(items) = self.map.get(key).and_then(Value::as_array) else {
            self.fallback = true;
            return Vec::new();
        };
        let hand: Vec<Card> = items.iter().filter_map(parse_str).collect();
        self.fallback |= hand.len() != items.len();
        hand
    }

    /// Blank string means "nothing yet". Anything unrecognized is also nothing, but flagged.
    fn optional<T: FromStr>(&mut self, key: &str) -> Option<T> {
        match self.text(key) {
            Some("") | None => None,
            Some(raw) => {
                let parsed = raw.parse().ok();
                self.fallback |= parsed.is_none();
                parsed
            }
        }
    }

    fn rounds(&mut self, key: &str) -> Vec<Round> {
        let Some(items) = self.map.get(key).and_then(Value::as_array) else {
            self.fallback = true;
            return Vec::new();
        };
        let rounds: Vec<Round> = items.iter().filter_map(sanitize_round).collect();
        self.fallback |= rounds.len() != items.len();
        rounds
    }
}

fn parse_str<T: FromStr>(value: &Value) -> Option<T> {
    value.as_str()?.parse().ok()
}

/// Rounds need a recognizable winner; unreadable choices degrade to `None`.
fn sanitize_round(value: &Value) -> Option<Round> {
    let map = value.as_object()?;
    let winner = map.get("winner").and_then(parse_str)?;
    Some(Round {
        player_choice: map.get("playerChoice").and_then(parse_str),
        cpu_choice: map.get("cpuChoice").and_then(parse_str),
        winner,
    })
}

pub fn sanitize_snapshot(value: &Value) -> Option<Sanitized<GameState>> {
    let mut fields = Fields::new(value)?;

    let player_hand = fields.hand("playerHand");
    let cpu_hand = fields.hand("cpuHand");
    let stored_active = fields.flag("isActive");
    let is_active = stored_active && !(player_hand.is_empty() && cpu_hand.is_empty());
    if stored_active != is_active {
        log::warn!("snapshot claimed an active session without cards");
    }

    let state = GameState {
        player_name: fields.name("playerName", MAX_NAME_LEN),
        player_score: fields.count("playerScore"),
        cpu_score: fields.count("cpuScore"),
        rounds: fields.rounds("rounds"),
        last_player_choice: fields.optional("lastPlayerChoice"),
        last_cpu_choice: fields.optional("lastCpuChoice"),
        last_winner: fields.optional("lastWinner"),
        last_message: String::from(fields.text("lastMessage").unwrap_or_default()),
        player_hand,
        cpu_hand,
        is_active,
    };
    Some(fields.finish(state))
}

pub fn sanitize_history_entry(value: &Value) -> Option<Sanitized<HistoryEntry>> {
    let mut fields = Fields::new(value)?;

    let id = match fields.map.get("id").and_then(Value::as_u64) {
        Some(id) if id > 0 => id,
        _ => {
            fields.fallback = true;
            0
        }
    };
    let entry = HistoryEntry {
        id,
        player: fields.name("player", MAX_HISTORY_NAME_LEN),
        player_score: fields.count("playerScore"),
        cpu_score: fields.count("cpuScore"),
    };
    Some(fields.finish(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use serde_json::json;

    fn full_snapshot() -> Value {
        json!({
            "playerName": "Ana",
            "playerHand": ["rock", "paper"],
            "cpuHand": ["scissors", "scissors"],
            "playerScore": 2,
            "cpuScore": 1,
            "rounds": [
                { "playerChoice": "rock", "cpuChoice": "scissors", "winner": "player" },
                { "playerChoice": null, "cpuChoice": "paper", "winner": "cpu" },
            ],
            "isActive": true,
            "lastPlayerChoice": "",
            "lastCpuChoice": "paper",
            "lastWinner": "cpu",
            "lastMessage": "Te quedaste pensando... CPU jugo papel.",
        })
    }

    #[test]
    fn well_formed_snapshot_is_valid() {
        let sanitized = sanitize_snapshot(&full_snapshot()).unwrap();

        assert!(sanitized.is_valid());
        let state = sanitized.into_inner();
        assert_eq!(state.player_name, "Ana");
        assert_eq!(state.player_hand, vec![Card::Rock, Card::Paper]);
        assert_eq!(state.rounds.len(), 2);
        assert!(state.rounds[1].is_timeout());
        assert_eq!(state.last_player_choice, None);
        assert_eq!(state.last_cpu_choice, Some(Card::Paper));
        assert!(state.is_active);
    }

    #[test]
    fn non_objects_are_refused() {
        assert_eq!(sanitize_snapshot(&Value::Null), None);
        assert_eq!(sanitize_snapshot(&json!([])), None);
        assert_eq!(sanitize_snapshot(&json!(42)), None);
        assert_eq!(sanitize_history_entry(&json!("entry")), None);
    }

    #[test]
    fn corrupted_fields_fall_back_to_defaults() {
        let sanitized = sanitize_snapshot(&json!({
            "playerName": 12,
            "playerHand": ["rock", "lizard", 3],
            "cpuHand": "paper",
            "playerScore": -4,
            "cpuScore": 1.5,
            "rounds": [
                null,
                { "playerChoice": "spock", "cpuChoice": "rock", "winner": "cpu" },
                { "playerChoice": "rock", "cpuChoice": "rock", "winner": "nobody" },
            ],
            "isActive": "yes",
            "lastPlayerChoice": "spock",
            "lastWinner": 7,
        }))
        .unwrap();

        assert!(!sanitized.is_valid());
        let state = sanitized.into_inner();
        assert_eq!(state.player_name, "Jugador");
        assert_eq!(state.player_hand, vec![Card::Rock]);
        assert!(state.cpu_hand.is_empty());
        assert_eq!((state.player_score, state.cpu_score), (0, 0));
        assert_eq!(
            state.rounds,
            vec![Round {
                player_choice: None,
                cpu_choice: Some(Card::Rock),
                winner: Outcome::Cpu,
            }]
        );
        assert!(!state.is_active);
        assert_eq!(state.last_player_choice, None);
        assert_eq!(state.last_winner, None);
        assert_eq!(state.last_message, "");
    }

    #[test]
    fn active_flag_requires_cards() {
        let mut raw = full_snapshot();
        raw["playerHand"] = json!([]);
        raw["cpuHand"] = json!([]);

        let state = sanitize_snapshot(&raw).unwrap().into_inner();

        assert!(!state.is_active);
    }

    #[test]
    fn long_names_are_capped_per_shape() {
        let long = "x".repeat(60);

        let state = sanitize_snapshot(&json!({ "playerName": long.as_str() })).unwrap();
        let entry = sanitize_history_entry(&json!({ "player": long.as_str() })).unwrap();

        assert_eq!(state.as_inner().player_name.len(), MAX_NAME_LEN);
        assert_eq!(entry.as_inner().player.len(), MAX_HISTORY_NAME_LEN);
    }

    #[test]
    fn history_entry_defaults() {
        let sanitized = sanitize_history_entry(&json!({ "playerScore": 3 })).unwrap();

        assert!(!sanitized.is_valid());
        assert_eq!(
            sanitized.into_inner(),
            HistoryEntry {
                id: 0,
                player: String::from("Jugador"),
                player_score: 3,
                cpu_score: 0,
            }
        );

        let valid = sanitize_history_entry(&json!({
            "id": 1700000000000u64,
            "player": "Ana",
            "playerScore": 4,
            "cpuScore": 2,
        }))
        .unwrap();
        assert!(valid.is_valid());
    }
}
