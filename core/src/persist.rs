use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::*;

/// Named slots the game keeps in its key-value store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Slot {
    History,
    Snapshot,
}

impl Slot {
    pub const fn key(self) -> &'static str {
        match self {
            Self::History => "ppt_history",
            Self::Snapshot => "ppt_snapshot",
        }
    }
}

/// Key-value medium holding JSON documents.
pub trait SlotStore {
    /// `Ok(None)` when the slot has never been written.
    fn read(&self, slot: Slot) -> core::result::Result<Option<Value>, StoreError>;
    fn write(&mut self, slot: Slot, value: &Value) -> core::result::Result<(), StoreError>;
    fn remove(&mut self, slot: Slot) -> core::result::Result<(), StoreError>;
}

/// In-memory store keeping raw JSON text, so tests can plant corrupted data.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slots: BTreeMap<Slot, String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that fails every operation, like a browser with storage disabled.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn insert_raw(&mut self, slot: Slot, raw: impl Into<String>) {
        self.slots.insert(slot, raw.into());
    }

    pub fn raw(&self, slot: Slot) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    fn check(&self) -> core::result::Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, slot: Slot) -> core::result::Result<Option<Value>, StoreError> {
        self.check()?;
        self.slots
            .get(&slot)
            .map(|raw| serde_json::from_str(raw).map_err(|_| StoreError::Corrupted))
            .transpose()
    }

    fn write(&mut self, slot: Slot, value: &Value) -> core::result::Result<(), StoreError> {
        self.check()?;
        let raw = serde_json::to_string(value).map_err(|_| StoreError::Corrupted)?;
        self.slots.insert(slot, raw);
        Ok(())
    }

    fn remove(&mut self, slot: Slot) -> core::result::Result<(), StoreError> {
        self.check()?;
        self.slots.remove(&slot);
        Ok(())
    }
}

/// One finished match as kept in the history slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: u64,
    pub player: String,
    pub player_score: u32,
    pub cpu_score: u32,
}

impl HistoryEntry {
    /// An `id` of 0 is replaced with a fresh one when the entry is stored.
    pub fn new(id: u64, player: &str, summary: &Summary) -> Self {
        Self {
            id,
            player: String::from(player),
            player_score: summary.player_score,
            cpu_score: summary.cpu_score,
        }
    }
}

/// Reads and writes the two slots, never trusting what comes back and never failing loudly.
#[derive(Clone, Debug)]
pub struct PersistenceAdapter<S> {
    store: S,
}

impl<S: SlotStore> PersistenceAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        let Some(Value::Array(items)) = self.read(Slot::History) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(sanitize_history_entry)
            .map(Sanitized::into_inner)
            .collect()
    }

    pub fn add_history_entry(&mut self, entry: &HistoryEntry) -> bool {
        let Ok(raw) = serde_json::to_value(entry) else {
            return false;
        };
        let Some(sanitized) = sanitize_history_entry(&raw) else {
            return false;
        };

        let mut history = self.history();
        let mut entry = sanitized.into_inner();
        if entry.id == 0 {
            entry.id = history
                .iter()
                .map(|entry| entry.id)
                .max()
                .unwrap_or(0)
                .saturating_add(1);
        }
        log::debug!(
            "recording match #{} for {}: {}-{}",
            entry.id,
            entry.player,
            entry.player_score,
            entry.cpu_score
        );
        history.push(entry);

        match serde_json::to_value(&history) {
            Ok(value) => self.write(Slot::History, &value),
            Err(_) => false,
        }
    }

    pub fn clear_history(&mut self) -> bool {
        self.remove(Slot::History)
    }

    pub fn save_snapshot(&mut self, state: &GameState) -> bool {
        let Ok(raw) = serde_json::to_value(state) else {
            return false;
        };
        let Some(clean) = sanitize_snapshot(&raw) else {
            return false;
        };
        match serde_json::to_value(clean.as_inner()) {
            Ok(value) => self.write(Slot::Snapshot, &value),
            Err(_) => false,
        }
    }

    pub fn load_snapshot(&self) -> Option<GameState> {
        let raw = self.read(Slot::Snapshot)?;
        let sanitized = sanitize_snapshot(&raw);
        match &sanitized {
            Some(Sanitized::Fallback(_)) => log::warn!("stored snapshot was repaired on load"),
            None => log::warn!("stored snapshot is not an object, ignoring it"),
            Some(Sanitized::Valid(_)) => {}
        }
        sanitized.map(Sanitized::into_inner)
    }

    pub fn clear_snapshot(&mut self) -> bool {
        self.remove(Slot::Snapshot)
    }

    fn read(&self, slot: Slot) -> Option<Value> {
        match self.store.read(slot) {
            Ok(value) => value,
            Err(err) => {
                log::error!("could not read {}: {}", slot.key(), err);
                None
            }
        }
    }

    fn write(&mut self, slot: Slot, value: &Value) -> bool {
        match self.store.write(slot, value) {
            Ok(()) => true,
            Err(err) => {
                log::error!("could not write {}: {}", slot.key(), err);
                false
            }
        }
    }

    fn remove(&mut self, slot: Slot) -> bool {
        match self.store.remove(slot) {
            Ok(()) => true,
            Err(err) => {
                log::error!("could not clear {}: {}", slot.key(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn summary(player_score: u32, cpu_score: u32) -> Summary {
        Summary {
            message: String::from("Fin del juego! Empate!"),
            player_score,
            cpu_score,
        }
    }

    fn active_state() -> GameState {
        GameState {
            player_name: String::from("Ana"),
            player_hand: vec![Card::Rock, Card::Paper],
            cpu_hand: vec![Card::Scissors, Card::Rock],
            player_score: 1,
            rounds: vec![Round::played(Card::Rock, Card::Scissors)],
            is_active: true,
            last_player_choice: Some(Card::Rock),
            last_cpu_choice: Some(Card::Scissors),
            last_winner: Some(Outcome::Player),
            last_message: String::from(":)"),
            ..GameState::default()
        }
    }

    #[test]
    fn history_starts_empty_and_grows_in_order() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        assert!(adapter.history().is_empty());

        assert!(adapter.add_history_entry(&HistoryEntry::new(10, "Ana", &summary(4, 2))));
        assert!(adapter.add_history_entry(&HistoryEntry::new(0, "Luis", &summary(1, 3))));

        let history = adapter.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].player, "Ana");
        assert_eq!((history[0].player_score, history[0].cpu_score), (4, 2));
        assert_eq!(history[1].id, 11);
    }

    #[test]
    fn next_id_does_not_overflow_past_the_largest_stored_one() {
        let mut store = MemoryStore::new();
        store.insert_raw(
            Slot::History,
            r#"[{"id": 18446744073709551615, "player": "Ana", "playerScore": 1, "cpuScore": 0}]"#,
        );
        let mut adapter = PersistenceAdapter::new(store);

        assert!(adapter.add_history_entry(&HistoryEntry::new(0, "Luis", &summary(0, 1))));

        let history = adapter.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, u64::MAX);
        assert_eq!(history[1].id, u64::MAX);
        assert_eq!(history[1].player, "Luis");
    }

    #[test]
    fn history_entries_are_capped_and_defaulted() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        let long = "n".repeat(80);

        adapter.add_history_entry(&HistoryEntry::new(1, &long, &summary(0, 0)));
        adapter.add_history_entry(&HistoryEntry::new(2, "   ", &summary(0, 0)));

        let history = adapter.history();
        assert_eq!(history[0].player.len(), MAX_HISTORY_NAME_LEN);
        assert_eq!(history[1].player, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn clear_history_empties_the_slot() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        adapter.add_history_entry(&HistoryEntry::new(1, "Ana", &summary(1, 0)));

        assert!(adapter.clear_history());

        assert!(adapter.history().is_empty());
        assert_eq!(adapter.store().raw(Slot::History), None);
    }

    #[test]
    fn corrupted_history_reads_as_empty_or_filtered() {
        let mut store = MemoryStore::new();
        store.insert_raw(Slot::History, "{not json");
        let adapter = PersistenceAdapter::new(store);
        assert!(adapter.history().is_empty());

        let mut store = MemoryStore::new();
        store.insert_raw(Slot::History, r#"{"id": 1}"#);
        assert!(PersistenceAdapter::new(store).history().is_empty());

        let mut store = MemoryStore::new();
        store.insert_raw(
            Slot::History,
            r#"[null, 3, {"id": 5, "player": "Ana", "playerScore": "lots", "cpuScore": 2}]"#,
        );
        let history = PersistenceAdapter::new(store).history();
        assert_eq!(
            history,
            vec![HistoryEntry {
                id: 5,
                player: String::from("Ana"),
                player_score: 0,
                cpu_score: 2,
            }]
        );
    }

    #[test]
    fn snapshot_round_trips() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        let state = active_state();

        assert!(adapter.save_snapshot(&state));

        assert_eq!(adapter.load_snapshot(), Some(state));
    }

    #[test]
    fn saving_recomputes_the_active_flag() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        let state = GameState {
            is_active: true,
            ..GameState::default()
        };

        assert!(adapter.save_snapshot(&state));

        assert!(!adapter.load_snapshot().unwrap().is_active);
    }

    #[test]
    fn missing_or_broken_snapshot_loads_as_none() {
        let adapter = PersistenceAdapter::new(MemoryStore::new());
        assert_eq!(adapter.load_snapshot(), None);

        let mut store = MemoryStore::new();
        store.insert_raw(Slot::Snapshot, "]]");
        assert_eq!(PersistenceAdapter::new(store).load_snapshot(), None);

        let mut store = MemoryStore::new();
        store.insert_raw(Slot::Snapshot, "[1, 2]");
        assert_eq!(PersistenceAdapter::new(store).load_snapshot(), None);
    }

    #[test]
    fn hand_edited_snapshot_is_repaired() {
        let mut store = MemoryStore::new();
        store.insert_raw(
            Slot::Snapshot,
            r#"{"playerName": "  Eve  ", "playerHand": ["piedra", "papel"], "cpuHand": ["rock"],
                "playerScore": 9000000000, "isActive": true}"#,
        );

        let state = PersistenceAdapter::new(store).load_snapshot().unwrap();

        assert_eq!(state.player_name, "Eve");
        assert_eq!(state.player_hand, vec![Card::Rock, Card::Paper]);
        assert_eq!(state.player_score, u32::MAX);
        assert_eq!(state.cpu_score, 0);
        assert!(state.is_active);
    }

    #[test]
    fn unavailable_storage_degrades_to_sentinels() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::unavailable());

        assert!(adapter.history().is_empty());
        assert!(!adapter.add_history_entry(&HistoryEntry::new(1, "Ana", &summary(1, 1))));
        assert!(!adapter.clear_history());
        assert!(!adapter.save_snapshot(&active_state()));
        assert_eq!(adapter.load_snapshot(), None);
        assert!(!adapter.clear_snapshot());
    }

    #[test]
    fn clear_snapshot_removes_it() {
        let mut adapter = PersistenceAdapter::new(MemoryStore::new());
        adapter.save_snapshot(&active_state());

        assert!(adapter.clear_snapshot());

        assert_eq!(adapter.load_snapshot(), None);
    }
}
