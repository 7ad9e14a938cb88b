use crate::utils::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Time the player gets for each move.
    pub countdown_ms: u32,
    pub tick_ms: u32,
}

impl Settings {
    pub const MIN_TICK_MS: u32 = 10;

    /// Keeps the tick usable and no longer than the countdown itself.
    pub fn normalized(self) -> Self {
        let tick_ms = self.tick_ms.max(Self::MIN_TICK_MS);
        Self {
            countdown_ms: self.countdown_ms.max(tick_ms),
            tick_ms,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            countdown_ms: 3000,
            tick_ms: 100,
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "ppt:settings";
}
