use core::fmt;
use core::ops::{Index, IndexMut};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// One of the three card kinds in the deck.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Card {
    #[serde(alias = "piedra")]
    Rock,
    #[serde(alias = "papel")]
    Paper,
    #[serde(alias = "tijera")]
    Scissors,
}

impl Card {
    pub const ALL: [Card; 3] = [Card::Rock, Card::Paper, Card::Scissors];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Paper => "paper",
            Self::Scissors => "scissors",
        }
    }

    /// Label shown to the player.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rock => "piedra",
            Self::Paper => "papel",
            Self::Scissors => "tijera",
        }
    }

    pub const fn beats(self, other: Card) -> bool {
        matches!(
            (self, other),
            (Self::Rock, Self::Scissors) | (Self::Scissors, Self::Paper) | (Self::Paper, Self::Rock)
        )
    }

    /// Resolves a round from the player's point of view.
    pub const fn against(self, cpu: Card) -> Outcome {
        if self.slot() == cpu.slot() {
            Outcome::Tie
        } else if self.beats(cpu) {
            Outcome::Player
        } else {
            Outcome::Cpu
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Rock => 0,
            Self::Paper => 1,
            Self::Scissors => 2,
        }
    }
}

impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rock" | "piedra" => Ok(Self::Rock),
            "paper" | "papel" => Ok(Self::Paper),
            "scissors" | "tijera" => Ok(Self::Scissors),
            _ => Err(GameError::UnknownCard),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who took a round, or a session-level marker stored as the last winner.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Player,
    Cpu,
    Tie,
    Timeout,
    Finished,
}

impl Outcome {
    pub const fn round_message(self) -> &'static str {
        match self {
            Self::Player => ":)",
            Self::Cpu => ":(",
            _ => "Chicle!",
        }
    }
}

impl FromStr for Outcome {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "player" => Ok(Self::Player),
            "cpu" => Ok(Self::Cpu),
            "tie" => Ok(Self::Tie),
            "timeout" => Ok(Self::Timeout),
            "finished" => Ok(Self::Finished),
            _ => Err(GameError::UnknownOutcome),
        }
    }
}

/// Per-kind tally of a hand. Every kind is always present.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCounts {
    pub rock: usize,
    pub paper: usize,
    pub scissors: usize,
}

impl CardCounts {
    pub fn from_hand(hand: &[Card]) -> Self {
        let mut counts = Self::default();
        for &card in hand {
            counts[card] += 1;
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.rock + self.paper + self.scissors
    }

    pub fn iter(&self) -> impl Iterator<Item = (Card, usize)> + '_ {
        Card::ALL.into_iter().map(|card| (card, self[card]))
    }
}

impl Index<Card> for CardCounts {
    type Output = usize;

    fn index(&self, card: Card) -> &Self::Output {
        match card.slot() {
            0 => &self.rock,
            1 => &self.paper,
            _ => &self.scissors,
        }
    }
}

impl IndexMut<Card> for CardCounts {
    fn index_mut(&mut self, card: Card) -> &mut Self::Output {
        match card.slot() {
            0 => &mut self.rock,
            1 => &mut self.paper,
            _ => &mut self.scissors,
        }
    }
}
