use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde_json::Value;

use crate::*;

/// Result of a successful [`GameEngine::play`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub player_choice: Card,
    pub cpu_choice: Option<Card>,
    pub winner: Outcome,
    pub summary: Option<Summary>,
}

impl RoundResult {
    pub const fn is_finished(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutPenalty {
    /// Card taken from the player's hand, it does not count as played.
    pub removed_card: Option<Card>,
    pub cpu_choice: Option<Card>,
    pub summary: Option<Summary>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeoutOutcome {
    NoChange,
    Penalized(TimeoutPenalty),
}

impl TimeoutOutcome {
    pub const fn has_update(&self) -> bool {
        matches!(self, Self::Penalized(_))
    }

    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Penalized(TimeoutPenalty {
                summary: Some(_),
                ..
            })
        )
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Self::Penalized(penalty) => penalty.summary.as_ref(),
            Self::NoChange => None,
        }
    }
}

/// Owns the game state and enforces every transition on it.
#[derive(Clone, Debug)]
pub struct GameEngine<R> {
    state: GameState,
    rng: R,
}

impl<R: RandomSource> GameEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            state: GameState::default(),
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn player_name(&self) -> &str {
        &self.state.player_name
    }

    /// Deals a freshly shuffled deck, keeping only the player name from the previous state.
    pub fn start(&mut self) -> &GameState {
        let mut deck = full_deck();
        self.rng.shuffle(&mut deck);
        let cpu_hand = deck.split_off(HAND_SIZE);

        let player_name = core::mem::take(&mut self.state.player_name);
        self.state = GameState {
            player_name,
            player_hand: deck,
            cpu_hand,
            is_active: true,
            ..GameState::default()
        };
        log::debug!("new session for {}", self.state.player_name);
        &self.state
    }

    pub fn play(&mut self, choice: Card) -> Result<RoundResult> {
        self.check_active()?;
        let index = self
            .state
            .player_hand
            .iter()
            .position(|&card| card == choice)
            .ok_or(GameError::CardNotInHand)?;

        self.state.player_hand.remove(index);

        if self.state.cpu_hand.is_empty() {
            log::warn!("cpu hand was already empty, session forfeited to cpu");
            self.state.rounds.push(Round {
                player_choice: Some(choice),
                cpu_choice: None,
                winner: Outcome::Cpu,
            });
            let summary = self.finish();
            return Ok(RoundResult {
                player_choice: choice,
                cpu_choice: None,
                winner: Outcome::Cpu,
                summary: Some(summary),
            });
        }

        let cpu_choice = self.draw_cpu_card();
        let round = Round::played(choice, cpu_choice);
        match round.winner {
            Outcome::Player => self.state.player_score = self.state.player_score.saturating_add(1),
            Outcome::Cpu => self.state.cpu_score = self.state.cpu_score.saturating_add(1),
            _ => {}
        }
        self.state.rounds.push(round);
        self.state.last_player_choice = Some(choice);
        self.state.last_cpu_choice = Some(cpu_choice);
        self.state.last_winner = Some(round.winner);
        self.state.last_message = String::from(round.winner.round_message());
        log::trace!("{:?} vs {:?}: {:?}", choice, cpu_choice, round.winner);

        let summary = self.state.either_hand_empty().then(|| self.finish());
        Ok(RoundResult {
            player_choice: choice,
            cpu_choice: Some(cpu_choice),
            winner: round.winner,
            summary,
        })
    }

    /// Player ran out of time: a random card of theirs is lost and the cpu gets a free point.
    pub fn apply_timeout_penalty(&mut self) -> TimeoutOutcome {
        if !self.state.is_active || self.state.hands_exhausted() {
            return TimeoutOutcome::NoChange;
        }

        let removed_card = take_random(&mut self.state.player_hand, &mut self.rng);
        let cpu_choice = take_random(&mut self.state.cpu_hand, &mut self.rng);
        if cpu_choice.is_some() {
            self.state.cpu_score = self.state.cpu_score.saturating_add(1);
        }
        self.state.player_score = self.state.player_score.saturating_sub(1);

        let winner = if cpu_choice.is_some() {
            Outcome::Cpu
        } else {
            Outcome::Timeout
        };
        self.state.last_player_choice = None;
        self.state.last_cpu_choice = cpu_choice;
        self.state.last_winner = Some(winner);
        self.state.last_message = match cpu_choice {
            Some(card) => format!("Te quedaste pensando... CPU jugo {card}."),
            None => String::from("Te quedaste pensando..."),
        };
        self.state.rounds.push(Round {
            player_choice: None,
            cpu_choice,
            winner,
        });
        log::debug!("timeout penalty, removed {removed_card:?}, cpu drew {cpu_choice:?}");

        let summary = self.state.either_hand_empty().then(|| self.finish());
        TimeoutOutcome::Penalized(TimeoutPenalty {
            removed_card,
            cpu_choice,
            summary,
        })
    }

    /// Closes the session. Calling it on an inactive state returns what is already stored.
    pub(crate) fn finish(&mut self) -> Summary {
        if !self.state.is_active {
            return Summary {
                message: self.state.last_message.clone(),
                player_score: self.state.player_score,
                cpu_score: self.state.cpu_score,
            };
        }

        let GameState {
            player_score,
            cpu_score,
            ..
        } = self.state;
        let verdict = match player_score.cmp(&cpu_score) {
            core::cmp::Ordering::Greater => "Ganaste! :)",
            core::cmp::Ordering::Less => "Perdedor! >:(",
            core::cmp::Ordering::Equal => "Empate!",
        };

        self.state.is_active = false;
        self.state.last_winner = Some(Outcome::Finished);
        self.state.last_message = format!("Fin del juego! {verdict}");
        log::debug!("session finished {player_score}-{cpu_score}");
        Summary {
            message: self.state.last_message.clone(),
            player_score,
            cpu_score,
        }
    }

    /// Final summary of the current session, once it has finished.
    pub fn summary(&self) -> Option<Summary> {
        self.state.summary()
    }

    pub fn set_player_name(&mut self, name: &str) -> &str {
        self.state.player_name = sanitize_player_name(name);
        &self.state.player_name
    }

    pub fn counts(&self) -> CardCounts {
        self.state.counts()
    }

    pub fn get_snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Rebuilds the state from an untrusted record. Only non-objects are refused.
    pub fn restore(&mut self, snapshot: &Value) -> bool {
        match sanitize_snapshot(snapshot) {
            Some(sanitized) => {
                if !sanitized.is_valid() {
                    log::warn!("restored snapshot needed fallback values");
                }
                self.restore_state(sanitized.into_inner());
                true
            }
            None => {
                log::warn!("refusing to restore a snapshot that is not an object");
                false
            }
        }
    }

    /// Adopts an already typed state, re-checking the name and the active flag.
    pub fn restore_state(&mut self, mut state: GameState) {
        state.player_name = sanitize_player_name(&state.player_name);
        state.is_active = state.is_active && !state.hands_exhausted();
        log::debug!(
            "restored session for {} (active: {})",
            state.player_name,
            state.is_active
        );
        self.state = state;
    }

    fn draw_cpu_card(&mut self) -> Card {
        let index = self.rng.index(self.state.cpu_hand.len());
        self.state.cpu_hand.remove(index)
    }

    fn check_active(&self) -> Result<()> {
        if self.state.is_active {
            Ok(())
        } else {
            Err(GameError::NotActive)
        }
    }
}

/// The unshuffled deck: every kind repeated [`COPIES_PER_KIND`] times.
pub fn full_deck() -> Vec<Card> {
    Card::ALL
        .into_iter()
        .flat_map(|card| core::iter::repeat_n(card, COPIES_PER_KIND))
        .collect()
}

fn take_random<R: RandomSource>(hand: &mut Vec<Card>, rng: &mut R) -> Option<Card> {
    if hand.is_empty() {
        None
    } else {
        let index = rng.index(hand.len());
        Some(hand.remove(index))
    }
}
