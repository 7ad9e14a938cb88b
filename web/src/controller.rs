use crate::countdown::{Countdown, CountdownTick};
use crate::settings::Settings;
use ppt_core as game;
use ppt_core::{Card, GameEngine, PersistenceAdapter, RandomSource, SlotStore};
use serde::Serialize;

/// What a countdown tick did to the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Running(u32),
    TimedOut(game::TimeoutOutcome),
}

impl Tick {
    pub const fn has_update(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Everything the page needs to draw the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub state: game::GameState,
    pub counts: game::CardCounts,
    pub cpu_cards: usize,
    pub seconds_left: Option<u32>,
    pub resume_pending: bool,
    pub can_deal: bool,
    pub name_editable: bool,
    pub history: Vec<game::HistoryEntry>,
}

/// Drives one engine from page events, saving after every change.
#[derive(Debug)]
pub struct Controller<S, R> {
    engine: GameEngine<R>,
    storage: PersistenceAdapter<S>,
    countdown: Countdown,
    clock: fn() -> u64,
    resume_pending: bool,
}

impl<S: SlotStore, R: RandomSource> Controller<S, R> {
    /// Picks up an unfinished session from storage; it waits for [`Controller::start`] before the clock runs.
    pub fn new(
        mut engine: GameEngine<R>,
        storage: PersistenceAdapter<S>,
        settings: Settings,
        clock: fn() -> u64,
    ) -> Self {
        let mut resume_pending = false;
        if let Some(snapshot) = storage.load_snapshot().filter(|snapshot| snapshot.is_active) {
            engine.restore_state(snapshot);
            resume_pending = engine.is_active();
            log::debug!("resumable session found for {}", engine.player_name());
        }

        Self {
            engine,
            storage,
            countdown: Countdown::new(settings),
            clock,
            resume_pending,
        }
    }

    pub fn engine(&self) -> &GameEngine<R> {
        &self.engine
    }

    pub fn storage(&self) -> &PersistenceAdapter<S> {
        &self.storage
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn is_resume_pending(&self) -> bool {
        self.resume_pending
    }

    /// Deals a new session, or resumes the restored one. Returns whether anything changed.
    pub fn start(&mut self) -> bool {
        if self.resume_pending {
            log::debug!("resuming session");
            self.resume_pending = false;
            self.restart_countdown();
            self.persist();
            return true;
        }

        if self.engine.is_active() {
            log::trace!("deal ignored, session in progress");
            return false;
        }

        self.engine.start();
        self.restart_countdown();
        self.persist();
        true
    }

    pub fn play(&mut self, choice: &str) -> Option<game::RoundResult> {
        if self.resume_pending {
            log::debug!("play ignored until the restored session is resumed");
            return None;
        }

        if self.engine.is_active() {
            self.countdown.stop();
        }

        match choice
            .parse::<Card>()
            .and_then(|card| self.engine.play(card))
        {
            Ok(result) => {
                self.after_resolution(result.summary.as_ref());
                Some(result)
            }
            Err(err) => {
                log::debug!("play {:?} rejected: {}", choice, err);
                self.restart_countdown();
                None
            }
        }
    }

    pub fn tick(&mut self) -> Tick {
        match self.countdown.tick() {
            CountdownTick::Idle => Tick::Idle,
            CountdownTick::Running { seconds_left } => Tick::Running(seconds_left),
            CountdownTick::Expired => {
                log::debug!("countdown expired");
                let outcome = self.engine.apply_timeout_penalty();
                let summary = outcome.summary().cloned();
                self.after_resolution(summary.as_ref());
                Tick::TimedOut(outcome)
            }
        }
    }

    /// Deals and renames are only allowed between sessions, or before resuming one.
    pub fn is_between_sessions(&self) -> bool {
        self.resume_pending || !self.engine.is_active()
    }

    /// Applies a new player name, keeping the old one if it is refused.
    pub fn commit_name(&mut self, name: &str) -> game::Result<String> {
        if !self.is_between_sessions() {
            log::warn!("rename to {:?} refused mid-session", name);
            return Err(game::GameError::SessionInProgress);
        }
        let name = game::validate_player_name(name).inspect_err(|err| {
            log::warn!("name {:?} refused: {}", name, err);
        })?;
        let applied = self.engine.set_player_name(&name).to_owned();
        self.persist();
        Ok(applied)
    }

    pub fn clear_history(&mut self) -> bool {
        self.storage.clear_history()
    }

    /// Keeps the snapshot slot in step with the session: saved while active, cleared otherwise.
    pub fn persist(&mut self) -> bool {
        if self.engine.is_active() {
            self.storage.save_snapshot(self.engine.state())
        } else {
            self.storage.clear_snapshot()
        }
    }

    pub fn view(&self) -> ViewModel {
        let state = self.engine.get_snapshot();
        ViewModel {
            counts: state.counts(),
            cpu_cards: state.cpu_hand.len(),
            seconds_left: self.countdown.seconds_left(),
            resume_pending: self.resume_pending,
            can_deal: self.is_between_sessions(),
            name_editable: self.is_between_sessions(),
            history: self.storage.history(),
            state,
        }
    }

    fn after_resolution(&mut self, summary: Option<&game::Summary>) {
        match summary {
            Some(summary) => {
                let entry = game::HistoryEntry::new((self.clock)(), self.engine.player_name(), summary);
                if !self.storage.add_history_entry(&entry) {
                    log::error!("match result could not be recorded");
                }
                self.countdown.stop();
            }
            None => self.restart_countdown(),
        }
        self.persist();
    }

    fn restart_countdown(&mut self) {
        if self.resume_pending || !self.engine.is_active() {
            self.countdown.stop();
        } else {
            self.countdown.start();
        }
    }
}
