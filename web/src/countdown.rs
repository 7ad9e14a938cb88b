use crate::settings::Settings;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CountdownTick {
    Idle,
    Running { seconds_left: u32 },
    /// Time ran out. Reported once, the countdown is stopped afterwards.
    Expired,
}

/// Per-move timer, advanced by a fixed tick from the page's interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Countdown {
    duration_ms: u32,
    tick_ms: u32,
    remaining_ms: Option<u32>,
}

impl Countdown {
    pub fn new(settings: Settings) -> Self {
        let Settings {
            countdown_ms,
            tick_ms,
        } = settings.normalized();
        Self {
            duration_ms: countdown_ms,
            tick_ms,
            remaining_ms: None,
        }
    }

    pub fn tick_ms(&self) -> u32 {
        self.tick_ms
    }

    pub fn is_running(&self) -> bool {
        self.remaining_ms.is_some()
    }

    pub fn start(&mut self) {
        self.remaining_ms = Some(self.duration_ms);
    }

    pub fn stop(&mut self) {
        self.remaining_ms = None;
    }

    pub fn seconds_left(&self) -> Option<u32> {
        self.remaining_ms.map(|ms| ms.div_ceil(1000))
    }

    pub fn tick(&mut self) -> CountdownTick {
        let Some(remaining) = self.remaining_ms else {
            return CountdownTick::Idle;
        };
        match remaining.saturating_sub(self.tick_ms) {
            0 => {
                self.remaining_ms = None;
                CountdownTick::Expired
            }
            left => {
                self.remaining_ms = Some(left);
                CountdownTick::Running {
                    seconds_left: left.div_ceil(1000),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn countdown(countdown_ms: u32, tick_ms: u32) -> Countdown {
        Countdown::new(Settings {
            countdown_ms,
            tick_ms,
        })
    }

    #[test]
    fn idle_until_started() {
        let mut countdown = countdown(3000, 100);

        assert_eq!(countdown.tick(), CountdownTick::Idle);
        assert_eq!(countdown.seconds_left(), None);
    }

    #[test]
    fn expires_exactly_once_per_cycle() {
        let mut countdown = countdown(3000, 100);
        countdown.start();
        assert_eq!(countdown.seconds_left(), Some(3));

        let ticks: Vec<_> = (0..40).map(|_| countdown.tick()).collect();

        let expired = ticks.iter().filter(|&&tick| tick == CountdownTick::Expired).count();
        assert_eq!(expired, 1);
        assert_eq!(ticks[28], CountdownTick::Running { seconds_left: 1 });
        assert_eq!(ticks[29], CountdownTick::Expired);
        assert_eq!(ticks[30], CountdownTick::Idle);
        assert!(!countdown.is_running());
    }

    #[test]
    fn seconds_round_up() {
        let mut countdown = countdown(3000, 100);
        countdown.start();

        assert_eq!(countdown.tick(), CountdownTick::Running { seconds_left: 3 });
        for _ in 0..9 {
            countdown.tick();
        }
        assert_eq!(countdown.seconds_left(), Some(2));
    }

    #[test]
    fn restart_resets_the_full_duration() {
        let mut countdown = countdown(1000, 100);
        countdown.start();
        for _ in 0..5 {
            countdown.tick();
        }

        countdown.start();

        assert_eq!(countdown.seconds_left(), Some(1));
        assert_eq!((0..9).filter(|_| countdown.tick() == CountdownTick::Expired).count(), 0);
        assert_eq!(countdown.tick(), CountdownTick::Expired);
    }

    #[test]
    fn stop_cancels_a_pending_expiry() {
        let mut countdown = countdown(200, 100);
        countdown.start();
        countdown.tick();

        countdown.stop();

        assert_eq!(countdown.tick(), CountdownTick::Idle);
    }
}
