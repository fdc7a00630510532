use super::screen::Screen;
use super::store::AttemptSession;

//
// ─── SECTION TIMER ─────────────────────────────────────────────────────────────
//

/// Outcome of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// The countdown is not running; nothing happened.
    Idle,
    /// One second accrued and the countdown moved.
    Ticked,
    /// The countdown just hit zero. Fired at most once per section.
    Expired,
}

/// Countdown for the active section.
///
/// Always rebuilt from scratch when the active section or the screen
/// changes — a resumed attempt may have accumulated time server-side, so
/// incremental adjustment of a stale value is never safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTimer {
    seconds_left: u64,
    running: bool,
    expired: bool,
}

impl SectionTimer {
    /// A timer that never runs (untimed section, terminal attempt, or no
    /// attempt at all).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            seconds_left: 0,
            running: false,
            expired: false,
        }
    }

    /// Computes the countdown state for the session's active section.
    ///
    /// The countdown runs iff the attempt is in progress, the question
    /// screen is showing, the section is timed, and budget remains.
    #[must_use]
    pub fn recompute(session: &AttemptSession, screen: Screen) -> Self {
        let Some(section) = session.active_section() else {
            return Self::disabled();
        };
        let Some(minutes) = section.duration_minutes() else {
            return Self::disabled();
        };

        let budget = u64::from(minutes) * 60;
        let seconds_left = budget.saturating_sub(section.time_spent_secs());
        let running =
            session.is_in_progress() && seconds_left > 0 && screen == Screen::Question;
        Self {
            seconds_left,
            running,
            expired: seconds_left == 0,
        }
    }

    #[must_use]
    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether this section's budget is exhausted.
    #[must_use]
    pub fn has_expired(&self) -> bool {
        self.expired
    }

    /// Advances the countdown by one second while running: accrues time on
    /// the active question (and the attempt total) and reports expiry the
    /// instant the countdown reaches zero. After expiry the timer is
    /// stopped, so continued ticks are `Idle` — expiry fires exactly once.
    pub fn tick(&mut self, session: &mut AttemptSession) -> TimerTick {
        if !self.running {
            return TimerTick::Idle;
        }

        session.tick_active_question_time();
        self.seconds_left = self.seconds_left.saturating_sub(1);
        if self.seconds_left == 0 {
            self.running = false;
            self.expired = true;
            return TimerTick::Expired;
        }
        TimerTick::Ticked
    }

    /// Unconditionally stops the countdown (screen left, section changed,
    /// teardown).
    pub fn stop(&mut self) {
        self.running = false;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
