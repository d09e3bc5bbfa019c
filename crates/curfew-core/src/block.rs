//! Daily block state machine
//!
//! Pure decision logic: given the current local time and the persisted
//! configuration, decide whether the block must be activated or reset.
//! The caller persists the new configuration whenever the transition is not
//! [`Transition::None`].

use chrono::{NaiveDate, NaiveDateTime};
use curfew_store::BlockConfig;

/// State change produced by one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to persist
    None,
    /// The cutoff was reached; the target is denied for the rest of the day
    Activated,
    /// A stale activation was cleared
    Reset,
}

/// Result of [`evaluate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Configuration after the transition
    pub config: BlockConfig,

    /// What changed. When a stale block is cleared and today's cutoff has
    /// already passed in the same evaluation, this is `Activated`.
    pub transition: Transition,

    /// The block date that was cleared, if any
    pub cleared: Option<NaiveDate>,
}

impl Evaluation {
    pub fn changed(&self) -> bool {
        self.transition != Transition::None
    }
}

/// Decide the block state for `now`.
///
/// Evaluation order is fixed: the reset check runs first, then the
/// activation check runs against the post-reset state. An activation dated
/// anything other than today is stale, which also covers a date in the
/// future left behind by a clock change or a corrupt file.
pub fn evaluate(now: NaiveDateTime, config: &BlockConfig) -> Evaluation {
    let today = now.date();
    let mut next = config.clone();
    let mut transition = Transition::None;
    let mut cleared = None;

    if let Some(date) = next.block_date
        && date != today
    {
        next.block_date = None;
        cleared = Some(date);
        transition = Transition::Reset;
    }

    if next.block_date.is_none() && next.cutoff.has_passed(&now) {
        next.block_date = Some(today);
        transition = Transition::Activated;
    }

    Evaluation {
        config: next,
        transition,
        cleared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curfew_util::WallClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        d.and_hms_opt(h, m, s).unwrap()
    }

    fn config(cutoff: WallClock, block_date: Option<NaiveDate>) -> BlockConfig {
        BlockConfig {
            target_path: Some("/usr/bin/game".into()),
            cutoff,
            block_date,
        }
    }

    fn five_pm() -> WallClock {
        WallClock::new(17, 0).unwrap()
    }

    #[test]
    fn before_cutoff_nothing_happens() {
        let eval = evaluate(at(date(2024, 5, 22), 16, 59, 59), &config(five_pm(), None));

        assert_eq!(eval.transition, Transition::None);
        assert!(!eval.config.block_active());
        assert!(!eval.changed());
    }

    #[test]
    fn cutoff_reached_activates() {
        let today = date(2024, 5, 22);
        let eval = evaluate(at(today, 17, 0, 0), &config(five_pm(), None));

        assert_eq!(eval.transition, Transition::Activated);
        assert_eq!(eval.config.block_date, Some(today));
        assert_eq!(eval.cleared, None);
    }

    #[test]
    fn active_today_stays_active() {
        let today = date(2024, 5, 22);
        let eval = evaluate(at(today, 21, 0, 0), &config(five_pm(), Some(today)));

        assert_eq!(eval.transition, Transition::None);
        assert_eq!(eval.config.block_date, Some(today));
    }

    #[test]
    fn new_day_resets() {
        let eval = evaluate(
            at(date(2024, 5, 22), 0, 0, 1),
            &config(five_pm(), Some(date(2024, 5, 21))),
        );

        assert_eq!(eval.transition, Transition::Reset);
        assert!(!eval.config.block_active());
        assert_eq!(eval.cleared, Some(date(2024, 5, 21)));
    }

    #[test]
    fn stale_block_past_cutoff_resets_then_activates() {
        let today = date(2024, 5, 22);
        let eval = evaluate(at(today, 18, 0, 0), &config(five_pm(), Some(date(2024, 5, 20))));

        assert_eq!(eval.transition, Transition::Activated);
        assert_eq!(eval.config.block_date, Some(today));
        assert_eq!(eval.cleared, Some(date(2024, 5, 20)));
    }

    #[test]
    fn future_date_is_not_trusted() {
        let today = date(2024, 5, 22);
        let eval = evaluate(at(today, 9, 0, 0), &config(five_pm(), Some(date(2024, 6, 1))));

        assert_eq!(eval.transition, Transition::Reset);
        assert!(!eval.config.block_active());
    }

    #[test]
    fn future_date_past_cutoff_is_replaced_by_today() {
        let today = date(2024, 5, 22);
        let eval = evaluate(at(today, 17, 30, 0), &config(five_pm(), Some(date(2030, 1, 1))));

        assert_eq!(eval.transition, Transition::Activated);
        assert_eq!(eval.config.block_date, Some(today));
    }

    #[test]
    fn midnight_cutoff_activates_immediately() {
        let today = date(2024, 5, 22);
        let midnight = WallClock::new(0, 0).unwrap();

        let eval = evaluate(at(today, 0, 0, 0), &config(midnight, None));
        assert_eq!(eval.transition, Transition::Activated);

        // Rollover from yesterday's block straight into today's
        let eval = evaluate(at(today, 0, 0, 1), &config(midnight, Some(date(2024, 5, 21))));
        assert_eq!(eval.transition, Transition::Activated);
        assert_eq!(eval.config.block_date, Some(today));
    }

    #[test]
    fn reevaluating_same_instant_is_idempotent() {
        let today = date(2024, 5, 22);
        let instants = [
            at(today, 8, 0, 0),
            at(today, 17, 0, 0),
            at(today, 23, 59, 59),
        ];
        let starts = [
            config(five_pm(), None),
            config(five_pm(), Some(date(2024, 5, 21))),
            config(five_pm(), Some(date(2024, 5, 23))),
        ];

        for now in instants {
            for start in &starts {
                let first = evaluate(now, start);
                let second = evaluate(now, &first.config);
                assert_eq!(second.transition, Transition::None, "now={now} start={start:?}");
                assert_eq!(second.config, first.config);
            }
        }
    }

    #[test]
    fn target_and_cutoff_are_untouched() {
        let start = config(WallClock::new(6, 45).unwrap(), Some(date(2024, 5, 1)));
        let eval = evaluate(at(date(2024, 5, 22), 7, 0, 0), &start);

        assert_eq!(eval.config.target_path, start.target_path);
        assert_eq!(eval.config.cutoff, start.cutoff);
    }
}
