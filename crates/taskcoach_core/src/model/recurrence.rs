//! Recurrence rules for task dates.
//!
//! # Responsibility
//! - Describe a repeat rule (`unit`, `amount`, `same_weekday`, `max`, `count`).
//! - Compute the next occurrence of a date or date-time with calendar-aware
//!   month and year arithmetic.
//!
//! # Invariants
//! - A rule without a unit is inactive and leaves dates unchanged.
//! - Advancing with `next = true` counts the occurrence; reaching `max`
//!   (when non-zero) clears the unit.
//! - Equality ignores `count`; `copy()` resets it.
//! - Monthly steps that land on an invalid day walk the day down until valid.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecurrenceResult<T> = Result<T, RecurrenceError>;

/// Error for recurrence values that cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    UnknownUnit(String),
    ZeroAmount,
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownUnit(label) => write!(f, "unknown recurrence unit: {label}"),
            Self::ZeroAmount => write!(f, "recurrence amount must be at least 1"),
        }
    }
}

impl Error for RecurrenceError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceUnit {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceUnit {
    /// Parses a unit label; the empty label means "no recurrence".
    pub fn parse(label: &str) -> RecurrenceResult<Option<Self>> {
        match label.trim() {
            "" => Ok(None),
            "daily" => Ok(Some(Self::Daily)),
            "weekly" => Ok(Some(Self::Weekly)),
            "monthly" => Ok(Some(Self::Monthly)),
            "yearly" => Ok(Some(Self::Yearly)),
            other => Err(RecurrenceError::UnknownUnit(other.to_string())),
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl Display for RecurrenceUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Date-like values the engine can advance.
pub trait Occurrence: Copy {
    fn calendar_date(self) -> NaiveDate;
    /// Same time of day (if any) on `date`.
    fn on_date(self, date: NaiveDate) -> Self;
}

impl Occurrence for NaiveDate {
    fn calendar_date(self) -> NaiveDate {
        self
    }

    fn on_date(self, date: NaiveDate) -> Self {
        date
    }
}

impl Occurrence for NaiveDateTime {
    fn calendar_date(self) -> NaiveDate {
        self.date()
    }

    fn on_date(self, date: NaiveDate) -> Self {
        date.and_time(self.time())
    }
}

/// Repeat rule attached to a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Recurrence {
    pub unit: Option<RecurrenceUnit>,
    pub amount: u32,
    pub same_weekday: bool,
    /// Number of occurrences before the rule expires; 0 means unlimited.
    pub max: u32,
    pub count: u32,
    /// Re-base dates on the completion moment instead of the planned dates.
    pub recur_based_on_completion: bool,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self {
            unit: None,
            amount: 1,
            same_weekday: false,
            max: 0,
            count: 0,
            recur_based_on_completion: false,
        }
    }
}

impl PartialEq for Recurrence {
    fn eq(&self, other: &Self) -> bool {
        self.unit == other.unit
            && self.amount == other.amount
            && self.same_weekday == other.same_weekday
            && self.max == other.max
            && self.recur_based_on_completion == other.recur_based_on_completion
    }
}

impl Recurrence {
    pub fn new(unit: RecurrenceUnit, amount: u32) -> RecurrenceResult<Self> {
        if amount == 0 {
            return Err(RecurrenceError::ZeroAmount);
        }
        Ok(Self {
            unit: Some(unit),
            amount,
            ..Self::default()
        })
    }

    /// Builds a rule from its persisted unit label.
    pub fn from_label(label: &str, amount: u32) -> RecurrenceResult<Self> {
        match RecurrenceUnit::parse(label)? {
            Some(unit) => Self::new(unit, amount),
            None => Ok(Self::default()),
        }
    }

    pub fn with_same_weekday(mut self, same_weekday: bool) -> Self {
        self.same_weekday = same_weekday;
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = max;
        self
    }

    pub fn with_recur_based_on_completion(mut self, based_on_completion: bool) -> Self {
        self.recur_based_on_completion = based_on_completion;
        self
    }

    pub fn is_active(&self) -> bool {
        self.unit.is_some()
    }

    /// Same rule with the occurrence count reset.
    pub fn copy(&self) -> Self {
        Self { count: 0, ..*self }
    }

    /// Whether every field, including `count`, matches.
    pub fn same_state(&self, other: &Self) -> bool {
        self == other && self.count == other.count
    }

    /// Next occurrence of `at`; inactive rules return `at` unchanged.
    pub fn next_date<T: Occurrence>(&self, at: T) -> T {
        let Some(unit) = self.unit else {
            return at;
        };
        let mut date = at.calendar_date();
        for _ in 0..self.amount.max(1) {
            date = step(unit, self.same_weekday, date);
        }
        at.on_date(date)
    }

    /// Advances every date by one occurrence.
    ///
    /// Returns `None` when the rule is inactive. With `next`, the occurrence
    /// is counted and the rule expires once `count` reaches a non-zero `max`.
    pub fn occurrences<T: Occurrence>(
        &mut self,
        dates: &[Option<T>],
        next: bool,
    ) -> Option<Vec<Option<T>>> {
        if !self.is_active() {
            return None;
        }
        let result = dates
            .iter()
            .map(|date| date.map(|at| self.next_date(at)))
            .collect();
        if next {
            self.count += 1;
            if self.max > 0 && self.count >= self.max {
                debug!(
                    "event=recurrence_exhausted module=recurrence status=ok count={} max={}",
                    self.count, self.max
                );
                self.unit = None;
            }
        }
        Some(result)
    }
}

fn step(unit: RecurrenceUnit, same_weekday: bool, date: NaiveDate) -> NaiveDate {
    let next = match unit {
        RecurrenceUnit::Daily => date.checked_add_days(Days::new(1)),
        RecurrenceUnit::Weekly => date.checked_add_days(Days::new(7)),
        RecurrenceUnit::Monthly => next_month(date, same_weekday),
        RecurrenceUnit::Yearly => next_year(date, same_weekday),
    };
    next.unwrap_or(date)
}

fn next_month(date: NaiveDate, same_weekday: bool) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    if same_weekday {
        let week_of_month = ((date.day() - 1) / 7).min(3);
        let mut candidate = NaiveDate::from_ymd_opt(year, month, week_of_month * 7 + 1)?;
        while candidate.weekday() != date.weekday() {
            candidate = candidate.succ_opt()?;
        }
        return Some(candidate);
    }
    let mut day = date.day();
    loop {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(candidate);
        }
        if day <= 1 {
            return None;
        }
        day -= 1;
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

fn next_year(date: NaiveDate, same_weekday: bool) -> Option<NaiveDate> {
    let year = date.year();
    let spans_leap_day = (is_leap_year(year) && date.month() <= 2)
        || (is_leap_year(year + 1) && date.month() >= 3);
    let days = if spans_leap_day { 366 } else { 365 };
    let candidate = date.checked_add_days(Days::new(days))?;
    if !same_weekday {
        return Some(candidate);
    }
    let back = (7 + candidate.weekday().num_days_from_monday()
        - date.weekday().num_days_from_monday())
        % 7;
    let earlier = candidate.checked_sub_days(Days::new(u64::from(back)))?;
    if earlier.year() == year + 1 || earlier == candidate {
        return Some(earlier);
    }
    earlier.checked_add_days(Days::new(7))
}

#[cfg(test)]
mod tests {
    use super::{Recurrence, RecurrenceError, RecurrenceUnit};
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn monthly_clamps_to_last_valid_day() {
        let monthly = Recurrence::new(RecurrenceUnit::Monthly, 1).expect("rule");
        let february = monthly.next_date(date(2020, 1, 31));
        assert_eq!(february, date(2020, 2, 29));
        assert_eq!(monthly.next_date(february), date(2020, 3, 29));
    }

    #[test]
    fn monthly_wraps_year() {
        let monthly = Recurrence::new(RecurrenceUnit::Monthly, 2).expect("rule");
        assert_eq!(monthly.next_date(date(2021, 12, 15)), date(2022, 2, 15));
    }

    #[test]
    fn monthly_same_weekday_keeps_week_of_month() {
        // Second Tuesday of March 2021 -> second Tuesday of April 2021.
        let monthly = Recurrence::new(RecurrenceUnit::Monthly, 1)
            .expect("rule")
            .with_same_weekday(true);
        assert_eq!(monthly.next_date(date(2021, 3, 9)), date(2021, 4, 13));
    }

    #[test]
    fn yearly_same_weekday_around_leap_day() {
        let yearly = Recurrence::new(RecurrenceUnit::Yearly, 1)
            .expect("rule")
            .with_same_weekday(true);
        assert_eq!(yearly.next_date(date(2020, 2, 29)), date(2021, 2, 27));
    }

    #[test]
    fn yearly_adds_leap_day_when_crossed() {
        let yearly = Recurrence::new(RecurrenceUnit::Yearly, 1).expect("rule");
        assert_eq!(yearly.next_date(date(2019, 3, 1)), date(2020, 3, 1));
        assert_eq!(yearly.next_date(date(2021, 6, 1)), date(2022, 6, 1));
    }

    #[test]
    fn date_times_keep_time_of_day() {
        let weekly = Recurrence::new(RecurrenceUnit::Weekly, 1).expect("rule");
        let at: NaiveDateTime = date(2024, 5, 1).and_hms_opt(9, 30, 0).expect("time");
        assert_eq!(
            weekly.next_date(at),
            date(2024, 5, 8).and_hms_opt(9, 30, 0).expect("time")
        );
    }

    #[test]
    fn max_exhausts_rule() {
        let mut daily = Recurrence::new(RecurrenceUnit::Daily, 1)
            .expect("rule")
            .with_max(2);
        let start = Some(date(2024, 1, 1));

        assert_eq!(daily.occurrences(&[start], true), Some(vec![Some(date(2024, 1, 2))]));
        assert!(daily.is_active());
        assert!(daily.occurrences(&[start], true).is_some());
        assert!(!daily.is_active());
        assert_eq!(daily.occurrences(&[start], true), None);
    }

    #[test]
    fn equality_ignores_count_and_copy_resets_it() {
        let mut rule = Recurrence::new(RecurrenceUnit::Daily, 3).expect("rule");
        rule.count = 7;
        let copy = rule.copy();
        assert_eq!(copy, rule);
        assert_eq!(copy.count, 0);
        assert!(!copy.same_state(&rule));
    }

    #[test]
    fn labels_parse_and_reject_unknown_units() {
        assert_eq!(RecurrenceUnit::parse("weekly"), Ok(Some(RecurrenceUnit::Weekly)));
        assert_eq!(RecurrenceUnit::parse(""), Ok(None));
        assert_eq!(
            RecurrenceUnit::parse("hourly"),
            Err(RecurrenceError::UnknownUnit("hourly".to_string()))
        );
        assert_eq!(
            Recurrence::new(RecurrenceUnit::Daily, 0),
            Err(RecurrenceError::ZeroAmount)
        );
    }
}
