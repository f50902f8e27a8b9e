//! Date validation.
//!
//! This module provides [`DateValidator`], which parses timestamps into
//! `chrono::DateTime<Utc>` and checks them against calendar constraints.
//! All calendar fields are read in UTC.

use chrono::{DateTime, Datelike, Duration, Month, NaiveDate, SecondsFormat, TimeZone, Utc, Weekday};
use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, Issues};
use crate::path::JsonPath;
use crate::pipeline::Modifiers;
use crate::ParseResult;

use super::traits::Validator;

/// An amount of time added to every parsed date.
///
/// ```rust
/// use surely::DateOffset;
///
/// let offset = DateOffset::default().days(1).hours(-2);
/// assert_eq!(offset.total_milliseconds(), 22 * 3_600_000);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOffset {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl DateOffset {
    pub fn days(mut self, days: i64) -> Self {
        self.days = days;
        self
    }

    pub fn hours(mut self, hours: i64) -> Self {
        self.hours = hours;
        self
    }

    pub fn minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn seconds(mut self, seconds: i64) -> Self {
        self.seconds = seconds;
        self
    }

    pub fn milliseconds(mut self, milliseconds: i64) -> Self {
        self.milliseconds = milliseconds;
        self
    }

    /// Returns the whole offset in milliseconds, saturating on overflow.
    pub fn total_milliseconds(&self) -> i64 {
        self.days
            .saturating_mul(86_400_000)
            .saturating_add(self.hours.saturating_mul(3_600_000))
            .saturating_add(self.minutes.saturating_mul(60_000))
            .saturating_add(self.seconds.saturating_mul(1_000))
            .saturating_add(self.milliseconds)
    }

    fn to_duration(self) -> Duration {
        // i64::MIN milliseconds is outside Duration's range
        Duration::milliseconds(self.total_milliseconds().max(-i64::MAX))
    }
}

/// A validator for dates.
///
/// Strict mode accepts RFC 3339 strings. Coercive mode also accepts epoch
/// milliseconds and plain `YYYY-MM-DD` dates (taken as midnight UTC).
/// The offset from [`add`](Self::add) is applied before any constraint is
/// checked; constraints are checked in a fixed order and the first failure
/// is reported.
///
/// Outputs convert back to RFC 3339 strings with millisecond precision.
///
/// # Example
///
/// ```rust
/// use surely::{Schema, Validator};
/// use chrono::{TimeZone, Utc, Weekday};
/// use serde_json::json;
///
/// let launch = Schema::date()
///     .after(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
///     .weekday(Weekday::Mon);
///
/// assert!(launch.validate(&json!("2024-01-01T09:30:00Z")));
/// assert!(!launch.validate(&json!("2024-01-02T09:30:00Z")));
/// assert!(!launch.validate(&json!("2024-01-01")));
/// ```
#[derive(Clone)]
pub struct DateValidator {
    add: Option<DateOffset>,
    before: Option<DateTime<Utc>>,
    after: Option<DateTime<Utc>>,
    days_from_today: Option<i64>,
    weekday: Option<Weekday>,
    day_of_month: Option<u32>,
    month: Option<Month>,
    year: Option<i32>,
    modifiers: Modifiers<DateTime<Utc>>,
}

impl DateValidator {
    pub fn new() -> Self {
        Self {
            add: None,
            before: None,
            after: None,
            days_from_today: None,
            weekday: None,
            day_of_month: None,
            month: None,
            year: None,
            modifiers: Modifiers::new(),
        }
    }

    /// Shifts every parsed date by `offset`.
    pub fn add(mut self, offset: DateOffset) -> Self {
        self.add = Some(offset);
        self
    }

    /// Requires a date strictly before `bound`.
    pub fn before(mut self, bound: DateTime<Utc>) -> Self {
        self.before = Some(bound);
        self
    }

    /// Requires a date strictly after `bound`.
    pub fn after(mut self, bound: DateTime<Utc>) -> Self {
        self.after = Some(bound);
        self
    }

    /// Requires a date strictly between `a` and `b`, in either order.
    pub fn between(self, a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        let (min, max) = if a < b { (a, b) } else { (b, a) };
        self.after(min).before(max)
    }

    /// Requires the calendar day `days` after today (negative for the past).
    pub fn days_from_today(mut self, days: i64) -> Self {
        self.days_from_today = Some(days);
        self
    }

    pub fn days_ahead(self, days: i64) -> Self {
        self.days_from_today(days)
    }

    pub fn days_ago(self, days: i64) -> Self {
        self.days_from_today(days.saturating_neg())
    }

    pub fn today(self) -> Self {
        self.days_from_today(0)
    }

    pub fn weekday(mut self, weekday: Weekday) -> Self {
        self.weekday = Some(weekday);
        self
    }

    /// Requires the given day of the month, 1 to 31.
    pub fn day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    fn coerce_input(&self, value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(&Utc));
                }
                if self.is_strict() {
                    return None;
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| Utc.from_utc_datetime(&naive))
            }
            Value::Number(n) if !self.is_strict() => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        }
    }

    fn check(&self, dt: DateTime<Utc>, path: &JsonPath) -> Option<Issue> {
        let fail = |code: &str, message: String, expected: String| {
            Some(
                Issue::refinement(path.clone(), code, message, date_to_value(dt))
                    .with_expected(expected),
            )
        };

        if let Some(bound) = self.before {
            if dt >= bound {
                return fail(
                    "before",
                    format!("must be before {}, got {}", iso(bound), iso(dt)),
                    format!("date before {}", iso(bound)),
                );
            }
        }
        if let Some(bound) = self.after {
            if dt <= bound {
                return fail(
                    "after",
                    format!("must be after {}, got {}", iso(bound), iso(dt)),
                    format!("date after {}", iso(bound)),
                );
            }
        }
        if let Some(days) = self.days_from_today {
            let wanted = match days {
                0 => "today".to_string(),
                d if d > 0 => format!("{} days ahead", d),
                d => format!("{} days ago", d.unsigned_abs()),
            };
            let Some(target) = Duration::try_days(days)
                .and_then(|delta| Utc::now().checked_add_signed(delta))
                .map(|shifted| shifted.date_naive())
            else {
                return fail(
                    "days_from_today",
                    format!("must be {}, which is outside the supported date range", wanted),
                    wanted,
                );
            };
            if dt.date_naive() != target {
                return fail(
                    "days_from_today",
                    format!("must be {}, got {}", wanted, dt.date_naive()),
                    target.to_string(),
                );
            }
        }
        if let Some(weekday) = self.weekday {
            if dt.weekday() != weekday {
                return fail(
                    "weekday",
                    format!("must fall on {}, got {}", weekday, dt.weekday()),
                    weekday.to_string(),
                );
            }
        }
        if let Some(day) = self.day_of_month {
            if dt.day() != day {
                return fail(
                    "day_of_month",
                    format!("day of month must be {}, got {}", day, dt.day()),
                    day.to_string(),
                );
            }
        }
        if let Some(month) = self.month {
            if dt.month() != month.number_from_month() {
                return fail(
                    "month",
                    format!("month must be {}, got {}", month.name(), dt.month()),
                    month.name().to_string(),
                );
            }
        }
        if let Some(year) = self.year {
            if dt.year() != year {
                return fail(
                    "year",
                    format!("year must be {}, got {}", year, dt.year()),
                    year.to_string(),
                );
            }
        }
        None
    }
}

fn iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn date_to_value(dt: DateTime<Utc>) -> Value {
    Value::String(iso(dt))
}

impl Validator for DateValidator {
    type Output = DateTime<Utc>;

    fn modifiers(&self) -> &Modifiers<Self::Output> {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers<Self::Output> {
        &mut self.modifiers
    }

    fn parse_inner(&self, value: &Value, path: &JsonPath) -> ParseResult<Self::Output> {
        let mut dt = match self.coerce_input(value) {
            Some(dt) => dt,
            None => {
                return Validation::Failure(Issues::single(Issue::type_mismatch(
                    path.clone(),
                    "date",
                    value,
                )))
            }
        };

        if let Some(offset) = self.add {
            dt = match dt.checked_add_signed(offset.to_duration()) {
                Some(shifted) => shifted,
                None => {
                    return Validation::Failure(Issues::single(Issue::refinement(
                        path.clone(),
                        "date_out_of_range",
                        "date offset moves the value out of range",
                        value.clone(),
                    )))
                }
            };
        }

        match self.check(dt, path) {
            Some(issue) => Validation::Failure(Issues::single(issue)),
            None => Validation::Success(dt),
        }
    }

    fn output_to_value(&self, output: Self::Output) -> Value {
        date_to_value(output)
    }
}
