use crate::models::CompletionCounts;
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Color of a calendar day derived from completed/total habits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Indicator {
    Neutral,
    Red,
    Green,
    Gradient { percent: f64 },
}

impl Indicator {
    pub fn css(&self) -> String {
        match self {
            Indicator::Neutral => "background-color: var(--bg-tertiary)".to_string(),
            Indicator::Red => "background-color: var(--calendar-color-red)".to_string(),
            Indicator::Green => "background-color: var(--calendar-color-green)".to_string(),
            Indicator::Gradient { percent } => format!(
                "background: linear-gradient(to right, var(--calendar-color-red), \
                 var(--calendar-color-yellow) {percent}%, var(--calendar-color-green) {percent}%)"
            ),
        }
    }
}

pub fn day_indicator(completed: u32, total: usize) -> Indicator {
    if total == 0 {
        return Indicator::Neutral;
    }
    let ratio = f64::from(completed) / total as f64;
    if ratio == 0.0 {
        Indicator::Red
    } else if ratio >= 1.0 {
        Indicator::Green
    } else {
        Indicator::Gradient {
            percent: ratio * 100.0,
        }
    }
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: String,
    pub count: u32,
    /// `None` for days after today.
    pub indicator: Option<Indicator>,
}

impl DayCell {
    pub fn title(&self, total_habits: usize) -> String {
        format!("{}/{} completions", self.count, total_habits)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub month_name: String,
    pub year: i32,
    pub leading_blanks: u32,
    pub total_habits: usize,
    pub days: Vec<DayCell>,
}

pub fn month_view(today: NaiveDate, counts: &CompletionCounts, total_habits: usize) -> MonthView {
    let (first, last) = month_bounds(today);
    let days = (1..=last.day())
        .filter_map(|day| first.with_day(day))
        .map(|date| {
            let key = date_key(date);
            let count = counts.get(&key).copied().unwrap_or(0);
            let indicator = (date.day() <= today.day()).then(|| day_indicator(count, total_habits));
            DayCell {
                day: date.day(),
                date: key,
                count,
                indicator,
            }
        })
        .collect();

    MonthView {
        month_name: first.format("%B").to_string(),
        year: first.year(),
        leading_blanks: first.weekday().num_days_from_sunday(),
        total_habits,
        days,
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
