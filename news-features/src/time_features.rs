//! Calendar, trading-session and cyclical time features
//!
//! Sessions are defined on the UTC clock; naive bar times are read as UTC.

use crate::frame::FeatureValue;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use common::EventTime;
use std::f64::consts::PI;

pub const TIME_FEATURE_COLUMNS: [&str; 45] = [
    // calendar
    "hour",
    "day_of_week",
    "day_of_month",
    "week_of_year",
    "month",
    "quarter",
    "year",
    "is_weekend",
    "is_monday",
    "is_friday",
    "is_month_start",
    "is_month_end",
    "is_quarter_start",
    "is_quarter_end",
    // sessions
    "session_sydney",
    "session_tokyo",
    "session_london",
    "session_newyork",
    "overlap_london_newyork",
    "overlap_tokyo_london",
    "main_session",
    // market hours
    "is_liquid_hours",
    "is_low_liquidity",
    "is_peak_hours",
    "hours_since_london_open",
    "hours_since_ny_open",
    // cyclical
    "hour_sin",
    "hour_cos",
    "day_sin",
    "day_cos",
    "dom_sin",
    "dom_cos",
    "month_sin",
    "month_cos",
    // time of day / month position
    "minutes_since_midnight",
    "time_of_day_normalized",
    "days_since_month_start",
    "days_to_month_end",
    // special periods
    "is_first_hour_london",
    "is_last_hour_ny",
    "is_first_day_of_week",
    "is_last_day_of_week",
    "is_first_5_days",
    "is_last_5_days",
    "week_of_month",
];

const LONDON_OPEN_HOUR: u32 = 8;
const NEW_YORK_OPEN_HOUR: u32 = 13;

/// Dominant session by UTC hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainSession {
    Asian = 1,
    European = 2,
    Us = 3,
    AfterHours = 4,
}

impl MainSession {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=7 => MainSession::Asian,
            8..=12 => MainSession::European,
            13..=21 => MainSession::Us,
            _ => MainSession::AfterHours,
        }
    }
}

/// Number of days in the month of `year`/`month`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Hours elapsed since the most recent daily open at `open_hour`
fn hours_since_open(hour: u32, open_hour: u32) -> u32 {
    (hour + 24 - open_hour) % 24
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeFeatures {
    pub hour: u32,
    pub minute: u32,
    pub day_of_week: u32, // Monday = 0
    pub day_of_month: u32,
    pub days_in_month: u32,
    pub week_of_year: u32, // ISO week
    pub month: u32,
    pub quarter: u32,
    pub year: i32,
    pub is_weekend: bool,
    pub session_sydney: bool,
    pub session_tokyo: bool,
    pub session_london: bool,
    pub session_newyork: bool,
    pub overlap_london_newyork: bool,
    pub overlap_tokyo_london: bool,
    pub main_session: MainSession,
}

impl TimeFeatures {
    pub fn from_event_time(timestamp: &EventTime) -> Self {
        Self::from_utc(timestamp.utc_wall_clock())
    }

    pub fn from_utc(at: NaiveDateTime) -> Self {
        let hour = at.hour();
        let day_of_week = at.weekday().num_days_from_monday();
        let month = at.month();

        Self {
            hour,
            minute: at.minute(),
            day_of_week,
            day_of_month: at.day(),
            days_in_month: days_in_month(at.year(), month),
            week_of_year: at.iso_week().week(),
            month,
            quarter: (month - 1) / 3 + 1,
            year: at.year(),
            is_weekend: day_of_week >= 5,
            session_sydney: hour >= 21 || hour < 6,
            session_tokyo: hour < 9,
            session_london: (8..16).contains(&hour),
            session_newyork: (13..22).contains(&hour),
            overlap_london_newyork: (13..16).contains(&hour),
            overlap_tokyo_london: hour == 8,
            main_session: MainSession::from_hour(hour),
        }
    }

    pub fn is_month_start(&self) -> bool {
        self.day_of_month == 1
    }

    pub fn is_month_end(&self) -> bool {
        self.day_of_month == self.days_in_month
    }

    pub fn is_quarter_start(&self) -> bool {
        self.is_month_start() && self.month % 3 == 1
    }

    pub fn is_quarter_end(&self) -> bool {
        self.is_month_end() && self.month % 3 == 0
    }

    /// 08:00-22:00 UTC, London open to New York close
    pub fn is_liquid_hours(&self) -> bool {
        (8..22).contains(&self.hour)
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// `day_of_month >= days_in_month - 5`, so six calendar days qualify
    pub fn is_last_5_days(&self) -> bool {
        self.day_of_month + 5 >= self.days_in_month
    }

    /// Values in `TIME_FEATURE_COLUMNS` order
    pub fn values(&self) -> [FeatureValue; 45] {
        let flag = |b: bool| FeatureValue::Integer(i64::from(b));
        let int = |v: u32| FeatureValue::Integer(i64::from(v));
        let (hour_sin, hour_cos) = cyclical(self.hour, 24);
        let (day_sin, day_cos) = cyclical(self.day_of_week, 7);
        let (dom_sin, dom_cos) = cyclical(self.day_of_month, 30);
        let (month_sin, month_cos) = cyclical(self.month, 12);
        let minutes = self.minutes_since_midnight();

        [
            int(self.hour),
            int(self.day_of_week),
            int(self.day_of_month),
            int(self.week_of_year),
            int(self.month),
            int(self.quarter),
            FeatureValue::Integer(i64::from(self.year)),
            flag(self.is_weekend),
            flag(self.day_of_week == 0),
            flag(self.day_of_week == 4),
            flag(self.is_month_start()),
            flag(self.is_month_end()),
            flag(self.is_quarter_start()),
            flag(self.is_quarter_end()),
            flag(self.session_sydney),
            flag(self.session_tokyo),
            flag(self.session_london),
            flag(self.session_newyork),
            flag(self.overlap_london_newyork),
            flag(self.overlap_tokyo_london),
            FeatureValue::Integer(self.main_session as i64),
            flag(self.is_liquid_hours()),
            flag(!self.is_liquid_hours()),
            flag(self.overlap_london_newyork),
            int(hours_since_open(self.hour, LONDON_OPEN_HOUR)),
            int(hours_since_open(self.hour, NEW_YORK_OPEN_HOUR)),
            FeatureValue::Number(hour_sin),
            FeatureValue::Number(hour_cos),
            FeatureValue::Number(day_sin),
            FeatureValue::Number(day_cos),
            FeatureValue::Number(dom_sin),
            FeatureValue::Number(dom_cos),
            FeatureValue::Number(month_sin),
            FeatureValue::Number(month_cos),
            int(minutes),
            FeatureValue::Number(f64::from(minutes) / (24.0 * 60.0)),
            int(self.day_of_month - 1),
            int(self.days_in_month - self.day_of_month),
            flag(self.hour == LONDON_OPEN_HOUR),
            flag(self.hour == 21),
            flag(self.day_of_week == 0),
            flag(self.day_of_week == 4),
            flag(self.day_of_month <= 5),
            flag(self.is_last_5_days()),
            int((self.day_of_month - 1) / 7 + 1),
        ]
    }
}

fn cyclical(value: u32, period: u32) -> (f64, f64) {
    let angle = 2.0 * PI * f64::from(value) / f64::from(period);
    (angle.sin(), angle.cos())
}
