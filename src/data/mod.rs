//! Core domain model for horocache
//!
//! This module contains the enumerations that make up the cache key space
//! (relative day, style, source, zodiac sign) and the date helpers used to
//! resolve relative days against a reference date. Everything here is pure:
//! no value ever caches "now" internally, callers pass the reference date in.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A day relative to the current date
///
/// A `RelativeDay` is only a slot label; the absolute calendar date it refers
/// to is derived from an explicit reference date via [`RelativeDay::resolve`],
/// never stored inside the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDay {
    Yesterday,
    Today,
    Tomorrow,
}

impl RelativeDay {
    /// All relative days, in chronological order
    pub const ALL: [RelativeDay; 3] = [
        RelativeDay::Yesterday,
        RelativeDay::Today,
        RelativeDay::Tomorrow,
    ];

    /// Signed day offset from the reference date
    pub fn offset(self) -> i64 {
        match self {
            RelativeDay::Yesterday => -1,
            RelativeDay::Today => 0,
            RelativeDay::Tomorrow => 1,
        }
    }

    /// Resolves this relative day to an absolute date
    ///
    /// # Arguments
    /// * `today` - The reference date that counts as "today"
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            RelativeDay::Yesterday => today.checked_sub_days(Days::new(1)),
            RelativeDay::Today => Some(today),
            RelativeDay::Tomorrow => today.checked_add_days(Days::new(1)),
        }
        // NaiveDate covers +/- ~262000 years; a real reference date never
        // sits at the boundary.
        .unwrap_or(today)
    }

    /// Lowercase slot name, used in URLs and the data file
    pub fn name(self) -> &'static str {
        match self {
            RelativeDay::Yesterday => "yesterday",
            RelativeDay::Today => "today",
            RelativeDay::Tomorrow => "tomorrow",
        }
    }
}

/// Returns the lowercase English weekday name for a date
///
/// Used by sources whose URL scheme is keyed on the day of the week.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A presentation style of horoscope offered by a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Daily,
    DailyLove,
}

impl Style {
    /// All styles
    pub const ALL: [Style; 2] = [Style::Daily, Style::DailyLove];

    /// Human-readable name, for presentation
    pub fn display_name(self) -> &'static str {
        match self {
            Style::Daily => "Daily Horoscope",
            Style::DailyLove => "Daily Love Horoscope",
        }
    }
}

/// An upstream horoscope source
///
/// Each source owns a URL construction rule and an HTML extraction rule for
/// its page layout (see the `fetch` module) and declares which styles it
/// publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    AstrologyCom,
    Astrostyle,
    HoroscopeCom,
}

impl Source {
    /// All sources
    pub const ALL: [Source; 3] = [
        Source::AstrologyCom,
        Source::Astrostyle,
        Source::HoroscopeCom,
    ];

    /// Human-readable name, for presentation
    pub fn display_name(self) -> &'static str {
        match self {
            Source::AstrologyCom => "Astrology.com",
            Source::Astrostyle => "AstroStyle.com",
            Source::HoroscopeCom => "Horoscope.com",
        }
    }

    /// The styles this source publishes
    pub fn styles(self) -> &'static [Style] {
        match self {
            Source::AstrologyCom => &[Style::Daily, Style::DailyLove],
            Source::Astrostyle => &[Style::Daily],
            Source::HoroscopeCom => &[Style::Daily, Style::DailyLove],
        }
    }

    /// The style substituted when a caller asks for one this source
    /// does not publish
    pub fn default_style(self) -> Style {
        Style::Daily
    }

    /// Clamps a requested style to one this source publishes
    ///
    /// Callers must not assume the style they requested is the one served;
    /// an unsupported pair silently substitutes the default.
    pub fn supported_style(self, style: Style) -> Style {
        if self.styles().contains(&style) {
            style
        } else {
            self.default_style()
        }
    }
}

/// A zodiac sign
///
/// Purely a lookup key; carries no behavior beyond its display name and
/// symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    /// All twelve signs, in zodiac order
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    /// Lowercase name, used in URLs and the data file
    pub fn name(self) -> &'static str {
        match self {
            Sign::Aries => "aries",
            Sign::Taurus => "taurus",
            Sign::Gemini => "gemini",
            Sign::Cancer => "cancer",
            Sign::Leo => "leo",
            Sign::Virgo => "virgo",
            Sign::Libra => "libra",
            Sign::Scorpio => "scorpio",
            Sign::Sagittarius => "sagittarius",
            Sign::Capricorn => "capricorn",
            Sign::Aquarius => "aquarius",
            Sign::Pisces => "pisces",
        }
    }

    /// Human-readable name, for presentation
    pub fn display_name(self) -> &'static str {
        match self {
            Sign::Aries => "Aries",
            Sign::Taurus => "Taurus",
            Sign::Gemini => "Gemini",
            Sign::Cancer => "Cancer",
            Sign::Leo => "Leo",
            Sign::Virgo => "Virgo",
            Sign::Libra => "Libra",
            Sign::Scorpio => "Scorpio",
            Sign::Sagittarius => "Sagittarius",
            Sign::Capricorn => "Capricorn",
            Sign::Aquarius => "Aquarius",
            Sign::Pisces => "Pisces",
        }
    }

    /// Unicode symbol for the sign
    pub fn symbol(self) -> &'static str {
        match self {
            Sign::Aries => "\u{2648}",
            Sign::Taurus => "\u{2649}",
            Sign::Gemini => "\u{264A}",
            Sign::Cancer => "\u{264B}",
            Sign::Leo => "\u{264C}",
            Sign::Virgo => "\u{264D}",
            Sign::Libra => "\u{264E}",
            Sign::Scorpio => "\u{264F}",
            Sign::Sagittarius => "\u{2650}",
            Sign::Capricorn => "\u{2651}",
            Sign::Aquarius => "\u{2652}",
            Sign::Pisces => "\u{2653}",
        }
    }
}
