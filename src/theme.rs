use std::fmt::{Display, Formatter};

use chrono::{DateTime, Datelike, Month, TimeZone};
use log::warn;
use serde::{Serialize, Serializer};

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Paints `self` at the given opacity over `backdrop`.
    pub fn with_opacity(self, opacity: f32, backdrop: Rgb) -> Rgb {
        let alpha = opacity.clamp(0.0, 1.0);
        let mix = |front: u8, back: u8| -> u8 {
            (front as f32 * alpha + back as f32 * (1.0 - alpha)).round() as u8
        };
        Rgb(
            mix(self.0, backdrop.0),
            mix(self.1, backdrop.1),
            mix(self.2, backdrop.2),
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Visual palette for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthTheme {
    pub emoji: &'static str,
    pub background: Rgb,
    pub weekday_text: Rgb,
    pub day_number_text: Rgb,
}

const WEEKDAY_TEXT_OPACITY: f32 = 0.6;
const DAY_NUMBER_TEXT_OPACITY: f32 = 0.8;

impl MonthTheme {
    /// Used only if a calendar ever reports a month outside 1..=12.
    pub const DEFAULT: MonthTheme = MonthTheme {
        emoji: "📅",
        background: Rgb(142, 142, 147),
        weekday_text: Rgb(28, 28, 30),
        day_number_text: Rgb(28, 28, 30),
    };

    pub fn for_month(month: Month) -> MonthTheme {
        match month {
            Month::January => MonthTheme {
                emoji: "⛄️",
                background: Rgb(173, 216, 230),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(25, 25, 112),
            },
            Month::February => MonthTheme {
                emoji: "❤️",
                background: Rgb(255, 182, 193),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(178, 34, 34),
            },
            Month::March => MonthTheme {
                emoji: "☘️",
                background: Rgb(144, 238, 144),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(0, 100, 0),
            },
            Month::April => MonthTheme {
                emoji: "🌧️",
                background: Rgb(176, 196, 222),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(72, 61, 139),
            },
            Month::May => MonthTheme {
                emoji: "🌸",
                background: Rgb(255, 228, 225),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(199, 21, 133),
            },
            Month::June => MonthTheme {
                emoji: "🌤️",
                background: Rgb(135, 206, 250),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(255, 140, 0),
            },
            Month::July => MonthTheme {
                emoji: "🏖️",
                background: Rgb(64, 224, 208),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(0, 0, 139),
            },
            Month::August => MonthTheme {
                emoji: "☀️",
                background: Rgb(255, 215, 0),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(139, 69, 19),
            },
            Month::September => MonthTheme {
                emoji: "🍂",
                background: Rgb(210, 105, 30),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(255, 248, 220),
            },
            Month::October => MonthTheme {
                emoji: "👻",
                background: Rgb(255, 140, 0),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(0, 0, 0),
            },
            Month::November => MonthTheme {
                emoji: "🦃",
                background: Rgb(139, 69, 19),
                weekday_text: Rgb(0, 0, 0),
                day_number_text: Rgb(255, 222, 173),
            },
            Month::December => MonthTheme {
                emoji: "🎄",
                background: Rgb(178, 34, 34),
                weekday_text: Rgb(255, 255, 255),
                day_number_text: Rgb(255, 255, 255),
            },
        }
    }

    pub fn for_month_number(month: u32) -> MonthTheme {
        match u8::try_from(month).ok().and_then(|month| Month::try_from(month).ok()) {
            Some(month) => MonthTheme::for_month(month),
            None => {
                warn!("calendar produced month {month}, using default theme");
                MonthTheme::DEFAULT
            }
        }
    }

    /// Weekday color as painted: faded over the background, or white when
    /// the host hides the container background.
    pub fn weekday_color(&self, show_background: bool) -> Rgb {
        if show_background {
            self.weekday_text
                .with_opacity(WEEKDAY_TEXT_OPACITY, self.background)
        } else {
            Rgb::WHITE
        }
    }

    pub fn day_number_color(&self, show_background: bool) -> Rgb {
        if show_background {
            self.day_number_text
                .with_opacity(DAY_NUMBER_TEXT_OPACITY, self.background)
        } else {
            Rgb::WHITE
        }
    }
}

/// Resolves the theme for the calendar month `date` falls in, in its own
/// time zone.
pub fn resolve<Tz: TimeZone>(date: &DateTime<Tz>) -> MonthTheme {
    MonthTheme::for_month_number(date.month())
}
