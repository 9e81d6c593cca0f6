use std::fmt::Display;

use chrono::{
    DateTime, Datelike, Days, Duration, Locale, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone,
};
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::theme::{self, MonthTheme};

pub const LOOK_AHEAD_DAYS: u64 = 7;

const PREVIEW_DAYS: [(i32, u32, u32); 2] = [(2024, 5, 24), (2024, 6, 10)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FontChoice {
    /// Regular system face.
    #[default]
    Default,
    /// Display face for the weekday and day number.
    Decorative,
}

/// One day of the widget timeline.
#[derive(Debug, Clone)]
pub struct DayEntry<Tz: TimeZone> {
    pub date: DateTime<Tz>,
    pub show_decorative_font: bool,
}

impl<Tz: TimeZone> DayEntry<Tz> {
    pub fn theme(&self) -> MonthTheme {
        theme::resolve(&self.date)
    }

    pub fn day_label(&self) -> String {
        self.date.day().to_string()
    }

    pub fn weekday_label(&self, locale: Locale) -> String
    where
        Tz::Offset: Display,
    {
        self.date.format_localized("%A", locale).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelinePolicy {
    /// Ask for a new timeline once the last entry's date has been reached.
    AtEnd,
}

#[derive(Debug, Clone)]
pub struct Timeline<Tz: TimeZone> {
    pub entries: Vec<DayEntry<Tz>>,
    pub policy: TimelinePolicy,
}

impl<Tz: TimeZone> Timeline<Tz> {
    /// The entry on screen at `now`: the latest one whose date has arrived.
    pub fn entry_at(&self, now: &DateTime<Tz>) -> Option<&DayEntry<Tz>> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.date <= *now)
            .or_else(|| self.entries.first())
    }

    pub fn needs_refresh(&self, now: &DateTime<Tz>) -> bool {
        match self.policy {
            TimelinePolicy::AtEnd => self
                .entries
                .last()
                .is_none_or(|last| *now >= last.date),
        }
    }
}

/// Builds one entry per day starting at the day containing `reference`.
pub fn generate_timeline<Tz: TimeZone>(reference: &DateTime<Tz>, font: FontChoice) -> Timeline<Tz> {
    let tz = reference.timezone();
    let first_day = reference.date_naive();
    let show_decorative_font = font == FontChoice::Decorative;

    let entries = (0..LOOK_AHEAD_DAYS)
        .filter_map(|offset| first_day.checked_add_days(Days::new(offset)))
        .map(|day| DayEntry {
            date: start_of_day(&tz, day),
            show_decorative_font,
        })
        .collect::<Vec<_>>();

    debug!(
        "generated {} timeline entries from {first_day} (font: {font:?})",
        entries.len()
    );

    Timeline {
        entries,
        policy: TimelinePolicy::AtEnd,
    }
}

/// Single low-fidelity entry for "now", used for snapshots and placeholders.
pub fn snapshot_entry<Tz: TimeZone>(now: &DateTime<Tz>) -> DayEntry<Tz> {
    DayEntry {
        date: start_of_day(&now.timezone(), now.date_naive()),
        show_decorative_font: false,
    }
}

pub fn preview_entries<Tz: TimeZone>(tz: &Tz) -> Vec<DayEntry<Tz>> {
    PREVIEW_DAYS
        .iter()
        .filter_map(|&(year, month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .map(|day| DayEntry {
            date: start_of_day(tz, day),
            show_decorative_font: false,
        })
        .collect()
}

/// First instant of `day` in `tz`. Ambiguous midnights take the earlier
/// instant; a midnight skipped by a DST gap moves to the first minute that
/// exists.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    if let Some(timestamp) = resolve_local(tz, midnight) {
        return timestamp;
    }

    let mut cursor = midnight + Duration::minutes(1);
    for _ in 0..120 {
        if let Some(timestamp) = resolve_local(tz, cursor) {
            return timestamp;
        }
        cursor += Duration::minutes(1);
    }

    tz.from_utc_datetime(&midnight)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(timestamp) => Some(timestamp),
        LocalResult::Ambiguous(first, second) => Some(first.min(second)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{
        Datelike, Duration, FixedOffset, Locale, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
        TimeZone, Timelike, Utc,
    };

    use crate::theme::MonthTheme;

    use super::{
        FontChoice, TimelinePolicy, generate_timeline, preview_entries, snapshot_entry,
        start_of_day,
    };

    #[test]
    fn generates_a_week_of_midnights() {
        let reference = Utc.with_ymd_and_hms(2024, 12, 24, 15, 42, 7).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);
        let first = start_of_day(&Utc, reference.date_naive());

        assert_eq!(timeline.entries.len(), 7);
        assert_eq!(timeline.policy, TimelinePolicy::AtEnd);
        for (index, entry) in timeline.entries.iter().enumerate() {
            assert_eq!(entry.date, first + Duration::days(index as i64));
            assert_eq!(entry.date.hour(), 0);
            assert_eq!(entry.date.minute(), 0);
            assert!(!entry.show_decorative_font);
        }

        let days = timeline
            .entries
            .iter()
            .map(|entry| entry.date.day())
            .collect::<Vec<_>>();
        assert_eq!(days, vec![24, 25, 26, 27, 28, 29, 30]);
        assert!(timeline
            .entries
            .iter()
            .all(|entry| entry.theme() == MonthTheme::for_month_number(12)));
    }

    #[test]
    fn decorative_font_applies_to_every_entry() {
        let reference = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Decorative);
        assert_eq!(timeline.entries.len(), 7);
        assert!(timeline.entries.iter().all(|entry| entry.show_decorative_font));
    }

    #[test]
    fn entries_are_strictly_increasing() {
        let reference = Utc.with_ymd_and_hms(2024, 2, 26, 23, 59, 59).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);
        for pair in timeline.entries.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        // leap day is included
        assert_eq!(timeline.entries[3].date.day(), 29);
    }

    #[test]
    fn each_entry_is_themed_by_its_own_month() {
        let reference = Utc.with_ymd_and_hms(2024, 5, 28, 12, 0, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);
        let may = MonthTheme::for_month_number(5);
        let june = MonthTheme::for_month_number(6);

        let themes = timeline
            .entries
            .iter()
            .map(|entry| entry.theme())
            .collect::<Vec<_>>();
        assert_eq!(themes[..4], [may; 4]);
        assert_eq!(themes[4..], [june; 3]);
    }

    #[test]
    fn crosses_into_the_next_year() {
        let reference = Utc.with_ymd_and_hms(2024, 12, 29, 6, 0, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);
        let last = &timeline.entries[6];
        assert_eq!((last.date.year(), last.date.month(), last.date.day()), (2025, 1, 4));
        assert_eq!(last.theme(), MonthTheme::for_month_number(1));
    }

    #[test]
    fn truncates_in_the_reference_zone() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let reference = offset.with_ymd_and_hms(2024, 7, 4, 22, 30, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);
        let first = &timeline.entries[0];
        assert_eq!(first.date.day(), 4);
        assert_eq!(first.date.hour(), 0);
        assert_eq!(first.date.with_timezone(&Utc).hour(), 5);
    }

    #[test]
    fn picks_the_entry_for_now_and_refreshes_at_end() {
        let reference = Utc.with_ymd_and_hms(2024, 12, 24, 9, 0, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);

        let now = Utc.with_ymd_and_hms(2024, 12, 26, 13, 0, 0).unwrap();
        let current = timeline.entry_at(&now).expect("entry for now");
        assert_eq!(current.date.day(), 26);
        assert!(!timeline.needs_refresh(&now));

        let last_day = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert!(timeline.needs_refresh(&last_day));

        let before = Utc.with_ymd_and_hms(2024, 12, 23, 0, 0, 0).unwrap();
        let current = timeline.entry_at(&before).expect("first entry");
        assert_eq!(current.date.day(), 24);
    }

    #[test]
    fn snapshot_uses_default_font_and_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 17, 5, 0).unwrap();
        let entry = snapshot_entry(&now);
        assert_eq!(entry.date, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        assert!(!entry.show_decorative_font);
        assert_eq!(entry.theme(), MonthTheme::for_month_number(6));
    }

    #[test]
    fn preview_covers_may_and_june() {
        let entries = preview_entries(&Utc);
        let months = entries
            .iter()
            .map(|entry| entry.date.month())
            .collect::<Vec<_>>();
        assert_eq!(months, vec![5, 6]);
    }

    #[test]
    fn formats_weekday_and_day_labels() {
        let now = Utc.with_ymd_and_hms(2024, 12, 24, 10, 0, 0).unwrap();
        let entry = snapshot_entry(&now);
        assert_eq!(entry.weekday_label(Locale::en_US), "Tuesday");
        assert_eq!(entry.weekday_label(Locale::de_DE), "Dienstag");
        assert_eq!(entry.day_label(), "24");
    }

    /// Eastern-style zone whose clock changes happen at local midnight:
    /// 2024-03-10 00:00 EST jumps to 01:00 EDT, and 2024-11-03 01:00 EDT
    /// falls back to 00:00 EST.
    #[derive(Debug, Clone, Copy)]
    struct MidnightShift;

    impl MidnightShift {
        fn standard() -> FixedOffset {
            FixedOffset::west_opt(5 * 3600).unwrap()
        }

        fn daylight() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).unwrap()
        }
    }

    impl TimeZone for MidnightShift {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            MidnightShift
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let valid = [Self::daylight(), Self::standard()]
                .into_iter()
                .filter(|offset| {
                    let utc = *local - Duration::seconds(offset.local_minus_utc().into());
                    self.offset_from_utc_datetime(&utc) == *offset
                })
                .collect::<Vec<_>>();
            match valid.as_slice() {
                [offset] => LocalResult::Single(*offset),
                [earlier, later] => LocalResult::Ambiguous(*earlier, *later),
                _ => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            let spring = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(5, 0, 0).unwrap();
            let autumn = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap().and_hms_opt(5, 0, 0).unwrap();
            if *utc >= spring && *utc < autumn {
                Self::daylight()
            } else {
                Self::standard()
            }
        }
    }

    #[test]
    fn skipped_midnight_starts_at_first_existing_minute() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let start = start_of_day(&MidnightShift, day);
        assert_eq!(start.naive_local(), day.and_hms_opt(1, 0, 0).unwrap());
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn repeated_midnight_takes_the_earlier_instant() {
        let day = NaiveDate::from_ymd_opt(2024, 11, 3).unwrap();
        let start = start_of_day(&MidnightShift, day);
        assert_eq!(start.naive_local(), day.and_time(NaiveTime::MIN));
        assert_eq!(
            start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 11, 3, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn timeline_over_a_clock_change_stays_ordered() {
        let reference = MidnightShift.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let timeline = generate_timeline(&reference, FontChoice::Default);

        let days_and_hours = timeline
            .entries
            .iter()
            .map(|entry| (entry.date.day(), entry.date.hour()))
            .collect::<Vec<_>>();
        assert_eq!(
            days_and_hours,
            vec![(8, 0), (9, 0), (10, 1), (11, 0), (12, 0), (13, 0), (14, 0)]
        );
        for pair in timeline.entries.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}
