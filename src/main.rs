mod config;
mod domain;
mod logging;
mod paths;
mod theme;
mod ui;

use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;

use chrono::{Local, Locale, TimeZone};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::load_config;
use crate::domain::{generate_timeline, preview_entries, snapshot_entry, FontChoice, Timeline, TimelinePolicy};
use crate::paths::resolve_config_path;
use crate::theme::MonthTheme;
use crate::ui::{print_widgets, run_watch, WIDGET_TITLE};

#[derive(Debug, Parser)]
#[command(
	name = "monthly-widget",
	about = "Date widget whose theme changes with the month"
)]
struct Cli {
	#[arg(long)]
	config: Option<PathBuf>,
	#[arg(long, value_enum)]
	font: Option<FontChoice>,
	#[arg(long)]
	no_background: bool,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Show,
	Timeline {
		#[arg(long)]
		json: bool,
	},
	Watch,
	Preview,
	Snapshot,
}

#[derive(Debug, Serialize)]
struct TimelineRow {
	date: String,
	weekday: String,
	day: String,
	#[serde(flatten)]
	theme: MonthTheme,
	decorative_font: bool,
}

#[derive(Debug, Serialize)]
struct TimelineReport {
	policy: TimelinePolicy,
	entries: Vec<TimelineRow>,
}

fn main() {
	logging::init_logging();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	let config_path = resolve_config_path(cli.config);
	let config = load_config(&config_path)?;
	let settings = config.settings(cli.font, cli.no_background)?;
	log::debug!("using {} with {settings:?}", config_path.display());

	let now = Local::now();
	match cli.command.unwrap_or(Command::Show) {
		Command::Show => {
			let timeline = generate_timeline(&now, settings.font);
			if let Some(entry) = timeline.entry_at(&now) {
				print_widgets(std::slice::from_ref(entry), &settings)?;
			}
		}
		Command::Timeline { json } => {
			let timeline = generate_timeline(&now, settings.font);
			print_timeline(&timeline, settings.locale, json)?;
		}
		Command::Watch => {
			run_watch(&settings)?;
		}
		Command::Preview => {
			let entries = preview_entries(&Local);
			print_widgets(&entries, &settings)?;
		}
		Command::Snapshot => {
			let entry = snapshot_entry(&now);
			print_widgets(&[entry], &settings)?;
		}
	}

	Ok(())
}

fn timeline_report<Tz: TimeZone>(timeline: &Timeline<Tz>, locale: Locale) -> TimelineReport
where
	Tz::Offset: Display,
{
	let entries = timeline
		.entries
		.iter()
		.map(|entry| TimelineRow {
			date: entry.date.to_rfc3339(),
			weekday: entry.weekday_label(locale),
			day: entry.day_label(),
			theme: entry.theme(),
			decorative_font: entry.show_decorative_font,
		})
		.collect();

	TimelineReport {
		policy: timeline.policy,
		entries,
	}
}

fn print_timeline<Tz: TimeZone>(timeline: &Timeline<Tz>, locale: Locale, json: bool) -> Result<(), Box<dyn Error>>
where
	Tz::Offset: Display,
{
	let report = timeline_report(timeline, locale);
	if json {
		println!("{}", serde_json::to_string_pretty(&report)?);
		return Ok(());
	}

	println!("{WIDGET_TITLE}");
	for row in &report.entries {
		println!(
			"{} | {:<10} | {:>2} | {} | {} | {}",
			&row.date[..10],
			row.weekday,
			row.day,
			row.theme.emoji,
			row.theme.background,
			if row.decorative_font { "decorative" } else { "default" }
		);
	}
	println!("refresh policy: {:?}", report.policy);

	Ok(())
}

#[cfg(test)]
mod tests {
	use chrono::{Locale, TimeZone, Utc};

	use crate::domain::{generate_timeline, FontChoice};

	use super::timeline_report;

	#[test]
	fn report_lists_every_entry_with_its_theme() {
		let reference = Utc.with_ymd_and_hms(2024, 5, 28, 9, 0, 0).unwrap();
		let timeline = generate_timeline(&reference, FontChoice::Decorative);
		let report = timeline_report(&timeline, Locale::en_US);

		assert_eq!(report.entries.len(), 7);
		assert_eq!(report.entries[0].date, "2024-05-28T00:00:00+00:00");
		assert_eq!(report.entries[0].weekday, "Tuesday");
		assert_eq!(report.entries[4].day, "1");
		assert_ne!(report.entries[3].theme, report.entries[4].theme);
		assert!(report.entries.iter().all(|row| row.decorative_font));

		let json = serde_json::to_value(&report).expect("report serializes");
		assert_eq!(json["policy"], "at_end");
		assert_eq!(json["entries"][4]["emoji"], report.entries[4].theme.emoji);
		assert!(json["entries"][0].get("theme").is_none());
		assert!(json["entries"][0]["background"]
			.as_str()
			.expect("hex color")
			.starts_with('#'));
	}
}
