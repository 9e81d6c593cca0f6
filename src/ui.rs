use std::error::Error;
use std::fmt::Display;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Local, Locale, TimeZone};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::tty::IsTty;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use log::debug;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Padding, Paragraph, Widget};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};

use crate::config::WidgetSettings;
use crate::domain::{generate_timeline, DayEntry, Timeline};
use crate::theme::Rgb;

pub const WIDGET_TITLE: &str = "Monthly Style Widget";
pub const WIDGET_WIDTH: u16 = 24;
pub const WIDGET_HEIGHT: u16 = 9;

const PREVIEW_SPACING: u16 = 2;
const TICK: StdDuration = StdDuration::from_millis(1000);
const HEAVY_FILL: char = '█';
const DECORATIVE_FILL: char = '▓';
const DIGIT_ROWS: usize = 5;
const DIGITS: [[&str; DIGIT_ROWS]; 10] = [
	["###", "#.#", "#.#", "#.#", "###"],
	[".#.", "##.", ".#.", ".#.", "###"],
	["###", "..#", "###", "#..", "###"],
	["###", "..#", "###", "..#", "###"],
	["#.#", "#.#", "###", "..#", "..#"],
	["###", "#..", "###", "..#", "###"],
	["###", "#..", "###", "#.#", "###"],
	["###", "..#", "..#", "..#", "..#"],
	["###", "#.#", "###", "#.#", "###"],
	["###", "#.#", "###", "..#", "###"],
];

/// Paints one timeline entry the way the widget shows it on a home screen.
pub struct WidgetView<'a, Tz: TimeZone> {
	pub entry: &'a DayEntry<Tz>,
	pub show_background: bool,
	pub locale: Locale,
}

impl<'a, Tz: TimeZone> WidgetView<'a, Tz> {
	pub fn new(entry: &'a DayEntry<Tz>, settings: &WidgetSettings) -> Self {
		Self {
			entry,
			show_background: settings.show_background,
			locale: settings.locale,
		}
	}
}

impl<Tz: TimeZone> Widget for WidgetView<'_, Tz>
where
	Tz::Offset: Display,
{
	fn render(self, area: Rect, buf: &mut Buffer) {
		let theme = self.entry.theme();
		let decorative = self.entry.show_decorative_font;

		let base_style = if self.show_background {
			Style::default().bg(color(theme.background))
		} else {
			Style::default()
		};
		let weekday_style = Style::default()
			.fg(color(theme.weekday_color(self.show_background)))
			.add_modifier(Modifier::BOLD);
		let day_style = Style::default().fg(color(theme.day_number_color(self.show_background)));

		let weekday = self.entry.weekday_label(self.locale);
		let weekday = if decorative { decorate(&weekday) } else { weekday };

		let mut lines = vec![Line::from(vec![
			Span::raw(theme.emoji),
			Span::raw(" "),
			Span::styled(weekday, weekday_style),
		])];
		lines.push(Line::from(""));
		for row in big_digit_rows(&self.entry.day_label(), decorative) {
			lines.push(Line::from(Span::styled(row, day_style)));
		}

		let block = Block::default().padding(Padding::uniform(1));
		Paragraph::new(lines)
			.style(base_style)
			.block(block)
			.render(area, buf);
	}
}

/// Full-screen host: paints the entry for the current day and asks for a new
/// timeline when the current one runs out.
pub fn run_watch(settings: &WidgetSettings) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, settings);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	settings: &WidgetSettings,
) -> Result<(), Box<dyn Error>> {
	let mut timeline = generate_timeline(&Local::now(), settings.font);

	loop {
		let now = Local::now();
		if timeline.needs_refresh(&now) {
			debug!("timeline exhausted at {now}, regenerating");
			timeline = generate_timeline(&now, settings.font);
		}

		terminal.draw(|frame| draw_watch(frame, &timeline, &now, settings))?;

		if event::poll(TICK)? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}
				if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_watch<Tz: TimeZone>(
	frame: &mut Frame,
	timeline: &Timeline<Tz>,
	now: &DateTime<Tz>,
	settings: &WidgetSettings,
) where
	Tz::Offset: Display,
{
	let rows = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Length(1),
			Constraint::Min(WIDGET_HEIGHT),
			Constraint::Length(1),
		])
		.split(frame.area());

	frame.render_widget(
		Paragraph::new(Line::styled(WIDGET_TITLE, Style::default().add_modifier(Modifier::BOLD))),
		rows[0],
	);

	if let Some(entry) = timeline.entry_at(now) {
		let area = centered_rect(WIDGET_WIDTH, WIDGET_HEIGHT, rows[1]);
		frame.render_widget(WidgetView::new(entry, settings), area);
	}

	let next_refresh = timeline
		.entries
		.last()
		.map(|entry| entry.date.format("%Y-%m-%d").to_string())
		.unwrap_or_else(|| "now".to_string());
	frame.render_widget(
		Paragraph::new(format!("q quit | next timeline {next_refresh}"))
			.style(Style::default().fg(Color::DarkGray)),
		rows[2],
	);
}

/// Paints the given entries side by side below the cursor and returns.
/// Without a terminal on stdout the widgets are written as plain text.
pub fn print_widgets<Tz: TimeZone>(entries: &[DayEntry<Tz>], settings: &WidgetSettings) -> Result<(), Box<dyn Error>>
where
	Tz::Offset: Display,
{
	if !io::stdout().is_tty() {
		debug!("stdout is not a terminal, printing plain text");
		for line in plain_lines(entries, settings) {
			println!("{line}");
		}
		return Ok(());
	}

	enable_raw_mode()?;
	let backend = CrosstermBackend::new(io::stdout());
	let result = Terminal::with_options(
		backend,
		TerminalOptions {
			viewport: Viewport::Inline(WIDGET_HEIGHT),
		},
	)
	.and_then(|mut terminal| {
		terminal
			.draw(|frame| render_row(frame.area(), frame.buffer_mut(), entries, settings))
			.map(|_| ())
	});
	disable_raw_mode()?;
	println!();

	result.map_err(Into::into)
}

fn render_row<Tz: TimeZone>(area: Rect, buf: &mut Buffer, entries: &[DayEntry<Tz>], settings: &WidgetSettings)
where
	Tz::Offset: Display,
{
	let columns = Layout::horizontal(entries.iter().map(|_| Constraint::Length(WIDGET_WIDTH)))
		.spacing(PREVIEW_SPACING)
		.split(area);

	for (entry, column) in entries.iter().zip(columns.iter()) {
		WidgetView::new(entry, settings).render(*column, buf);
	}
}

fn plain_lines<Tz: TimeZone>(entries: &[DayEntry<Tz>], settings: &WidgetSettings) -> Vec<String>
where
	Tz::Offset: Display,
{
	let count = entries.len() as u16;
	let width = count * WIDGET_WIDTH + count.saturating_sub(1) * PREVIEW_SPACING;
	let area = Rect::new(0, 0, width, WIDGET_HEIGHT);
	let mut buffer = Buffer::empty(area);
	render_row(area, &mut buffer, entries, settings);

	(0..area.height)
		.map(|y| {
			(0..area.width)
				.map(|x| buffer[(x, y)].symbol())
				.collect::<String>()
				.trim_end()
				.to_string()
		})
		.collect()
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
	let width = width.min(area.width);
	let height = height.min(area.height);
	Rect {
		x: area.x + (area.width - width) / 2,
		y: area.y + (area.height - height) / 2,
		width,
		height,
	}
}

fn color(rgb: Rgb) -> Color {
	Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Maps ASCII letters to Unicode bold script; anything else is kept.
fn decorate(text: &str) -> String {
	text.chars()
		.map(|ch| {
			let base = match ch {
				'A'..='Z' => 0x1D4D0 + (ch as u32 - 'A' as u32),
				'a'..='z' => 0x1D4EA + (ch as u32 - 'a' as u32),
				_ => return ch,
			};
			char::from_u32(base).unwrap_or(ch)
		})
		.collect()
}

fn big_digit_rows(label: &str, decorative: bool) -> Vec<String> {
	let fill = if decorative { DECORATIVE_FILL } else { HEAVY_FILL };
	let glyphs = label
		.chars()
		.filter_map(|ch| ch.to_digit(10))
		.map(|digit| &DIGITS[digit as usize])
		.collect::<Vec<_>>();

	(0..DIGIT_ROWS)
		.map(|row| {
			glyphs
				.iter()
				.map(|glyph| {
					glyph[row]
						.chars()
						.map(|pixel| if pixel == '#' { fill } else { ' ' })
						.flat_map(|cell| [cell, cell])
						.collect::<String>()
				})
				.collect::<Vec<_>>()
				.join(" ")
		})
		.collect()
}
