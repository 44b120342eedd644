use crate::calc::monthly::{count_holidays, month_days, summarize_month, MonthlySummary};
use crate::calc::report::{build_month_report, ReportTotals};
use crate::calc::time_calc::{compute_daily_work, format_minutes_as_clock, format_optional_minutes};
use crate::calc::work_status::{classify_day_status, WorkStatus};
use crate::cmd::punch::{apply_break, apply_check_in, apply_check_out, check_out_date};
use crate::data::{retention_start, AppSettings, WorkRecord, WorkRecordData};
use anyhow::Result;
use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveTime, Weekday};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io::Stdout;
use std::time::Duration as StdDuration;

// Calendar cell colors
const ATTENTION_COLOR: Color = Color::Indexed(208); // reddish-orange

const SECTION_BG: Color = Color::Rgb(40, 44, 52);

const HELP: &str =
    "arrows move  n/p month  t today  i in  o out  h day off  x clear  +/- break  q quit";

pub struct App<'a> {
    records: &'a mut WorkRecordData,
    pub settings: AppSettings,
    employee: String,
    today: NaiveDate,
    selected_date: NaiveDate,
    summary: MonthlySummary,
    holiday_days: u32,
    totals: ReportTotals,
    /// Result of the last action (message, color). Cleared on next keypress.
    status_line: Option<(String, Color)>,
    /// True once any record was written.
    pub dirty: bool,
}

impl<'a> App<'a> {
    pub fn new(
        records: &'a mut WorkRecordData,
        settings: AppSettings,
        employee: &str,
        today: NaiveDate,
    ) -> Self {
        let mut app = App {
            records,
            settings,
            employee: employee.to_string(),
            today,
            selected_date: today,
            summary: MonthlySummary::default(),
            holiday_days: 0,
            totals: ReportTotals::default(),
            status_line: None,
            dirty: false,
        };
        app.update_summary();
        app
    }

    fn yyyy_mm(&self) -> String {
        self.selected_date.format("%Y-%m").to_string()
    }

    fn date_key(&self) -> String {
        self.selected_date.format("%Y-%m-%d").to_string()
    }

    fn retention(&self) -> NaiveDate {
        retention_start(self.today, self.settings.retention_days)
    }

    /// Status shown in the grid; days before the retention window read as empty,
    /// matching the summary totals.
    pub(crate) fn visible_status(&self, date: NaiveDate) -> WorkStatus {
        if date < self.retention() {
            return classify_day_status(None, self.today);
        }
        let key = date.format("%Y-%m-%d").to_string();
        classify_day_status(self.records.get(&key, &self.employee), self.today)
    }

    fn update_summary(&mut self) {
        let ym = self.yyyy_mm();
        let rows = self.records.list_by_month(&self.employee, &ym, self.retention());
        self.summary = summarize_month(&rows, &ym);
        self.holiday_days = count_holidays(&rows, &ym);
        self.totals = build_month_report(&rows, &self.employee, &ym, self.settings.standard_work_minutes)
            .map(|r| r.totals)
            .unwrap_or_default();
    }

    fn selected_record(&self) -> Option<&WorkRecord> {
        self.records.get(&self.date_key(), &self.employee)
    }

    fn select(&mut self, date: NaiveDate) {
        let month_changed =
            date.year() != self.selected_date.year() || date.month() != self.selected_date.month();
        self.selected_date = date;
        if month_changed {
            self.update_summary();
        }
    }

    fn move_days(&mut self, delta: i64) {
        let step = Days::new(delta.unsigned_abs());
        let next = if delta >= 0 {
            self.selected_date.checked_add_days(step)
        } else {
            self.selected_date.checked_sub_days(step)
        };
        if let Some(date) = next {
            self.select(date);
        }
    }

    /// Day of month is clamped, so Jan 31 moves to the last day of February.
    fn move_months(&mut self, forward: bool) {
        let next = if forward {
            self.selected_date.checked_add_months(Months::new(1))
        } else {
            self.selected_date.checked_sub_months(Months::new(1))
        };
        if let Some(date) = next {
            self.select(date);
        }
    }

    fn changed(&mut self, message: String) {
        self.dirty = true;
        self.status_line = Some((message, Color::Green));
        self.update_summary();
    }

    fn failed(&mut self, err: anyhow::Error) {
        self.status_line = Some((err.to_string(), Color::Red));
    }

    fn toggle_day_off(&mut self) {
        let key = self.date_key();
        if self.selected_record().is_some_and(WorkRecord::is_day_off) {
            self.records.delete(&key, &self.employee);
            self.changed(format!("{} is a working day again", key));
        } else {
            self.records.mark_day_off(&key, &self.employee);
            self.changed(format!("{} marked as a day off", key));
        }
    }

    fn clear_day(&mut self) {
        let key = self.date_key();
        if self.records.delete(&key, &self.employee) {
            self.changed(format!("Record for {} removed", key));
        } else {
            self.status_line = Some((format!("No record for {}", key), Color::DarkGray));
        }
    }

    fn adjust_break(&mut self, step: i64) {
        let current = self.selected_record().map(|r| r.break_min).unwrap_or(0);
        let minutes = (current + step).max(0);
        match apply_break(self.records, &self.employee, self.selected_date, minutes) {
            Ok(_) => self.changed(format!("Break set to {}", format_minutes_as_clock(minutes))),
            Err(e) => self.failed(e),
        }
    }

    /// Check-in always lands on today.
    pub(crate) fn punch_in(&mut self, now: NaiveTime) {
        let time = now.format("%H:%M").to_string();
        match apply_check_in(self.records, &self.employee, self.today, &time, false) {
            Ok(_) => {
                self.select(self.today);
                self.changed(format!("Checked in at {}", time));
            }
            Err(e) => self.failed(e),
        }
    }

    pub(crate) fn punch_out(&mut self, now: NaiveTime) {
        let time = now.format("%H:%M").to_string();
        let date = check_out_date(self.records, &self.employee, self.today);
        match apply_check_out(self.records, &self.employee, date, &time, false) {
            Ok(_) => {
                self.select(date);
                self.changed(format!("Checked out at {} on {}", time, date.format("%Y-%m-%d")));
            }
            Err(e) => self.failed(e),
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_line = None;
        let step = self.settings.break_step_minutes;
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.move_days(-1),
            KeyCode::Right => self.move_days(1),
            KeyCode::Up => self.move_days(-7),
            KeyCode::Down => self.move_days(7),
            KeyCode::Char('n') => self.move_months(true),
            KeyCode::Char('p') => self.move_months(false),
            KeyCode::Char('t') => self.select(self.today),
            KeyCode::Char('i') => self.punch_in(Local::now().time()),
            KeyCode::Char('o') => self.punch_out(Local::now().time()),
            KeyCode::Char('h') => self.toggle_day_off(),
            KeyCode::Char('x') => self.clear_day(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_break(step),
            KeyCode::Char('-') => self.adjust_break(-step),
            _ => {}
        }
        false
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),  // title, weekday header, up to 6 weeks, padding
                Constraint::Length(14), // month summary table
                Constraint::Min(7),     // selected day + help
            ])
            .split(f.area());

        self.render_calendar(f, chunks[0]);
        self.render_summary(f, chunks[1]);
        self.render_day_and_help(f, chunks[2]);
    }

    fn render_calendar(&self, f: &mut Frame, area: Rect) {
        let Some(days) = month_days(&self.yyyy_mm()) else {
            return;
        };
        let Some(first) = days.first().copied() else {
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(21),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                format!("{:^21}", first.format("%B %Y").to_string()),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )),
            Line::from("Su Mo Tu We Th Fr Sa"),
        ];

        let lead = first.weekday().num_days_from_sunday() as usize;
        let mut spans: Vec<Span> = vec![Span::raw("   "); lead];
        for date in days {
            let status = self.visible_status(date);
            let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
            let style = day_style(status, date == self.selected_date, date == self.today, weekend);
            spans.push(Span::styled(format!("{:2}", date.day()), style));
            spans.push(Span::raw(" "));
            if date.weekday() == Weekday::Sat {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
        }
        if !spans.is_empty() {
            lines.push(Line::from(spans));
        }
        f.render_widget(Paragraph::new(lines), columns[0]);

        let mut legend = vec![Line::from(""), Line::from("")];
        for status in [
            WorkStatus::Working,
            WorkStatus::Off,
            WorkStatus::Incomplete,
            WorkStatus::Holiday,
        ] {
            legend.push(Line::from(Span::styled(
                status.label(),
                day_style(status, false, false, false),
            )));
        }
        f.render_widget(Paragraph::new(legend), columns[2]);
    }

    fn render_summary(&self, f: &mut Frame, area: Rect) {
        let s = &self.summary;
        let t = &self.totals;

        let incomplete = if s.incomplete_days > 0 {
            colored(s.incomplete_days.to_string(), ATTENTION_COLOR)
        } else {
            plain(s.incomplete_days.to_string())
        };

        let rows = vec![
            section_header("Days"),
            data_row("Complete", plain(s.work_days.to_string()), plain("")),
            data_row("Incomplete", incomplete, plain("")),
            data_row("Days Off", colored(self.holiday_days.to_string(), Color::Green), plain("")),
            spacer(),
            section_header("Hours"),
            data_row("Total Work", plain(format_minutes_as_clock(s.total_work)), plain("")),
            data_row("Total Break", plain(format_minutes_as_clock(s.total_break)), plain("")),
            data_row(
                "Average Day",
                plain(format_minutes_as_clock(s.average_work())),
                plain(format!(
                    "standard {}",
                    format_minutes_as_clock(self.settings.standard_work_minutes)
                )),
            ),
            data_row(
                "Overtime",
                colored(format_minutes_as_clock(t.total_overtime), Color::Yellow),
                plain(""),
            ),
            data_row(
                "Early Leave",
                colored(format_minutes_as_clock(t.total_early_leave), ATTENTION_COLOR),
                plain(""),
            ),
        ];

        let table = Table::new(
            rows,
            [
                Constraint::Length(18),
                Constraint::Length(8),
                Constraint::Min(0),
            ],
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} / {} ", self.employee, s.yyyy_mm)),
        );
        f.render_widget(table, area);
    }

    fn render_day_and_help(&self, f: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some((msg, color)) = &self.status_line {
            lines.push(Line::from(Span::styled(
                msg.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )));
        }

        let record = self.selected_record();
        let status = classify_day_status(record, self.today);
        lines.push(Line::from(vec![
            Span::styled(
                self.selected_date.format("%Y-%m-%d (%a)").to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(status.label(), day_style(status, false, false, false)),
        ]));

        match record.filter(|r| !r.is_day_off()) {
            Some(r) => {
                let daily = compute_daily_work(r);
                lines.push(Line::from(format!(
                    "In {}  Out {}  Break {}  Work {}",
                    r.check_in.as_deref().unwrap_or("--:--"),
                    r.check_out.as_deref().unwrap_or("--:--"),
                    format_minutes_as_clock(daily.break_minutes),
                    format_optional_minutes(daily.work_minutes)
                )));
            }
            None if record.is_some() => {}
            None => lines.push(Line::from("(no record)")),
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            HELP,
            Style::default().fg(Color::DarkGray),
        )));

        let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, area);
    }
}

// ── Row construction helpers ──────────────────────────────────────────────────

/// A section header row with a dark background and bold text.
fn section_header(title: &str) -> Row<'static> {
    Row::new(vec![
        Cell::from(title.to_string())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Cell::from(""),
        Cell::from(""),
    ])
    .style(Style::default().bg(SECTION_BG))
}

fn spacer() -> Row<'static> {
    Row::new(vec![Cell::from(""), Cell::from(""), Cell::from("")])
}

/// A data row with a two-space indent on the metric label.
fn data_row(metric: impl Into<String>, value: Cell<'static>, note: Cell<'static>) -> Row<'static> {
    Row::new(vec![Cell::from(format!("  {}", metric.into())), value, note])
}

fn plain(s: impl Into<String>) -> Cell<'static> {
    Cell::from(s.into())
}

fn colored(s: impl Into<String>, color: Color) -> Cell<'static> {
    Cell::from(s.into()).style(Style::default().fg(color))
}

// ── App event loop ────────────────────────────────────────────────────────────

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;
        if event::poll(StdDuration::from_millis(16))? {
            if let CEvent::Key(key) = event::read()? {
                if app.handle_key(key.code, key.modifiers) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn status_color(status: WorkStatus) -> Color {
    match status {
        WorkStatus::Holiday => Color::Green,
        WorkStatus::Working => Color::Cyan,
        WorkStatus::Off => Color::Yellow,
        WorkStatus::Incomplete => ATTENTION_COLOR,
        WorkStatus::NoRecord => Color::White,
    }
}

/// Style for one calendar day cell.
pub(crate) fn day_style(status: WorkStatus, is_selected: bool, is_today: bool, is_weekend: bool) -> Style {
    if is_selected {
        return Style::default()
            .fg(Color::Black)
            .bg(status_color(status))
            .add_modifier(Modifier::BOLD);
    }
    if status == WorkStatus::NoRecord {
        return if is_today {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        } else if is_weekend {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
    }
    let mut s = match status {
        WorkStatus::Holiday | WorkStatus::NoRecord => Style::default().fg(Color::Green),
        WorkStatus::Incomplete => Style::default()
            .fg(ATTENTION_COLOR)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        WorkStatus::Working | WorkStatus::Off => Style::default()
            .fg(status_color(status))
            .add_modifier(Modifier::BOLD),
    };
    if is_today {
        s = s.add_modifier(Modifier::REVERSED);
    }
    s
}
