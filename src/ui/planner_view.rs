use crate::calc::format::{format_date_fr, format_date_for_input, format_day_label};
use crate::calc::week::{self, WeekBounds};
use crate::calc::DayState;
use crate::data::notification::SAVE_FAILURE_MESSAGE;
use crate::data::{Notification, PlannerSettings, SaveResponse, Severity, WeekContext};
use anyhow::Result;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyModifiers};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::Stdout;
use std::time::{Duration as StdDuration, Instant};

/// Form field receiving the quick-set due date.
pub const DEFAULT_DUE_FIELD: &str = "due_date";

const SETTING_LABELS: [&str; 4] = [
    "Unité de temps (min)",
    "Début de journée",
    "Unités par jour",
    "WIP limit",
];

#[derive(PartialEq)]
enum Mode {
    Normal,
    EditTitle,
    EditSetting,
}

#[derive(PartialEq, Default, Clone, Copy)]
enum ViewState {
    #[default]
    Timetable,
    Goal,
    Settings,
}

pub struct App<'a> {
    context: &'a WeekContext,
    pub settings: PlannerSettings,
    today: NaiveDate,
    bounds: WeekBounds,
    /// Day currently shown in the timetable panel, always within bounds.
    displayed_day: NaiveDate,
    day_state: DayState,
    view_state: ViewState,
    mode: Mode,
    input_buffer: String,
    /// Named fields of the week-goal form, addressed by id.
    goal_fields: Vec<(String, String)>,
    notification: Option<Notification>,
    /// Raised by `request_refresh`, consumed by the next tick.
    pending_refresh: bool,
    settings_cursor: usize,
}

impl<'a> App<'a> {
    pub fn new(context: &'a WeekContext, settings: PlannerSettings, today: NaiveDate) -> Self {
        let bounds = context.current_week_bounds(today);
        let displayed_day = clamp_to_bounds(today, bounds);
        let mut app = App {
            context,
            settings,
            today,
            bounds,
            displayed_day,
            day_state: DayState::Future,
            view_state: ViewState::Timetable,
            mode: Mode::Normal,
            input_buffer: String::new(),
            goal_fields: vec![
                ("title".to_string(), String::new()),
                (DEFAULT_DUE_FIELD.to_string(), String::new()),
            ],
            notification: None,
            pending_refresh: false,
            settings_cursor: 0,
        };
        app.on_day_replaced();
        app
    }

    /// Recomputes the panel's visual state from dates. The previous state is
    /// replaced wholesale, so the three markers stay mutually exclusive.
    pub fn on_day_replaced(&mut self) {
        self.day_state = DayState::classify(self.today, self.displayed_day);
    }

    pub fn next_day(&mut self) {
        if self.displayed_day < self.bounds.end {
            self.displayed_day = week::add_days(self.displayed_day, 1);
            self.on_day_replaced();
        }
    }

    pub fn previous_day(&mut self) {
        if self.displayed_day > self.bounds.start {
            self.displayed_day = week::add_days(self.displayed_day, -1);
            self.on_day_replaced();
        }
    }

    pub fn go_to_today(&mut self) {
        self.displayed_day = clamp_to_bounds(self.today, self.bounds);
        self.on_day_replaced();
    }

    /// Raises the refresh signal. No data is fetched here; the event loop
    /// reacts on its next tick.
    pub fn request_refresh(&mut self) {
        self.pending_refresh = true;
    }

    /// One event-loop tick: drops an expired banner and serves a pending
    /// refresh by re-deriving today-dependent state.
    pub fn tick(&mut self, now: Instant, today: NaiveDate) {
        if self
            .notification
            .as_ref()
            .is_some_and(|banner| banner.is_expired(now))
        {
            self.notification = None;
        }
        if self.pending_refresh {
            self.pending_refresh = false;
            self.today = today;
            self.bounds = self.context.current_week_bounds(today);
            self.displayed_day = clamp_to_bounds(self.displayed_day, self.bounds);
            self.on_day_replaced();
        }
    }

    pub fn form_field(&self, id: &str) -> Option<&str> {
        self.goal_fields
            .iter()
            .find(|(field_id, _)| field_id == id)
            .map(|(_, value)| value.as_str())
    }

    /// Writes into a named form field; a missing id is a silent no-op.
    pub fn set_form_field(&mut self, id: &str, value: String) {
        if let Some((_, field)) = self.goal_fields.iter_mut().find(|(field_id, _)| field_id == id) {
            *field = value;
        }
    }

    /// Sets the named due-date field to the Sunday ending the current week.
    pub fn set_current_week_due_date(&mut self, field_id: &str) {
        let sunday = self.context.current_week_end(self.today);
        self.set_form_field(field_id, format_date_for_input(sunday));
    }

    /// Sets the named due-date field to the Sunday ending next week.
    pub fn set_next_week_due_date(&mut self, field_id: &str) {
        let sunday = self.context.next_week_end(self.today);
        self.set_form_field(field_id, format_date_for_input(sunday));
    }

    /// Validates and persists the settings, then routes the outcome through
    /// the submission-response contract to produce the banner.
    pub fn save_settings(&mut self) {
        let response = self.settings_save_response();
        self.notification = Some(Notification::from_save_response(&response.to_body()));
    }

    fn settings_save_response(&self) -> SaveResponse {
        let errors = self.settings.validate();
        if !errors.is_empty() {
            return SaveResponse::failure(errors.join(" ; "));
        }
        match self.settings.save() {
            Ok(()) => SaveResponse::ok(),
            Err(_) => SaveResponse::failure(SAVE_FAILURE_MESSAGE),
        }
    }

    fn commit_setting_edit(&mut self) {
        let buffer = std::mem::take(&mut self.input_buffer);
        match self.settings_cursor {
            0 | 2 | 3 => match buffer.parse::<u32>() {
                Ok(value) => match self.settings_cursor {
                    0 => self.settings.time_unit_minutes = value,
                    2 => self.settings.time_units_per_day = value,
                    _ => self.settings.wip_limit = value,
                },
                Err(_) => {
                    self.notification = Some(Notification::error("Données invalides"));
                }
            },
            // day_start_time stays a raw string; validated on save
            _ => self.settings.day_start_time = buffer,
        }
        self.mode = Mode::Normal;
    }

    fn setting_value(&self, index: usize) -> String {
        match index {
            0 => self.settings.time_unit_minutes.to_string(),
            1 => self.settings.day_start_time.clone(),
            2 => self.settings.time_units_per_day.to_string(),
            _ => self.settings.wip_limit.to_string(),
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::EditTitle | Mode::EditSetting => {
                self.handle_edit_key(code);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.view_state = match self.view_state {
                    ViewState::Timetable => ViewState::Goal,
                    ViewState::Goal => ViewState::Settings,
                    ViewState::Settings => ViewState::Timetable,
                };
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Left if self.view_state == ViewState::Timetable => self.previous_day(),
            KeyCode::Right if self.view_state == ViewState::Timetable => self.next_day(),
            KeyCode::Char('t') if self.view_state == ViewState::Timetable => self.go_to_today(),
            KeyCode::Char('w') if self.view_state == ViewState::Goal => {
                self.set_current_week_due_date(DEFAULT_DUE_FIELD);
            }
            KeyCode::Char('n') if self.view_state == ViewState::Goal => {
                self.set_next_week_due_date(DEFAULT_DUE_FIELD);
            }
            KeyCode::Char('e') if self.view_state == ViewState::Goal => {
                self.input_buffer = self.form_field("title").unwrap_or("").to_string();
                self.mode = Mode::EditTitle;
            }
            KeyCode::Up if self.view_state == ViewState::Settings => {
                self.settings_cursor = self.settings_cursor.saturating_sub(1);
            }
            KeyCode::Down if self.view_state == ViewState::Settings => {
                if self.settings_cursor + 1 < SETTING_LABELS.len() {
                    self.settings_cursor += 1;
                }
            }
            KeyCode::Enter if self.view_state == ViewState::Settings => {
                self.input_buffer = self.setting_value(self.settings_cursor);
                self.mode = Mode::EditSetting;
            }
            KeyCode::Char('s') if self.view_state == ViewState::Settings => self.save_settings(),
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                if self.mode == Mode::EditTitle {
                    let title = std::mem::take(&mut self.input_buffer);
                    self.set_form_field("title", title);
                    self.mode = Mode::Normal;
                } else {
                    self.commit_setting_edit();
                }
            }
            _ => {}
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        match self.view_state {
            ViewState::Timetable => self.render_timetable(f, chunks[1]),
            ViewState::Goal => self.render_goal_form(f, chunks[1]),
            ViewState::Settings => self.render_settings(f, chunks[1]),
        }
        self.render_help(f, chunks[2]);
        self.render_banner(f, chunks[3]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                self.context.week_title(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "Du {} au {}",
                format_date_fr(self.bounds.start),
                format_date_fr(self.bounds.end)
            )),
        ];
        let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, area);
    }

    fn render_timetable(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(20)])
            .split(area);

        // Day strip: the seven days of the week, styled by their state.
        let mut day_lines = Vec::new();
        for offset in 0..7 {
            let date = week::add_days(self.bounds.start, offset);
            let mut style = day_state_style(DayState::classify(self.today, date));
            if date == self.displayed_day {
                style = style.add_modifier(Modifier::REVERSED);
            }
            day_lines.push(Line::from(Span::styled(self.day_label(date), style)));
        }
        let strip = Paragraph::new(day_lines)
            .block(Block::default().borders(Borders::ALL).title("Semaine"));
        f.render_widget(strip, chunks[0]);

        // Slot grid for the displayed day.
        let mut title = self.day_label(self.displayed_day);
        if self.day_state.is_read_only() {
            title.push_str(" (lecture seule)");
        }
        let slot_style = if self.day_state.is_read_only() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };
        let slot_lines: Vec<Line> = self
            .slot_times()
            .into_iter()
            .map(|slot| Line::from(Span::styled(format!("{slot} │"), slot_style)))
            .collect();
        let grid = Paragraph::new(slot_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(day_state_style(self.day_state)),
        );
        f.render_widget(grid, chunks[1]);
    }

    fn render_goal_form(&self, f: &mut Frame, area: Rect) {
        let title_value = if self.mode == Mode::EditTitle {
            format!("{}_", self.input_buffer)
        } else {
            self.form_field("title").unwrap_or("").to_string()
        };
        let due_value = self.form_field(DEFAULT_DUE_FIELD).unwrap_or("");
        // Flag a due date falling inside the exported week; without an export
        // the check is always negative and no flag is shown.
        let due_line = if self.context.is_date_str_in_current_week(due_value) {
            format!("Échéance  : {due_value} (cette semaine)")
        } else {
            format!("Échéance  : {due_value}")
        };
        let lines = vec![
            Line::from(format!("Titre     : {title_value}")),
            Line::from(due_line),
            Line::from(""),
            Line::from("e éditer le titre  w échéance fin de semaine  n fin de semaine prochaine"),
        ];
        let form = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Objectif de la semaine"),
        );
        f.render_widget(form, area);
    }

    fn render_settings(&self, f: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for (index, label) in SETTING_LABELS.iter().enumerate() {
            let value = if self.mode == Mode::EditSetting && index == self.settings_cursor {
                format!("{}_", self.input_buffer)
            } else {
                self.setting_value(index)
            };
            let mut style = Style::default();
            if index == self.settings_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(Span::styled(
                format!("{label:<22} {value}"),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from("↑/↓ choisir  Entrée éditer  s enregistrer"));
        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Paramètres"));
        f.render_widget(panel, area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help = match self.view_state {
            ViewState::Timetable => "Tab vues  ←/→ jour  t aujourd'hui  r rafraîchir  q quitter",
            ViewState::Goal => "Tab vues  r rafraîchir  q quitter",
            ViewState::Settings => "Tab vues  q quitter",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().add_modifier(Modifier::DIM)),
            area,
        );
    }

    fn render_banner(&self, f: &mut Frame, area: Rect) {
        if let Some(banner) = &self.notification {
            f.render_widget(
                Paragraph::new(banner.message.as_str()).style(severity_style(banner.severity)),
                area,
            );
        }
    }

    fn day_label(&self, date: NaiveDate) -> String {
        match self.context.day_info(&format_date_for_input(date)) {
            Some(record) if !record.display_date.is_empty() => record.display_date.clone(),
            _ => format_day_label(date),
        }
    }

    /// Slot start times derived from the settings, "HH:MM" each.
    fn slot_times(&self) -> Vec<String> {
        let start = self
            .settings
            .day_start()
            .unwrap_or_else(|| NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default());
        let step = Duration::minutes(self.settings.time_unit_minutes.max(1) as i64);
        let mut times = Vec::new();
        let mut slot = start;
        for _ in 0..self.settings.time_units_per_day {
            times.push(slot.format("%H:%M").to_string());
            slot += step;
        }
        times
    }
}

fn clamp_to_bounds(date: NaiveDate, bounds: WeekBounds) -> NaiveDate {
    // Open-coded rather than Ord::clamp: a malformed export with end before
    // start must not panic the UI.
    if date < bounds.start {
        bounds.start
    } else if date > bounds.end {
        bounds.end
    } else {
        date
    }
}

/// Closed state→style mapping, the marker-class analog of the web timetable.
pub(crate) fn day_state_style(state: DayState) -> Style {
    match state {
        DayState::Past => Style::default().fg(Color::DarkGray),
        DayState::Current => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        DayState::Future => Style::default().fg(Color::Cyan),
    }
}

pub(crate) fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Success => Style::default().fg(Color::Green),
        Severity::Error => Style::default().fg(Color::Red),
    }
}

pub fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick(Instant::now(), Local::now().date_naive());
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
