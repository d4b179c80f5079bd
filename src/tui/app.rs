use std::fmt::Display;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{
        palette::{
            material::{BLUE, GREEN, RED},
            tailwind::SLATE,
        },
        Color, Modifier, Style, Stylize,
    },
    symbols::{self, border},
    text::{Line, Span, Text},
    widgets::{
        block::{Position, Title},
        Block, Borders, Clear, HighlightSpacing, List, ListItem, Paragraph, StatefulWidget,
        Widget, Wrap,
    },
    DefaultTerminal, Frame,
};

use crate::tasks::{Durations, SettingsError, Storage, TaskError, TaskList};
use crate::timer::{format_time, IntervalTimer, TimerKind, TimerStatus};
use crate::wheel::{Ring, Selection, SpinEngine, Wheel};

const HEADER_STYLE: Style = Style::new().fg(SLATE.c100).bg(BLUE.c800);
const NORMAL_ROW_BG: Color = SLATE.c950;
const ALT_ROW_BG_COLOR: Color = SLATE.c900;
const SELECTED_STYLE: Style = Style::new().bg(SLATE.c800).add_modifier(Modifier::BOLD);
const TEXT_FG_COLOR: Color = SLATE.c200;
const SESSION_COLOR: Color = RED.c400;
const BREAK_COLOR: Color = GREEN.c500;

const BREAK_OVER: &str = "Break's over!";
const NOTICE_DURATION: Duration = Duration::from_secs(2);

const fn alternate_colors(i: usize) -> Color {
    if i % 2 == 0 {
        NORMAL_ROW_BG
    } else {
        ALT_ROW_BG_COLOR
    }
}

const fn kind_color(kind: TimerKind) -> Color {
    match kind {
        TimerKind::Session => SESSION_COLOR,
        TimerKind::Break => BREAK_COLOR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Session,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Adding {
        input: String,
    },
    /// Keystrokes go straight into the task at `index`.
    Editing {
        index: usize,
    },
    Settings {
        session: String,
        brk: String,
        field: SettingsField,
    },
}

/// A message that keeps the spin and break controls hidden until it expires.
#[derive(Debug)]
struct Notice {
    text: &'static str,
    until: Instant,
}

pub struct App {
    storage: Storage,
    tasks: TaskList,
    durations: Durations,
    spin: SpinEngine,
    timer: IntervalTimer,
    rng: StdRng,
    mode: Mode,
    notice: Option<Notice>,
    /// Selection of a finished session, waiting for the user to keep or drop it.
    pending_removal: Option<Selection>,
    status: Option<String>,
    frame: Duration,
    exit: bool,
}

impl App {
    pub fn new(storage: Storage, frame: Duration) -> Result<Self> {
        Self::with_rng(storage, frame, StdRng::from_entropy())
    }

    pub fn with_rng(storage: Storage, frame: Duration, rng: StdRng) -> Result<Self> {
        let tasks = TaskList::load(&storage)?;
        let durations = Durations::load(&storage)?;
        Ok(Self {
            storage,
            tasks,
            durations,
            spin: SpinEngine::new(),
            timer: IntervalTimer::new(),
            rng,
            mode: Mode::Normal,
            notice: None,
            pending_removal: None,
            status: None,
            frame,
            exit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
            self.on_frame(Instant::now());
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn handle_events(&mut self) -> Result<()> {
        if !event::poll(self.frame)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => Ok(()),
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) -> Result<()> {
        self.handle_key_at(key_event, Instant::now())
    }

    fn handle_key_at(&mut self, key_event: KeyEvent, now: Instant) -> Result<()> {
        if self.pending_removal.is_some() {
            return match key_event.code {
                KeyCode::Char('y') | KeyCode::Enter => self.answer_removal(true),
                KeyCode::Char('n') | KeyCode::Esc => self.answer_removal(false),
                KeyCode::Char('q') => {
                    self.exit();
                    Ok(())
                }
                _ => Ok(()),
            };
        }
        match self.mode {
            Mode::Normal => self.handle_normal_key(key_event.code, now),
            Mode::Adding { .. } => self.handle_adding_key(key_event.code),
            Mode::Editing { index } => self.handle_editing_key(key_event.code, index),
            Mode::Settings { .. } => self.handle_settings_key(key_event.code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, now: Instant) -> Result<()> {
        match code {
            KeyCode::Char('q') => self.exit(),
            KeyCode::Char(' ') | KeyCode::Char('s') => self.spin(now),
            KeyCode::Char('b') => self.start_break(now),
            KeyCode::Char('p') => self.pause_or_resume(now),
            KeyCode::Char('r') => self.reset(now),
            KeyCode::Char('c') => self.cancel(),
            KeyCode::Char('a') => {
                self.mode = Mode::Adding {
                    input: String::new(),
                }
            }
            KeyCode::Char('e') => {
                if let Some(index) = self.tasks.cursor() {
                    self.mode = Mode::Editing { index };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected()?,
            KeyCode::Char('o') => self.open_settings(),
            KeyCode::Char('j') | KeyCode::Down => self.tasks.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.tasks.state.select_previous(),
            KeyCode::Char('g') => self.tasks.state.select_first(),
            KeyCode::Char('G') => self.tasks.state.select_last(),
            KeyCode::Char('h') => self.tasks.state.select(None),
            _ => {}
        }
        Ok(())
    }

    fn handle_adding_key(&mut self, code: KeyCode) -> Result<()> {
        let Mode::Adding { input } = &mut self.mode else {
            return Ok(());
        };
        match code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let label = std::mem::take(input);
                self.mode = Mode::Normal;
                let result = self.tasks.add(&self.storage, &label);
                self.check(result)?;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
        Ok(())
    }

    fn handle_editing_key(&mut self, code: KeyCode, index: usize) -> Result<()> {
        let mut label = match self.tasks.get(index) {
            Some(label) => label.to_string(),
            None => {
                self.mode = Mode::Normal;
                return Ok(());
            }
        };
        match code {
            KeyCode::Char(c) => label.push(c),
            KeyCode::Backspace => {
                label.pop();
            }
            KeyCode::Enter | KeyCode::Esc => {
                self.mode = Mode::Normal;
                return Ok(());
            }
            _ => return Ok(()),
        }
        let result = self.tasks.edit(&self.storage, index, &label);
        self.check(result)?;
        Ok(())
    }

    fn handle_settings_key(&mut self, code: KeyCode) -> Result<()> {
        let Mode::Settings { session, brk, field } = &mut self.mode else {
            return Ok(());
        };
        let focused = match *field {
            SettingsField::Session => &mut *session,
            SettingsField::Break => &mut *brk,
        };
        match code {
            KeyCode::Char(c) => focused.push(c),
            KeyCode::Backspace => {
                focused.pop();
            }
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                *field = match *field {
                    SettingsField::Session => SettingsField::Break,
                    SettingsField::Break => SettingsField::Session,
                }
            }
            KeyCode::Enter => {
                let (session, brk) = (session.clone(), brk.clone());
                self.mode = Mode::Normal;
                self.save_settings(&session, &brk)?;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.exit = true;
    }

    /// Spin and break are offered only when nothing else is in flight.
    fn entry_controls_visible(&self) -> bool {
        !self.spin.is_spinning()
            && !self.timer.is_active()
            && self.notice.is_none()
            && self.pending_removal.is_none()
    }

    pub fn can_spin(&self) -> bool {
        self.entry_controls_visible() && !self.tasks.is_empty()
    }

    fn spin(&mut self, now: Instant) {
        if self.timer.is_active() || self.notice.is_some() {
            self.reject("Finish or cancel the current timer first");
            return;
        }
        match self.spin.request(self.tasks.len(), &mut self.rng, now) {
            Ok(_) => self.status = None,
            Err(e) => self.reject(e),
        }
    }

    fn start_break(&mut self, now: Instant) {
        if !self.entry_controls_visible() {
            self.reject("Finish or cancel the current timer first");
            return;
        }
        self.spin.clear_selection();
        match self.timer.start(TimerKind::Break, self.durations.break_secs, now) {
            Ok(()) => self.status = None,
            Err(e) => self.reject(e),
        }
    }

    fn pause_or_resume(&mut self, now: Instant) {
        if let Err(e) = self.timer.pause_or_resume(now) {
            self.reject(e);
        }
    }

    fn reset(&mut self, now: Instant) {
        if let Err(e) = self.timer.reset(now) {
            self.reject(e);
        }
    }

    fn cancel(&mut self) {
        if !self.timer.is_active() {
            return;
        }
        self.timer.cancel();
        self.spin.clear_selection();
    }

    fn remove_selected(&mut self) -> Result<()> {
        let Some(index) = self.tasks.cursor() else {
            return Ok(());
        };
        let result = self.tasks.remove(&self.storage, index);
        self.check(result)?;
        Ok(())
    }

    fn open_settings(&mut self) {
        self.mode = Mode::Settings {
            session: self.durations.session_minutes().to_string(),
            brk: self.durations.break_minutes().to_string(),
            field: SettingsField::Session,
        };
    }

    /// Each field is applied on its own; a rejected one keeps its old value.
    fn save_settings(&mut self, session: &str, brk: &str) -> Result<()> {
        let mut rejected = Vec::new();
        match self.durations.set_session_minutes(&self.storage, session) {
            Ok(_) => {}
            Err(SettingsError::Storage(e)) => return Err(e.into()),
            Err(e) => rejected.push(format!("Session: {e}")),
        }
        match self.durations.set_break_minutes(&self.storage, brk) {
            Ok(_) => {}
            Err(SettingsError::Storage(e)) => return Err(e.into()),
            Err(e) => rejected.push(format!("Break: {e}")),
        }
        if rejected.is_empty() {
            self.status = None;
        } else {
            self.reject(rejected.join("; "));
        }
        Ok(())
    }

    fn answer_removal(&mut self, remove: bool) -> Result<()> {
        let Some(selection) = self.pending_removal.take() else {
            return Ok(());
        };
        if !remove {
            return Ok(());
        }
        // the list may have been edited while the session ran
        let index = match self.tasks.get(selection.index) {
            Some(label) if label == selection.label => Some(selection.index),
            _ => self.tasks.items.iter().position(|t| *t == selection.label),
        };
        match index {
            Some(index) => {
                let result = self.tasks.remove(&self.storage, index);
                if self.check(result)?.is_some() {
                    self.shift_editor_after_removal(index);
                }
            }
            None => tracing::warn!(label = %selection.label, "finished task is no longer listed"),
        }
        Ok(())
    }

    /// Keeps an open editor on the same task once the row at `removed` is gone.
    fn shift_editor_after_removal(&mut self, removed: usize) {
        if let Mode::Editing { index } = &mut self.mode {
            if *index == removed {
                self.mode = Mode::Normal;
            } else if *index > removed {
                *index -= 1;
            }
        }
    }

    /// Advances the spin animation and the countdown to `now`.
    pub fn on_frame(&mut self, now: Instant) {
        if self.spin.update(now, &self.tasks.items).is_some() {
            if let Err(e) = self
                .timer
                .start(TimerKind::Session, self.durations.session_secs, now)
            {
                tracing::warn!(error = %e, "could not start session");
                self.reject(e);
            }
        }

        match self.timer.poll(now) {
            Some(TimerKind::Session) => self.on_session_expired(),
            Some(TimerKind::Break) => {
                self.notice = Some(Notice {
                    text: BREAK_OVER,
                    until: now + NOTICE_DURATION,
                });
            }
            None => {}
        }

        if self.notice.as_ref().is_some_and(|n| n.until <= now) {
            self.notice = None;
        }
    }

    fn on_session_expired(&mut self) {
        self.status = Some(format!("Session finished at {}", Local::now().format("%H:%M")));
        if let Some(selection) = self.spin.selection().cloned() {
            self.spin.clear_selection();
            self.pending_removal = Some(selection);
        }
    }

    fn reject(&mut self, reason: impl Display) {
        tracing::debug!(%reason, "request rejected");
        self.status = Some(reason.to_string());
    }

    /// Surfaces task rejections in the status line; storage failures propagate.
    fn check<T>(&mut self, result: Result<T, TaskError>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(TaskError::Storage(e)) => Err(e.into()),
            Err(e) => {
                self.reject(e);
                Ok(None)
            }
        }
    }

    fn instructions(&self) -> Line<'static> {
        let mut keys: Vec<(&str, &str)> = Vec::new();
        if self.pending_removal.is_some() {
            keys.extend([(" Remove ", "<y>"), (" Keep ", "<n>")]);
        } else {
            match self.mode {
                Mode::Adding { .. } | Mode::Editing { .. } => {
                    keys.extend([(" Done ", "<enter>"), (" Back ", "<esc>")]);
                }
                Mode::Settings { .. } => {
                    keys.extend([
                        (" Switch ", "<tab>"),
                        (" Save ", "<enter>"),
                        (" Close ", "<esc>"),
                    ]);
                }
                Mode::Normal => {
                    if self.can_spin() {
                        keys.push((" Spin ", "<space>"));
                    }
                    if self.entry_controls_visible() {
                        keys.push((" Break ", "<b>"));
                    }
                    if self.timer.is_active() {
                        let pause = if self.timer.status() == TimerStatus::Paused {
                            " Resume "
                        } else {
                            " Pause "
                        };
                        keys.extend([(pause, "<p>"), (" Reset ", "<r>"), (" Cancel ", "<c>")]);
                    }
                    keys.extend([
                        (" Add ", "<a>"),
                        (" Edit ", "<e>"),
                        (" Delete ", "<d>"),
                        (" Settings ", "<o>"),
                        (" Quit ", "<q> "),
                    ]);
                }
            }
        }
        Line::from(
            keys.into_iter()
                .flat_map(|(label, key)| [label.into(), key.blue().bold()])
                .collect::<Vec<Span>>(),
        )
    }

    fn render_wheel(&self, area: Rect, buf: &mut Buffer) {
        let ring = self
            .timer
            .is_active()
            .then(|| self.timer.kind())
            .flatten()
            .map(|kind| Ring {
                fraction: self.timer.fraction_remaining(),
                color: kind_color(kind),
            });
        let block = Block::bordered()
            .title(Line::raw(" Wheel ").centered())
            .border_set(symbols::border::ROUNDED);
        Wheel::new(&self.tasks.items, self.spin.angle())
            .ring(ring)
            .block(block)
            .render(area, buf);
    }

    fn render_timer(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(Line::raw(" Timer ").centered());
        let text = match (self.timer.kind(), self.timer.status()) {
            (Some(kind), TimerStatus::Running | TimerStatus::Paused) => {
                let name = match kind {
                    TimerKind::Session => "Session",
                    TimerKind::Break => "Break",
                };
                let mut heading = format!("{name} of {}", format_time(i64::from(self.timer.total())));
                if self.timer.status() == TimerStatus::Paused {
                    heading.push_str(" (paused)");
                }
                Text::from(vec![
                    Line::from(heading),
                    Line::from(Span::styled(
                        self.timer.display(),
                        Style::new().bold().fg(kind_color(kind)),
                    )),
                ])
            }
            _ => match &self.notice {
                Some(notice) => Text::from(notice.text.bold().fg(BREAK_COLOR)),
                None if self.spin.is_spinning() => Text::from("Spinning..."),
                None => Text::from("Ready".dark_gray()),
            },
        };
        Paragraph::new(text).centered().block(block).render(area, buf);
    }

    fn render_list(&mut self, area: Rect, buf: &mut Buffer) {
        let block = Block::new()
            .title(Line::raw("Tasks").centered())
            .borders(Borders::TOP)
            .border_set(symbols::border::EMPTY)
            .border_style(HEADER_STYLE)
            .bg(NORMAL_ROW_BG);

        let editing = match self.mode {
            Mode::Editing { index } => Some(index),
            _ => None,
        };
        let items: Vec<ListItem> = self
            .tasks
            .items
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let text = if editing == Some(i) {
                    format!(" {label}▏")
                } else {
                    format!(" {label}")
                };
                ListItem::new(Line::styled(text, TEXT_FG_COLOR)).bg(alternate_colors(i))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(SELECTED_STYLE)
            .highlight_symbol(">")
            .highlight_spacing(HighlightSpacing::Always);

        // `List` is both `Widget` and `StatefulWidget`
        StatefulWidget::render(list, area, buf, &mut self.tasks.state);
    }

    fn render_panel(&self, area: Rect, buf: &mut Buffer) {
        let (title, text) = match &self.mode {
            Mode::Adding { input } => (" New task ", Text::from(format!("{input}▏"))),
            Mode::Settings {
                session,
                brk,
                field,
            } => {
                let row = |name: &str, value: &str, focused: bool| {
                    let line = Line::from(format!("{name} (min): {value}"));
                    if focused {
                        line.reversed()
                    } else {
                        line
                    }
                };
                (
                    " Settings ",
                    Text::from(vec![
                        row("Session", session, *field == SettingsField::Session),
                        row("Break", brk, *field == SettingsField::Break),
                    ]),
                )
            }
            Mode::Normal | Mode::Editing { .. } => (
                " Settings ",
                Text::from(vec![
                    Line::from(format!("Session {} min", self.durations.session_minutes())),
                    Line::from(format!("Break {} min", self.durations.break_minutes())),
                ]),
            ),
        };
        Paragraph::new(text)
            .block(Block::bordered().title(title))
            .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        let line = match (self.spin.selection(), &self.status) {
            (Some(selection), _) => Line::from(vec![
                "Selected Task: ".into(),
                Span::styled(selection.label.clone(), Style::new().yellow().bold()),
            ]),
            (None, Some(status)) => Line::styled(status.clone(), Style::new().dark_gray()),
            (None, None) => Line::default(),
        };
        Paragraph::new(line).centered().render(area, buf);
    }

    fn render_prompt(selection: &Selection, area: Rect, buf: &mut Buffer) {
        let width = area.width.min(50);
        let height = area.height.min(6);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        Clear.render(popup, buf);
        let text = Text::from(vec![
            Line::from(format!(
                "Would you like to remove the task \"{}\" from the list?",
                selection.label
            )),
            Line::from(vec![" Yes ".into(), "<y>".blue().bold(), "  No ".into(), "<n>".blue().bold()]),
        ]);
        Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .centered()
            .block(
                Block::bordered()
                    .title(" Session has ended ".bold())
                    .border_set(border::DOUBLE),
            )
            .render(popup, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let title = Title::from(" Wheel of Tasks ".bold());
        let instructions = Title::from(self.instructions());
        let block = Block::bordered()
            .title(title.alignment(Alignment::Center))
            .title(
                instructions
                    .alignment(Alignment::Center)
                    .position(Position::Bottom),
            )
            .border_set(border::THICK);
        let inner = block.inner(area);
        block.render(area, buf);

        let [body, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
        let [wheel_area, side] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(body);
        let [timer_area, list_area, panel_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .areas(side);

        self.render_wheel(wheel_area, buf);
        self.render_timer(timer_area, buf);
        self.render_list(list_area, buf);
        self.render_panel(panel_area, buf);
        self.render_status(status, buf);
        if let Some(selection) = &self.pending_removal {
            App::render_prompt(selection, area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::storage::{BREAK_LENGTH_KEY, SESSION_LENGTH_KEY};
    use crate::tasks::task_list::DEFAULT_TASKS;
    use crate::wheel::spin::SPIN_DURATION;

    fn new_app() -> Result<App> {
        App::with_rng(
            Storage::open_in_memory()?,
            Duration::from_millis(33),
            StdRng::seed_from_u64(42),
        )
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> Result<()> {
        app.handle_key_at(code.into(), now)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) -> Result<()> {
        for c in text.chars() {
            press(app, KeyCode::Char(c), now)?;
        }
        Ok(())
    }

    fn screen(app: &mut App) -> String {
        let mut buf = Buffer::empty(Rect::new(0, 0, 100, 30));
        app.render(buf.area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    /// Spins and lets the wheel settle; returns the settle time.
    fn spin_and_settle(app: &mut App, now: Instant) -> Result<Instant> {
        press(app, KeyCode::Char(' '), now)?;
        assert!(app.spin.is_spinning());
        let settled = now + SPIN_DURATION;
        app.on_frame(settled);
        assert!(!app.spin.is_spinning());
        Ok(settled)
    }

    #[test]
    fn handle_key_event() -> Result<()> {
        let mut app = new_app()?;
        app.handle_key_event(KeyCode::Down.into())?;
        app.handle_key_event(KeyCode::Down.into())?;
        assert_eq!(app.tasks.state.selected(), Some(1));

        app.handle_key_event(KeyCode::Up.into())?;
        assert_eq!(app.tasks.state.selected(), Some(0));

        let mut app = new_app()?;
        app.handle_key_event(KeyCode::Char('q').into())?;
        assert!(app.exit);

        Ok(())
    }

    #[test]
    fn render() -> Result<()> {
        let mut app = new_app()?;
        let text = screen(&mut app);
        assert!(text.contains("Wheel of Tasks"));
        assert!(text.contains("Session 25 min"));
        assert!(text.contains("Spin"));
        for task in DEFAULT_TASKS {
            assert!(text.contains(task), "missing {task}");
        }
        Ok(())
    }

    #[test]
    fn settled_spin_starts_a_session() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        spin_and_settle(&mut app, now)?;

        let selection = app.spin.selection().cloned().expect("a selection");
        assert_eq!(app.tasks.get(selection.index), Some(selection.label.as_str()));
        assert_eq!(app.timer.kind(), Some(TimerKind::Session));
        assert_eq!(app.timer.status(), TimerStatus::Running);
        assert_eq!(app.timer.total(), 25 * 60);
        assert!(!app.can_spin());
        assert!(screen(&mut app).contains(&format!("Selected Task: {}", selection.label)));
        Ok(())
    }

    #[test]
    fn spin_is_refused_while_a_timer_runs() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        press(&mut app, KeyCode::Char('b'), now)?;
        press(&mut app, KeyCode::Char(' '), now)?;
        assert!(!app.spin.is_spinning());
        assert!(app.status.is_some());
        Ok(())
    }

    #[test]
    fn one_minute_session_asks_to_remove_its_task() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        press(&mut app, KeyCode::Char('o'), now)?;
        press(&mut app, KeyCode::Backspace, now)?;
        press(&mut app, KeyCode::Backspace, now)?;
        type_text(&mut app, "1", now)?;
        press(&mut app, KeyCode::Enter, now)?;
        assert_eq!(app.durations.session_secs, 60);

        let settled = spin_and_settle(&mut app, now)?;
        let selection = app.spin.selection().cloned().expect("a selection");

        app.on_frame(settled + Duration::from_secs(60));
        assert_eq!(app.timer.remaining(), 0);
        assert!(app.pending_removal.is_none());

        app.on_frame(settled + Duration::from_secs(61));
        assert_eq!(app.timer.status(), TimerStatus::Expired);
        assert_eq!(app.pending_removal.as_ref(), Some(&selection));
        assert!(app.spin.selection().is_none());
        assert!(screen(&mut app).contains(&selection.label));

        let before = app.tasks.len();
        press(&mut app, KeyCode::Char('y'), settled)?;
        assert_eq!(app.tasks.len(), before - 1);
        assert!(app.pending_removal.is_none());
        assert!(app.can_spin());
        Ok(())
    }

    #[test]
    fn declined_removal_keeps_the_task() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        let settled = spin_and_settle(&mut app, now)?;
        app.on_frame(settled + Duration::from_secs(25 * 60 + 1));
        assert!(app.pending_removal.is_some());
        press(&mut app, KeyCode::Char('n'), settled)?;
        assert_eq!(app.tasks.len(), DEFAULT_TASKS.len());
        assert!(app.can_spin());
        Ok(())
    }

    #[test]
    fn removal_follows_the_task_after_reordering_edits() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        let settled = spin_and_settle(&mut app, now)?;
        let selection = app.spin.selection().cloned().expect("a selection");

        // drop a task in front of the selected one, if there is one
        if selection.index > 0 {
            app.tasks.state.select(Some(0));
            press(&mut app, KeyCode::Char('d'), settled)?;
        }
        app.on_frame(settled + Duration::from_secs(25 * 60 + 1));
        press(&mut app, KeyCode::Char('y'), settled)?;
        assert!(!app.tasks.items.contains(&selection.label));
        Ok(())
    }

    #[test]
    fn removal_keeps_the_editor_on_its_task() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        app.tasks.state.select(Some(1));
        press(&mut app, KeyCode::Char('e'), now)?;
        assert_eq!(app.mode, Mode::Editing { index: 1 });

        app.pending_removal = Some(Selection {
            index: 0,
            label: DEFAULT_TASKS[0].to_string(),
        });
        press(&mut app, KeyCode::Char('y'), now)?;
        assert_eq!(app.mode, Mode::Editing { index: 0 });
        press(&mut app, KeyCode::Char('!'), now)?;
        assert_eq!(app.tasks.get(0), Some("Exercise!"));
        assert_eq!(app.tasks.get(1), Some(DEFAULT_TASKS[2]));

        // the edited row itself goes away
        app.pending_removal = Some(Selection {
            index: 0,
            label: "Exercise!".to_string(),
        });
        press(&mut app, KeyCode::Char('y'), now)?;
        assert_eq!(app.mode, Mode::Normal);
        press(&mut app, KeyCode::Char('!'), now)?;
        assert!(app.tasks.items.iter().all(|t| !t.ends_with('!')));
        assert_eq!(app.tasks.len(), DEFAULT_TASKS.len() - 2);
        Ok(())
    }

    #[test]
    fn break_over_notice_holds_controls_briefly() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        press(&mut app, KeyCode::Char('b'), now)?;
        assert_eq!(app.timer.kind(), Some(TimerKind::Break));

        let over = now + Duration::from_secs(5 * 60);
        app.on_frame(over);
        assert_eq!(app.timer.status(), TimerStatus::Expired);
        assert!(screen(&mut app).contains(BREAK_OVER));
        assert!(!app.can_spin());

        app.on_frame(over + NOTICE_DURATION);
        assert!(app.notice.is_none());
        assert!(app.can_spin());
        Ok(())
    }

    #[test]
    fn pause_reset_and_cancel() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        let settled = spin_and_settle(&mut app, now)?;
        app.on_frame(settled + Duration::from_secs(10));
        assert_eq!(app.timer.remaining(), 25 * 60 - 10);

        press(&mut app, KeyCode::Char('p'), settled + Duration::from_secs(10))?;
        assert_eq!(app.timer.status(), TimerStatus::Paused);
        assert!(screen(&mut app).contains("Resume"));
        app.on_frame(settled + Duration::from_secs(100));
        assert_eq!(app.timer.remaining(), 25 * 60 - 10);

        press(&mut app, KeyCode::Char('r'), settled + Duration::from_secs(100))?;
        assert_eq!(app.timer.status(), TimerStatus::Running);
        assert_eq!(app.timer.remaining(), 25 * 60);

        press(&mut app, KeyCode::Char('c'), settled + Duration::from_secs(101))?;
        assert_eq!(app.timer.status(), TimerStatus::None);
        assert!(app.spin.selection().is_none());
        assert_eq!(app.tasks.len(), DEFAULT_TASKS.len());
        assert!(app.can_spin());
        Ok(())
    }

    #[test]
    fn add_and_edit_from_the_keyboard() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        press(&mut app, KeyCode::Char('a'), now)?;
        type_text(&mut app, "Water plants", now)?;
        press(&mut app, KeyCode::Enter, now)?;
        assert_eq!(app.tasks.items.last().map(String::as_str), Some("Water plants"));

        press(&mut app, KeyCode::Char('a'), now)?;
        type_text(&mut app, "   ", now)?;
        press(&mut app, KeyCode::Enter, now)?;
        assert_eq!(app.tasks.len(), DEFAULT_TASKS.len() + 1);
        assert_eq!(app.status.as_deref(), Some("Task label is empty"));

        press(&mut app, KeyCode::Char('g'), now)?;
        press(&mut app, KeyCode::Char('e'), now)?;
        type_text(&mut app, "!", now)?;
        assert_eq!(app.tasks.get(0), Some("Read a book!"));
        press(&mut app, KeyCode::Backspace, now)?;
        press(&mut app, KeyCode::Backspace, now)?;
        assert_eq!(app.tasks.get(0), Some("Read a boo"));
        press(&mut app, KeyCode::Enter, now)?;
        assert_eq!(app.mode, Mode::Normal);

        let reloaded = TaskList::load(&app.storage)?;
        assert_eq!(reloaded.items, app.tasks.items);
        Ok(())
    }

    #[test]
    fn bad_break_input_changes_nothing() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        press(&mut app, KeyCode::Char('o'), now)?;
        press(&mut app, KeyCode::Tab, now)?;
        press(&mut app, KeyCode::Backspace, now)?;
        type_text(&mut app, "abc", now)?;
        press(&mut app, KeyCode::Enter, now)?;

        assert_eq!(app.durations.break_secs, 5 * 60);
        assert_eq!(app.storage.get(BREAK_LENGTH_KEY)?, None);
        // the untouched session field still saves
        assert_eq!(app.storage.get(SESSION_LENGTH_KEY)?.as_deref(), Some("25"));
        assert!(app.status.as_deref().is_some_and(|s| s.starts_with("Break:")));
        Ok(())
    }

    #[test]
    fn removing_the_last_task_disables_spin() -> Result<()> {
        let mut app = new_app()?;
        let now = Instant::now();
        app.tasks.state.select(Some(0));
        for _ in 0..DEFAULT_TASKS.len() {
            press(&mut app, KeyCode::Char('d'), now)?;
        }
        assert!(app.tasks.is_empty());
        assert!(!app.can_spin());
        press(&mut app, KeyCode::Char(' '), now)?;
        assert!(!app.spin.is_spinning());

        let text = screen(&mut app);
        assert!(text.contains(crate::wheel::widget::EMPTY_MESSAGE));
        assert!(!text.contains("<space>"));
        Ok(())
    }
}
