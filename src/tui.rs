//! Terminal interface for chatterdle, built on Ratatui.
//!
//! # Architecture
//! - `App`: presentation state (screen, pool, session, chat notices) and
//!   key handling; owns no terminal, so it is testable headless
//! - `Tui`: terminal lifecycle and the draw/poll loop
//!
//! # Screens
//! `Home` (chatters joining, filter toggles, Start) -> `Board` (tile grid,
//! keyboard, end-of-round modal with New Game back into `Board`).

use crate::chat::ChatEvent;
use crate::feedback::Feedback;
use crate::pool::{CandidatePool, PoolFilter};
use crate::session::{GameSession, RoundStatus};
use crate::settings::Settings;
use crate::{debug_log, info_log};
use chrono::{DateTime, Duration as ChronoDuration, Local};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;
const MAX_CHATTERS_DISPLAY: usize = 15;
const MAX_CHAT_NOTICES: usize = 4;
const CHAT_NOTICE_TTL_SECS: i64 = 8;

const KEYBOARD_ROWS: [&str; 4] = ["0123456789_", "qwertyuiop", "asdfghjkl", "zxcvbnm"];

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const NOTICE_STYLE: Style = Style::new().fg(Color::Magenta);
const STATUS_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Home,
    Board,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continue,
    Exit,
}

/// A transient "chat message received" notification. The core hands these to
/// the rendering layer, which owns their lifetime and expiry.
#[derive(Clone, Debug)]
struct ChatNotice {
    login: String,
    text: String,
    shown_at: DateTime<Local>,
}

fn is_guess_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

fn tile_colors(feedback: Feedback) -> (Color, Color) {
    match feedback {
        Feedback::Correct => (Color::Green, Color::Black),
        Feedback::Present => (Color::Yellow, Color::Black),
        Feedback::Absent => (Color::DarkGray, Color::White),
    }
}

/// Presentation state and key handling, independent of any terminal.
pub struct App {
    channel: String,
    pool: CandidatePool,
    filter: PoolFilter,
    session: GameSession,
    settings: Settings,
    screen: Screen,
    notices: VecDeque<ChatNotice>,
    error_message: String,
    chat_rx: Option<Receiver<ChatEvent>>,
}

impl App {
    pub fn new(
        channel: String,
        settings: Settings,
        filter: PoolFilter,
        session: GameSession,
        chat_rx: Option<Receiver<ChatEvent>>,
    ) -> Self {
        Self {
            channel,
            pool: CandidatePool::new(),
            filter,
            session,
            settings,
            screen: Screen::Home,
            notices: VecDeque::new(),
            error_message: String::new(),
            chat_rx,
        }
    }

    /// Fold any chat arrivals into the pool. Called from the event loop
    /// between frames, so pool and session mutations never interleave.
    pub fn drain_chat(&mut self) {
        let Some(rx) = self.chat_rx.take() else { return };
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    if self.pool.insert(&event.login, event.meta) {
                        info_log!("chatter joined: {}", event.login);
                    }
                    self.notices.push_back(ChatNotice {
                        login: event.login,
                        text: event.text,
                        shown_at: Local::now(),
                    });
                    while self.notices.len() > MAX_CHAT_NOTICES {
                        self.notices.pop_front();
                    }
                }
                Err(TryRecvError::Empty) => {
                    self.chat_rx = Some(rx);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    // Leave chat_rx empty; the pool keeps whatever arrived.
                    log::warn!("chat feed disconnected");
                    break;
                }
            }
        }
    }

    pub fn expire_notices(&mut self) {
        let cutoff = Local::now() - ChronoDuration::seconds(CHAT_NOTICE_TTL_SECS);
        while self
            .notices
            .front()
            .is_some_and(|notice| notice.shown_at < cutoff)
        {
            self.notices.pop_front();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        debug_log!("handle_key() - {:?} on {:?}", key.code, self.screen);
        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Board => self.handle_board_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Esc => return Outcome::Exit,
            KeyCode::Enter => match self.session.start_round(&self.pool, self.filter) {
                Ok(()) => {
                    info_log!("round started, target length {}", self.session.target_len());
                    self.error_message.clear();
                    self.screen = Screen::Board;
                }
                Err(e) => {
                    self.error_message = e.to_string();
                }
            },
            KeyCode::Char('a' | 'A') => {
                self.filter = PoolFilter::All;
            }
            KeyCode::Char('m' | 'M') => self.toggle_role(true),
            KeyCode::Char('s' | 'S') => self.toggle_role(false),
            KeyCode::Char('n' | 'N') => {
                self.settings.reveal_names_before_start = !self.settings.reveal_names_before_start;
                self.persist_settings();
            }
            KeyCode::Char('h' | 'H') => {
                self.settings.reveal_occurrence_hints = !self.settings.reveal_occurrence_hints;
                self.persist_settings();
            }
            _ => {}
        }
        Outcome::Continue
    }

    fn toggle_role(&mut self, moderator: bool) {
        let (mut moderators, mut subscribers) = match self.filter {
            PoolFilter::All => (false, false),
            PoolFilter::Roles {
                moderators,
                subscribers,
            } => (moderators, subscribers),
        };
        if moderator {
            moderators = !moderators;
        } else {
            subscribers = !subscribers;
        }
        self.filter = if moderators || subscribers {
            PoolFilter::Roles {
                moderators,
                subscribers,
            }
        } else {
            PoolFilter::All
        };
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings.save() {
            log::warn!("failed to save settings: {e}");
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Outcome {
        if self.session.modal_message().is_some() {
            match key.code {
                KeyCode::Esc => return Outcome::Exit,
                KeyCode::Enter | KeyCode::Char('n' | 'N') => {
                    if let Err(e) = self.session.reset(&self.pool, self.filter) {
                        // Only reachable if the filter was tightened after
                        // the round ran; fall back to the home screen.
                        self.error_message = e.to_string();
                        self.screen = Screen::Home;
                    }
                }
                _ => {}
            }
            return Outcome::Continue;
        }

        match key.code {
            KeyCode::Esc => return Outcome::Exit,
            KeyCode::Backspace => self.session.delete(),
            KeyCode::Enter => self.session.submit_guess(),
            KeyCode::Left => self.session.move_cursor(-1),
            KeyCode::Right => self.session.move_cursor(1),
            KeyCode::Char(c) => {
                let c = c.to_ascii_lowercase();
                if is_guess_char(c) {
                    self.session.press_key(c);
                } else {
                    debug_log!("handle_board_key() - rejecting '{}'", c);
                }
            }
            _ => {}
        }
        Outcome::Continue
    }

    #[cfg(test)]
    fn session(&self) -> &GameSession {
        &self.session
    }
}

fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                           // Title
            Constraint::Min(10),                             // Lobby or board
            Constraint::Length(MAX_CHAT_NOTICES as u16 + 2), // Chat feed
            Constraint::Length(3),                           // Instructions
        ])
        .split(f.area());

    render_title(f, chunks[0], &app.channel);
    match app.screen {
        Screen::Home => render_home(f, chunks[1], app),
        Screen::Board => render_board(f, chunks[1], app),
    }
    render_chat_feed(f, chunks[2], app);
    render_instructions(f, chunks[3], app);

    if let Some(message) = app.session.modal_message() {
        render_modal(f, &message);
    }
}

fn render_title(f: &mut Frame, area: Rect, channel: &str) {
    let title = Paragraph::new(format!("CHATTERDLE - #{channel}"))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_home(f: &mut Frame, area: Rect, app: &App) {
    let eligible = app.pool.filtered(app.filter).len();
    let mut lines = vec![
        Line::from(format!(
            "Hello {}'s chat, type anything to join! ({} have joined)",
            app.channel,
            app.pool.len()
        )),
        Line::from(format!(
            "Target pool: {} ({eligible} eligible)",
            app.filter.describe()
        )),
        Line::from(""),
    ];

    if !app.error_message.is_empty() {
        lines.push(Line::from(Span::styled(
            app.error_message.clone(),
            ERROR_STYLE,
        )));
        lines.push(Line::from(""));
    }

    if app.settings.reveal_names_before_start {
        let names = app.pool.filtered(PoolFilter::All);
        for login in names.iter().take(MAX_CHATTERS_DISPLAY) {
            lines.push(Line::from(format!("  {login}")));
        }
        if names.len() > MAX_CHATTERS_DISPLAY {
            lines.push(Line::from(format!(
                "  ... and {} more",
                names.len() - MAX_CHATTERS_DISPLAY
            )));
        }
    } else {
        lines.push(Line::from("(chatter names hidden)"));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Lobby").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let len = session.target_len();
    let mut lines = Vec::new();

    for guess in session.guesses() {
        let mut spans = vec![Span::raw("  ")];
        for (c, &fb) in guess.word.chars().zip(&guess.feedback) {
            let (bg, fg) = tile_colors(fb);
            spans.push(Span::styled(
                format!(" {c} "),
                Style::default().fg(fg).bg(bg),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    if session.status() == RoundStatus::Active {
        let mut spans = vec![Span::raw("  ")];
        for (i, &c) in session.pending().iter().enumerate() {
            let style = if i == session.cursor() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {c} "), style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let shown = session.guesses().len() + usize::from(session.status() == RoundStatus::Active);
    for _ in shown..crate::session::MAX_GUESSES {
        let mut spans = vec![Span::raw("  ")];
        for _ in 0..len {
            spans.push(Span::styled(
                "   ",
                Style::default().bg(Color::Black).fg(Color::DarkGray),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    for row in KEYBOARD_ROWS {
        let mut spans = vec![Span::raw("  ")];
        for c in row.chars() {
            let style = match session.keys().color(c) {
                Some(fb) => {
                    let (bg, fg) = tile_colors(fb);
                    Style::default().fg(fg).bg(bg)
                }
                None => Style::default().fg(Color::Black).bg(Color::Gray),
            };
            let floor = session.keys().occurrence_floor(c);
            let cap = if app.settings.reveal_occurrence_hints && floor > 1 {
                format!("{c}{floor}")
            } else {
                format!(" {c} ")
            };
            spans.push(Span::styled(cap, style));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
    }

    let title = format!("Guesses ({} left)", session.guesses_remaining());
    let paragraph = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_chat_feed(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app
        .notices
        .iter()
        .map(|notice| {
            Line::from(vec![
                Span::styled(format!("{}: ", notice.login), NOTICE_STYLE),
                Span::raw(notice.text.clone()),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Chat").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_instructions(f: &mut Frame, area: Rect, app: &App) {
    let text = match (app.screen, app.session.status()) {
        (Screen::Home, _) => {
            "ENTER: Start | A: everyone | M: moderators | S: subscribers | N: names | H: hints | ESC: Quit"
        }
        (Screen::Board, RoundStatus::Won | RoundStatus::Lost) => "N/ENTER: New Game | ESC: Quit",
        (Screen::Board, _) => {
            "Type the chatter's name | ENTER: Submit | BACKSPACE: Delete | ARROWS: Move | ESC: Quit"
        }
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_modal(f: &mut Frame, message: &str) {
    let area = f.area();
    let width = (message.len() as u16 + 6).min(area.width);
    let rect = Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(5) / 2,
        width,
        height: 5.min(area.height),
    };
    f.render_widget(Clear, rect);
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(message.to_string(), STATUS_STYLE)),
        Line::from(""),
        Line::from("N: New Game | ESC: Quit"),
    ])
    .block(Block::default().borders(Borders::ALL))
    .wrap(Wrap { trim: true });
    f.render_widget(paragraph, rect);
}

/// Terminal lifecycle and the draw/poll loop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("Tui::new() - initializing terminal");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    pub fn run(&mut self, app: &mut App) -> io::Result<()> {
        loop {
            app.drain_chat();
            app.expire_notices();
            self.terminal.draw(|f| render(f, app))?;

            if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events, ignore Release and Repeat
                    // to avoid double input.
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    // Filter out garbage characters from terminal escape
                    // sequences (alt-tab) and modified chords.
                    if let KeyCode::Char(c) = key.code {
                        if c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD {
                            debug_log!("run() - ignoring invalid character {:?}", c);
                            continue;
                        }
                        if key.modifiers.contains(KeyModifiers::ALT)
                            || key.modifiers.contains(KeyModifiers::CONTROL)
                        {
                            debug_log!("run() - ignoring modified key {:?}", key);
                            continue;
                        }
                    }
                    if app.handle_key(key) == Outcome::Exit {
                        break;
                    }
                }
                _ => {
                    // Mouse, focus, paste, and resize events carry nothing
                    // the app needs; resizes are picked up on the next draw.
                }
            }
        }
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::ChatterMeta;
    use crate::session::InputMode;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn event_for(login: &str) -> ChatEvent {
        ChatEvent {
            login: login.to_string(),
            text: "hi".to_string(),
            meta: ChatterMeta::default(),
        }
    }

    fn app_with_chatters(logins: &[&str]) -> App {
        let (tx, rx) = mpsc::channel();
        for login in logins {
            tx.send(event_for(login)).unwrap();
        }
        let mut app = App::new(
            "somechannel".to_string(),
            Settings::default(),
            PoolFilter::All,
            GameSession::seeded(InputMode::AutoAdvance, 7),
            Some(rx),
        );
        app.drain_chat();
        app
    }

    #[test]
    fn start_with_empty_pool_shows_error_and_stays_home() {
        let mut app = app_with_chatters(&[]);
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Outcome::Continue);
        assert_eq!(app.screen, Screen::Home);
        assert!(app.error_message.contains("no chatters"));
        assert_eq!(app.session().status(), RoundStatus::Idle);
    }

    #[test]
    fn start_moves_to_board_and_typing_reaches_the_session() {
        let mut app = app_with_chatters(&["abc"]);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Board);
        assert_eq!(app.session().status(), RoundStatus::Active);

        app.handle_key(key(KeyCode::Char('A')));
        assert_eq!(app.session().pending()[0], 'a');
        app.handle_key(key(KeyCode::Char('!')));
        assert_eq!(app.session().pending()[1], ' ');
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.session().pending()[0], ' ');
    }

    #[test]
    fn winning_then_new_game_starts_a_fresh_round() {
        let mut app = app_with_chatters(&["ab"]);
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Char('b')));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session().status(), RoundStatus::Won);

        // Keys other than New Game/quit are absorbed by the modal.
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.session().status(), RoundStatus::Won);

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.session().status(), RoundStatus::Active);
        assert!(app.session().guesses().is_empty());
    }

    #[test]
    fn role_toggles_cycle_back_to_everyone() {
        let mut app = app_with_chatters(&[]);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(
            app.filter,
            PoolFilter::Roles {
                moderators: true,
                subscribers: false
            }
        );
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(
            app.filter,
            PoolFilter::Roles {
                moderators: true,
                subscribers: true
            }
        );
        app.handle_key(key(KeyCode::Char('m')));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.filter, PoolFilter::All);
    }

    #[test]
    fn esc_exits_from_both_screens() {
        let mut app = app_with_chatters(&["abc"]);
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Outcome::Exit);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.handle_key(key(KeyCode::Esc)), Outcome::Exit);
    }

    #[test]
    fn disconnected_feed_is_dropped_quietly() {
        let (tx, rx) = mpsc::channel();
        tx.send(event_for("alice")).unwrap();
        drop(tx);
        let mut app = App::new(
            "c".to_string(),
            Settings::default(),
            PoolFilter::All,
            GameSession::seeded(InputMode::AutoAdvance, 0),
            Some(rx),
        );
        app.drain_chat();
        assert_eq!(app.pool.len(), 1);
        assert!(app.chat_rx.is_none());
        app.drain_chat();
    }

    #[test]
    fn notices_expire_after_their_ttl() {
        let mut app = app_with_chatters(&["alice"]);
        assert_eq!(app.notices.len(), 1);
        app.notices[0].shown_at = Local::now() - ChronoDuration::seconds(CHAT_NOTICE_TTL_SECS + 1);
        app.expire_notices();
        assert!(app.notices.is_empty());
    }
}
