pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::SystemTime,
};
use tracing::{info, warn};
use typespeed::{
    config::{Config, DEFAULT_LOG_FILTER},
    input::TypedText,
    logging,
    passages::PassagePool,
    report::SessionReport,
    runtime::{
        CrosstermEventSource, EventSource, Runner, Ticker, TypingEvent, DEFAULT_TICK_RATE_MS,
    },
    session::{SessionError, SessionResult, SessionSignal, TypingSession},
};

pub const NOT_STARTED_MESSAGE: &str =
    "Start typing first (press any key in the input box) to begin test.";

/// typing speed and accuracy tester
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the passage shown on screen. The clock starts on your first key press and stops when you finish or reach the end of the passage; you get your time, words per minute and accuracy."
)]
pub struct Cli {
    /// milliseconds between timer refreshes
    #[clap(long, default_value_t = DEFAULT_TICK_RATE_MS)]
    tick_rate_ms: u64,

    /// do not open the results popup after finishing a run
    #[clap(long)]
    no_summary: bool,

    /// print a JSON report of the last finished run on exit
    #[clap(long)]
    json: bool,

    /// write logs to this file (nothing is logged otherwise)
    #[clap(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// log filter directives, e.g. "debug" or "typespeed=trace"
    #[clap(long, default_value = DEFAULT_LOG_FILTER)]
    log_level: String,
}

impl Cli {
    fn to_config(&self) -> Config {
        Config {
            tick_rate_ms: self.tick_rate_ms,
            show_summary: !self.no_summary,
            json_report: self.json,
            log_file: self.log_file.clone(),
            log_filter: self.log_level.clone(),
        }
    }
}

/// The three buttons of the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Command {
    #[strum(serialize = "New Text")]
    NewText,
    Finish,
    Reset,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::NewText, Command::Finish, Command::Reset];

    pub fn key_hint(&self) -> &'static str {
        match self {
            Command::NewText => "ctrl+n",
            Command::Finish => "enter",
            Command::Reset => "ctrl+r",
        }
    }

    fn from_key(key: &KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => Some(Command::Finish),
            KeyCode::Right => Some(Command::NewText),
            KeyCode::Left => Some(Command::Reset),
            KeyCode::Char('n') if ctrl => Some(Command::NewText),
            KeyCode::Char('r') if ctrl => Some(Command::Reset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Popup {
    Results(SessionResult),
    Info(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub pool: PassagePool,
    pub session: TypingSession,
    pub typed: TypedText,
    /// What the stats labels show; `None` renders zeros
    pub last_result: Option<SessionResult>,
    pub last_report: Option<SessionReport>,
    pub popup: Option<Popup>,
}

impl App {
    pub fn new(config: Config, pool: PassagePool) -> Self {
        let session = pool.new_session(&mut rand::thread_rng());
        Self {
            config,
            pool,
            session,
            typed: TypedText::new(),
            last_result: None,
            last_report: None,
            popup: None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: SystemTime) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        // a popup is modal: the next key only dismisses it
        if self.popup.take().is_some() {
            return Flow::Continue;
        }

        if key.code == KeyCode::Esc {
            return Flow::Quit;
        }

        match Command::from_key(&key) {
            Some(command) => self.run_command(command, now),
            None => self.keystroke(&key, now),
        }

        Flow::Continue
    }

    pub fn run_command(&mut self, command: Command, now: SystemTime) {
        match command {
            Command::NewText => self.new_text(),
            Command::Finish => self.finish(now),
            Command::Reset => self.reset(),
        }
    }

    fn keystroke(&mut self, key: &KeyEvent, now: SystemTime) {
        let was_running = self.session.is_running();
        let visible = self.typed.apply_key(key);

        let signal = self.session.on_keystroke_at(visible, self.typed.as_str(), now);
        if !was_running && signal != SessionSignal::NoOp {
            // fresh run: labels start from zero again
            self.last_result = None;
        }

        if signal == SessionSignal::AutoFinish {
            self.finish(now);
        }
    }

    pub fn finish(&mut self, now: SystemTime) {
        match self.session.finalize_at(self.typed.as_str(), now) {
            Ok(result) => {
                self.last_result = Some(result);
                self.last_report = Some(SessionReport::new(
                    self.session.sample(),
                    self.typed.as_str(),
                    result,
                ));
                if self.config.show_summary {
                    self.popup = Some(Popup::Results(result));
                }
            }
            Err(SessionError::NotStarted) => {
                warn!("finish requested before typing started");
                self.popup = Some(Popup::Info(NOT_STARTED_MESSAGE));
            }
        }
    }

    /// Same passage, empty input, fresh clock
    pub fn reset(&mut self) {
        self.typed.clear();
        self.session.reset();
        self.last_result = None;
    }

    /// New passage and a new session; the typed text is left alone
    pub fn new_text(&mut self) {
        self.session = self.pool.new_session(&mut rand::thread_rng());
        self.last_result = None;
    }

    /// Seconds for the Time label: live while running, else the last result
    pub fn display_elapsed(&self, now: SystemTime) -> f64 {
        if self.session.is_running() {
            self.session.elapsed_secs_at(now)
        } else {
            self.last_result.map_or(0.0, |r| r.elapsed_secs)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.to_config();
    logging::init(&config)?;
    info!(?config, "starting typespeed");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), config.ticker());
    let mut app = App::new(config, PassagePool::default());
    let outcome = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome?;

    if app.config.json_report {
        if let Some(report) = &app.last_report {
            println!("{}", report.to_json()?);
        }
    }

    Ok(())
}

fn run_app<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    loop {
        match runner.step() {
            TypingEvent::Tick => {
                // only the live timer changes between events
                if app.session.is_running() {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
            TypingEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            TypingEvent::Closed => {
                warn!("terminal event source closed");
                break;
            }
            TypingEvent::Key(key) => {
                if app.handle_key(key, SystemTime::now()) == Flow::Quit {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
        }
    }

    info!("quitting typespeed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ratatui::backend::TestBackend;
    use std::time::Duration;
    use typespeed::runtime::{ChannelEventSource, FixedTicker};
    use typespeed::session::SessionState;

    fn at(secs: f64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs_f64(1_700_000_000.0 + secs)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with(sample: &str) -> App {
        App::new(Config::default(), PassagePool::new([sample]).unwrap())
    }

    fn type_str(app: &mut App, s: &str, now: SystemTime) {
        for c in s.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(c)), now), Flow::Continue);
        }
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typespeed"]);

        assert_eq!(cli.tick_rate_ms, 100);
        assert!(!cli.no_summary);
        assert!(!cli.json);
        assert_eq!(cli.log_file, None);
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.to_config(), Config::default());
    }

    #[test]
    fn test_cli_flags_to_config() {
        let cli = Cli::parse_from([
            "typespeed",
            "--tick-rate-ms",
            "250",
            "--no-summary",
            "--json",
            "--log-file",
            "/tmp/typespeed.log",
            "--log-level",
            "debug",
        ]);
        let cfg = cli.to_config();

        assert_eq!(cfg.tick_rate_ms, 250);
        assert!(!cfg.show_summary);
        assert!(cfg.json_report);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/typespeed.log")));
        assert_eq!(cfg.log_filter, "debug");
    }

    #[test]
    fn test_command_labels() {
        let labels: Vec<String> = Command::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(labels, vec!["New Text", "Finish", "Reset"]);
    }

    #[test]
    fn test_command_from_key() {
        assert_eq!(Command::from_key(&key(KeyCode::Enter)), Some(Command::Finish));
        assert_eq!(Command::from_key(&ctrl('n')), Some(Command::NewText));
        assert_eq!(Command::from_key(&ctrl('r')), Some(Command::Reset));
        assert_eq!(Command::from_key(&key(KeyCode::Right)), Some(Command::NewText));
        assert_eq!(Command::from_key(&key(KeyCode::Left)), Some(Command::Reset));
        assert_eq!(Command::from_key(&key(KeyCode::Char('n'))), None);
    }

    #[test]
    fn test_app_starts_idle() {
        let app = app_with("cat");

        assert_eq!(app.session.sample(), "cat");
        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(app.typed.is_empty());
        assert!(app.popup.is_none());
        assert_eq!(app.display_elapsed(at(10.0)), 0.0);
    }

    #[test]
    fn test_typing_whole_sample_auto_finishes() {
        let mut app = app_with("cat");

        app.handle_key(key(KeyCode::Char('c')), at(0.0));
        app.handle_key(key(KeyCode::Char('a')), at(3.0));
        app.handle_key(key(KeyCode::Char('t')), at(6.0));

        assert!(app.session.is_finalized());
        let result = app.last_result.unwrap();
        assert_eq!(result.correct_chars, 3);
        assert_abs_diff_eq!(result.wpm, 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.accuracy, 100.0, epsilon = 1e-9);
        assert_eq!(app.popup, Some(Popup::Results(result)));
        assert!(app.last_report.is_some());
    }

    #[test]
    fn test_mistyped_run() {
        let mut app = app_with("cat");

        app.handle_key(key(KeyCode::Char('c')), at(0.0));
        app.handle_key(key(KeyCode::Char('x')), at(1.0));
        app.handle_key(key(KeyCode::Char('t')), at(3.0));

        let result = app.last_result.unwrap();
        assert_eq!(result.correct_chars, 2);
        assert_abs_diff_eq!(result.wpm, 8.0, epsilon = 1e-6);
        assert_eq!(format!("{:.2}", result.accuracy), "66.67");
    }

    #[test]
    fn test_finish_before_typing_shows_info() {
        let mut app = app_with("cat");

        app.handle_key(key(KeyCode::Enter), at(1.0));

        assert_eq!(app.popup, Some(Popup::Info(NOT_STARTED_MESSAGE)));
        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(app.last_result.is_none());

        // dismiss, then typing still works
        app.handle_key(key(KeyCode::Char('z')), at(2.0));
        assert!(app.popup.is_none());
        assert!(app.typed.is_empty());

        app.handle_key(key(KeyCode::Char('c')), at(3.0));
        assert!(app.session.is_running());
    }

    #[test]
    fn test_manual_finish() {
        let mut app = app_with("hello");
        type_str(&mut app, "he", at(0.0));

        app.handle_key(key(KeyCode::Enter), at(12.0));

        let result = app.last_result.unwrap();
        assert_abs_diff_eq!(result.elapsed_secs, 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.wpm, 2.0, epsilon = 1e-6);
        assert!(matches!(app.popup, Some(Popup::Results(_))));
    }

    #[test]
    fn test_no_summary_skips_popup() {
        let mut app = App::new(
            Config {
                show_summary: false,
                ..Config::default()
            },
            PassagePool::new(["ab"]).unwrap(),
        );

        type_str(&mut app, "ab", at(0.0));

        assert!(app.last_result.is_some());
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_modifier_key_does_not_start() {
        let mut app = app_with("cat");

        app.handle_key(key(KeyCode::Tab), at(0.0));
        app.handle_key(key(KeyCode::Backspace), at(0.0));

        assert_eq!(app.session.state(), SessionState::Idle);
    }

    #[test]
    fn test_reset_clears_input_and_keeps_sample() {
        let mut app = app_with("cat");
        type_str(&mut app, "ca", at(0.0));
        app.handle_key(key(KeyCode::Enter), at(2.0));
        app.handle_key(key(KeyCode::Esc), at(2.0)); // dismiss results

        app.handle_key(ctrl('r'), at(3.0));

        assert!(app.typed.is_empty());
        assert_eq!(app.session.sample(), "cat");
        assert_eq!(app.session.state(), SessionState::Idle);
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_new_text_replaces_session_and_keeps_input() {
        let mut app = app_with("cat");
        type_str(&mut app, "ca", at(0.0));

        app.handle_key(key(KeyCode::Right), at(1.0));

        assert_eq!(app.session.sample(), "cat");
        assert_eq!(app.session.state(), SessionState::Idle);
        assert_eq!(app.typed.as_str(), "ca");
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_typing_after_finish_starts_new_run() {
        let mut app = app_with("cat");
        type_str(&mut app, "c", at(0.0));
        app.handle_key(key(KeyCode::Enter), at(1.0));
        app.handle_key(key(KeyCode::Esc), at(1.0));
        assert!(app.last_result.is_some());

        app.handle_key(key(KeyCode::Char('a')), at(5.0));

        assert!(app.session.is_running());
        assert_eq!(app.session.started_at(), Some(at(5.0)));
        assert!(app.last_result.is_none());
    }

    #[test]
    fn test_display_elapsed_live_then_frozen() {
        let mut app = app_with("hello");
        type_str(&mut app, "h", at(0.0));

        assert_abs_diff_eq!(app.display_elapsed(at(2.5)), 2.5, epsilon = 1e-6);

        app.handle_key(key(KeyCode::Enter), at(4.0));
        assert_abs_diff_eq!(app.display_elapsed(at(60.0)), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app_with("cat");
        assert_eq!(app.handle_key(key(KeyCode::Esc), at(0.0)), Flow::Quit);
        assert_eq!(app.handle_key(ctrl('c'), at(0.0)), Flow::Quit);
    }

    #[test]
    fn test_esc_with_popup_only_dismisses() {
        let mut app = app_with("cat");
        app.handle_key(key(KeyCode::Enter), at(0.0));

        assert_eq!(app.handle_key(key(KeyCode::Esc), at(0.0)), Flow::Continue);
        assert!(app.popup.is_none());
    }

    #[test]
    fn test_run_app_stops_when_events_close() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = app_with("hello");
        let (tx, es) = ChannelEventSource::pair();
        let runner = Runner::new(es, FixedTicker::from_millis(100));

        tx.send(TypingEvent::Key(key(KeyCode::Char('h')))).unwrap();
        drop(tx);

        let started = std::time::Instant::now();
        run_app(&mut terminal, &mut app, &runner).unwrap();

        // returns right away instead of ticking forever
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(app.session.is_running());
        assert_eq!(app.typed.as_str(), "h");
    }

    #[test]
    fn test_run_app_until_quit() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut app = app_with("hi");
        let (tx, es) = ChannelEventSource::pair();
        let runner = Runner::new(es, FixedTicker::from_millis(1));

        for c in ['h', 'i'] {
            tx.send(TypingEvent::Key(key(KeyCode::Char(c)))).unwrap();
        }
        tx.send(TypingEvent::Resize).unwrap();
        tx.send(TypingEvent::Key(key(KeyCode::Esc))).unwrap(); // dismiss results
        tx.send(TypingEvent::Key(key(KeyCode::Esc))).unwrap(); // quit

        run_app(&mut terminal, &mut app, &runner).unwrap();

        assert!(app.session.is_finalized());
        assert_eq!(app.last_result.unwrap().accuracy, 100.0);
    }
}
