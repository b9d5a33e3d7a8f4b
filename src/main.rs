mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use zenstudy::{
    app_dirs::AppDirs,
    chime::{Chime, Muted, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    desk::Desk,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, StudyEvent, StudyEventSource, Ticker},
    storage::{SqliteStore, Store},
    util::{format_clock, format_studied},
};

/// calm study timer with pomodoro phases and a daily goal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A calm study timer TUI: alternating study and break phases, a daily goal, a task checklist and a brain dump. State survives restarts."
)]
pub struct Cli {
    /// directory holding the study state database and the log file
    #[clap(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// do not ring the terminal bell on phase changes
    #[clap(long)]
    mute: bool,

    /// print the current session summary and exit (no tty required)
    #[clap(long)]
    status: bool,

    /// raise log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Timer,
    Tasks,
    Notes,
    Settings,
    ConfirmReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App<S: Store> {
    pub desk: Desk<S>,
    pub state: AppState,
    pub config: Config,
    pub task_input: String,
    pub selected_task: Option<usize>,
    config_store: Option<FileConfigStore>,
}

impl<S: Store> App<S> {
    pub fn new(desk: Desk<S>, config: Config) -> Self {
        let selected_task = if desk.tasks().is_empty() { None } else { Some(0) };
        Self {
            desk,
            state: AppState::Timer,
            config,
            task_input: String::new(),
            selected_task,
            config_store: None,
        }
    }

    pub fn with_config_store(mut self, store: FileConfigStore) -> Self {
        self.config_store = Some(store);
        self
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Timer => return self.on_timer_key(key),
            AppState::Tasks => self.on_tasks_key(key),
            AppState::Notes => self.on_notes_key(key),
            AppState::Settings => self.on_settings_key(key),
            AppState::ConfirmReset => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.desk.hard_reset();
                    self.task_input.clear();
                    self.selected_task = None;
                }
                self.state = AppState::Timer;
            }
        }
        Flow::Continue
    }

    fn on_timer_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char(' ') => {
                self.desk.start_or_pause();
            }
            KeyCode::Right | KeyCode::Char('n') => self.desk.skip_forward(),
            KeyCode::Left | KeyCode::Char('p') => self.desk.step_back(),
            KeyCode::Char('s') => {
                self.desk.open_settings();
                self.state = AppState::Settings;
            }
            KeyCode::Char('t') => {
                self.set_collapsed(Panel::Tasks, false);
                self.state = AppState::Tasks;
            }
            KeyCode::Char('b') => {
                self.set_collapsed(Panel::Notes, false);
                self.state = AppState::Notes;
            }
            KeyCode::Char('[') => self.set_collapsed(Panel::Tasks, !self.config.tasks_collapsed),
            KeyCode::Char(']') => self.set_collapsed(Panel::Notes, !self.config.notes_collapsed),
            KeyCode::Char('R') => self.state = AppState::ConfirmReset,
            _ => {}
        }
        Flow::Continue
    }

    fn on_tasks_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.state = AppState::Timer,
            KeyCode::Enter => {
                if self.task_input.is_empty() {
                    self.toggle_selected_task();
                } else if self.desk.add_task(&self.task_input).is_some() {
                    self.task_input.clear();
                    self.selected_task = Some(self.desk.tasks().len() - 1);
                }
            }
            KeyCode::Backspace => {
                self.task_input.pop();
            }
            KeyCode::Up => {
                self.selected_task = self.selected_task.map(|i| i.saturating_sub(1));
            }
            KeyCode::Down => {
                let last = self.desk.tasks().len().checked_sub(1);
                self.selected_task = match (self.selected_task, last) {
                    (Some(i), Some(last)) => Some((i + 1).min(last)),
                    (None, Some(_)) => Some(0),
                    (_, None) => None,
                };
            }
            KeyCode::Char(c) => self.task_input.push(c),
            _ => {}
        }
    }

    fn toggle_selected_task(&mut self) {
        let id = self
            .selected_task
            .and_then(|i| self.desk.tasks().get(i))
            .map(|t| t.id.clone());
        if let Some(id) = id {
            self.desk.toggle_task(&id);
        }
    }

    fn on_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.state = AppState::Timer,
            KeyCode::Enter => self.desk.edit_notes(|n| n.newline()),
            KeyCode::Backspace => self.desk.edit_notes(|n| {
                n.backspace();
            }),
            KeyCode::Left => self.desk.edit_notes(|n| n.move_left()),
            KeyCode::Right => self.desk.edit_notes(|n| n.move_right()),
            KeyCode::Home => self.desk.edit_notes(|n| n.move_home()),
            KeyCode::End => self.desk.edit_notes(|n| n.move_end()),
            KeyCode::Char(c) => self.desk.edit_notes(|n| n.insert(c)),
            _ => {}
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.desk.discard_settings();
            self.state = AppState::ConfirmReset;
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.desk.discard_settings();
                self.state = AppState::Timer;
            }
            KeyCode::Enter => {
                self.desk.apply_settings_and_close();
                self.state = AppState::Timer;
            }
            KeyCode::Up | KeyCode::BackTab => self.desk.settings_manager_mut().select_prev(),
            KeyCode::Down | KeyCode::Tab => self.desk.settings_manager_mut().select_next(),
            KeyCode::Backspace => self.desk.settings_manager_mut().backspace(),
            KeyCode::Char(c) => self.desk.settings_manager_mut().type_char(c),
            _ => {}
        }
    }

    fn set_collapsed(&mut self, panel: Panel, collapsed: bool) {
        let flag = match panel {
            Panel::Tasks => &mut self.config.tasks_collapsed,
            Panel::Notes => &mut self.config.notes_collapsed,
        };
        if *flag == collapsed {
            return;
        }
        *flag = collapsed;
        if let Some(store) = &self.config_store {
            if let Err(err) = store.save(&self.config) {
                tracing::warn!(%err, "failed to save config");
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Panel {
    Tasks,
    Notes,
}

/// Plain-text summary printed by `--status`.
pub fn status_report<S: Store>(desk: &Desk<S>) -> String {
    let session = desk.session();
    let tasks = desk.tasks();
    format!(
        "Session {} of {} | {} | {}\nGoal: {:.1}% ({} studied, {} study sessions done)\nTasks: {} open of {}",
        session.session_ordinal(),
        session.goal_sessions(),
        session.status_label(),
        format_clock(session.time_left()),
        session.goal_percent(),
        format_studied(session.total_studied_secs()),
        session.completed_sessions(),
        tasks.remaining(),
        tasks.len(),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    logging::init_logging(&AppDirs::log_path(data_dir), cli.verbose)?;
    let store = SqliteStore::open(AppDirs::db_path(data_dir))?;

    if cli.status {
        let desk = Desk::open(store, Box::new(Muted));
        println!("{}", status_report(&desk));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = config_store.load();
    let chime: Box<dyn Chime> = if cli.mute || !config.chime {
        Box::new(Muted)
    } else {
        Box::new(TerminalBell)
    };
    let mut app = App::new(Desk::open(store, chime), config).with_config_store(config_store);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::seconds());
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: Store, E: StudyEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        // A completion reported by the previous tick lands on this turn.
        app.desk.finish_pending_phase();
        runner.sync(app.desk.is_running());
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            StudyEvent::Tick => {
                app.desk.tick();
            }
            StudyEvent::Resize | StudyEvent::Idle => {}
            StudyEvent::Key(key) => {
                if app.handle_key(key) == Flow::Quit {
                    break;
                }
            }
        }
    }

    runner.disarm();
    tracing::debug!("event loop finished");
    Ok(())
}

fn ui<S: Store>(app: &App<S>, f: &mut Frame) {
    f.render_widget(app, f.area());
}
