use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout};
use ratatui::{DefaultTerminal, Frame};
use tracing::{info, warn};

use crate::config::{Config, Theme};
use crate::error::{Error, Rejection, Result};
use crate::git::{CancelToken, RemoteInfo};
use crate::navigator::{BlameSource, Navigator};
use crate::search::{Direction, Search};
use crate::views::{render_status_bar, BlameView, Prompt, Status};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input(Prompt),
}

/// Resolves the remote used for permalinks. Called at most once per session.
pub type RemoteLookup = Box<dyn FnMut() -> Result<RemoteInfo>>;

pub struct App {
    pub navigator: Navigator,
    pub search: Search,
    pub mode: Mode,
    pub input_buffer: String,
    pub status: Status,
    pub should_quit: bool,

    config: Config,
    theme: Theme,
    view: BlameView,
    source: Box<dyn BlameSource>,
    remote_lookup: RemoteLookup,
    remote: Option<RemoteInfo>,
    cancel: CancelToken,
}

impl App {
    pub fn new(
        navigator: Navigator,
        source: Box<dyn BlameSource>,
        remote_lookup: RemoteLookup,
        config: Config,
        cancel: CancelToken,
    ) -> Self {
        let theme = config.current_theme();
        let mut app = Self {
            navigator,
            search: Search::new(),
            mode: Mode::Normal,
            input_buffer: String::new(),
            status: Status::Info(String::new()),
            should_quit: false,
            config,
            theme,
            view: BlameView::new(),
            source,
            remote_lookup,
            remote: None,
            cancel,
        };
        app.show_selection();
        app
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        info!(path = self.navigator.path(), "session started");
        loop {
            if self.cancel.is_cancelled() {
                info!("cancelled");
                break;
            }

            terminal.draw(|f| self.draw(f))?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }
        info!("session ended");
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame) {
        let areas = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());

        let now = chrono::Utc::now().timestamp();
        self.view.render(
            f,
            areas[0],
            &self.navigator,
            &self.theme,
            self.search.term(),
            self.config.summary_width,
            now,
        );

        let input = match self.mode {
            Mode::Normal => None,
            Mode::Input(prompt) => Some((prompt, self.input_buffer.as_str())),
        };
        render_status_bar(f, areas[1], &self.theme, input, &self.status);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.cancel.cancel();
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Input(prompt) => self.handle_input_key(key, prompt),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let page = self.config.page_size as isize;
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_by(-1),
            KeyCode::Char('J') | KeyCode::PageDown => self.move_by(page),
            KeyCode::Char('K') | KeyCode::PageUp => self.move_by(-page),
            KeyCode::Char('g') | KeyCode::Home => {
                self.navigator.select_first();
                self.show_selection();
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.navigator.select_last();
                self.show_selection();
            }
            KeyCode::Char('h') => {
                let result = self.navigator.descend(self.source.as_mut());
                self.finish_navigation(result);
            }
            KeyCode::Char('l') => {
                let result = self.navigator.ascend(self.source.as_mut());
                self.finish_navigation(result);
            }
            KeyCode::Char('/') => self.enter_input(Prompt::Search),
            KeyCode::Char(':') => self.enter_input(Prompt::Command),
            KeyCode::Char('n') => self.repeat_search(Direction::Forward),
            KeyCode::Char('N') => self.repeat_search(Direction::Backward),
            _ => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, prompt: Prompt) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.input_buffer);
                self.mode = Mode::Normal;
                match prompt {
                    Prompt::Search => self.submit_search(&input),
                    Prompt::Command => match self.execute_command(&input) {
                        Ok(Some(message)) => self.status = Status::Info(message),
                        Ok(None) => {}
                        Err(e) => self.report(e),
                    },
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn enter_input(&mut self, prompt: Prompt) {
        self.input_buffer.clear();
        self.mode = Mode::Input(prompt);
    }

    fn move_by(&mut self, delta: isize) {
        self.navigator.move_by(delta);
        self.show_selection();
    }

    fn finish_navigation(&mut self, result: Result<()>) {
        match result {
            Ok(()) => self.show_selection(),
            Err(e) => self.report(e),
        }
    }

    fn submit_search(&mut self, term: &str) {
        let result = self.search.search(
            term,
            Direction::Forward,
            self.navigator.blame().lines(),
            self.navigator.cursor(),
        );
        self.finish_search(result);
    }

    fn repeat_search(&mut self, direction: Direction) {
        let result = self.search.repeat(
            direction,
            self.navigator.blame().lines(),
            self.navigator.cursor(),
        );
        self.finish_search(result);
    }

    fn finish_search(&mut self, result: Option<Result<usize>>) {
        match result {
            None => {}
            Some(Ok(index)) => {
                self.navigator.select(index);
                self.show_selection();
            }
            Some(Err(e)) => self.report(e),
        }
    }

    /// Runs a `:` command. `Ok(Some(_))` carries text for the status bar.
    fn execute_command(&mut self, input: &str) -> Result<Option<String>> {
        let command = input.trim();
        match command {
            "" => Ok(None),
            "q" | "quit" => {
                self.should_quit = true;
                Ok(None)
            }
            "ll" | "line-link" => {
                let (commit_id, path) = self.committed_selection()?;
                let line = self.navigator.cursor() + 1;
                let link = self.remote()?.line_link(&commit_id, &path, line)?;
                info!(%link, "built line link");
                Ok(Some(link))
            }
            "cl" | "commit-link" => {
                let (commit_id, _) = self.committed_selection()?;
                let link = self.remote()?.commit_link(&commit_id)?;
                info!(%link, "built commit link");
                Ok(Some(link))
            }
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }

    /// Commit id and path of the selected line, if it is committed.
    fn committed_selection(&self) -> Result<(String, String)> {
        let chunk = self
            .navigator
            .selected_chunk()
            .ok_or(Error::NavigationRejected(Rejection::NoSelection))?;
        if !chunk.is_committed() {
            return Err(Error::NotCommitted);
        }
        Ok((chunk.commit_id.clone(), chunk.filename.clone()))
    }

    fn remote(&mut self) -> Result<&RemoteInfo> {
        if self.remote.is_none() {
            let info = (self.remote_lookup)()?;
            info!(host = %info.host, repo = %info.repo, "resolved remote");
            self.remote = Some(info);
        }
        self.remote
            .as_ref()
            .ok_or_else(|| Error::UnsupportedRemote(self.config.default_remote.clone()))
    }

    fn show_selection(&mut self) {
        self.status = match self.navigator.selected_chunk() {
            None => Status::Info(String::new()),
            Some(chunk) if !chunk.is_committed() => Status::Info("(not committed)".to_string()),
            Some(chunk) => {
                let mut fields = vec![("Date", chunk.date()), ("Author", chunk.author.clone())];
                if chunk.summary.chars().count() > self.config.summary_width {
                    fields.push(("Message", chunk.summary.clone()));
                }
                Status::Details(fields)
            }
        };
    }

    fn report(&mut self, error: Error) {
        if !error.is_recoverable() {
            self.should_quit = true;
            return;
        }
        warn!(error = %error, "action failed");
        self.status = Status::Error(error.to_string());
    }
}
