//! Application state and the event loop.

mod constants;
mod tasks;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use ratatui::{DefaultTerminal, Frame};
use terminus_core::{FileSystem, LocalFs};
use terminus_modal::{
    Action, Followup, KeyInput, KeyTable, ModalState, Mutation, Platform, UiAction,
};
use terminus_ops::{OperationEngine, OperationExecutor};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::event::key_input;
use crate::settings::UserSettings;
use crate::theme::Theme;
use crate::ui::{render_app, RenderContext};

use self::constants::{EVENT_CHANNEL_SIZE, TICK_INTERVAL_MS};
pub use self::tasks::AppEvent;
use self::tasks::{spawn_job, spawn_listing, spawn_preview, spawn_search, ListingKind};

/// Application result type.
pub type AppResult<T> = color_eyre::Result<T>;

/// A file shown in the preview pane.
#[derive(Debug, Clone)]
pub struct Preview {
    pub path: PathBuf,
    pub text: Result<String, String>,
}

/// The terminal front-end: owns the mode machine and runs its effects.
pub struct App {
    state: ModalState,
    table: KeyTable,
    settings: UserSettings,
    fs: Arc<dyn FileSystem>,
    executor: OperationExecutor,
    platform: Platform,
    theme: Theme,
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
    search_task: Option<JoinHandle<()>>,
    preview: Option<Preview>,
    quit: bool,
    needs_redraw: bool,
}

impl App {
    /// Create an app for `path` on the local filesystem.
    pub fn new(path: PathBuf, settings: UserSettings, table: KeyTable) -> Self {
        Self::with_filesystem(path, settings, table, Arc::new(LocalFs::new()))
    }

    /// Create an app over any filesystem.
    pub fn with_filesystem(
        path: PathBuf,
        settings: UserSettings,
        table: KeyTable,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let state = ModalState::new(path)
            .with_caret_policy(settings.rename_caret)
            .with_home(fs.home_dir());
        let executor = OperationExecutor::new(OperationEngine::new(fs.clone()));
        let theme = Theme::from_variant(settings.theme);

        Self {
            state,
            table,
            settings,
            fs,
            executor,
            platform: Platform::current(),
            theme,
            tx,
            rx,
            search_task: None,
            preview: None,
            quit: false,
            needs_redraw: true,
        }
    }

    /// The mode machine's state.
    pub fn state(&self) -> &ModalState {
        &self.state
    }

    /// Whether a quit was requested.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Run the application with async event loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        info!(path = %self.state.cwd().display(), "starting");
        self.list(self.state.cwd().to_path_buf(), None, ListingKind::Navigate);

        let period = Duration::from_millis(TICK_INTERVAL_MS);
        let mut interval = tokio::time::interval(period);
        let mut events = EventStream::new();

        while !self.quit {
            if self.needs_redraw {
                terminal.draw(|frame| self.render(frame))?;
                self.needs_redraw = false;
            }

            tokio::select! {
                biased;

                Some(Ok(event)) = events.next() => {
                    match event {
                        Event::Key(key_event) => {
                            if let Some(input) = key_input(key_event) {
                                self.handle_key(&input);
                            }
                        }
                        Event::Resize(..) => self.needs_redraw = true,
                        _ => {}
                    }
                }

                Some(event) = self.rx.recv() => {
                    self.handle_event(event);
                }

                _ = interval.tick() => {}
            }
        }

        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        info!("exiting");
        Ok(())
    }

    /// Route one key through the mode machine and start its effects.
    pub fn handle_key(&mut self, input: &KeyInput) {
        let action = self.state.handle_key(&self.table, input);
        self.perform(action);
        self.needs_redraw = true;
    }

    /// Fold a background result into the state.
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Modal(event) => {
                let cwd = self.state.cwd().to_path_buf();
                let followup = self.state.apply(event);
                if self.state.cwd() != cwd {
                    self.preview = None;
                }
                if let Followup::Refresh(dir) = followup {
                    self.list(dir, None, ListingKind::Refresh);
                }
            }
            AppEvent::Preview { path, text } => {
                if let Err(e) = &text {
                    self.state.set_error(format!("{}: {e}", path.display()));
                }
                self.preview = Some(Preview { path, text });
            }
        }
        self.needs_redraw = true;
    }

    /// Wait for the next background result and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::Ui(ui) => self.perform_ui(ui),
            Action::Mutation(mutation) => self.perform_mutation(mutation),
            Action::Unrecognized => {}
        }
    }

    fn perform_ui(&mut self, action: UiAction) {
        match action {
            UiAction::Navigate { dir, focus } => {
                self.cancel_search();
                self.list(dir, focus, ListingKind::Navigate);
            }
            UiAction::OpenFile { path } => {
                spawn_preview(self.tx.clone(), self.fs.clone(), path);
            }
            UiAction::SearchRequested {
                root,
                query,
                generation,
            } => self.search(root, query, generation),
            UiAction::ModeChanged { from, to } => {
                debug!(%from, %to, "mode changed");
                if from == terminus_core::Mode::Search {
                    self.cancel_search();
                }
            }
            UiAction::Quit => self.quit = true,
            _ => {}
        }
    }

    fn perform_mutation(&mut self, mutation: Mutation) {
        if let Some(job) = mutation.into_job(self.settings.paste_conflict) {
            debug!(?job, "starting job");
            spawn_job(self.tx.clone(), &self.executor, job);
        }
    }

    fn list(&self, dir: PathBuf, focus: Option<PathBuf>, kind: ListingKind) {
        spawn_listing(
            self.tx.clone(),
            self.fs.clone(),
            self.settings.listing.clone(),
            dir,
            focus,
            kind,
        );
    }

    fn search(&mut self, root: PathBuf, query: String, generation: u64) {
        self.cancel_search();
        if query.is_empty() {
            return;
        }
        self.search_task = Some(spawn_search(
            self.tx.clone(),
            root,
            query,
            generation,
            self.settings.search.clone(),
        ));
    }

    fn cancel_search(&mut self) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
    }

    fn render(&self, frame: &mut Frame) {
        let ctx = RenderContext {
            state: &self.state,
            table: &self.table,
            theme: &self.theme,
            platform: self.platform,
            preview: self.preview.as_ref(),
        };
        render_app(&ctx, frame.area(), frame.buffer_mut());
    }

    /// The current directory.
    pub fn cwd(&self) -> &Path {
        self.state.cwd()
    }
}
