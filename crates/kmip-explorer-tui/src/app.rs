//! Application core: event loop, key dispatch, modal stack and rendering.
//!
//! The explorer controller owns every piece of domain state. The app only
//! keeps view state (focus, overlays, toast) and translates keys into
//! [`Action`]s, which are drained and processed one at a time between
//! background updates.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, TableState},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use kmip_explorer_core::{
    Category, CoreError, DirectoryEvent, ExplorerConfig, ExplorerController, ExplorerEvent,
    ExplorerState, KmipClient, Operation, Update,
};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::forms::field::TextField;
use crate::forms::{CreateKeyForm, RegisterForm, RekeyForm, RevokeForm};
use crate::theme;
use crate::tui::Tui;
use crate::update_check;
use crate::widgets::{
    self, attributes::render_attributes, banner, banner::Banner, confirm::ConfirmDialog,
    key_material::KeyMaterialView, object_table::render_object_table,
    type_tabs::render_type_tabs,
};

/// Which part of the main screen receives keys when no modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Table,
    Search,
    Attributes,
}

/// Full-screen modal above the table.
enum Overlay {
    Form(Box<dyn Component>),
    Material(KeyMaterialView),
}

/// What woke the loop up.
enum Wake {
    Event(Option<Event>),
    Update(Update),
}

/// Settings for the terminal loop.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub initial_category: Category,
    pub tick_rate: Duration,
    pub render_rate: Duration,
    pub check_update: bool,
}

pub struct App {
    controller: ExplorerController,
    update_rx: mpsc::UnboundedReceiver<Update>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    running: bool,
    focus: Focus,
    search: TextField,
    search_open: bool,
    attributes_scroll: u16,
    overlay: Option<Overlay>,
    /// Yes/No prompt, above every overlay but the error modal.
    confirm: Option<ConfirmDialog>,
    banner: Banner,
    notification: Option<Notification>,
    table_state: TableState,
    /// Rows visible in the table at the last render.
    page_size: usize,
    /// Opened on first copy.
    clipboard: Option<arboard::Clipboard>,
    options: AppOptions,
}

impl App {
    pub fn new(client: Arc<dyn KmipClient>, options: AppOptions) -> Self {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let config = ExplorerConfig {
            initial_category: options.initial_category,
        };
        let controller = ExplorerController::new(client, &config, update_tx);
        let banner = Banner::new(&controller.server_info(), env!("CARGO_PKG_VERSION"));

        Self {
            controller,
            update_rx,
            action_tx,
            action_rx,
            running: true,
            focus: Focus::Table,
            search: TextField::line(),
            search_open: false,
            attributes_scroll: 0,
            overlay: None,
            confirm: None,
            banner,
            notification: None,
            table_state: TableState::default(),
            page_size: 1,
            clipboard: None,
            options,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(self.options.tick_rate, self.options.render_rate);
        self.controller.refresh(true);
        if self.options.check_update {
            self.spawn_update_check();
        }

        info!(
            server = %self.controller.server_info().address,
            filter = self.controller.filter().label(),
            "TUI event loop started"
        );

        while self.running {
            let wake = tokio::select! {
                event = events.next() => Wake::Event(event),
                Some(update) = self.update_rx.recv() => Wake::Update(update),
            };

            match wake {
                Wake::Event(None) => break,
                Wake::Event(Some(event)) => self.handle_event(event)?,
                Wake::Update(update) => self.controller.apply(update),
            }
            self.drain_explorer_events();

            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action);
                self.drain_explorer_events();
                if render {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    fn spawn_update_check(&self) {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Some(tag) = update_check::newer_release(env!("CARGO_PKG_VERSION")).await {
                let _ = tx.send(Action::UpdateAvailable(tag));
            }
        });
    }

    fn dispatch(&self, action: Action) {
        if let Err(e) = self.action_tx.send(action) {
            warn!(action = ?e.0, "action queue closed");
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let action = match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Paste(text) => self.handle_paste(&text)?,
            Event::Resize(w, h) => Some(Action::Resize(w, h)),
            Event::Tick => Some(Action::Tick),
            Event::Render => Some(Action::Render),
        };
        if let Some(action) = action {
            self.dispatch(action);
        }
        Ok(())
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if self.controller.error().is_some() || self.confirm.is_some() {
            return Ok(None);
        }
        if let Some(Overlay::Form(form)) = &mut self.overlay {
            return form.handle_paste(text);
        }
        if self.focus == Focus::Search && self.search.paste(text) {
            return Ok(Some(Action::SearchInput(self.search.value().to_owned())));
        }
        Ok(None)
    }

    /// Map a key to an action. Modals capture every key, topmost first.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.controller.error().is_some() {
            return Ok(match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                    Some(Action::AcknowledgeError)
                }
                _ => None,
            });
        }

        if let Some(confirm) = &mut self.confirm {
            return confirm.handle_key_event(key);
        }

        match &mut self.overlay {
            Some(Overlay::Form(form)) => return form.handle_key_event(key),
            Some(Overlay::Material(view)) => return view.handle_key_event(key),
            None => {}
        }

        match self.focus {
            Focus::Search => Ok(self.handle_search_key(key)),
            Focus::Attributes => Ok(Self::handle_attributes_key(key)),
            Focus::Table => Ok(Self::handle_table_key(key)),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CloseSearch),
            KeyCode::Enter => Some(Action::SearchSubmit),
            _ if self.search.edit(key) => {
                Some(Action::SearchInput(self.search.value().to_owned()))
            }
            _ => None,
        }
    }

    fn handle_attributes_key(key: KeyEvent) -> Option<Action> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
                Some(Action::Quit)
            }
            (_, KeyCode::Esc) => Some(Action::CloseAttributes),
            (_, KeyCode::Char('j') | KeyCode::Down) => Some(Action::ScrollAttributes(1)),
            (_, KeyCode::Char('k') | KeyCode::Up) => Some(Action::ScrollAttributes(-1)),
            (_, KeyCode::PageDown) => Some(Action::ScrollAttributes(10)),
            (_, KeyCode::PageUp) => Some(Action::ScrollAttributes(-10)),
            _ => None,
        }
    }

    fn handle_table_key(key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Some(Action::Quit),
            KeyCode::Char('d') if ctrl => Some(Action::Destroy),
            KeyCode::Char('t') if ctrl => Some(Action::OpenForm(Operation::Rekey)),
            KeyCode::Char('r') if ctrl => Some(Action::Refresh),
            _ if ctrl => None,

            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Tab => Some(Action::NextFilter),
            KeyCode::BackTab => Some(Action::PrevFilter),

            KeyCode::Char('C') => Some(Action::OpenForm(Operation::Create)),
            KeyCode::Char('R') => Some(Action::OpenForm(Operation::Register)),
            KeyCode::Char('a') => Some(Action::Activate),
            KeyCode::Char('r') => Some(Action::OpenForm(Operation::Revoke)),
            KeyCode::Char(' ') => Some(Action::GetContent),

            KeyCode::Enter => Some(Action::BrowseAttributes),
            KeyCode::Char('/') => Some(Action::OpenSearch),
            KeyCode::Esc => Some(Action::ClearSelection),

            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::ScrollToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Action::ScrollToBottom),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            _ => None,
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}
            Action::Tick => {
                if self.notification.as_ref().is_some_and(Notification::is_expired) {
                    self.notification = None;
                }
            }

            Action::NextFilter => self.controller.next_filter(),
            Action::PrevFilter => self.controller.prev_filter(),
            Action::Refresh => self.controller.refresh(false),

            Action::ScrollDown => self.controller.directory_mut().select_next(),
            Action::ScrollUp => self.controller.directory_mut().select_prev(),
            Action::ScrollToTop => self.controller.directory_mut().select_first(),
            Action::ScrollToBottom => self.controller.directory_mut().select_last(),
            Action::PageDown => {
                let page = self.page_size;
                self.controller.directory_mut().page_down(page);
            }
            Action::PageUp => {
                let page = self.page_size;
                self.controller.directory_mut().page_up(page);
            }
            Action::ClearSelection => self.controller.directory_mut().select(0),

            Action::OpenSearch => {
                self.search_open = true;
                self.focus = Focus::Search;
            }
            Action::CloseSearch => {
                self.search = TextField::line();
                self.search_open = false;
                self.focus = Focus::Table;
                self.controller.directory_mut().set_search("");
            }
            Action::SearchInput(query) => self.controller.directory_mut().set_search(&query),
            Action::SearchSubmit => {
                self.focus = Focus::Table;
                if self.search.value().is_empty() {
                    self.search_open = false;
                }
            }

            Action::BrowseAttributes => {
                if self.controller.directory().selection().is_some() {
                    self.focus = Focus::Attributes;
                    self.attributes_scroll = 0;
                }
            }
            Action::CloseAttributes => self.focus = Focus::Table,
            Action::ScrollAttributes(delta) => {
                self.attributes_scroll = self.attributes_scroll.saturating_add_signed(delta);
            }

            Action::OpenForm(operation) => self.open_form(operation),
            Action::Activate => {
                let result = self.controller.activate_selected();
                self.report(result);
            }
            Action::Destroy => {
                let result = self.controller.destroy_selected();
                self.report(result);
                self.open_prompt();
            }
            Action::GetContent => {
                let result = self.controller.fetch_material();
                self.report(result);
            }
            Action::FormDone(effect) => {
                self.overlay = None;
                let result = self.controller.submit(effect);
                self.report(result);
                self.open_prompt();
            }
            Action::FormCancelled => {
                self.overlay = None;
                self.controller.cancel();
            }

            Action::ConfirmAnswer(accepted) => {
                self.confirm = None;
                self.controller.confirm(accepted);
            }
            Action::AcknowledgeError => {
                self.controller.acknowledge_error();
                self.focus = Focus::Table;
            }
            Action::CloseMaterial => self.overlay = None,
            Action::CopyToClipboard(text) => self.copy_to_clipboard(text),

            Action::UpdateAvailable(tag) => {
                info!(%tag, "newer release available");
                self.banner.set_latest_release(tag);
            }
        }
    }

    fn open_form(&mut self, operation: Operation) {
        let form: Box<dyn Component> = match operation {
            Operation::Create => Box::new(CreateKeyForm::new()),
            Operation::Register => Box::new(RegisterForm::new()),
            Operation::Revoke => Box::new(RevokeForm::new()),
            Operation::Rekey => Box::new(RekeyForm::new()),
            Operation::Activate | Operation::Destroy => {
                warn!(%operation, "operation has no parameter form");
                return;
            }
        };
        match self.controller.begin(operation) {
            Ok(()) => {
                debug!(form = form.id(), "opening form");
                self.overlay = Some(Overlay::Form(form));
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// Show the controller's pending yes/no question, if any.
    fn open_prompt(&mut self) {
        if let Some(prompt) = self.controller.prompt() {
            self.confirm = Some(ConfirmDialog::new(prompt.clone()));
        }
    }

    /// Errors rejected before any background work start are shown as a toast.
    fn report(&mut self, result: Result<(), CoreError>) {
        match result {
            Ok(()) => {}
            Err(CoreError::NoSelection) => self.notify(Notification::info("No object selected")),
            Err(e) => {
                warn!(error = %e, "action rejected");
                self.notify(Notification::error(e.to_string()));
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: String) {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!(error = %e, "clipboard unavailable");
                    self.notify(Notification::error(format!("Clipboard unavailable: {e}")));
                    return;
                }
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(text) {
            Ok(()) => self.notify(Notification::success("Copied to clipboard")),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                self.notify(Notification::error(format!("Copy failed: {e}")));
            }
        }
    }

    // ── Explorer notifications ───────────────────────────────────────

    fn drain_explorer_events(&mut self) {
        for event in self.controller.take_events() {
            match event {
                ExplorerEvent::Directory(DirectoryEvent::SelectionChanged { row }) => {
                    self.attributes_scroll = 0;
                    if row == 0 && self.focus == Focus::Attributes {
                        self.focus = Focus::Table;
                    }
                }
                ExplorerEvent::Directory(DirectoryEvent::ContentUpdated) => {}
                ExplorerEvent::FilterChanged(change) => {
                    debug!(category = change.label, "filter changed");
                    if self.focus == Focus::Attributes {
                        self.focus = Focus::Table;
                    }
                }
                ExplorerEvent::Material { id, object } => {
                    // The viewer replaces any open form, which counts as cancelling it.
                    if matches!(self.overlay, Some(Overlay::Form(_))) {
                        debug!(%id, "content arrived over an open form");
                        self.controller.cancel();
                    }
                    self.overlay = Some(Overlay::Material(KeyMaterialView::new(id, object)));
                }
                ExplorerEvent::Error(message) => {
                    debug!(%message, "error modal shown");
                }
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [banner_area, tabs_area, search_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(banner::HEIGHT),
            Constraint::Length(1),
            Constraint::Length(u16::from(self.search_open)),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.banner.render(frame, banner_area);
        frame.render_widget(
            Paragraph::new(render_type_tabs(self.controller.filter().current())),
            tabs_area,
        );
        if self.search_open {
            self.render_search(frame, search_area);
        }
        self.render_main(frame, main_area);
        self.render_status(frame, status_area);

        // Overlays, last is topmost.
        match &self.overlay {
            Some(Overlay::Form(form)) => form.render(frame, area),
            Some(Overlay::Material(view)) => view.render(frame, area),
            None => {}
        }
        if let Some(confirm) = &self.confirm {
            confirm.render(frame, area);
        }
        if let Some(message) = self.controller.error() {
            widgets::render_error(frame, area, message);
        }
        if let Some(notification) = &self.notification {
            render_notification(frame, area, notification);
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Search;
        let prefix = " / ";
        let line = Line::from(vec![
            Span::styled(prefix, Style::default().fg(theme::SKY_BLUE)),
            Span::styled(self.search.value(), Style::default().fg(theme::NEON_CYAN)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        if focused {
            let offset = u16::try_from(prefix.len() + self.search.cursor()).unwrap_or(u16::MAX);
            frame.set_cursor_position((area.x.saturating_add(offset), area.y));
        }
    }

    fn render_main(&mut self, frame: &mut Frame, area: Rect) {
        let label = self.controller.filter().label();
        let table_focused = self.focus != Focus::Attributes;
        let Some(selection) = self.controller.directory().selection() else {
            self.page_size = render_object_table(
                frame,
                area,
                self.controller.directory(),
                label,
                table_focused,
                &mut self.table_state,
            );
            return;
        };

        let browsing = self.focus == Focus::Attributes;
        let [table_area, attributes_area] = Layout::vertical([
            Constraint::Fill(2),
            Constraint::Fill(if browsing { 6 } else { 1 }),
        ])
        .areas(area);

        render_attributes(
            frame,
            attributes_area,
            selection,
            browsing,
            self.attributes_scroll,
        );
        self.page_size = render_object_table(
            frame,
            table_area,
            self.controller.directory(),
            label,
            table_focused,
            &mut self.table_state,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let indicator = match self.controller.state() {
            ExplorerState::Idle => Span::styled("● ready", Style::default().fg(theme::SUCCESS_GREEN)),
            ExplorerState::Loading => {
                Span::styled("◐ loading", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            ExplorerState::ActionPending => {
                Span::styled("◐ working", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            ExplorerState::ErrorShown => {
                Span::styled("✗ error", Style::default().fg(theme::ERROR_RED))
            }
        };

        let hints = match self.focus {
            Focus::Table => " │ / search  enter attributes  esc clear selection  q quit",
            Focus::Search => " │ enter done  esc clear search",
            Focus::Attributes => " │ j/k scroll  esc back  q quit",
        };

        let line = Line::from(vec![
            Span::raw(" "),
            indicator,
            Span::styled(hints, theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Toast in the bottom-right corner, above the status line.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let message_width = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = message_width
        .saturating_add(6)
        .clamp(20, 60)
        .min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast);
    frame.render_widget(block, toast);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notification.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
