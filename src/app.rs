use crate::api::worker::ApiWorker;
use crate::config::AppConfig;
use crate::event::AppEvent;
use crate::session::store::{ChatStore, Command};
use crate::session::NoticeLevel;
use crate::theme::Theme;
use crate::ui::search::SearchPage;
use crate::ui::sidebar::SidebarState;
use crate::ui::visualized::VisualizedPage;
use crate::ui::{about, home::HomePage, result, Page, UiAction};
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use tracing::info;

const DIAGNOSTICS_LIMIT: usize = 500;

pub struct FoundByMeApp {
    rx: Receiver<AppEvent>,
    worker: ApiWorker,
    store: ChatStore,
    theme: Theme,
    page: Page,
    history: Vec<Page>,
    home: HomePage,
    search: SearchPage,
    visualized: VisualizedPage,
    sidebar: SidebarState,
    diagnostics_log: Vec<String>,
    visuals_applied: bool,
    titled_page: Option<Page>,
}

impl FoundByMeApp {
    pub fn new(rx: Receiver<AppEvent>, worker: ApiWorker, config: &AppConfig) -> Self {
        let mut app = Self {
            rx,
            worker,
            store: ChatStore::new(),
            theme: Theme::default(),
            page: Page::Home,
            history: Vec::new(),
            home: HomePage::default(),
            search: SearchPage::new(config.api.search_k),
            visualized: VisualizedPage::new(config.galaxy.clone()),
            sidebar: SidebarState::default(),
            diagnostics_log: Vec::new(),
            visuals_applied: false,
            titled_page: None,
        };
        app.store.create_new_chat();
        let base_url = app.worker.base_url().to_string();
        app.log_diagnostic(format!("using API at {base_url}"));
        app
    }

    fn timestamp() -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
        if self.diagnostics_log.len() > DIAGNOSTICS_LIMIT {
            let overflow = self.diagnostics_log.len() - DIAGNOSTICS_LIMIT;
            self.diagnostics_log.drain(..overflow);
        }
    }

    fn dispatch(&mut self, commands: Vec<Command>) {
        for command in &commands {
            self.log_diagnostic(format!("request {}", describe(command)));
        }
        self.worker.dispatch_all(commands);
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.log_diagnostic(event.to_log_line());
                    let follow_up = self.store.apply(event);
                    self.dispatch(follow_up);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn navigate(&mut self, page: Page) {
        if page == self.page {
            return;
        }
        if self.page == Page::Visualized {
            self.visualized.unmount();
        }
        self.history.push(self.page);
        self.page = page;
    }

    fn back(&mut self) {
        let previous = self.history.pop().unwrap_or(Page::Home);
        if self.page == Page::Visualized {
            self.visualized.unmount();
        }
        self.page = previous;
    }

    fn handle_action(&mut self, ctx: &egui::Context, action: UiAction) {
        match action {
            UiAction::Navigate(page) => self.navigate(page),
            UiAction::Back => self.back(),
            UiAction::NewChat => {
                self.store.create_new_chat();
            }
            UiAction::SelectChat(id) => {
                let commands = self.store.select_chat(id);
                self.dispatch(commands);
            }
            UiAction::DeleteChat(id) => {
                info!(session_id = %id, "deleting session");
                let commands = self.store.delete_chat(id);
                self.dispatch(commands);
            }
            UiAction::DeleteAllChats => {
                info!("deleting all sessions");
                let commands = self.store.delete_all_chats();
                self.dispatch(commands);
            }
            UiAction::RenameChat(id, title) => self.store.update_chat_title(id, &title),
            UiAction::LaunchFiles(files) => {
                let commands = self.store.launch_files(files);
                self.dispatch(commands);
            }
            UiAction::Ask(query) => {
                let commands = self.store.ask_question(&query);
                self.dispatch(commands);
            }
            UiAction::RefreshGalaxy => {
                if let Some(command) = self.store.fetch_galaxy() {
                    self.dispatch(vec![command]);
                }
            }
            UiAction::Search(query, k) => {
                let commands = self.store.search(&query, k);
                self.dispatch(commands);
            }
            UiAction::OpenUrl(url) => {
                self.log_diagnostic(format!("opening {url}"));
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
        }
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.store.front_notice().cloned() else {
            return;
        };
        let (title, color) = match notice.level {
            NoticeLevel::Info => ("FoundByMe", self.theme.success),
            NoticeLevel::Error => ("Something went wrong", self.theme.danger),
        };
        let mut dismissed = false;
        egui::Window::new(RichText::new(title).color(color))
            .id(egui::Id::new("notice_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(&notice.message);
                ui.add_space(self.theme.spacing_8);
                dismissed = ui.button("OK").clicked()
                    || ui.input(|i| i.key_pressed(egui::Key::Enter));
            });
        if dismissed {
            self.store.dismiss_notice();
        }
    }

    fn render_diagnostics(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("diagnostics_panel")
            .resizable(false)
            .show(ctx, |ui| {
                egui::CollapsingHeader::new("Diagnostics")
                    .default_open(false)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt("diagnostics_log")
                            .max_height(120.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for entry in &self.diagnostics_log {
                                    ui.label(RichText::new(entry).monospace().small());
                                }
                            });
                    });
            });
    }

    fn render_page(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let padding = if self.page == Page::Visualized {
            0
        } else {
            self.theme.spacing_24 as i8
        };
        let frame = self.theme.panel_frame(self.theme.surface_1, padding);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| match self.page {
            Page::Home => self.home.show(ui, &self.store, &self.theme, actions),
            Page::Result => result::show(ui, &self.store, &self.theme, actions),
            Page::Visualized => self.visualized.show(
                ui,
                &self.store,
                &self.theme,
                self.worker.runtime_handle(),
                actions,
            ),
            Page::About => about::show(ui, &self.theme, self.worker.base_url()),
            Page::Search => self.search.show(ui, &self.store, &self.theme, actions),
        });
    }
}

fn window_title(page: Page) -> String {
    match page {
        Page::Home => "FoundByMe".to_string(),
        other => format!("FoundByMe · {}", other.title()),
    }
}

fn describe(command: &Command) -> String {
    match command {
        Command::Upload { session_id, files } => {
            format!("upload session={session_id} files={}", files.len())
        }
        Command::Reindex { session_id } => format!("reindex session={session_id}"),
        Command::Ask { session_id, .. } => format!("chat session={session_id}"),
        Command::FetchDocuments { session_id } => format!("documents session={session_id}"),
        Command::FetchGalaxy { session_id, query } => format!(
            "galaxy session={session_id} query={}",
            query.as_deref().unwrap_or("-")
        ),
        Command::DeleteSession { session_id } => format!("delete session={session_id}"),
        Command::DeleteAllSessions => "delete all sessions".to_string(),
        Command::Search { query, k } => format!("search q={query:?} k={k}"),
    }
}

impl eframe::App for FoundByMeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.visuals_applied {
            self.theme.apply_visuals(ctx);
            self.worker.attach_context(ctx);
            self.visuals_applied = true;
        }

        self.drain_events();

        let mut actions = Vec::new();
        if self.page != Page::Visualized {
            self.sidebar
                .show(ctx, &self.store, &self.theme, self.page, &mut actions);
            self.render_diagnostics(ctx);
        }
        self.render_page(ctx, &mut actions);
        self.render_notice(ctx);

        for action in actions {
            self.handle_action(ctx, action);
        }

        if self.titled_page != Some(self.page) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(window_title(self.page)));
            self.titled_page = Some(self.page);
        }
    }
}
