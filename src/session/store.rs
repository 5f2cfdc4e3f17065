use crate::event::AppEvent;
use crate::scene::GalaxyPoint;
use crate::session::{Document, Notice, QueryResult, ScoredMatch, Session, SessionId};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Network work requested by a store action. The worker runs each command and
/// answers with exactly one [`AppEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload {
        session_id: SessionId,
        files: Vec<PathBuf>,
    },
    Reindex {
        session_id: SessionId,
    },
    Ask {
        session_id: SessionId,
        query: String,
    },
    FetchDocuments {
        session_id: SessionId,
    },
    FetchGalaxy {
        session_id: SessionId,
        query: Option<String>,
    },
    DeleteSession {
        session_id: SessionId,
    },
    DeleteAllSessions,
    Search {
        query: String,
        k: u32,
    },
}

/// Point cloud currently shown for a session, keyed by the query it was fetched for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalaxyState {
    pub session_id: Option<SessionId>,
    pub query: Option<String>,
    pub points: Vec<GalaxyPoint>,
    /// Bumped on every successful load so renderers know to rebuild.
    pub revision: u64,
}

/// Outcome of the most recent legacy vector search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: Option<String>,
    pub results: Vec<ScoredMatch>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct ChatStore {
    sessions: Vec<Session>,
    current_session_id: Option<SessionId>,
    current_result: Option<QueryResult>,
    documents: Vec<Document>,
    galaxy: GalaxyState,
    search: SearchState,
    pending_loads: u32,
    notices: VecDeque<Notice>,
    last_issued_id: u64,
}

fn now_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_millis() as u64,
        Err(_) => 0,
    }
}

fn exploration_title() -> String {
    format!("New exploration {}", chrono::Local::now().format("%H:%M:%S"))
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn current_session_id(&self) -> Option<SessionId> {
        self.current_session_id
    }

    pub fn current_session(&self) -> Option<&Session> {
        let id = self.current_session_id?;
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn current_result(&self) -> Option<&QueryResult> {
        self.current_result.as_ref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn galaxy(&self) -> &GalaxyState {
        &self.galaxy
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    pub fn front_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    fn next_session_id(&mut self) -> SessionId {
        let id = now_millis().max(self.last_issued_id + 1);
        self.last_issued_id = id;
        SessionId(id)
    }

    fn begin_loading(&mut self) {
        self.pending_loads += 1;
    }

    fn finish_loading(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }

    fn ensure_active_session(&mut self) -> SessionId {
        match self.current_session_id {
            Some(id) => id,
            None => self.create_new_chat(),
        }
    }

    fn is_active(&self, session_id: SessionId) -> bool {
        self.current_session_id == Some(session_id)
    }

    /// Switches the active session. Per-session views start empty so nothing
    /// from the previous session shows until its own fetches land.
    fn activate(&mut self, session_id: SessionId) {
        self.current_session_id = Some(session_id);
        self.documents.clear();
        self.galaxy = GalaxyState {
            session_id: Some(session_id),
            query: None,
            points: Vec::new(),
            revision: self.galaxy.revision + 1,
        };
    }

    pub fn create_new_chat(&mut self) -> SessionId {
        let id = self.next_session_id();
        let session = Session {
            id,
            title: exploration_title(),
            messages: Vec::new(),
        };
        info!(session_id = %id, "created session");
        self.sessions.insert(0, session);
        self.activate(id);
        id
    }

    pub fn select_chat(&mut self, session_id: SessionId) -> Vec<Command> {
        if self.is_active(session_id) {
            self.current_result = None;
            return Vec::new();
        }
        if !self.sessions.iter().any(|session| session.id == session_id) {
            warn!(session_id = %session_id, "ignoring selection of unknown session");
            return Vec::new();
        }

        self.activate(session_id);
        self.current_result = None;
        self.fetch_documents(Some(session_id))
    }

    pub fn fetch_documents(&self, session_id: Option<SessionId>) -> Vec<Command> {
        match session_id {
            Some(session_id) => vec![Command::FetchDocuments { session_id }],
            None => Vec::new(),
        }
    }

    pub fn launch_files(&mut self, files: Vec<PathBuf>) -> Vec<Command> {
        if files.is_empty() {
            return Vec::new();
        }
        let session_id = self.ensure_active_session();
        self.begin_loading();
        info!(session_id = %session_id, count = files.len(), "launching files");
        vec![Command::Upload { session_id, files }]
    }

    pub fn ask_question(&mut self, text: &str) -> Vec<Command> {
        let query = text.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let session_id = self.ensure_active_session();
        self.begin_loading();
        info!(session_id = %session_id, "asking question");
        vec![Command::Ask {
            session_id,
            query: query.to_string(),
        }]
    }

    pub fn delete_chat(&mut self, session_id: SessionId) -> Vec<Command> {
        self.sessions.retain(|session| session.id != session_id);
        let mut commands = vec![Command::DeleteSession { session_id }];

        if self.is_active(session_id) {
            match self.sessions.first().map(|session| session.id) {
                Some(next) => {
                    self.activate(next);
                    commands.extend(self.fetch_documents(Some(next)));
                }
                None => {
                    self.create_new_chat();
                }
            }
            self.current_result = None;
        }

        commands
    }

    pub fn delete_all_chats(&mut self) -> Vec<Command> {
        self.sessions.clear();
        self.current_session_id = None;
        self.current_result = None;
        self.create_new_chat();
        vec![Command::DeleteAllSessions]
    }

    pub fn update_chat_title(&mut self, session_id: SessionId, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            session.title = title.to_string();
        }
    }

    /// Point cloud request for the active session and current question, if any.
    pub fn fetch_galaxy(&self) -> Option<Command> {
        let session_id = self.current_session_id?;
        Some(Command::FetchGalaxy {
            session_id,
            query: self.current_result.as_ref().map(|r| r.query.clone()),
        })
    }

    pub fn search(&self, text: &str, k: u32) -> Vec<Command> {
        let query = text.trim();
        if query.is_empty() {
            return Vec::new();
        }
        vec![Command::Search {
            query: query.to_string(),
            k,
        }]
    }

    /// Applies a completion reported by the worker and returns any follow-up work.
    pub fn apply(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::UploadFinished {
                session_id,
                file_count,
                result,
            } => {
                self.finish_loading();
                match result {
                    Ok(()) => {
                        self.notices.push_back(Notice::info(format!(
                            "{file_count} file(s) launched successfully"
                        )));
                        // The document list is read from the index, so it is
                        // refreshed once the reindex has completed.
                        vec![Command::Reindex { session_id }]
                    }
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "upload failed");
                        self.notices
                            .push_back(Notice::error(format!("File upload failed: {err}")));
                        Vec::new()
                    }
                }
            }
            AppEvent::ReindexFinished { session_id, result } => {
                if let Err(err) = result {
                    warn!(session_id = %session_id, error = %err, "reindex failed");
                }
                self.fetch_documents(Some(session_id))
            }
            AppEvent::AnswerReceived {
                session_id,
                result,
                ..
            } => {
                self.finish_loading();
                match result {
                    Ok(answer) => {
                        self.current_result = Some(answer);
                    }
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "question failed");
                        self.notices
                            .push_back(Notice::error(format!("Failed to get an answer: {err}")));
                    }
                }
                Vec::new()
            }
            AppEvent::DocumentsLoaded { session_id, result } => {
                match result {
                    Ok(documents) if self.is_active(session_id) => {
                        self.documents = documents;
                    }
                    Ok(_) => {
                        info!(session_id = %session_id, "dropping documents for inactive session");
                    }
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "failed to fetch documents");
                    }
                }
                Vec::new()
            }
            AppEvent::GalaxyLoaded {
                session_id,
                query,
                result,
            } => {
                match result {
                    Ok(points) if self.is_active(session_id) => {
                        self.galaxy = GalaxyState {
                            session_id: Some(session_id),
                            query,
                            points,
                            revision: self.galaxy.revision + 1,
                        };
                    }
                    Ok(_) => {
                        info!(session_id = %session_id, "dropping galaxy for inactive session");
                    }
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "failed to fetch galaxy data");
                    }
                }
                Vec::new()
            }
            AppEvent::SessionDeleted { session_id, result } => {
                if let Err(err) = result {
                    match session_id {
                        Some(id) => warn!(session_id = %id, error = %err, "remote delete failed"),
                        None => warn!(error = %err, "remote delete of all sessions failed"),
                    }
                }
                Vec::new()
            }
            AppEvent::SearchFinished { query, result } => {
                self.search = match result {
                    Ok(results) => SearchState {
                        query: Some(query),
                        results,
                        error: None,
                    },
                    Err(err) => {
                        warn!(query = %query, error = %err, "search failed");
                        SearchState {
                            query: Some(query),
                            results: Vec::new(),
                            error: Some(err),
                        }
                    }
                };
                Vec::new()
            }
        }
    }
}
