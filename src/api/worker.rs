use crate::api::ApiClient;
use crate::event::AppEvent;
use crate::session::store::Command;
use eframe::egui;
use std::sync::{mpsc, Arc, OnceLock};
use tokio::runtime::Handle;
use tracing::warn;

/// Runs store commands on the tokio runtime and posts one completion event per
/// command back to the UI thread.
#[derive(Clone)]
pub struct ApiWorker {
    client: ApiClient,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
    repaint: Arc<OnceLock<egui::Context>>,
}

impl ApiWorker {
    pub fn new(client: ApiClient, tx: mpsc::Sender<AppEvent>, runtime_handle: Handle) -> Self {
        Self {
            client,
            tx,
            runtime_handle,
            repaint: Arc::new(OnceLock::new()),
        }
    }

    pub fn runtime_handle(&self) -> &Handle {
        &self.runtime_handle
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Lets completions wake the UI instead of waiting for the next input event.
    pub fn attach_context(&self, ctx: &egui::Context) {
        let _ = self.repaint.set(ctx.clone());
    }

    pub fn dispatch_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.dispatch(command);
        }
    }

    pub fn dispatch(&self, command: Command) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let repaint = Arc::clone(&self.repaint);

        self.runtime_handle.spawn(async move {
            let event = run_command(&client, command).await;
            if tx.send(event).is_err() {
                warn!("event channel closed before completion was delivered");
                return;
            }
            if let Some(ctx) = repaint.get() {
                ctx.request_repaint();
            }
        });
    }
}

pub async fn run_command(client: &ApiClient, command: Command) -> AppEvent {
    match command {
        Command::Upload { session_id, files } => AppEvent::UploadFinished {
            session_id,
            file_count: files.len(),
            result: client
                .upload(session_id, &files)
                .await
                .map_err(|err| err.to_string()),
        },
        Command::Reindex { session_id } => AppEvent::ReindexFinished {
            session_id,
            result: client
                .reindex(session_id)
                .await
                .map_err(|err| err.to_string()),
        },
        Command::Ask { session_id, query } => {
            let result = client
                .chat(session_id, &query)
                .await
                .map_err(|err| err.to_string());
            AppEvent::AnswerReceived {
                session_id,
                query,
                result,
            }
        }
        Command::FetchDocuments { session_id } => AppEvent::DocumentsLoaded {
            session_id,
            result: client
                .documents(session_id)
                .await
                .map_err(|err| err.to_string()),
        },
        Command::FetchGalaxy { session_id, query } => {
            let result = client
                .galaxy(session_id, query.as_deref())
                .await
                .map_err(|err| err.to_string());
            AppEvent::GalaxyLoaded {
                session_id,
                query,
                result,
            }
        }
        Command::DeleteSession { session_id } => AppEvent::SessionDeleted {
            session_id: Some(session_id),
            result: client
                .delete_session(session_id)
                .await
                .map_err(|err| err.to_string()),
        },
        Command::DeleteAllSessions => AppEvent::SessionDeleted {
            session_id: None,
            result: client
                .delete_all_sessions()
                .await
                .map_err(|err| err.to_string()),
        },
        Command::Search { query, k } => {
            let result = client
                .search(&query, k)
                .await
                .map_err(|err| err.to_string());
            AppEvent::SearchFinished { query, result }
        }
    }
}
