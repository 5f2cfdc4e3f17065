use crate::scene::GalaxyPoint;
use crate::session::{Document, QueryResult, ScoredMatch, SessionId};

/// Completion reported by a worker task. Errors are carried as display strings
/// so the events stay `Clone` across the channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    UploadFinished {
        session_id: SessionId,
        file_count: usize,
        result: Result<(), String>,
    },
    ReindexFinished {
        session_id: SessionId,
        result: Result<(), String>,
    },
    AnswerReceived {
        session_id: SessionId,
        query: String,
        result: Result<QueryResult, String>,
    },
    DocumentsLoaded {
        session_id: SessionId,
        result: Result<Vec<Document>, String>,
    },
    GalaxyLoaded {
        session_id: SessionId,
        query: Option<String>,
        result: Result<Vec<GalaxyPoint>, String>,
    },
    SessionDeleted {
        session_id: Option<SessionId>,
        result: Result<(), String>,
    },
    SearchFinished {
        query: String,
        result: Result<Vec<ScoredMatch>, String>,
    },
}

impl AppEvent {
    pub fn to_log_line(&self) -> String {
        fn outcome<T>(result: &Result<T, String>) -> String {
            match result {
                Ok(_) => "ok".to_string(),
                Err(err) => format!("error: {err}"),
            }
        }

        match self {
            Self::UploadFinished {
                session_id,
                file_count,
                result,
            } => format!(
                "upload session={session_id} files={file_count} {}",
                outcome(result)
            ),
            Self::ReindexFinished { session_id, result } => {
                format!("reindex session={session_id} {}", outcome(result))
            }
            Self::AnswerReceived {
                session_id, result, ..
            } => format!("chat session={session_id} {}", outcome(result)),
            Self::DocumentsLoaded { session_id, result } => match result {
                Ok(documents) => format!(
                    "documents session={session_id} count={}",
                    documents.len()
                ),
                Err(err) => format!("documents session={session_id} error: {err}"),
            },
            Self::GalaxyLoaded {
                session_id, result, ..
            } => match result {
                Ok(points) => format!("galaxy session={session_id} points={}", points.len()),
                Err(err) => format!("galaxy session={session_id} error: {err}"),
            },
            Self::SessionDeleted { session_id, result } => match session_id {
                Some(id) => format!("delete session={id} {}", outcome(result)),
                None => format!("delete all sessions {}", outcome(result)),
            },
            Self::SearchFinished { query, result } => {
                format!("search q={query:?} {}", outcome(result))
            }
        }
    }
}
