//! Access-key login and cookie sessions
//!
//! Every route that starts a run or hands out an archive sits behind
//! [`require_session`]. A session is created by `POST /login` once the
//! submitted key matches the configured one, and lives in memory until
//! logout or until it is evicted by newer sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{error::ApiError, state::AppState, utils::cookie_value};
use crate::archive::ArchiveBundle;

const MAX_SESSIONS: usize = 256;

/// Session token of an authenticated request, inserted by [`require_session`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

/// Archive of the latest run, waiting for its one download
#[derive(Debug)]
struct PendingArchive {
    run_id: Uuid,
    bundle: ArchiveBundle,
}

#[derive(Debug)]
struct Session {
    /// Creation order, used to pick the eviction victim
    seq: u64,
    pending: Option<PendingArchive>,
}

/// In-memory session table. Each session holds at most one pending archive.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    next_seq: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session and return its token
    pub async fn create(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut sessions = self.sessions.lock().await;

        if sessions.len() >= MAX_SESSIONS {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.seq)
                .map(|(token, _)| token.clone());
            if let Some(oldest) = oldest {
                debug!("Session table full, evicting oldest session");
                sessions.remove(&oldest);
            }
        }

        sessions.insert(token.clone(), Session { seq, pending: None });
        token
    }

    pub async fn contains(&self, token: &str) -> bool {
        self.sessions.lock().await.contains_key(token)
    }

    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }

    /// Replace the session's pending archive. `None` clears it.
    pub async fn set_archive(&self, token: &str, run_id: Uuid, bundle: Option<ArchiveBundle>) {
        if let Some(session) = self.sessions.lock().await.get_mut(token) {
            session.pending = bundle.map(|bundle| PendingArchive { run_id, bundle });
        }
    }

    /// Hand out the pending archive of `run_id` and forget it
    pub async fn take_archive(&self, token: &str, run_id: Uuid) -> Option<ArchiveBundle> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(token)?;

        if !session
            .pending
            .as_ref()
            .is_some_and(|pending| pending.run_id == run_id)
        {
            return None;
        }
        session.pending.take().map(|pending| pending.bundle)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Constant-time byte comparison.
/// Always compares all bytes regardless of where the first mismatch occurs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Reject requests without a live session cookie
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = cookie_value(request.headers(), &state.config.auth.cookie_name)
        .ok_or_else(|| ApiError::Unauthorized("Please log in first".to_string()))?;

    if !state.sessions.contains(&token).await {
        return Err(ApiError::Unauthorized(
            "Session expired, please log in again".to_string(),
        ));
    }

    request.extensions_mut().insert(SessionToken(token));
    Ok(next.run(request).await)
}
