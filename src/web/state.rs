//! Shared server state: one `Session` per browser, keyed by cookie.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use axum::http::{header, HeaderMap};
use tracing::debug;
use uuid::Uuid;

use crate::config::VisualizerConfig;
use crate::session::Session;

pub(crate) const SESSION_COOKIE: &str = "dv_session";

struct Entry {
    session: Session,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<Mutex<HashMap<Uuid, Entry>>>,
    config: Arc<VisualizerConfig>,
}

impl AppState {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Entry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the session for `id`, creating an empty one on first use.
    ///
    /// Only writers create sessions, and creating one first drops idle sessions.
    /// Holds the session map for the duration of `f`; keep `f` short.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> R {
        let now = Instant::now();
        let mut sessions = self.lock();
        if !sessions.contains_key(&id) {
            self.prune(&mut sessions, now);
        }
        let entry = sessions.entry(id).or_insert_with(|| Entry {
            session: Session::default(),
            last_seen: now,
        });
        entry.last_seen = now;
        f(&mut entry.session)
    }

    /// Cheap copy of a session; the table inside is shared.
    ///
    /// Unknown ids read as an empty session without being stored.
    pub fn snapshot(&self, id: Uuid) -> Session {
        match self.lock().get_mut(&id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                entry.session.clone()
            }
            None => Session::default(),
        }
    }

    /// Drop sessions idle longer than the configured timeout as of `now`.
    /// Returns how many were removed.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        self.prune(&mut sessions, now)
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let idle = self.config.web.session_idle();
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= idle);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "expired idle sessions");
        }
        removed
    }
}

/// Session id for a request, and whether it was just minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionId {
    pub(crate) id: Uuid,
    pub(crate) fresh: bool,
}

impl SessionId {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_session(headers) {
            Some(id) => Self { id, fresh: false },
            None => Self {
                id: Uuid::new_v4(),
                fresh: true,
            },
        }
    }

    /// `Set-Cookie` value for a freshly minted id.
    pub(crate) fn set_cookie(&self) -> Option<String> {
        self.fresh.then(|| {
            format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                self.id
            )
        })
    }
}

fn cookie_session(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .find_map(|id| Uuid::parse_str(id.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    #[test]
    fn reads_session_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; lang=en")).unwrap(),
        );

        let session = SessionId::from_headers(&headers);
        assert_eq!(session.id, id);
        assert!(!session.fresh);
        assert_eq!(session.set_cookie(), None);
    }

    #[test]
    fn garbage_cookie_mints_new_id() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("dv_session=not-a-uuid; dv_sessionx=1"),
        );

        let session = SessionId::from_headers(&headers);
        assert!(session.fresh);
        let cookie = session.set_cookie().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session.id)));
    }

    #[test]
    fn reads_do_not_create_sessions() {
        let state = AppState::new(VisualizerConfig::default());
        let id = Uuid::new_v4();
        assert!(state.snapshot(id).table().is_none());
        assert_eq!(state.session_count(), 0);

        state.with_session(id, |_| ());
        assert_eq!(state.session_count(), 1);
        assert!(state.snapshot(id).table().is_none());
        assert_eq!(state.session_count(), 1);
    }

    #[test]
    fn idle_sessions_expire() {
        let state = AppState::new(VisualizerConfig::default());
        let idle = state.config().web.session_idle();
        state.with_session(Uuid::new_v4(), |_| ());
        state.with_session(Uuid::new_v4(), |_| ());

        assert_eq!(state.prune_idle(Instant::now()), 0);
        assert_eq!(state.prune_idle(Instant::now() + idle + Duration::from_secs(1)), 2);
        assert_eq!(state.session_count(), 0);
    }
}
