use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "kiln_session";

#[derive(Debug, Clone)]
struct Session {
    identifier: String,
    expires_at: Instant,
}

/// Logged-in users by opaque token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `identifier` and return its token.
    pub fn create_at(&self, identifier: &str, now: Instant) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                identifier: identifier.to_string(),
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// The user behind `token`, if the session is still live. Expired
    /// sessions are removed on lookup.
    pub fn identify_at(&self, token: &str, now: Instant) -> Option<String> {
        let identifier = {
            let session = self.sessions.get(token)?;
            (now < session.expires_at).then(|| session.identifier.clone())
        };
        if identifier.is_none() {
            self.sessions.remove(token);
        }
        identifier
    }

    pub fn remove(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| now < session.expires_at);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// `Set-Cookie` value carrying `token`.
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        ttl.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn expired_cookie(secure: bool) -> String {
    session_cookie("", Duration::ZERO, secure)
}

/// Pull the session token out of a `Cookie` header value.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn sessions_expire_after_ttl() {
        let store = SessionStore::new(TTL);
        let now = Instant::now();
        let token = store.create_at("alice", now);

        assert_eq!(store.identify_at(&token, now + TTL / 2).as_deref(), Some("alice"));
        assert_eq!(store.identify_at(&token, now + TTL), None);
        assert!(store.is_empty());
    }

    #[test]
    fn tokens_are_unique_and_removable() {
        let store = SessionStore::new(TTL);
        let now = Instant::now();
        let a = store.create_at("alice", now);
        let b = store.create_at("alice", now);
        assert_ne!(a, b);

        assert!(store.remove(&a));
        assert!(!store.remove(&a));
        assert_eq!(store.identify_at(&b, now).as_deref(), Some("alice"));
    }

    #[test]
    fn sweep_removes_expired_sessions() {
        let store = SessionStore::new(Duration::from_secs(10));
        let now = Instant::now();
        store.create_at("old", now);
        store.create_at("new", now + Duration::from_secs(8));

        assert_eq!(store.sweep_at(now + Duration::from_secs(12)), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn cookie_round_trip() {
        let cookie = session_cookie("abc", TTL, true);
        assert_eq!(
            cookie,
            "kiln_session=abc; HttpOnly; SameSite=Strict; Path=/; Max-Age=86400; Secure"
        );
        assert_eq!(
            token_from_cookie_header("theme=dark; kiln_session=abc; other=1"),
            Some("abc")
        );
        assert_eq!(token_from_cookie_header("kiln_session="), None);
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert!(expired_cookie(false).contains("Max-Age=0"));
    }
}
