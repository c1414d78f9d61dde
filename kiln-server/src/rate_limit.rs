use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Blocked { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }

    /// Whole seconds to wait, never zero for a blocked client.
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            RateDecision::Allowed { .. } => 0,
            RateDecision::Blocked { retry_after } => {
                let secs = retry_after.as_secs();
                if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ClientRecord {
    attempts: Vec<Instant>,
    blocked_until: Option<Instant>,
}

/// Sliding-window attempt counter for login, keyed by client identifier.
///
/// `max_attempts` attempts fit in `window`; the next one blocks the client
/// for `block`. Once the block runs out the client starts over.
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    window: Duration,
    max_attempts: u32,
    block: Duration,
    clients: Arc<DashMap<String, ClientRecord>>,
}

impl AuthRateLimiter {
    pub fn new(window: Duration, max_attempts: u32, block: Duration) -> Self {
        Self {
            window,
            max_attempts,
            block,
            clients: Arc::new(DashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Record an attempt by `key` at `now` and decide whether it may proceed.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut record = self.clients.entry(key.to_string()).or_default();

        if let Some(until) = record.blocked_until {
            if now < until {
                return RateDecision::Blocked {
                    retry_after: until - now,
                };
            }
            record.blocked_until = None;
            record.attempts.clear();
        }

        let window = self.window;
        record
            .attempts
            .retain(|attempt| now.duration_since(*attempt) < window);

        if record.attempts.len() as u32 >= self.max_attempts {
            record.attempts.clear();
            record.blocked_until = Some(now + self.block);
            return RateDecision::Blocked {
                retry_after: self.block,
            };
        }

        record.attempts.push(now);
        RateDecision::Allowed {
            remaining: self.max_attempts - record.attempts.len() as u32,
        }
    }

    /// Forget everything about `key`, e.g. after a successful login.
    pub fn reset(&self, key: &str) {
        self.clients.remove(key);
    }

    /// Drop clients with no live attempts and no active block.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.clients.len();
        let window = self.window;
        self.clients.retain(|_, record| {
            let blocked = record.blocked_until.is_some_and(|until| now < until);
            let recent = record
                .attempts
                .iter()
                .any(|attempt| now.duration_since(*attempt) < window);
            blocked || recent
        });
        before.saturating_sub(self.clients.len())
    }

    pub fn tracked(&self) -> usize {
        self.clients.len()
    }
}
