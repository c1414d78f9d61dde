pub mod config;
pub mod error;
pub mod handlers;
pub mod passphrase;
pub mod rate_limit;
pub mod session;

use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use kiln_core::Library;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::{debug, error, info, warn};

pub use config::{RateLimitConfig, SecretConfig, SecretUser, ServerConfig};
pub use error::{ApiError, ServerError};
pub use rate_limit::AuthRateLimiter;
pub use session::SessionStore;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub secret: Arc<SecretConfig>,
    pub sessions: SessionStore,
    pub limiter: AuthRateLimiter,
    pub library: Arc<RwLock<Library>>,
}

impl AppState {
    pub fn new(secret: SecretConfig, library: Library) -> Self {
        let limits = &secret.rate_limit;
        Self {
            sessions: SessionStore::new(secret.session_ttl()),
            limiter: AuthRateLimiter::new(limits.window(), limits.max_attempts, limits.block()),
            library: Arc::new(RwLock::new(library)),
            secret: Arc::new(secret),
        }
    }
}

/// The JSON API. Static files are layered on by [`Server`].
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth", post(handlers::login).delete(handlers::logout))
        .route("/api/secret/content", get(handlers::secret_content))
        .route("/api/secret/users", get(handlers::secret_users))
        .route("/api/entries/{kind}", get(handlers::entries))
        .with_state(state)
}

/// Rebuilds the site after a content change and returns the fresh library.
pub type Rebuild = Arc<dyn Fn() -> anyhow::Result<Library> + Send + Sync>;

/// Static site plus API server
pub struct Server {
    config: ServerConfig,
    state: AppState,
    rebuild: Option<Rebuild>,
}

impl Server {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state,
            rebuild: None,
        }
    }

    /// Run `rebuild` whenever the content directory changes. Only used when
    /// `watch` is set in the config.
    pub fn on_change(mut self, rebuild: Rebuild) -> Self {
        self.rebuild = Some(rebuild);
        self
    }

    pub async fn run(self) -> Result<(), ServerError> {
        if !self.config.root.exists() {
            return Err(ServerError::MissingRoot(
                self.config.root.display().to_string(),
            ));
        }

        spawn_sweeper(
            self.state.clone(),
            self.state.secret.rate_limit.sweep_interval(),
        );

        if self.config.watch
            && let Some(rebuild) = self.rebuild.clone()
        {
            let watch_path = self.config.source.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(e) = watch_content(watch_path, rebuild, state).await {
                    error!(error = %e, "file watcher stopped");
                }
            });
        }

        let app = router(self.state).fallback_service(ServeDir::new(&self.config.root));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        info!(%addr, root = %self.config.root.display(), "serving");

        if self.config.open
            && let Err(e) = open::that(format!("http://{addr}"))
        {
            warn!(error = %e, "failed to open browser");
        }

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}

/// Periodically drop expired sessions and idle rate-limit records.
pub fn spawn_sweeper(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let now = std::time::Instant::now();
            let sessions = state.sessions.sweep_at(now);
            let clients = state.limiter.sweep_at(now);
            debug!(sessions, clients, "swept expired auth state");
        }
    })
}

async fn watch_content(
    watch_path: PathBuf,
    rebuild: Rebuild,
    state: AppState,
) -> Result<(), ServerError> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&watch_path, notify::RecursiveMode::Recursive)?;

    info!(path = %watch_path.display(), "watching content");

    while let Some(path) = rx.recv().await {
        // One rebuild covers every change queued so far.
        while rx.try_recv().is_ok() {}
        info!(path = %path.display(), "content changed; rebuilding");

        let rebuild = rebuild.clone();
        match tokio::task::spawn_blocking(move || rebuild()).await {
            Ok(Ok(library)) => {
                *state.library.write().await = library;
                info!("rebuild finished");
            }
            Ok(Err(e)) => warn!(error = %e, "rebuild failed; keeping previous content"),
            Err(e) => error!(error = %e, "rebuild task panicked"),
        }
    }

    Ok(())
}
