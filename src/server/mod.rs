// Server module entry point
// Listener setup, per-connection serving and shutdown handling

pub mod connection;
pub mod listener;
pub mod serve;
pub mod signal;
pub mod tls;

use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

use crate::config::{AppState, Config};
use crate::error::Result;
use crate::logger;

// Re-export commonly used items
pub use listener::bind_listener;
pub use serve::serve;
pub use signal::{wait_for_signal, Shutdown};

/// Runtime that drives the `LocalSet` holding every server task.
///
/// Connections are `spawn_local` tasks, so a single thread does all the work.
pub fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Listeners bound at startup, before any connection is accepted
pub struct Listeners {
    http: TcpListener,
    https: Option<(TcpListener, TlsAcceptor)>,
}

impl Listeners {
    /// Bind the HTTP listener, and the HTTPS listener when certificates exist.
    ///
    /// A certificate that cannot be loaded disables HTTPS but keeps plain
    /// HTTP. Must be called from within a Tokio runtime.
    pub fn bind(cfg: &Config) -> Result<Self> {
        let backlog = cfg.performance.backlog;

        let http = bind_listener(cfg.http_socket_addr()?, backlog)?;
        logger::log_listening("http", &http.local_addr()?);

        let https = if cfg.tls_files_present() {
            match tls::load_acceptor(&cfg.tls) {
                Ok(acceptor) => {
                    let listener = bind_listener(cfg.https_socket_addr()?, backlog)?;
                    logger::log_listening("https", &listener.local_addr()?);
                    Some((listener, acceptor))
                }
                Err(e) => {
                    logger::log_error(&format!("HTTPS listener disabled: {e}"));
                    None
                }
            }
        } else {
            logger::log_tls_disabled(&cfg.tls.key_path, &cfg.tls.cert_path);
            None
        };

        Ok(Self { http, https })
    }

    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http.local_addr()
    }

    /// Bound HTTPS address, `None` when HTTPS is disabled
    pub fn https_addr(&self) -> Option<SocketAddr> {
        self.https.as_ref().and_then(|(l, _)| l.local_addr().ok())
    }

    /// Start one accept loop per listener on the current `LocalSet`
    pub fn spawn(self, state: &Arc<AppState>, shutdown: &Shutdown) -> AcceptLoops {
        // Shared so `max_connections` caps both listeners together
        let active_connections = Arc::new(AtomicUsize::new(0));

        let mut handles = vec![tokio::task::spawn_local(serve(
            self.http,
            None,
            Arc::clone(state),
            Arc::clone(&active_connections),
            shutdown.subscribe(),
        ))];

        if let Some((listener, acceptor)) = self.https {
            handles.push(tokio::task::spawn_local(serve(
                listener,
                Some(acceptor),
                Arc::clone(state),
                active_connections,
                shutdown.subscribe(),
            )));
        }

        AcceptLoops { handles }
    }
}

/// Running accept loops
pub struct AcceptLoops {
    handles: Vec<JoinHandle<()>>,
}

impl AcceptLoops {
    /// Wait until every loop has stopped
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                logger::log_error(&format!("Accept loop ended abnormally: {e}"));
            }
        }
    }
}

/// Start the HTTP listener, and the HTTPS listener when certificates exist.
///
/// Must run inside a `tokio::task::LocalSet`. Returns once `shutdown` has
/// been triggered and the accept loops have stopped.
pub async fn run(state: Arc<AppState>, shutdown: &Shutdown) -> Result<()> {
    let listeners = Listeners::bind(&state.config)?;
    listeners.spawn(&state, shutdown).join().await;
    Ok(())
}
