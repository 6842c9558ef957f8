// Server loop module
// Accepts connections on one listener until shutdown is requested

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop shared by the plaintext and TLS listeners.
///
/// Every connection is served in its own `spawn_local` task, so this must
/// run inside a `tokio::task::LocalSet`. Returns once `shutdown` flips to
/// `true` or its sender is dropped; connections already accepted keep
/// running until they finish.
pub async fn serve(
    listener: TcpListener,
    tls: Option<TlsAcceptor>,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            tls.as_ref(),
                        );
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
