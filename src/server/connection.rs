// Connection handling module
// Serves a single accepted TCP connection, optionally behind TLS

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::rt::{Read, Write};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::config::AppState;
use crate::handler::{self, ConnectionInfo, Transport};
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `tls` - Acceptor for the HTTPS listener, `None` for plaintext
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    tls: Option<&TlsAcceptor>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    let transport = if tls.is_some() {
        Transport::Tls
    } else {
        Transport::Plain
    };

    if state.access_log() {
        logger::log_connection_accepted(&peer_addr, transport.scheme());
    }

    let conn = ConnectionInfo {
        peer_addr,
        transport,
    };
    let state = Arc::clone(state);
    let conn_counter = Arc::clone(conn_counter);
    let tls = tls.cloned();

    tokio::task::spawn_local(async move {
        let timeout = connection_timeout(&state);

        let served = tokio::time::timeout(timeout, async move {
            match tls {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(tls_stream) => serve_io(TokioIo::new(tls_stream), state, conn).await,
                    Err(e) => logger::log_warning(&format!(
                        "TLS handshake with {peer_addr} failed: {e}"
                    )),
                },
                None => serve_io(TokioIo::new(stream), state, conn).await,
            }
        })
        .await;

        if served.is_err() {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {} seconds",
                timeout.as_secs()
            ));
        }

        // Decrement active connection counter
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Drive an HTTP/1.1 connection to completion
async fn serve_io<I>(io: I, state: Arc<AppState>, conn: ConnectionInfo)
where
    I: Read + Write + Unpin + 'static,
{
    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);

    let service = service_fn(move |req| handler::handle_request(req, Arc::clone(&state), conn));

    if let Err(err) = builder.serve_connection(io, service).await {
        logger::log_connection_error(&err);
    }
}

/// Upper bound on the whole lifetime of one connection, handshake included
fn connection_timeout(state: &AppState) -> Duration {
    let perf = &state.config.performance;
    Duration::from_secs(std::cmp::max(perf.read_timeout, perf.write_timeout))
}
