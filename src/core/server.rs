use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::Request;
use axum::Router;
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

use crate::adapters::http;
use crate::config::ServerConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

type ConnectionBuilder = Arc<Builder<TokioExecutor>>;

/// A bound HTTP server. Owns the listener until [`Server::run`] consumes it.
pub struct Server {
    listener: TcpListener,
    router: Router,
    config: ServerConfig,
}

impl Server {
    /// Validates `config` and binds the listening socket.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.bind_addr).await?;
        let router = http::router(&config);

        Ok(Self {
            listener,
            router,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves until `cancel` fires, then drains open connections for at
    /// most `shutdown_timeout` and closes whatever is still running.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let Self {
            listener,
            router,
            config,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!("Starting server on port {}", addr.port());

        let builder = connection_builder(&config);
        let connections = TaskTracker::new();
        let force_close = CancellationToken::new();

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        continue;
                    }
                },
                () = cancel.cancelled() => break,
            };

            connections.spawn(serve_connection(
                stream,
                peer,
                builder.clone(),
                router.clone(),
                config.idle_timeout,
                cancel.clone(),
                force_close.clone(),
            ));
        }

        drop(listener);
        connections.close();
        tracing::info!(
            "Shutting down, waiting up to {:?} for {} open connection(s)",
            config.shutdown_timeout,
            connections.len()
        );

        if tokio::time::timeout(config.shutdown_timeout, connections.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} connection(s) still open after {:?}, forcing shutdown",
                connections.len(),
                config.shutdown_timeout
            );
            force_close.cancel();
            connections.wait().await;
        } else {
            tracing::info!("Server stopped gracefully");
        }

        Ok(())
    }
}

fn connection_builder(config: &ServerConfig) -> ConnectionBuilder {
    let mut builder = Builder::new(TokioExecutor::new()).http1_only();
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(config.read_timeout);
    Arc::new(builder)
}

/// Time of the last request seen on a connection.
#[derive(Clone)]
struct ActivityClock {
    accepted: Instant,
    last_request_ms: Arc<AtomicU64>,
}

impl ActivityClock {
    fn new() -> Self {
        Self {
            accepted: Instant::now(),
            last_request_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.accepted.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_request_ms.store(elapsed, Ordering::Relaxed);
    }

    fn idle_deadline(&self, idle_timeout: Duration) -> Instant {
        let last = Duration::from_millis(self.last_request_ms.load(Ordering::Relaxed));
        self.accepted + last + idle_timeout
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    builder: ConnectionBuilder,
    router: Router,
    idle_timeout: Duration,
    shutdown: CancellationToken,
    force_close: CancellationToken,
) {
    let clock = ActivityClock::new();
    let service = {
        let clock = clock.clone();
        router.map_request(move |req: Request<Incoming>| {
            clock.touch();
            req
        })
    };

    let connection =
        builder.serve_connection(TokioIo::new(stream), TowerToHyperService::new(service));
    tokio::pin!(connection);

    // graceful close requested, either by shutdown or by the idle timer
    let mut draining = false;
    loop {
        tokio::select! {
            served = connection.as_mut() => {
                if let Err(e) = served {
                    tracing::debug!(%peer, "Connection closed with error: {}", e);
                }
                return;
            }
            () = tokio::time::sleep_until(clock.idle_deadline(idle_timeout)), if !draining => {
                if clock.idle_deadline(idle_timeout) <= Instant::now() {
                    tracing::debug!(%peer, "Closing idle connection");
                    connection.as_mut().graceful_shutdown();
                    draining = true;
                }
            }
            () = shutdown.cancelled(), if !draining => {
                connection.as_mut().graceful_shutdown();
                draining = true;
            }
            () = force_close.cancelled() => {
                tracing::debug!(%peer, "Force closing connection");
                return;
            }
        }
    }
}
