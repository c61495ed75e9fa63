//! # Dispatcher TCP
//! src/server/tcp.rs
//!
//! Acepta conexiones y ejecuta un handler por cada una:
//!
//! - **Concurrent**: un thread nuevo por conexión, sin límite de threads
//!   vivos. El scheduler del sistema operativo decide el orden.
//! - **Sequential**: el handler corre en el mismo thread del `accept`, así
//!   que los requests se atienden estrictamente de a uno.
//!
//! Un error en una conexión se loguea y no afecta al resto ni al loop.

use super::handler::{self, HandlerContext};
use crate::config::{Config, ConcurrencyMode};
use crate::error::ServerError;
use crate::files::{FsProvider, ResourceProvider};
use crate::metrics::MetricsCollector;
use crate::state::{HitCounter, RateLimiter, SharedState};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Servidor de archivos
pub struct Server {
    listener: TcpListener,
    mode: ConcurrencyMode,
    context: HandlerContext,
}

/// Marca al handler como activo mientras vive (incluso si hace panic)
struct ActiveHandler(MetricsCollector);

impl ActiveHandler {
    fn start(metrics: &MetricsCollector) -> Self {
        metrics.handler_started();
        Self(metrics.clone())
    }
}

impl Drop for ActiveHandler {
    fn drop(&mut self) {
        self.0.handler_finished();
    }
}

impl Server {
    /// Valida la configuración, arma el estado compartido y hace bind
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::InvalidConfig)?;

        let provider = FsProvider::new(&config.root).map_err(|source| ServerError::Root {
            path: config.root.clone(),
            source,
        })?;
        info!(root = %provider.root().display(), "raíz servida");

        let state = SharedState::new(
            RateLimiter::new(config.rate_limit, config.rate_window()),
            HitCounter::new(config.counter_strategy()),
        );

        Self::with_parts(&config, Arc::new(provider), state)
    }

    /// Como `bind` pero con proveedor y estado inyectados
    pub fn with_parts(
        config: &Config,
        provider: Arc<dyn ResourceProvider>,
        state: SharedState,
    ) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            mode: config.concurrency_mode(),
            context: HandlerContext {
                state,
                provider,
                metrics: MetricsCollector::new(),
                delay: config.request_delay(),
            },
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Estado compartido (para inspeccionarlo desde afuera)
    pub fn state(&self) -> &SharedState {
        &self.context.state
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.context.metrics
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Acepta conexiones para siempre
    pub fn run(&self) {
        self.serve(None);
    }

    /// Acepta hasta `max_connections` conexiones (o sin fin con `None`)
    pub fn serve(&self, max_connections: Option<usize>) {
        match self.local_addr() {
            Ok(addr) => info!(address = %addr, mode = ?self.mode, "servidor escuchando"),
            Err(e) => warn!(error = %e, "no se pudo leer la dirección local"),
        }

        let mut accepted = 0usize;
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    accepted += 1;
                    self.dispatch(stream, accepted);
                }
                Err(e) => {
                    error!(error = %e, "error al aceptar conexión");
                }
            }

            if max_connections.is_some_and(|max| accepted >= max) {
                break;
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, connection_id: usize) {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        debug!(peer = %peer, connection_id, "nueva conexión");

        match self.mode {
            ConcurrencyMode::Sequential => {
                let _active = ActiveHandler::start(&self.context.metrics);
                run_handler(stream, &self.context, &peer);
            }
            ConcurrencyMode::Concurrent => {
                let context = self.context.clone();
                let active = ActiveHandler::start(&context.metrics);

                let spawned = thread::Builder::new()
                    .name(format!("conn-{}", connection_id))
                    .spawn(move || {
                        let _active = active;
                        run_handler(stream, &context, &peer);
                    });

                if let Err(e) = spawned {
                    error!(error = %e, connection_id, "no se pudo crear el thread; conexión descartada");
                }
            }
        }
    }
}

/// Ejecuta el handler y absorbe su error
fn run_handler(stream: TcpStream, context: &HandlerContext, peer: &str) {
    if let Err(e) = handler::handle_connection(stream, context) {
        warn!(peer = %peer, error = %e, "conexión terminada con error");
    }
}
