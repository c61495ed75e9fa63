//! # Handler de Conexión
//! src/server/handler.rs
//!
//! Atiende exactamente un request por conexión:
//!
//! ```text
//! leer + parsear ──✗──▶ 400 y cerrar
//!      │
//! limiter.allow(ip) ──✗──▶ 429 + Retry-After
//!      │
//! sleep(delay)             (trabajo simulado, puede ser 0)
//!      │
//! provider.fetch(path)
//!      ├─ Absent     ──▶ 404
//!      ├─ Directory  ──▶ listado con hits
//!      └─ File       ──▶ hits.bump(recurso), 200
//! ```
//!
//! Nunca se hace I/O con un lock tomado: `allow`, `bump` y `snapshot`
//! sueltan su lock antes de volver.

use crate::error::HandlerError;
use crate::files::{listing, Fetched, ResourceProvider};
use crate::http::{Method, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::state::SharedState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Path reservado para el reporte de métricas
pub const METRICS_PATH: &str = "/_metrics";

/// Tamaño máximo del request que se lee
const MAX_REQUEST_BYTES: usize = 8192;

/// Lo que necesita un handler; se clona una vez por conexión
#[derive(Clone)]
pub struct HandlerContext {
    pub state: SharedState,
    pub provider: Arc<dyn ResourceProvider>,
    pub metrics: MetricsCollector,

    /// Trabajo simulado por request
    pub delay: Duration,
}

/// Cuerpo de `/_metrics`
#[derive(Serialize)]
struct MetricsReport {
    server: crate::metrics::MetricsSnapshot,
    tracked_clients: usize,
    rate_limit: usize,
    rate_window_secs: f64,
    counter_safe: bool,
    hits: BTreeMap<String, u64>,
}

/// Atiende una conexión completa y la cierra al salir (drop del stream)
pub fn handle_connection(mut stream: TcpStream, ctx: &HandlerContext) -> Result<(), HandlerError> {
    let start = Instant::now();
    let identity = stream.peer_addr()?.ip().to_string();

    let raw = read_request(&mut stream)?;
    if raw.is_empty() {
        debug!(peer = %identity, "conexión cerrada sin datos");
        return Ok(());
    }

    let request = match Request::parse(&raw) {
        Ok(request) => request,
        Err(e) => {
            warn!(peer = %identity, error = %e, "request malformado");
            let response = Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e));
            send(&mut stream, response, Method::GET)?;
            ctx.metrics.record_request(400, start.elapsed());
            return Err(HandlerError::Malformed(e));
        }
    };

    let response = respond(&request, &identity, ctx);
    let status = response.status();

    send(&mut stream, response, request.method())?;

    let latency = start.elapsed();
    ctx.metrics.record_request(status.as_u16(), latency);
    info!(
        peer = %identity,
        method = request.method().as_str(),
        path = request.path(),
        version = request.version(),
        status = status.as_u16(),
        latency_ms = latency.as_secs_f64() * 1000.0,
        "request atendido"
    );

    Ok(())
}

/// Decide la respuesta para un request ya parseado
///
/// Es la parte del handler que toca el estado compartido; no hace I/O de red.
pub fn respond(request: &Request, identity: &str, ctx: &HandlerContext) -> Response {
    let limiter = &ctx.state.limiter;
    if !limiter.allow(identity) {
        warn!(peer = %identity, path = request.path(), "rate limit excedido");
        return Response::too_many_requests(limiter.retry_after_secs());
    }

    if !ctx.delay.is_zero() {
        thread::sleep(ctx.delay);
    }

    if request.path() == METRICS_PATH {
        return metrics_response(ctx);
    }

    match ctx.provider.fetch(request.path()) {
        Ok(Fetched::File {
            resource,
            content_type,
            bytes,
        }) => {
            ctx.state.hits.bump(&resource);
            Response::file(content_type, bytes)
        }
        Ok(Fetched::Directory { resource, entries }) => {
            Response::html(&listing::render(&resource, &entries, &ctx.state.hits))
        }
        Ok(Fetched::Absent) => Response::not_found(),
        Err(e) => {
            warn!(path = request.path(), error = %e, "no se pudo leer el recurso");
            Response::error(StatusCode::InternalServerError, "Could not read resource")
        }
    }
}

fn metrics_response(ctx: &HandlerContext) -> Response {
    let report = MetricsReport {
        server: ctx.metrics.snapshot(),
        tracked_clients: ctx.state.limiter.tracked_clients(),
        rate_limit: ctx.state.limiter.limit(),
        rate_window_secs: ctx.state.limiter.window().as_secs_f64(),
        counter_safe: ctx.state.hits.strategy().is_safe(),
        hits: ctx.state.hits.snapshot_all().into_iter().collect(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(body) => Response::json(&body),
        Err(e) => Response::error(StatusCode::InternalServerError, &e.to_string()),
    }
}

/// Lee hasta el fin de los headers (`\r\n\r\n` o `\n\n`), EOF o `MAX_REQUEST_BYTES`
fn read_request(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if headers_complete(&buffer) || buffer.len() >= MAX_REQUEST_BYTES {
            break;
        }
    }

    buffer.truncate(MAX_REQUEST_BYTES);
    Ok(buffer)
}

fn headers_complete(buffer: &[u8]) -> bool {
    buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.windows(2).any(|w| w == b"\n\n")
}

fn send(stream: &mut TcpStream, response: Response, method: Method) -> std::io::Result<()> {
    let mut response = match method {
        Method::HEAD => response.into_head(),
        Method::GET => response,
    };
    response.add_header("Server", "file_server/0.1");
    response.add_header("Connection", "close");

    stream.write_all(&response.to_bytes())?;
    stream.flush()
}
