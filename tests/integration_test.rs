//! Tests de integración para el servidor de archivos
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en 127.0.0.1:0 dentro de un thread
//! y le habla HTTP crudo por TcpStream.

use file_server::config::Config;
use file_server::server::Server;
use file_server::state::SharedState;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Crea un directorio raíz con archivos de prueba
///
/// El `TempDir` tiene que vivir hasta el final del test; al soltarlo se
/// borra todo el árbol.
fn make_root() -> (TempDir, PathBuf) {
    let base = TempDir::new().unwrap();
    let root = base.path().join("www");
    std::fs::create_dir_all(root.join("docs")).unwrap();
    std::fs::write(root.join("index.html"), "<h1>Bienvenido</h1>").unwrap();
    std::fs::write(root.join("image.png"), [0x89, b'P', b'N', b'G']).unwrap();
    std::fs::write(root.join("docs").join("doc.pdf"), "%PDF-1.4").unwrap();
    std::fs::write(root.join("script.sh"), "echo no").unwrap();
    std::fs::write(base.path().join("secret.html"), "fuera de la raíz").unwrap();
    (base, root)
}

fn config(root: &Path) -> Config {
    Config {
        root: root.to_string_lossy().into_owned(),
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Config::default()
    }
}

/// Levanta el servidor en background; queda vivo hasta que termine el test
fn start(config: Config) -> (SocketAddr, SharedState) {
    let server = Server::bind(config).expect("bind");
    let addr = server.local_addr().unwrap();
    let state = server.state().clone();
    thread::spawn(move || server.run());
    (addr, state)
}

/// Envía un GET y retorna (status, response completa)
fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    write!(stream, "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n", path).unwrap();

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    let text = String::from_utf8_lossy(&buf).into_owned();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .unwrap_or(0);
    (status, text)
}

/// Lanza `n` GET simultáneos y retorna sus status
fn burst(addr: SocketAddr, path: &'static str, n: usize) -> Vec<u16> {
    let barrier = Arc::new(Barrier::new(n));
    let handles: Vec<_> = (0..n)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                get(addr, path).0
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
}

#[test]
fn test_serves_html_png_pdf() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    let (status, text) = get(addr, "/index.html");
    assert_eq!(status, 200);
    assert!(text.contains("Content-Type: text/html\r\n"));
    assert!(text.contains("Content-Length: 19\r\n"));
    assert_eq!(body(&text), "<h1>Bienvenido</h1>");

    let (status, text) = get(addr, "/image.png");
    assert_eq!(status, 200);
    assert!(text.contains("Content-Type: image/png"));

    let (status, text) = get(addr, "/docs/doc.pdf");
    assert_eq!(status, 200);
    assert!(text.contains("Content-Type: application/pdf"));
}

#[test]
fn test_not_found_cases() {
    let (_base, root) = make_root();
    let (addr, state) = start(config(&root));

    let (status, text) = get(addr, "/missing.html");
    assert_eq!(status, 404);
    assert!(body(&text).contains("404 Not Found"));

    // Tipo no permitido
    assert_eq!(get(addr, "/script.sh").0, 404);

    // Path traversal
    assert_eq!(get(addr, "/../secret.html").0, 404);
    assert_eq!(get(addr, "/docs/%2E%2E/%2E%2E/secret.html").0, 404);

    assert!(state.hits.snapshot_all().is_empty());
}

#[test]
fn test_sixth_request_is_rate_limited() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    let statuses: Vec<u16> = (0..6).map(|_| get(addr, "/index.html").0).collect();
    assert_eq!(statuses, vec![200, 200, 200, 200, 200, 429]);

    let (status, text) = get(addr, "/index.html");
    assert_eq!(status, 429);
    assert!(text.contains("Retry-After: 1\r\n"));
    assert!(body(&text).contains("Too Many Requests"));
}

#[test]
fn test_rate_limit_window_expires() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    for _ in 0..5 {
        assert_eq!(get(addr, "/index.html").0, 200);
    }
    assert_eq!(get(addr, "/index.html").0, 429);

    thread::sleep(Duration::from_millis(1100));
    assert_eq!(get(addr, "/index.html").0, 200);
}

#[test]
fn test_rate_limited_requests_not_counted_as_hits() {
    let (_base, root) = make_root();
    let (addr, state) = start(config(&root));

    for _ in 0..8 {
        get(addr, "/index.html");
    }

    assert_eq!(state.hits.snapshot("/index.html"), 5);
}

#[test]
fn test_listing_shows_hits() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    get(addr, "/index.html");
    get(addr, "/index.html");

    let (status, text) = get(addr, "/");
    assert_eq!(status, 200);
    let html = body(&text);
    assert!(html.contains("<th>Hits</th>"));
    assert!(html.contains("<a href=\"/index.html\">index.html</a></td><td>2</td>"));
    assert!(html.contains("<a href=\"/docs/\">docs/</a>"));

    let (status, text) = get(addr, "/docs/");
    assert_eq!(status, 200);
    assert!(body(&text).contains("Parent Directory"));
}

#[test]
fn test_metrics_endpoint() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    get(addr, "/index.html");
    let (status, text) = get(addr, "/_metrics");
    assert_eq!(status, 200);

    let json: serde_json::Value = serde_json::from_str(body(&text)).unwrap();
    assert_eq!(json["hits"]["/index.html"], 1);
    assert_eq!(json["server"]["status_codes"]["200"], 1);
}

#[test]
fn test_safe_counter_exact_under_concurrency() {
    let (_base, root) = make_root();
    let mut cfg = config(&root);
    cfg.rate_limit = 10_000;
    let (addr, state) = start(cfg);

    let statuses = burst(addr, "/index.html", 60);
    assert!(statuses.iter().all(|s| *s == 200));

    // El último bump ocurre antes de escribir la respuesta
    assert_eq!(state.hits.snapshot("/index.html"), 60);
}

#[test]
fn test_unsafe_counter_loses_hits() {
    let (_base, root) = make_root();
    let mut cfg = config(&root);
    cfg.rate_limit = 10_000;
    cfg.unsafe_counter = true;
    cfg.race_demo = true;
    cfg.race_gap_ms = 50;
    let (addr, state) = start(cfg);

    let statuses = burst(addr, "/index.html", 60);
    assert!(statuses.iter().all(|s| *s == 200));

    let hits = state.hits.snapshot("/index.html");
    assert!(hits < 60, "se esperaban hits perdidos, hits = {}", hits);
}

#[test]
fn test_sequential_mode_serializes_requests() {
    let (_base, root) = make_root();
    let mut cfg = config(&root);
    cfg.rate_limit = 100;
    cfg.single_threaded = true;
    cfg.delay = 0.3;
    let (addr, _) = start(cfg);

    let start = Instant::now();
    let statuses = burst(addr, "/index.html", 4);
    let elapsed = start.elapsed();

    assert!(statuses.iter().all(|s| *s == 200));
    assert!(
        elapsed >= Duration::from_millis(1100),
        "modo secuencial debería tardar ~1.2s, tardó {:?}",
        elapsed
    );
}

#[test]
fn test_concurrent_mode_overlaps_requests() {
    let (_base, root) = make_root();
    let mut cfg = config(&root);
    cfg.rate_limit = 100;
    cfg.delay = 0.3;
    let (addr, _) = start(cfg);

    let start = Instant::now();
    let statuses = burst(addr, "/index.html", 4);
    let elapsed = start.elapsed();

    assert!(statuses.iter().all(|s| *s == 200));
    assert!(
        elapsed < Duration::from_millis(900),
        "modo concurrente debería tardar ~0.3s, tardó {:?}",
        elapsed
    );
}

#[test]
fn test_bare_lf_request_is_answered() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    // Sin shutdown de la escritura: el servidor no puede esperar EOF
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(b"GET /index.html HTTP/1.0\n\n").unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    let text = String::from_utf8_lossy(&buf).into_owned();

    assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(body(&text), "<h1>Bienvenido</h1>");
}

#[test]
fn test_malformed_request_does_not_stop_server() {
    let (_base, root) = make_root();
    let (addr, _) = start(config(&root));

    let mut stream = TcpStream::connect(addr).unwrap();
    stream.write_all(b"NOT AN HTTP REQUEST\r\n\r\n").unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).unwrap();
    assert!(String::from_utf8_lossy(&buf).contains("400 Bad Request"));

    assert_eq!(get(addr, "/index.html").0, 200);
}
