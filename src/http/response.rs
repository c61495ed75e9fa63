//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Las respuestas que emite el servidor de archivos:
//!
//! | Caso                 | Status | Body                         |
//! |----------------------|--------|------------------------------|
//! | archivo servido      | 200    | bytes del archivo            |
//! | listado de directorio| 200    | HTML con columna "Hits"      |
//! | no existe / tipo raro| 404    | HTML mínimo                  |
//! | rate limit           | 429    | texto + `Retry-After`        |
//! | request malformado   | 400    | JSON `{"error": ...}`        |
//!
//! ```
//! use file_server::http::{Response, StatusCode};
//!
//! let response = Response::too_many_requests(1);
//! assert_eq!(response.status(), StatusCode::TooManyRequests);
//! assert_eq!(response.header("Retry-After"), Some("1"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

/// Body del 404
const NOT_FOUND_HTML: &str = "<html><body><h1>404 Not Found</h1></body></html>";

/// Respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    body: Vec<u8>,
}

impl Response {
    /// Respuesta vacía con `Content-Length: 0`
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
        .with_body_bytes(Vec::new())
    }

    /// Agrega (o reemplaza) un header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el body y recalcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.headers
            .insert("Content-Length".to_string(), body.len().to_string());
        self.body = body;
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// 200 con el contenido de un archivo
    pub fn file(content_type: &str, bytes: Vec<u8>) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", content_type)
            .with_body_bytes(bytes)
    }

    /// 200 con HTML (listados de directorio)
    pub fn html(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_body(body)
    }

    /// 404 con el HTML mínimo
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
            .with_header("Content-Type", "text/html")
            .with_body(NOT_FOUND_HTML)
    }

    /// 429 indicando cuántos segundos esperar
    pub fn too_many_requests(retry_after_secs: u64) -> Self {
        let unit = if retry_after_secs == 1 { "second" } else { "seconds" };
        let body = format!(
            "Too Many Requests: retry after {} {}\n",
            retry_after_secs, unit
        );
        Self::new(StatusCode::TooManyRequests)
            .with_header("Content-Type", "text/plain")
            .with_header("Retry-After", &retry_after_secs.to_string())
            .with_body(&body)
    }

    /// Error con body JSON `{"error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(&body)
    }

    /// 200 con body JSON
    pub fn json(body: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Quita el body conservando `Content-Length` (para HEAD)
    pub fn into_head(mut self) -> Self {
        self.body.clear();
        self
    }

    /// Serializa la respuesta para escribirla en el socket
    ///
    /// ```text
    /// HTTP/1.0 200 OK\r\n
    /// Content-Type: text/html\r\n
    /// Content-Length: 5\r\n
    /// \r\n
    /// hello
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.0 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
