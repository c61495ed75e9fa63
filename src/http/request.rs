//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser mínimo para el servidor de archivos. Sólo interesa la request
//! line: método, path (ya decodificado) y versión. Los headers se guardan
//! por si algún handler los necesita.
//!
//! ## Formato
//!
//! ```text
//! GET /docs/mi%20archivo.pdf?x=1 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! El path resultante es `/docs/mi archivo.pdf` y la query `x=1`.

use std::collections::HashMap;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un archivo o listado
    GET,

    /// HEAD - Como GET pero sin body
    HEAD,
}

impl Method {
    fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
        }
    }
}

/// Request HTTP parseado
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Path decodificado, siempre empieza con '/'
    path: String,

    /// Query string cruda (sin el '?'), vacía si no hay
    query: String,

    headers: HashMap<String, String>,

    version: String,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío
    EmptyRequest,

    /// Formato inválido de la request line
    InvalidRequestLine,

    /// Método HTTP no soportado
    UnsupportedMethod(String),

    /// Versión HTTP distinta de 1.0/1.1
    InvalidHttpVersion(String),

    /// Header sin ':'
    InvalidHeader(String),

    /// Path con escapes '%' inválidos o que no es UTF-8
    InvalidPath(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported HTTP method: {}", m),
            ParseError::InvalidHttpVersion(v) => write!(f, "Invalid HTTP version: {}", v),
            ParseError::InvalidHeader(h) => write!(f, "Invalid header: {}", h),
            ParseError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea un request desde los bytes leídos del socket
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::Request;
    ///
    /// let raw = b"GET /www/index.html HTTP/1.1\r\nHost: localhost\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/www/index.html");
    /// assert_eq!(request.header("Host"), Some("localhost"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        // Los bytes no-UTF-8 no pueden formar una request line válida
        let text = std::str::from_utf8(buffer).map_err(|_| ParseError::InvalidRequestLine)?;

        if text.trim().is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // lines() corta en '\n' y descarta un '\r' final
        let mut lines = text.lines();
        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = Method::parse(parts[0])?;

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        let (raw_path, query) = match parts[1].split_once('?') {
            Some((path, query)) => (path, query.to_string()),
            None => (parts[1], String::new()),
        };
        if !raw_path.starts_with('/') {
            return Err(ParseError::InvalidPath(raw_path.to_string()));
        }
        let path = percent_decode(raw_path)?;

        let mut headers = HashMap::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(name.trim().to_string(), value.trim().to_string());
        }

        Ok(Request {
            method,
            path,
            query,
            headers,
            version,
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Decodifica escapes `%XX` de un path
///
/// A diferencia de una query string, en un path el '+' es literal.
fn percent_decode(raw: &str) -> Result<String, ParseError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| ParseError::InvalidPath(raw.to_string()))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| ParseError::InvalidPath(raw.to_string()))
}
