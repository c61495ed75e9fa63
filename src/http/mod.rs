//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Protocolo mínimo que habla el servidor de archivos: un request por
//! conexión, respuesta HTTP/1.0 con `Content-Length` y cierre.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /www/index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 429 Too Many Requests\r\n
//! Retry-After: 1\r\n
//! Content-Length: 41\r\n
//! \r\n
//! Too Many Requests: retry after 1 second
//! ```

pub mod request;
pub mod response;
pub mod status;

pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
