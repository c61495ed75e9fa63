//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Sólo los códigos que el servidor de archivos realmente emite.

/// Códigos de estado que soporta el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Archivo o listado servido
    Ok = 200,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 404 Not Found - No existe, está fuera del root o el tipo no se sirve
    NotFound = 404,

    /// 429 Too Many Requests - Rate limiting activado
    TooManyRequests = 429,

    /// 500 Internal Server Error - Falla al leer un archivo que sí existe
    InternalServerError = 500,
}

impl StatusCode {
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::TooManyRequests.as_u16(), 429);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::TooManyRequests => "Too Many Requests",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
