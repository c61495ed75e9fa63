//! # Errores del Servidor
//! src/error.rs
//!
//! Ni la negación del rate limiter ni un archivo inexistente son errores:
//! son respuestas normales (429 y 404). Aquí sólo están las fallas reales.

use crate::http::request::ParseError;
use thiserror::Error;

/// Fallas al levantar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuración inválida: {0}")]
    InvalidConfig(String),

    #[error("no se pudo hacer bind en {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("directorio raíz inválido {path}: {source}")]
    Root {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fallas que terminan una conexión (nunca el servidor)
#[derive(Debug, Error)]
pub enum HandlerError {
    /// El peer cerró o falló la lectura/escritura
    #[error("error de I/O: {0}")]
    Io(#[from] std::io::Error),

    /// El request no se pudo parsear; ya se respondió 400
    #[error("request malformado: {0}")]
    Malformed(#[from] ParseError),
}
