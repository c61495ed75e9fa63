//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: el dispatcher (accept + un handler por conexión)
//! - `handler`: lo que pasa dentro de cada conexión

pub mod handler;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::{HandlerContext, METRICS_PATH};
pub use tcp::Server;
