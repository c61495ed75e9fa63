//! # File Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP usado para demostrar conceptos de sistemas
//! operativos: un thread por conexión, estado compartido entre threads,
//! rate limiting por cliente y una race condition reproducible.
//!
//! ## Arquitectura
//!
//! - `server`: dispatcher TCP y handler de cada conexión
//! - `state`: estado compartido (rate limiter, contador de hits, reloj)
//! - `files`: proveedor de archivos y listado de directorios
//! - `http`: parsing de requests y construcción de responses
//! - `metrics`: métricas del servidor
//! - `config`: CLI y variables de entorno
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al iniciar servidor");
//! server.run();
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod metrics;
pub mod server;
pub mod state;

pub use error::{HandlerError, ServerError};
