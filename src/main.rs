//! # File Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y bloquea el thread
//! principal aceptando conexiones.

use file_server::config::Config;
use file_server::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new();
    config.print_summary();

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo iniciar el servidor");
            std::process::exit(1);
        }
    };

    // Bloquea para siempre
    server.run();
}
