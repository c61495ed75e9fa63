//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno. Todo se decide
//! una vez al arrancar: modo de concurrencia, estrategia del contador y
//! parámetros del rate limiter.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! # Un thread por conexión, contador seguro (por defecto)
//! ./file_server www
//!
//! # Todo secuencial con 1 segundo de trabajo simulado por request
//! ./file_server www --single-threaded --delay 1
//!
//! # Demo de race condition en el contador de hits
//! ./file_server www --unsafe-counter --race-demo
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=9000 RATE_LIMIT=10 ./file_server www
//! ```

use crate::state::CounterStrategy;
use clap::Parser;
use std::time::Duration;

/// Gap del contador inseguro cuando no se pide `--race-demo`
const DEFAULT_UNSAFE_GAP: Duration = Duration::from_millis(1);

/// Cómo el dispatcher ejecuta los handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// Un request a la vez, en el thread que hace accept
    Sequential,

    /// Un thread nuevo por conexión, sin límite
    Concurrent,
}

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor de archivos HTTP concurrente con rate limiting y contador de hits")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Directorio que se sirve
    #[arg(default_value = "./www", env = "SERVE_ROOT")]
    pub root: String,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    // === Concurrencia ===

    /// Procesa las conexiones de a una (sin threads)
    #[arg(long = "single-threaded", env = "SINGLE_THREADED")]
    pub single_threaded: bool,

    /// Trabajo simulado por request, en segundos (ej: 0.5)
    #[arg(long, default_value = "0", env = "REQUEST_DELAY")]
    pub delay: f64,

    // === Contador de hits ===

    /// Usa el contador sin lock (pierde updates bajo carga)
    #[arg(long = "unsafe-counter", env = "UNSAFE_COUNTER")]
    pub unsafe_counter: bool,

    /// Agranda la ventana de carrera del contador inseguro
    #[arg(long = "race-demo", env = "RACE_DEMO")]
    pub race_demo: bool,

    /// Milisegundos entre lectura y escritura con --race-demo
    #[arg(long = "race-gap-ms", default_value = "10", env = "RACE_GAP_MS")]
    pub race_gap_ms: u64,

    // === Rate Limiting ===

    /// Requests admitidos por cliente dentro de la ventana
    #[arg(long = "rate-limit", default_value = "5", env = "RATE_LIMIT")]
    pub rate_limit: usize,

    /// Largo de la ventana del rate limiter, en segundos
    #[arg(long = "rate-window", default_value = "1.0", env = "RATE_WINDOW")]
    pub rate_window_secs: f64,
}

impl Config {
    /// Parsea argumentos CLI (y variables de entorno)
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección para bind (host:port)
    ///
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn concurrency_mode(&self) -> ConcurrencyMode {
        if self.single_threaded {
            ConcurrencyMode::Sequential
        } else {
            ConcurrencyMode::Concurrent
        }
    }

    pub fn counter_strategy(&self) -> CounterStrategy {
        if !self.unsafe_counter {
            return CounterStrategy::Safe;
        }
        let gap = if self.race_demo {
            Duration::from_millis(self.race_gap_ms)
        } else {
            DEFAULT_UNSAFE_GAP
        };
        CounterStrategy::UnsafeDemo { gap }
    }

    /// Delay por request; `validate` ya descartó los valores fuera de rango
    pub fn request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::ZERO)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.rate_window_secs).unwrap_or(Duration::from_secs(1))
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("Serving root must not be empty".to_string());
        }
        // try_from_secs_f64 rechaza NaN, negativos y valores que no entran en un Duration
        if Duration::try_from_secs_f64(self.delay).is_err() {
            return Err(format!("Delay must be a number of seconds >= 0 in range, got {}", self.delay));
        }
        if self.rate_limit == 0 {
            return Err("Rate limit must be >= 1".to_string());
        }
        match Duration::try_from_secs_f64(self.rate_window_secs) {
            Ok(window) if !window.is_zero() => {}
            _ => {
                return Err(format!(
                    "Rate window must be > 0 seconds and in range, got {}",
                    self.rate_window_secs
                ))
            }
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        let mode = match self.concurrency_mode() {
            ConcurrencyMode::Sequential => "sequential (single-threaded)",
            ConcurrencyMode::Concurrent => "concurrent (thread per connection)",
        };
        let counter = match self.counter_strategy() {
            CounterStrategy::Safe => "safe (locked)".to_string(),
            CounterStrategy::UnsafeDemo { gap } => format!("UNSAFE demo (gap {} ms)", gap.as_millis()),
        };

        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              File Server Configuration                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Root:         {}", self.root);
        println!();
        println!("👷 Concurrency:");
        println!("   Mode:         {}", mode);
        println!("   Delay:        {:.3} s per request", self.delay);
        println!();
        println!("🔢 Hit counter:  {}", counter);
        println!();
        println!("🚦 Rate Limiting:");
        println!("   Limit:        {} req per {:.1} s per IP", self.rate_limit, self.rate_window_secs);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: "./www".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            single_threaded: false,
            delay: 0.0,
            unsafe_counter: false,
            race_demo: false,
            race_gap_ms: 10,
            rate_limit: 5,
            rate_window_secs: 1.0,
        }
    }
}
