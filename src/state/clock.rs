//! # Fuente de Tiempo
//! src/state/clock.rs
//!
//! El rate limiter no llama a `Instant::now()` directamente sino a un
//! `Clock`. En producción se usa `SystemClock`; en tests, `MockClock`
//! permite avanzar el tiempo a mano y probar los bordes de la ventana
//! sin dormir.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fuente de instantes monotónicos
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Reloj real del sistema
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Reloj controlable para tests
///
/// Todos los clones comparten el mismo instante: avanzar uno avanza todos.
///
/// # Ejemplo
/// ```
/// use file_server::state::{Clock, MockClock};
/// use std::time::Duration;
///
/// let clock = MockClock::new();
/// let t0 = clock.now();
/// clock.advance(Duration::from_millis(500));
/// assert_eq!(clock.now() - t0, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Avanza el reloj una duración
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += by;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
