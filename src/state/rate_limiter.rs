//! # Rate Limiter por Cliente
//! src/state/rate_limiter.rs
//!
//! Control de admisión con ventana deslizante. Para cada cliente se guarda
//! la lista de instantes de sus requests admitidos que siguen dentro de la
//! ventana.
//!
//! ## Algoritmo
//!
//! ```text
//! allow(ip):
//!   lock(log[ip])
//!   now = clock.now()
//!   descartar t  donde  now - t >= window
//!   si len(log) < limit  → push(now), true
//!   si no                → false (el intento NO se registra)
//! ```
//!
//! ## Granularidad del lock
//!
//! El log vive en un `DashMap`: la entrada de cada cliente se modifica con el
//! lock de escritura de su shard tomado, así que leer, podar, comparar y
//! agregar es una sola operación indivisible para ese cliente. Clientes en
//! shards distintos no compiten entre sí.

use super::clock::{Clock, SystemClock};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Requests admitidos por ventana (por defecto)
pub const DEFAULT_LIMIT: usize = 5;

/// Largo de la ventana (por defecto)
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Rate limiter de ventana deslizante, seguro entre threads
pub struct RateLimiter {
    /// Cliente → instantes admitidos, en orden cronológico
    log: DashMap<String, VecDeque<Instant>>,
    limit: usize,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Crea un limiter que usa el reloj del sistema
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::state::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::new(2, Duration::from_secs(1));
    /// assert!(limiter.allow("10.0.0.1"));
    /// assert!(limiter.allow("10.0.0.1"));
    /// assert!(!limiter.allow("10.0.0.1"));
    /// ```
    pub fn new(limit: usize, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    /// Crea un limiter con un reloj inyectado (útil para tests)
    pub fn with_clock(limit: usize, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            log: DashMap::new(),
            limit,
            window,
            clock,
        }
    }

    /// Decide si el cliente puede continuar
    ///
    /// Una negación no es un error: el handler la traduce a 429.
    pub fn allow(&self, identity: &str) -> bool {
        // El RefMut mantiene el lock del shard hasta el final de la función
        let mut entries = self.log.entry(identity.to_string()).or_default();
        let now = self.clock.now();

        while let Some(&oldest) = entries.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                entries.pop_front();
            } else {
                break;
            }
        }

        if entries.len() < self.limit {
            entries.push_back(now);
            true
        } else {
            false
        }
    }

    /// Cantidad de admisiones registradas para el cliente
    ///
    /// Lectura de diagnóstico: no poda, así que puede incluir instantes ya
    /// vencidos hasta el próximo `allow` de ese cliente.
    pub fn recorded(&self, identity: &str) -> usize {
        self.log.get(identity).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Clientes distintos vistos desde el arranque
    pub fn tracked_clients(&self) -> usize {
        self.log.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Valor para el header `Retry-After` (segundos enteros, mínimo 1)
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.window.as_secs_f64().ceil() as u64;
        secs.max(1)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MockClock;
    use std::sync::Barrier;
    use std::thread;

    fn mock_limiter(limit: usize, window: Duration) -> (RateLimiter, MockClock) {
        let clock = MockClock::new();
        let limiter = RateLimiter::with_clock(limit, window, Arc::new(clock.clone()));
        (limiter, clock)
    }

    #[test]
    fn test_sixth_call_is_denied() {
        let limiter = RateLimiter::default();
        let results: Vec<bool> = (0..6).map(|_| limiter.allow("ip1")).collect();
        assert_eq!(results, vec![true, true, true, true, true, false]);
    }

    #[test]
    fn test_denied_attempts_are_not_recorded() {
        let (limiter, _clock) = mock_limiter(5, DEFAULT_WINDOW);
        for _ in 0..20 {
            limiter.allow("ip1");
        }
        assert_eq!(limiter.recorded("ip1"), 5);
    }

    #[test]
    fn test_allowed_again_after_window() {
        let (limiter, clock) = mock_limiter(5, DEFAULT_WINDOW);
        for _ in 0..5 {
            assert!(limiter.allow("ip1"));
        }
        assert!(!limiter.allow("ip1"));

        clock.advance(Duration::from_millis(1001));
        assert!(limiter.allow("ip1"));
    }

    #[test]
    fn test_timestamp_at_window_edge_is_expired() {
        let (limiter, clock) = mock_limiter(1, DEFAULT_WINDOW);
        assert!(limiter.allow("ip1"));

        clock.advance(Duration::from_millis(999));
        assert!(!limiter.allow("ip1"));

        // now - t == window: ya no cuenta
        clock.advance(Duration::from_millis(1));
        assert!(limiter.allow("ip1"));
    }

    #[test]
    fn test_sliding_not_fixed_bucket() {
        let (limiter, clock) = mock_limiter(2, DEFAULT_WINDOW);
        assert!(limiter.allow("ip1")); // t=0
        clock.advance(Duration::from_millis(600));
        assert!(limiter.allow("ip1")); // t=600
        clock.advance(Duration::from_millis(500));
        // t=1100: el de t=0 venció, el de t=600 sigue
        assert!(limiter.allow("ip1"));
        assert!(!limiter.allow("ip1"));
        assert_eq!(limiter.recorded("ip1"), 2);
    }

    #[test]
    fn test_identities_are_independent() {
        let (limiter, _clock) = mock_limiter(5, DEFAULT_WINDOW);
        for _ in 0..5 {
            assert!(limiter.allow("ip1"));
        }
        assert!(!limiter.allow("ip1"));
        assert!(limiter.allow("ip2"));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_unseen_identity_starts_empty() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.recorded("never-seen"), 0);
        assert!(limiter.allow("never-seen"));
    }

    #[test]
    fn test_concurrent_callers_never_exceed_limit() {
        let (limiter, _clock) = mock_limiter(5, DEFAULT_WINDOW);
        let limiter = Arc::new(limiter);
        let barrier = Arc::new(Barrier::new(64));

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    limiter.allow("ip1")
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(admitted, 5);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(RateLimiter::new(5, Duration::from_secs(1)).retry_after_secs(), 1);
        assert_eq!(RateLimiter::new(5, Duration::from_millis(1500)).retry_after_secs(), 2);
        assert_eq!(RateLimiter::new(5, Duration::from_millis(200)).retry_after_secs(), 1);
    }
}
