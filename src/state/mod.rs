//! # Estado Compartido
//! src/state/mod.rs
//!
//! Todo el estado mutable que comparten los threads del servidor:
//!
//! - `rate_limiter`: log de admisiones por cliente (ventana deslizante)
//! - `hit_counter`: hits por recurso, con estrategia segura o de demo
//! - `clock`: fuente de tiempo inyectable
//!
//! Cada estructura tiene su propio lock y sólo se accede a través de sus
//! operaciones (`allow`, `bump`, `snapshot`). Un handler nunca sostiene los
//! dos locks a la vez.

pub mod clock;
pub mod hit_counter;
pub mod rate_limiter;

pub use clock::{Clock, MockClock, SystemClock};
pub use hit_counter::{CounterStrategy, HitCounter};
pub use rate_limiter::RateLimiter;

use std::sync::Arc;

/// Referencias al estado compartido que recibe cada handler
#[derive(Clone)]
pub struct SharedState {
    pub limiter: Arc<RateLimiter>,
    pub hits: Arc<HitCounter>,
}

impl SharedState {
    pub fn new(limiter: RateLimiter, hits: HitCounter) -> Self {
        Self {
            limiter: Arc::new(limiter),
            hits: Arc::new(hits),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(RateLimiter::default(), HitCounter::default())
    }
}
