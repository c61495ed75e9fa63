//! # Contador de Hits por Recurso
//! src/state/hit_counter.rs
//!
//! Cuenta cuántas veces se sirvió cada archivo. Hay dos estrategias, fijadas
//! al arrancar el servidor:
//!
//! - **Safe**: el read-modify-write ocurre con el lock de la entrada tomado.
//!   N `bump` concurrentes terminan sumando exactamente N.
//! - **UnsafeDemo**: lee, suelta el lock, duerme `gap` y escribe `leído + 1`.
//!   Dos threads que leen el mismo valor escriben el mismo resultado y uno de
//!   los incrementos se pierde (lost update). Existe para la demo de race
//!   conditions del laboratorio.
//!
//! ```text
//!   Thread A            Thread B
//!   read  → 7
//!                       read  → 7
//!   sleep(gap)          sleep(gap)
//!   write 8
//!                       write 8     ← se perdió un hit
//! ```

use dashmap::DashMap;
use std::thread;
use std::time::Duration;

/// Estrategia de actualización del contador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterStrategy {
    /// Incremento atómico respecto de otros `bump`
    #[default]
    Safe,

    /// Lectura y escritura separadas por `gap`, sin exclusión mutua
    UnsafeDemo { gap: Duration },
}

impl CounterStrategy {
    pub fn is_safe(&self) -> bool {
        matches!(self, CounterStrategy::Safe)
    }
}

/// Contador de hits compartido entre todos los handlers
pub struct HitCounter {
    /// Recurso → hits
    counts: DashMap<String, u64>,
    strategy: CounterStrategy,
}

impl HitCounter {
    /// Crea un contador vacío
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::state::{CounterStrategy, HitCounter};
    ///
    /// let counter = HitCounter::new(CounterStrategy::Safe);
    /// counter.bump("/index.html");
    /// counter.bump("/index.html");
    /// assert_eq!(counter.snapshot("/index.html"), 2);
    /// assert_eq!(counter.snapshot("/other.png"), 0);
    /// ```
    pub fn new(strategy: CounterStrategy) -> Self {
        Self {
            counts: DashMap::new(),
            strategy,
        }
    }

    /// Registra que el recurso se sirvió con éxito
    pub fn bump(&self, resource: &str) {
        match self.strategy {
            CounterStrategy::Safe => bump_locked(&self.counts, resource),
            CounterStrategy::UnsafeDemo { gap } => bump_racy(&self.counts, resource, gap),
        }
    }

    /// Valor actual del contador (0 si nunca se sirvió)
    ///
    /// Toma el lock de lectura del shard sólo lo necesario para copiar un
    /// `u64`: nunca ve un valor a medio escribir, pero puede ver uno viejo
    /// respecto de `bump` en curso.
    pub fn snapshot(&self, resource: &str) -> u64 {
        self.counts.get(resource).map(|hits| *hits).unwrap_or(0)
    }

    /// Copia de todos los contadores, ordenada por recurso
    pub fn snapshot_all(&self) -> Vec<(String, u64)> {
        let mut all: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        all.sort();
        all
    }

    pub fn strategy(&self) -> CounterStrategy {
        self.strategy
    }
}

impl Default for HitCounter {
    fn default() -> Self {
        Self::new(CounterStrategy::Safe)
    }
}

/// Incremento dentro de la sección crítica de la entrada
fn bump_locked(counts: &DashMap<String, u64>, resource: &str) {
    *counts.entry(resource.to_string()).or_insert(0) += 1;
}

/// Incremento con ventana de carrera entre la lectura y la escritura
fn bump_racy(counts: &DashMap<String, u64>, resource: &str, gap: Duration) {
    // El guard de lectura se libera al terminar esta sentencia
    let seen = counts.get(resource).map(|hits| *hits).unwrap_or(0);

    if !gap.is_zero() {
        thread::sleep(gap);
    }

    counts.insert(resource.to_string(), seen + 1);
}
