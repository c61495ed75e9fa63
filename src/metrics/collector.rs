//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta métricas del servidor en tiempo real: requests por status,
//! cuántos fueron frenados por el rate limiter, latencias y threads de
//! handler vivos.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Latencias que se guardan para calcular percentiles
const MAX_LATENCIES: usize = 10_000;

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Default)]
struct MetricsData {
    total_requests: u64,

    /// Requests por código de estado
    status_codes: BTreeMap<u16, u64>,

    /// Respuestas 429
    rate_limited: u64,

    /// Latencias registradas (en microsegundos), ventana circular
    latencies: Vec<u64>,
    next_slot: usize,

    /// Handlers ejecutándose ahora mismo
    active_handlers: u64,

    /// Máximo de handlers simultáneos observado
    peak_handlers: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    /// Un thread que entró en pánico no invalida las métricas
    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registra un request ya respondido
    pub fn record_request(&self, status_code: u16, latency: Duration) {
        let mut data = self.data();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;
        if status_code == 429 {
            data.rate_limited += 1;
        }

        let latency_us = latency.as_micros() as u64;
        if data.latencies.len() < MAX_LATENCIES {
            data.latencies.push(latency_us);
        } else {
            let slot = data.next_slot;
            data.latencies[slot] = latency_us;
        }
        data.next_slot = (data.next_slot + 1) % MAX_LATENCIES;
    }

    /// Un handler empezó
    pub fn handler_started(&self) {
        let mut data = self.data();
        data.active_handlers += 1;
        data.peak_handlers = data.peak_handlers.max(data.active_handlers);
    }

    /// Un handler terminó (nunca baja de cero)
    pub fn handler_finished(&self) {
        let mut data = self.data();
        data.active_handlers = data.active_handlers.saturating_sub(1);
    }

    pub fn active_handlers(&self) -> u64 {
        self.data().active_handlers
    }

    /// Snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let (p50, p95, p99, avg) = percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            total_requests: data.total_requests,
            rate_limited: data.rate_limited,
            status_codes: data
                .status_codes
                .iter()
                .map(|(code, count)| (code.to_string(), *count))
                .collect(),
            active_handlers: data.active_handlers,
            peak_handlers: data.peak_handlers,
            latency_us: LatencySummary {
                p50,
                p95,
                p99,
                avg,
                samples: data.latencies.len(),
            },
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula p50, p95, p99 y promedio
fn percentiles(latencies: &[u64]) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];
    let avg = sorted.iter().sum::<u64>() / len as u64;

    (p50, p95, p99, avg)
}

/// Snapshot de métricas (para el endpoint `/_metrics`)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub total_requests: u64,
    pub rate_limited: u64,
    pub status_codes: BTreeMap<String, u64>,
    pub active_handlers: u64,
    pub peak_handlers: u64,
    pub latency_us: LatencySummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencySummary {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
    pub samples: usize,
}
