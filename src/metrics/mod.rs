//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Contadores de requests, respuestas 429, latencias (p50, p95, p99) y
//! handlers activos. Se exponen como JSON en `/_metrics`.

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot};
