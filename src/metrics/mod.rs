//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Este módulo implementa la recolección y agregación de métricas del pool:
//! - Contadores de tareas (enviadas, rechazadas, completadas, fallidas, descartadas)
//! - Arranques y salidas de workers
//! - Latencias de ejecución (p50, p95, p99)

pub mod collector;

pub use collector::{MetricsSnapshot, PoolMetrics};
