//! # Collector de Métricas del Pool
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del pool en tiempo real: tareas enviadas,
//! rechazadas, completadas, fallidas y descartadas, arranques/salidas de
//! workers y latencias de ejecución.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct PoolMetrics {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Tareas aceptadas por `submit`
    submitted: u64,

    /// Tareas rechazadas (pool cerrado o cola llena)
    rejected: u64,

    /// Tareas que terminaron sin error
    completed: u64,

    /// Tareas que entraron en pánico o retornaron `Err`
    failed: u64,

    /// Tareas descartadas en el shutdown sin ejecutarse
    abandoned: u64,

    worker_starts: u64,
    worker_exits: u64,

    /// Latencias registradas (en microsegundos)
    latencies: VecDeque<u64>,

    /// Máximo de latencias a guardar (para calcular percentiles)
    max_latencies: usize,
}

impl PoolMetrics {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                submitted: 0,
                rejected: 0,
                completed: 0,
                failed: 0,
                abandoned: 0,
                worker_starts: 0,
                worker_exits: 0,
                latencies: VecDeque::with_capacity(10000),
                max_latencies: 10000, // Guardar últimas 10k latencias
            })),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_submitted(&self) {
        self.data().submitted += 1;
    }

    pub fn record_rejected(&self) {
        self.data().rejected += 1;
    }

    pub fn record_abandoned(&self, count: usize) {
        self.data().abandoned += count as u64;
    }

    pub fn record_worker_start(&self) {
        self.data().worker_starts += 1;
    }

    pub fn record_worker_exit(&self) {
        self.data().worker_exits += 1;
    }

    /// Registra la finalización de una tarea
    pub fn record_task(&self, latency: Duration, succeeded: bool) {
        let mut data = self.data();

        if succeeded {
            data.completed += 1;
        } else {
            data.failed += 1;
        }

        let latency_us = latency.as_micros() as u64;

        // Si tenemos demasiadas latencias, eliminar las más antiguas
        if data.latencies.len() >= data.max_latencies {
            data.latencies.pop_front();
        }
        data.latencies.push_back(latency_us);
    }

    /// Obtiene un snapshot de las métricas
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        let data = self.data();
        let (p50, p95, p99, avg) = calculate_percentiles(&data.latencies);

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            submitted: data.submitted,
            rejected: data.rejected,
            completed: data.completed,
            failed: data.failed,
            abandoned: data.abandoned,
            worker_starts: data.worker_starts,
            worker_exits: data.worker_exits,
            latency_us: LatencySummary {
                p50,
                p95,
                p99,
                avg,
                samples: data.latencies.len(),
            },
        }
    }

    /// Obtiene las métricas actuales en formato JSON
    pub fn get_metrics_json(&self) -> String {
        serde_json::to_string_pretty(&self.get_snapshot())
            .unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Calcula percentiles de latencia
fn calculate_percentiles(latencies: &VecDeque<u64>) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted: Vec<u64> = latencies.iter().copied().collect();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];

    let sum: u64 = sorted.iter().sum();
    let avg = sum / len as u64;

    (p50, p95, p99, avg)
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub submitted: u64,
    pub rejected: u64,
    pub completed: u64,
    pub failed: u64,
    pub abandoned: u64,
    pub worker_starts: u64,
    pub worker_exits: u64,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counters() {
        let metrics = PoolMetrics::new();

        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_rejected();
        metrics.record_task(Duration::from_millis(10), true);
        metrics.record_task(Duration::from_millis(5), false);
        metrics.record_abandoned(3);

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.submitted, 2);
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.abandoned, 3);
    }

    #[test]
    fn test_worker_lifecycle_counters() {
        let metrics = PoolMetrics::new();

        metrics.record_worker_start();
        metrics.record_worker_start();
        metrics.record_worker_exit();

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.worker_starts, 2);
        assert_eq!(snapshot.worker_exits, 1);
    }

    #[test]
    fn test_percentiles() {
        let metrics = PoolMetrics::new();

        // Registrar latencias conocidas
        for i in 1..=100 {
            metrics.record_task(Duration::from_micros(i), true);
        }

        let latency = metrics.get_snapshot().latency_us;
        assert!(latency.p50 > 0);
        assert!(latency.p95 > latency.p50);
        assert!(latency.p99 > latency.p95);
        assert_eq!(latency.samples, 100);
    }

    #[test]
    fn test_empty_percentiles() {
        let metrics = PoolMetrics::new();
        let latency = metrics.get_snapshot().latency_us;
        assert_eq!(latency.p50, 0);
        assert_eq!(latency.avg, 0);
        assert_eq!(latency.samples, 0);
    }

    #[test]
    fn test_latency_window_management() {
        let metrics = PoolMetrics::new();

        // Agregar más latencias que el tamaño de la ventana
        for i in 0..15000 {
            metrics.record_task(Duration::from_micros(i), true);
        }

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.completed, 15000);
        assert_eq!(snapshot.latency_us.samples, 10000);
    }

    #[test]
    fn test_json_format() {
        let metrics = PoolMetrics::new();
        metrics.record_submitted();
        metrics.record_task(Duration::from_millis(50), true);

        let json = metrics.get_metrics_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["submitted"], 1);
        assert_eq!(value["completed"], 1);
        assert!(value["latency_us"]["p50"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_clones_share_data() {
        let metrics = PoolMetrics::new();
        let clone = metrics.clone();

        clone.record_submitted();
        assert_eq!(metrics.get_snapshot().submitted, 1);
    }

    #[test]
    fn test_latency_window_keeps_latest() {
        let metrics = PoolMetrics::new();

        for _ in 0..10_000 {
            metrics.record_task(Duration::from_micros(1), true);
        }
        // Las nuevas desplazan a las más antiguas
        for _ in 0..10_000 {
            metrics.record_task(Duration::from_micros(500), true);
        }

        let snapshot = metrics.get_snapshot();
        assert_eq!(snapshot.completed, 20_000);
        assert_eq!(snapshot.latency_us.samples, 10_000);
        assert_eq!(snapshot.latency_us.p50, 500);
        assert_eq!(snapshot.latency_us.avg, 500);
    }
}
