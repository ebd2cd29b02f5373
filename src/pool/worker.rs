//! # Workers del Pool
//! src/pool/worker.rs
//!
//! Cada worker es un thread de larga vida que reclama tareas de la cola
//! compartida y las ejecuta fuera del lock. Los fallos de una tarea (panic o
//! `Err`) se capturan aquí y nunca matan al worker.

use crate::metrics::PoolMetrics;
use crate::pool::error::TaskFailure;
use crate::pool::queue::TaskQueue;
use crate::pool::types::Job;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Instant;

/// Un worker del pool
pub(crate) struct Worker {
    id: usize,
    thread: JoinHandle<()>,
}

impl Worker {
    /// Lanza el thread del worker
    pub fn spawn(
        id: usize,
        name: String,
        stack_size: Option<usize>,
        queue: Arc<TaskQueue>,
        metrics: PoolMetrics,
    ) -> io::Result<Self> {
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }

        let thread = builder.spawn(move || worker_loop(id, &queue, &metrics))?;

        Ok(Self { id, thread })
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread.thread().id()
    }

    /// Espera a que el thread termine
    pub fn join(self) {
        if self.thread.join().is_err() {
            tracing::error!(worker = self.id, "Worker entró en pánico fuera de una tarea");
        }
    }
}

/// Loop principal del worker
fn worker_loop(id: usize, queue: &TaskQueue, metrics: &PoolMetrics) {
    metrics.record_worker_start();
    queue.worker_started();
    tracing::debug!(worker = id, "🔧 Worker iniciado");

    // `claim` solo retorna None con stopping activo y la cola vacía
    while let Some(job) = queue.claim() {
        let start = Instant::now();
        let outcome = run_job(job);
        let latency = start.elapsed();

        queue.task_done();

        match outcome {
            Ok(()) => {
                metrics.record_task(latency, true);
                tracing::trace!(
                    worker = id,
                    latency_us = latency.as_micros() as u64,
                    "Tarea completada"
                );
            }
            Err(failure) => {
                metrics.record_task(latency, false);
                tracing::error!(worker = id, error = %failure, "❌ Tarea fallida");
            }
        }
    }

    metrics.record_worker_exit();
    queue.worker_exited();
    tracing::debug!(worker = id, "Worker terminando");
}

/// Ejecuta una tarea aislando sus panics
fn run_job(job: Job) -> Result<(), TaskFailure> {
    panic::catch_unwind(AssertUnwindSafe(job))
        .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload)))
}
