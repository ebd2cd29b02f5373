//! # Pool de Workers
//! src/pool/thread_pool.rs
//!
//! Pool de tamaño fijo: los workers se crean una sola vez al construir el
//! pool y viven hasta el shutdown. `submit` encola y retorna de inmediato;
//! `shutdown` deja de aceptar trabajo, despierta a todos los workers y espera
//! a que terminen.

use crate::metrics::PoolMetrics;
use crate::pool::error::{PoolError, TaskFailure};
use crate::pool::handle::TaskHandle;
use crate::pool::queue::TaskQueue;
use crate::pool::types::{FullPolicy, Job, PoolStats, ShutdownMode};
use crate::pool::worker::Worker;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

/// Configuración del pool antes de construirlo
///
/// # Ejemplo
/// ```
/// use pool_server::pool::{FullPolicy, WorkerPool};
///
/// let pool = WorkerPool::builder()
///     .workers(2)
///     .queue_capacity(64)
///     .full_policy(FullPolicy::Reject)
///     .build()
///     .unwrap();
///
/// pool.submit(|| println!("hola desde un worker")).unwrap();
/// pool.shutdown();
/// ```
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    workers: usize,
    queue_capacity: Option<usize>,
    full_policy: FullPolicy,
    shutdown_mode: ShutdownMode,
    thread_name: String,
    stack_size: Option<usize>,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: None,
            full_policy: FullPolicy::Block,
            shutdown_mode: ShutdownMode::Abandon,
            thread_name: "pool-worker".to_string(),
            stack_size: None,
        }
    }
}

impl PoolBuilder {
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Acota la cola a `capacity` tareas pendientes
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Cola sin límite (por defecto)
    pub fn unbounded(mut self) -> Self {
        self.queue_capacity = None;
        self
    }

    pub fn full_policy(mut self, policy: FullPolicy) -> Self {
        self.full_policy = policy;
        self
    }

    pub fn shutdown_mode(mut self, mode: ShutdownMode) -> Self {
        self.shutdown_mode = mode;
        self
    }

    /// Prefijo del nombre de los threads (`{prefijo}-{id}`)
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    /// Valida la configuración y arranca los workers
    ///
    /// Retorna solo cuando todos los workers entraron a su loop.
    pub fn build(self) -> Result<WorkerPool, PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfiguration(
                "worker count must be >= 1".to_string(),
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(PoolError::InvalidConfiguration(
                "queue capacity must be >= 1".to_string(),
            ));
        }

        let queue = Arc::new(TaskQueue::new(self.queue_capacity, self.full_policy));
        let metrics = PoolMetrics::new();
        let mut workers = Vec::with_capacity(self.workers);

        for id in 0..self.workers {
            let spawned = Worker::spawn(
                id,
                format!("{}-{}", self.thread_name, id),
                self.stack_size,
                Arc::clone(&queue),
                metrics.clone(),
            );

            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    tracing::error!(worker = id, error = %e, "❌ Error al crear worker");

                    // Bajar los que sí arrancaron
                    queue.close(ShutdownMode::Abandon);
                    for worker in workers {
                        worker.join();
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        queue.wait_started(self.workers);

        tracing::info!(
            workers = self.workers,
            capacity = ?self.queue_capacity,
            full_policy = self.full_policy.as_str(),
            shutdown_mode = self.shutdown_mode.as_str(),
            "🔧 Pool de workers iniciado"
        );

        let worker_ids = workers.iter().map(Worker::thread_id).collect();

        Ok(WorkerPool {
            queue,
            workers: Mutex::new(workers),
            worker_ids,
            worker_count: self.workers,
            shutdown_mode: self.shutdown_mode,
            metrics,
        })
    }
}

/// Pool fijo de workers
pub struct WorkerPool {
    queue: Arc<TaskQueue>,

    /// Handles de los threads; los toma quien haga el primer join
    workers: Mutex<Vec<Worker>>,

    worker_ids: Vec<ThreadId>,
    worker_count: usize,
    shutdown_mode: ShutdownMode,
    metrics: PoolMetrics,
}

impl WorkerPool {
    /// Crea un pool con `workers` threads y la configuración por defecto
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        Self::builder().workers(workers).build()
    }

    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    /// Envía una tarea fire-and-forget
    ///
    /// Falla con `PoolClosed` si el shutdown ya empezó.
    pub fn submit<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(move || {
            task();
            Ok(())
        }))
    }

    /// Envía una tarea que puede fallar
    ///
    /// El `Err` se reporta en el worker como `TaskFailure`; nunca llega a
    /// quien envió la tarea.
    pub fn submit_fallible<F, E>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        self.enqueue(Box::new(move || task().map_err(|e| TaskFailure::Failed(e.into()))))
    }

    /// Envía una tarea y retorna un handle para esperar su resultado
    pub fn submit_with_result<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = TaskHandle::wrap(task);
        self.enqueue(job)?;
        Ok(handle)
    }

    fn enqueue(&self, job: Job) -> Result<(), PoolError> {
        match self.queue.enqueue(job) {
            Ok(()) => {
                self.metrics.record_submitted();
                Ok(())
            }
            Err(e) => {
                self.metrics.record_rejected();
                Err(e)
            }
        }
    }

    /// Shutdown con el modo configurado al construir el pool
    pub fn shutdown(&self) {
        self.shutdown_with(self.shutdown_mode);
    }

    /// Detiene el pool y espera a que todos los workers terminen
    ///
    /// Idempotente: llamadas posteriores (o concurrentes) no cambian el modo,
    /// solo esperan. Llamado desde una tarea del propio pool, no espera.
    pub fn shutdown_with(&self, mode: ShutdownMode) {
        if let Some(abandoned) = self.queue.close(mode) {
            let count = abandoned.len();
            drop(abandoned);

            if count > 0 {
                self.metrics.record_abandoned(count);
                tracing::warn!(count, "Tareas en cola descartadas al apagar");
            }
            tracing::info!(mode = mode.as_str(), "🛑 Apagando pool de workers");
        }

        if self.is_worker_thread() {
            tracing::warn!("Shutdown llamado desde una tarea del pool; no se espera a los workers");
            return;
        }

        self.queue.wait_exited(self.worker_count);

        let workers = {
            let mut guard = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        if !workers.is_empty() {
            for worker in workers {
                worker.join();
            }
            tracing::info!("Pool de workers detenido");
        }
    }

    fn is_worker_thread(&self) -> bool {
        self.worker_ids.contains(&thread::current().id())
    }

    /// Número fijo de workers
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Workers que todavía no alcanzaron la transición terminal
    pub fn live_workers(&self) -> usize {
        self.queue.live()
    }

    pub fn busy_workers(&self) -> usize {
        self.queue.snapshot().busy
    }

    pub fn idle_workers(&self) -> usize {
        self.stats().idle_workers()
    }

    /// Tareas encoladas y todavía no reclamadas
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    pub fn stats(&self) -> PoolStats {
        let snapshot = self.queue.snapshot();
        PoolStats {
            workers: self.worker_count,
            live_workers: snapshot.live,
            busy_workers: snapshot.busy,
            queued: snapshot.queued,
            capacity: self.queue.capacity(),
            closed: snapshot.closed,
        }
    }

    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("stats", &self.stats())
            .field("shutdown_mode", &self.shutdown_mode)
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
