//! # Pool de Workers
//! src/pool/mod.rs
//!
//! Núcleo del servidor: un pool de tamaño fijo que desacopla la aceptación
//! de conexiones de su procesamiento.
//!
//! - `queue`: cola FIFO compartida + bandera `stopping` bajo un único mutex
//! - `worker`: loop de reclamo/ejecución con aislamiento de fallos
//! - `thread_pool`: ciclo de vida (construir, enviar, shutdown)
//! - `handle`: resultado opcional por tarea
//!
//! ## Ejemplo de uso
//!
//! ```
//! use pool_server::pool::WorkerPool;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let pool = WorkerPool::new(4).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! let handle = {
//!     let counter = Arc::clone(&counter);
//!     pool.submit_with_result(move || counter.fetch_add(1, Ordering::SeqCst))
//!         .unwrap()
//! };
//!
//! assert_eq!(handle.join(), Ok(0));
//! pool.shutdown();
//! ```

pub mod error;
pub mod handle;
mod queue;
pub mod thread_pool;
pub mod types;
mod worker;

pub use error::{PoolError, TaskError, TaskFailure};
pub use handle::TaskHandle;
pub use thread_pool::{PoolBuilder, WorkerPool};
pub use types::{FullPolicy, PoolStats, ShutdownMode};
