//! # Errores del Pool
//! src/pool/error.rs
//!
//! Taxonomía de errores del pool de workers:
//! - `PoolError`: errores síncronos que recibe quien construye el pool o envía tareas
//! - `TaskFailure`: fallos dentro de una tarea, capturados en la frontera del worker
//! - `TaskError`: lo que observa quien espera el resultado de una tarea (`TaskHandle`)

use std::any::Any;
use std::error::Error;
use std::io;

/// Errores devueltos por las operaciones del pool
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Parámetros de construcción inválidos (0 workers, capacidad 0, ...)
    #[error("invalid pool configuration: {0}")]
    InvalidConfiguration(String),

    /// El pool ya inició (o completó) el shutdown
    #[error("pool is closed")]
    PoolClosed,

    /// La cola acotada está llena y la política es `Reject`
    #[error("queue is full (max capacity: {capacity})")]
    QueueFull { capacity: usize },

    /// El sistema operativo no pudo crear un thread de worker
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Fallo ocurrido durante la ejecución de una tarea
///
/// Nunca se propaga a quien hizo `submit`: el worker lo registra y sigue.
#[derive(Debug, thiserror::Error)]
pub enum TaskFailure {
    #[error("task panicked: {message}")]
    Panicked { message: String },

    #[error("task failed: {0}")]
    Failed(Box<dyn Error + Send + Sync>),
}

impl TaskFailure {
    /// Construye un `Panicked` a partir del payload de `catch_unwind`
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskFailure::Panicked {
            message: panic_message(payload.as_ref()),
        }
    }
}

/// Resultado observado a través de un `TaskHandle`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// La tarea entró en pánico
    #[error("task panicked: {0}")]
    Panicked(String),

    /// La tarea nunca se ejecutó (descartada en el shutdown)
    #[error("task was abandoned before running")]
    Abandoned,
}

/// Extrae un mensaje legible del payload de un panic
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
