//! # Tipos del Pool
//! src/pool/types.rs
//!
//! Tipos compartidos entre la cola, los workers y el pool.

use crate::pool::error::TaskFailure;
use clap::ValueEnum;
use serde::Serialize;

/// Unidad de trabajo normalizada
///
/// Todas las tareas (fire-and-forget, falibles o con resultado) se convierten
/// a esta forma antes de encolarse.
pub(crate) type Job = Box<dyn FnOnce() -> Result<(), TaskFailure> + Send + 'static>;

/// Qué hacer cuando una cola acotada está llena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FullPolicy {
    /// Bloquear a quien envía hasta que haya espacio (o el pool se cierre)
    #[default]
    Block,
    /// Rechazar inmediatamente con `PoolError::QueueFull`
    Reject,
}

/// Qué pasa con las tareas encoladas (no reclamadas) al hacer shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownMode {
    /// Se descartan sin ejecutarse
    #[default]
    Abandon,
    /// Se ejecutan todas antes de que los workers terminen
    Drain,
}

impl FullPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FullPolicy::Block => "block",
            FullPolicy::Reject => "reject",
        }
    }
}

impl ShutdownMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownMode::Abandon => "abandon",
            ShutdownMode::Drain => "drain",
        }
    }
}

/// Estadísticas instantáneas del pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub live_workers: usize,
    pub busy_workers: usize,
    pub queued: usize,
    /// `None` = cola sin límite
    pub capacity: Option<usize>,
    pub closed: bool,
}

impl PoolStats {
    pub fn idle_workers(&self) -> usize {
        self.live_workers.saturating_sub(self.busy_workers)
    }
}
