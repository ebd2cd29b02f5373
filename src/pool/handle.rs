//! # Handle de Resultado
//! src/pool/handle.rs
//!
//! Canal opcional para observar el resultado de una tarea enviada con
//! `WorkerPool::submit_with_result`. El modo por defecto del pool sigue
//! siendo fire-and-forget.

use crate::pool::error::{panic_message, TaskError, TaskFailure};
use crate::pool::types::Job;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Resultado pendiente de una tarea
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, TaskError>>,
}

impl<T: Send + 'static> TaskHandle<T> {
    /// Envuelve `f` en un `Job` que publica su resultado en el handle
    ///
    /// Si el `Job` se descarta sin ejecutarse, el emisor se suelta y
    /// `join` retorna `TaskError::Abandoned`.
    pub(crate) fn wrap<F>(f: F) -> (Job, TaskHandle<T>)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);

        let job: Job = Box::new(move || match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => {
                // Si nadie espera el resultado, no es un fallo de la tarea
                let _ = sender.send(Ok(value));
                Ok(())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                let _ = sender.send(Err(TaskError::Panicked(message.clone())));
                Err(TaskFailure::Panicked { message })
            }
        });

        (job, TaskHandle { receiver })
    }

    /// Bloquea hasta que la tarea termine (o sea descartada)
    pub fn join(self) -> Result<T, TaskError> {
        self.receiver.recv().unwrap_or(Err(TaskError::Abandoned))
    }

    /// Como `join`, pero se rinde después de `timeout`
    ///
    /// Retorna `None` si la tarea todavía no terminó.
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<T, TaskError>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(TaskError::Abandoned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_receives_value() {
        let (job, handle) = TaskHandle::wrap(|| 6 * 7);
        assert!(job().is_ok());
        assert_eq!(handle.join(), Ok(42));
    }

    #[test]
    fn test_handle_reports_panic() {
        let (job, handle) = TaskHandle::<()>::wrap(|| panic!("exploded"));

        match job() {
            Err(TaskFailure::Panicked { message }) => assert_eq!(message, "exploded"),
            other => panic!("unexpected job result: {:?}", other),
        }
        assert_eq!(handle.join(), Err(TaskError::Panicked("exploded".to_string())));
    }

    #[test]
    fn test_handle_abandoned_when_job_dropped() {
        let (job, handle) = TaskHandle::wrap(|| "never");
        drop(job);
        assert_eq!(handle.join(), Err(TaskError::Abandoned));
    }

    #[test]
    fn test_join_timeout_pending() {
        let (_job, handle) = TaskHandle::wrap(|| 1);
        assert!(handle.join_timeout(Duration::from_millis(10)).is_none());
    }
}
