//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Colaboradores externos del pool:
//! 1. `tcp`: escucha en un puerto y acepta conexiones (el Listener)
//! 2. `handler`: lee bytes, responde y cierra (el cuerpo de cada tarea)

pub mod handler;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use handler::{handle_connection, HandlerSettings};
pub use tcp::{Server, ServerError, ServerMode};
