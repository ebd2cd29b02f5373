//! # Handler de Conexiones
//! src/server/handler.rs
//!
//! El cuerpo de cada tarea: leer una vez a un buffer fijo, (opcionalmente)
//! simular trabajo, responder con un HTML enlatado y cerrar. El request nunca
//! se parsea.

use crate::http::{Response, StatusCode};
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

/// Body de la respuesta exitosa
pub const RESPONSE_BODY: &str = "<html><body><h1>Pooled!</h1></body></html>";

/// Body cuando la cola del pool está llena
pub const BUSY_BODY: &str = "<html><body><h1>Server busy</h1></body></html>";

/// Parámetros compartidos por todas las conexiones
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Tamaño del buffer de lectura (bytes)
    pub read_buffer: usize,

    /// Trabajo simulado antes de responder
    pub work_delay: Duration,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            read_buffer: 30_000,
            work_delay: Duration::ZERO,
        }
    }
}

/// Atiende una conexión completa
///
/// Si el peer cierra sin mandar nada, retorna `Ok(())` sin escribir.
/// La conexión se cierra al soltar `stream`.
pub fn handle_connection<S: Read + Write>(
    mut stream: S,
    settings: &HandlerSettings,
) -> io::Result<()> {
    let mut buffer = vec![0u8; settings.read_buffer];
    let bytes_read = stream.read(&mut buffer)?;

    if bytes_read == 0 {
        tracing::debug!("Conexión cerrada sin enviar datos");
        return Ok(());
    }

    tracing::debug!(
        bytes = bytes_read,
        request = %String::from_utf8_lossy(&buffer[..bytes_read]),
        "Procesando request"
    );

    if !settings.work_delay.is_zero() {
        thread::sleep(settings.work_delay);
    }

    let response = Response::html(StatusCode::Ok, RESPONSE_BODY);
    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    tracing::debug!(status = response.status().as_u16(), "Request procesado");

    Ok(())
}

/// Responde 503
///
/// Consume el request antes de cerrar: cerrar con bytes sin leer hace que el
/// kernel mande RST y el cliente pierda la respuesta. Si la lectura vence por
/// timeout (cliente mudo), responde igual.
pub fn reject_connection<S: Read + Write>(mut stream: S) -> io::Result<()> {
    let mut buffer = [0u8; 1024];
    match stream.read(&mut buffer) {
        Ok(_) => {}
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            tracing::debug!("Cliente sin request, respondiendo 503 igual");
        }
        Err(e) => return Err(e),
    }

    let response = Response::html(StatusCode::ServiceUnavailable, BUSY_BODY);
    stream.write_all(&response.to_bytes())?;
    stream.flush()
}
