//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte completo
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./pool_server --port 8080 \
//!   --workers 4 \
//!   --queue-capacity 256 \
//!   --queue-full reject \
//!   --shutdown drain
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 WORKERS=8 SERVER_MODE=threaded ./pool_server
//! ```

use crate::pool::{FullPolicy, PoolBuilder, ShutdownMode, WorkerPool};
use crate::server::ServerMode;
use clap::Parser;
use std::time::Duration;

/// Errores de validación de la configuración
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    InvalidWorkers,

    #[error("read buffer must be >= 1 byte")]
    InvalidReadBuffer,

    #[error("max connections must be >= 1 when set")]
    InvalidMaxConnections,
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "pool_server")]
#[command(about = "Servidor TCP con pool fijo de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Cómo se despacha cada conexión aceptada
    #[arg(long, value_enum, default_value = "pooled", env = "SERVER_MODE")]
    pub mode: ServerMode,

    // === Pool ===

    /// Número fijo de workers del pool
    #[arg(short, long, default_value = "4", env = "WORKERS")]
    pub workers: usize,

    /// Capacidad máxima de la cola (0 = sin límite)
    #[arg(long = "queue-capacity", default_value = "0", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Qué hacer cuando la cola acotada está llena
    #[arg(long = "queue-full", value_enum, default_value = "block", env = "QUEUE_FULL_POLICY")]
    pub full_policy: FullPolicy,

    /// Qué pasa con las conexiones encoladas al apagar el pool
    #[arg(long = "shutdown", value_enum, default_value = "abandon", env = "SHUTDOWN_MODE")]
    pub shutdown_mode: ShutdownMode,

    // === Conexiones ===

    /// Tamaño del buffer de lectura por conexión (bytes)
    #[arg(long = "read-buffer", default_value = "30000", env = "READ_BUFFER")]
    pub read_buffer: usize,

    /// Trabajo simulado por conexión en milisegundos
    #[arg(long = "work-delay-ms", default_value = "0", env = "WORK_DELAY_MS")]
    pub work_delay_ms: u64,

    /// Aceptar solo N conexiones y luego apagar
    #[arg(long = "max-connections", env = "MAX_CONNECTIONS")]
    pub max_connections: Option<usize>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use pool_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Capacidad de la cola (`None` = sin límite)
    pub fn queue_limit(&self) -> Option<usize> {
        (self.queue_capacity > 0).then_some(self.queue_capacity)
    }

    pub fn work_delay(&self) -> Duration {
        Duration::from_millis(self.work_delay_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.read_buffer == 0 {
            return Err(ConfigError::InvalidReadBuffer);
        }
        if self.max_connections == Some(0) {
            return Err(ConfigError::InvalidMaxConnections);
        }

        Ok(())
    }

    /// Traduce la configuración a un builder del pool
    pub fn pool_builder(&self) -> PoolBuilder {
        let builder = WorkerPool::builder()
            .workers(self.workers)
            .full_policy(self.full_policy)
            .shutdown_mode(self.shutdown_mode)
            .thread_name("conn-worker");

        match self.queue_limit() {
            Some(capacity) => builder.queue_capacity(capacity),
            None => builder.unbounded(),
        }
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        let queue = match self.queue_limit() {
            Some(capacity) => capacity.to_string(),
            None => "unbounded".to_string(),
        };
        let max_connections = match self.max_connections {
            Some(n) => n.to_string(),
            None => "unlimited".to_string(),
        };

        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              Pool Server Configuration                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Mode:         {}", self.mode.as_str());
        println!("   Max conns:    {}", max_connections);
        println!();
        println!("👷 Worker Pool:");
        println!("   Workers:      {}", self.workers);
        println!("   Queue:        {} ({} when full)", queue, self.full_policy.as_str());
        println!("   Shutdown:     {}", self.shutdown_mode.as_str());
        println!();
        println!("🔌 Connections:");
        println!("   Read buffer:  {} bytes", self.read_buffer);
        println!("   Work delay:   {} ms", self.work_delay_ms);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto (igual a los defaults del CLI)
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            mode: ServerMode::Pooled,
            workers: 4,
            queue_capacity: 0,
            full_policy: FullPolicy::Block,
            shutdown_mode: ShutdownMode::Abandon,
            read_buffer: 30_000,
            work_delay_ms: 0,
            max_connections: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.workers, 4);
        assert_eq!(config.mode, ServerMode::Pooled);
        assert_eq!(config.read_buffer, 30_000);
        assert_eq!(config.queue_limit(), None);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidWorkers));
    }

    #[test]
    fn test_validate_invalid_read_buffer() {
        let mut config = Config::default();
        config.read_buffer = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidReadBuffer));
    }

    #[test]
    fn test_validate_invalid_max_connections() {
        let mut config = Config::default();
        config.max_connections = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidMaxConnections));
    }

    // ==================== CLI Parsing ====================

    #[test]
    fn test_parse_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["pool_server"]).unwrap();
        let default = Config::default();

        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.mode, default.mode);
        assert_eq!(parsed.workers, default.workers);
        assert_eq!(parsed.queue_capacity, default.queue_capacity);
        assert_eq!(parsed.full_policy, default.full_policy);
        assert_eq!(parsed.shutdown_mode, default.shutdown_mode);
        assert_eq!(parsed.read_buffer, default.read_buffer);
        assert_eq!(parsed.max_connections, default.max_connections);
    }

    #[test]
    fn test_parse_custom_values() {
        let config = Config::try_parse_from([
            "pool_server",
            "--port",
            "9000",
            "--workers",
            "8",
            "--mode",
            "threaded",
            "--queue-capacity",
            "64",
            "--queue-full",
            "reject",
            "--shutdown",
            "drain",
            "--max-connections",
            "10",
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.workers, 8);
        assert_eq!(config.mode, ServerMode::Threaded);
        assert_eq!(config.queue_limit(), Some(64));
        assert_eq!(config.full_policy, FullPolicy::Reject);
        assert_eq!(config.shutdown_mode, ShutdownMode::Drain);
        assert_eq!(config.max_connections, Some(10));
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Config::try_parse_from(["pool_server", "--mode", "forked"]).is_err());
    }

    // ==================== Pool Builder ====================

    #[test]
    fn test_pool_builder_from_config() {
        let mut config = Config::default();
        config.workers = 2;
        config.queue_capacity = 5;
        config.full_policy = FullPolicy::Reject;

        let pool = config.pool_builder().build().unwrap();
        let stats = pool.stats();
        assert_eq!(stats.workers, 2);
        assert_eq!(stats.capacity, Some(5));
        pool.shutdown();
    }

    #[test]
    fn test_config_print_summary() {
        let mut config = Config::default();
        config.max_connections = Some(3);
        // Should not panic
        config.print_summary();
    }
}
