//! # Pool Server
//! src/lib.rs
//!
//! Servidor TCP que desacopla la aceptación de conexiones de su
//! procesamiento mediante un pool fijo de workers. Demuestra conceptos de
//! sistemas operativos: exclusión mutua, variables de condición,
//! productor/consumidor y apagado ordenado de threads.
//!
//! ## Arquitectura
//!
//! - `pool`: el núcleo (cola compartida, workers, ciclo de vida)
//! - `server`: listener TCP y handler de conexiones
//! - `http`: respuesta HTTP enlatada (sin parsing de requests)
//! - `config`: CLI y variables de entorno
//! - `metrics`: contadores y latencias del pool
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use pool_server::config::Config;
//! use pool_server::server::Server;
//!
//! let server = Server::new(Config::default()).expect("configuración inválida");
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod http;
pub mod metrics;
pub mod pool;
pub mod server;
