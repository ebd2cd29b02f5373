//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Acepta conexiones y las despacha según el modo configurado:
//! - `inline`: una conexión a la vez, en el thread que acepta
//! - `threaded`: un thread nuevo por conexión
//! - `pooled`: una tarea por conexión en el `WorkerPool`
//!
//! En modo `pooled`, un `PoolClosed` al enviar significa "dejar de aceptar".

use crate::config::{Config, ConfigError};
use crate::pool::{FullPolicy, PoolError, WorkerPool};
use crate::server::handler::{handle_connection, reject_connection, HandlerSettings};
use clap::ValueEnum;
use std::io;
use std::net::{TcpListener, TcpStream};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Máximo que un rechazo puede frenar al loop de aceptación
const REJECT_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Cómo se procesa cada conexión aceptada
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServerMode {
    Inline,
    Threaded,
    Pooled,
}

impl ServerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerMode::Inline => "inline",
            ServerMode::Threaded => "threaded",
            ServerMode::Pooled => "pooled",
        }
    }
}

/// Errores fatales del servidor
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pool(#[from] PoolError),
}

enum Dispatcher {
    Inline,
    Threaded,
    Pooled(Arc<WorkerPool>),
}

/// Servidor TCP con despacho configurable
pub struct Server {
    config: Config,
    settings: Arc<HandlerSettings>,
    dispatcher: Dispatcher,
}

impl Server {
    /// Valida la configuración y, en modo `pooled`, arranca el pool
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate()?;

        let dispatcher = match config.mode {
            ServerMode::Inline => Dispatcher::Inline,
            ServerMode::Threaded => Dispatcher::Threaded,
            ServerMode::Pooled => Dispatcher::Pooled(Arc::new(config.pool_builder().build()?)),
        };

        let settings = Arc::new(HandlerSettings {
            read_buffer: config.read_buffer,
            work_delay: config.work_delay(),
        });

        Ok(Self {
            config,
            settings,
            dispatcher,
        })
    }

    /// El pool de workers (solo en modo `pooled`)
    ///
    /// Hacer `shutdown` sobre él detiene el loop de aceptación en la
    /// siguiente conexión.
    pub fn pool(&self) -> Option<&Arc<WorkerPool>> {
        match &self.dispatcher {
            Dispatcher::Pooled(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hace bind en `host:port` y atiende conexiones
    pub fn run(&self) -> Result<(), ServerError> {
        let address = self.config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        self.run_on(listener)
    }

    /// Atiende conexiones de un listener ya creado
    pub fn run_on(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local_addr = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        tracing::info!(
            address = %local_addr,
            mode = self.config.mode.as_str(),
            "🚀 Servidor escuchando"
        );

        let mut accepted = 0usize;

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "❌ Error al aceptar conexión");
                    continue;
                }
            };

            accepted += 1;

            let peer_addr = stream
                .peer_addr()
                .map(|addr| addr.to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            tracing::debug!(peer = %peer_addr, "Nueva conexión aceptada");

            if self.dispatch(stream).is_break() {
                tracing::info!("Pool cerrado, no se aceptan más conexiones");
                break;
            }

            if self.config.max_connections.is_some_and(|max| accepted >= max) {
                tracing::info!(accepted, "Límite de conexiones alcanzado");
                break;
            }
        }

        if let Some(pool) = self.pool() {
            pool.shutdown();
            tracing::info!(metrics = %pool.metrics().get_metrics_json(), "📊 Métricas del pool");
        }

        Ok(())
    }

    fn dispatch(&self, stream: TcpStream) -> ControlFlow<()> {
        match &self.dispatcher {
            Dispatcher::Inline => {
                log_outcome(handle_connection(stream, &self.settings));
                ControlFlow::Continue(())
            }
            Dispatcher::Threaded => {
                let settings = Arc::clone(&self.settings);
                let spawned = thread::Builder::new()
                    .name("conn-thread".to_string())
                    .spawn(move || log_outcome(handle_connection(stream, &settings)));

                if let Err(e) = spawned {
                    tracing::error!(error = %e, "❌ Error al crear thread de conexión");
                }
                ControlFlow::Continue(())
            }
            Dispatcher::Pooled(pool) => self.submit(pool, stream),
        }
    }

    fn submit(&self, pool: &WorkerPool, stream: TcpStream) -> ControlFlow<()> {
        // Con política `reject` guardamos un clon para poder responder 503
        let spare = if self.rejects_when_full() {
            stream.try_clone().ok()
        } else {
            None
        };

        let settings = Arc::clone(&self.settings);

        match pool.submit_fallible(move || handle_connection(stream, &settings)) {
            Ok(()) => ControlFlow::Continue(()),
            Err(PoolError::QueueFull { capacity }) => {
                tracing::warn!(capacity, "⚠️ Cola llena, rechazando conexión");
                if let Some(spare) = spare {
                    log_outcome(reject_busy(spare));
                }
                ControlFlow::Continue(())
            }
            Err(PoolError::PoolClosed) => ControlFlow::Break(()),
            Err(e) => {
                tracing::error!(error = %e, "❌ Error al enviar conexión al pool");
                ControlFlow::Continue(())
            }
        }
    }

    fn rejects_when_full(&self) -> bool {
        self.config.queue_limit().is_some() && self.config.full_policy == FullPolicy::Reject
    }
}

/// Responde 503 sin bloquear el accept más de `REJECT_READ_TIMEOUT`
///
/// Si no se puede poner el timeout, la conexión se cierra sin respuesta:
/// un cliente mudo bloquearía el loop de aceptación.
fn reject_busy(stream: TcpStream) -> io::Result<()> {
    stream.set_read_timeout(Some(REJECT_READ_TIMEOUT))?;
    reject_connection(stream)
}

fn log_outcome(result: io::Result<()>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Error en la conexión");
    }
}
