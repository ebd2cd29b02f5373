//! # Pool Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor: logging, configuración y loop de aceptación.

use pool_server::config::Config;
use pool_server::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pool_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Crear configuración (CLI + env)
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    let server = match Server::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "💥 Error al iniciar servidor");
            std::process::exit(1);
        }
    };

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        tracing::error!(error = %e, "💥 Error fatal");
        std::process::exit(1);
    }
}
