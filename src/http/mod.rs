//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Lo mínimo para contestar una conexión: status codes y una respuesta
//! enlatada. No hay parsing de requests; el handler lee bytes y los ignora.

pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

pub use response::Response;
pub use status::StatusCode;
