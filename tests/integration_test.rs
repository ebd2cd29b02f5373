//! Tests de integración para el servidor
//! tests/integration_test.rs
//!
//! Levantan el servidor en un puerto efímero dentro del mismo proceso,
//! envían requests reales por TCP y apagan el pool al final.

use pool_server::config::Config;
use pool_server::pool::{FullPolicy, ShutdownMode};
use pool_server::server::{Server, ServerMode};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Helper: arranca el servidor en 127.0.0.1:0
fn start_server(config: Config) -> (Arc<Server>, SocketAddr, JoinHandle<()>) {
    let server = Arc::new(Server::new(config).expect("valid config"));
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn({
        let server = Arc::clone(&server);
        move || server.run_on(listener).expect("server loop")
    });

    (server, addr, handle)
}

/// Helper: apaga el pool y despierta al `accept` bloqueado
fn stop_server(server: &Server, addr: SocketAddr, handle: JoinHandle<()>) {
    server.pool().expect("pooled mode").shutdown();
    let _ = TcpStream::connect(addr);
    handle.join().unwrap();
}

/// Helper: envía un request y retorna la response completa
fn send_request(addr: SocketAddr) -> Result<String, Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(addr)?;

    // Configurar timeouts
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    stream.set_write_timeout(Some(Duration::from_secs(5)))?;

    stream.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")?;
    stream.flush()?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    Ok(response)
}

/// Helper: extrae el body de una response HTTP
fn extract_body(response: &str) -> &str {
    match response.find("\r\n\r\n") {
        Some(pos) => &response[pos + 4..],
        None => "",
    }
}

fn pooled_config(workers: usize) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        mode: ServerMode::Pooled,
        workers,
        ..Config::default()
    }
}

#[test]
fn test_pooled_response() {
    let (server, addr, handle) = start_server(pooled_config(2));

    let response = send_request(addr).expect("Failed to send request");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "got: {}", response);
    assert!(response.contains("Content-Type: text/html"));
    assert!(response.contains("Connection: close"));
    assert_eq!(extract_body(&response), "<html><body><h1>Pooled!</h1></body></html>");

    stop_server(&server, addr, handle);
}

#[test]
fn test_concurrent_clients_are_served_in_parallel() {
    let mut config = pooled_config(4);
    config.work_delay_ms = 200;
    let (server, addr, handle) = start_server(config);

    let start = Instant::now();
    let clients: Vec<_> = (0..4)
        .map(|_| thread::spawn(move || send_request(addr).map_err(|e| e.to_string())))
        .collect();

    for client in clients {
        let response = client.join().unwrap().expect("request");
        assert!(response.contains("200 OK"));
    }

    // Secuencial serían 800ms
    assert!(start.elapsed() < Duration::from_millis(700), "took {:?}", start.elapsed());

    stop_server(&server, addr, handle);
}

#[test]
fn test_many_requests_counted_in_metrics() {
    let mut config = pooled_config(3);
    config.shutdown_mode = ShutdownMode::Drain;
    let (server, addr, handle) = start_server(config);

    for _ in 0..20 {
        assert!(send_request(addr).unwrap().contains("Pooled!"));
    }

    stop_server(&server, addr, handle);

    let snapshot = server.pool().unwrap().metrics().get_snapshot();
    assert_eq!(snapshot.completed, 20);
    assert_eq!(snapshot.failed, 0);
    assert_eq!(snapshot.worker_exits, 3);
}

#[test]
fn test_full_queue_answers_503() {
    let mut config = pooled_config(1);
    config.queue_capacity = 1;
    config.full_policy = FullPolicy::Reject;
    config.work_delay_ms = 300;
    let (server, addr, handle) = start_server(config);

    // 1 en ejecución + 1 en cola; el resto debería ser rechazado
    let clients: Vec<_> = (0..2)
        .map(|_| {
            let client = thread::spawn(move || send_request(addr).map_err(|e| e.to_string()));
            thread::sleep(Duration::from_millis(50));
            client
        })
        .collect();

    let rejected = send_request(addr).unwrap();
    assert!(rejected.starts_with("HTTP/1.1 503 Service Unavailable"), "got: {}", rejected);

    for client in clients {
        assert!(client.join().unwrap().unwrap().contains("200 OK"));
    }

    stop_server(&server, addr, handle);
    assert!(server.pool().unwrap().metrics().get_snapshot().rejected >= 1);
}
