#![allow(dead_code)]

pub mod fixtures;
pub mod handshake;
pub mod mock_server;
pub mod tls;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("masquerade=debug")
        .try_init();
}
