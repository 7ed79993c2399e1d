pub mod client;
pub mod protocol;
pub mod server;

pub use client::GatewayClient;
pub use server::GatewayServer;
