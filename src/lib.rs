pub mod aggregate;
pub mod codec;
pub mod config;
pub mod directory;
pub mod error;
pub mod gem;
pub mod http;
pub mod server;
pub mod upstream;
