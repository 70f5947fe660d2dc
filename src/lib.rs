pub mod aggregate;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod nutrients;
pub mod output;
pub mod parser;
pub mod record;
pub mod server;
pub mod snapshot;
pub mod source;
