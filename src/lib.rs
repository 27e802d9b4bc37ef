pub mod annotate;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod pivot;
pub mod record;
pub mod session;
pub mod vocabulary;
