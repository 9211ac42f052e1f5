// crates/reencuadre-core/src/lib.rs
pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod prompt;
pub mod redaction;
pub mod reframe;
pub mod render;
pub mod session;
pub mod traits;
pub mod types;
