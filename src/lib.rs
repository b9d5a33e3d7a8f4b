// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod chime;
pub mod config;
pub mod desk;
pub mod error;
pub mod logging;
pub mod notes;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod storage;
pub mod tasks;
pub mod util;
