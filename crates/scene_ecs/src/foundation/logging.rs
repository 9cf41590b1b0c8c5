//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it more than once is
/// harmless, which lets tests and binaries share it.
pub fn init() {
    init_with_default("info");
}

/// Initialize logging with a custom default filter (e.g. `"scene_ecs=debug"`)
pub fn init_with_default(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already initialized");
    }
}
