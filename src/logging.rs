//! Logging initialization utilities.

use env_logger::Env;

/// Default filter for a given number of `-v` flags.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialize logging. `RUST_LOG` wins over the verbosity default.
pub fn init(verbosity: u8) {
    let env = Env::default().default_filter_or(default_filter(verbosity));
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
