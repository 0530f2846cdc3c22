//! Process-level setup for the binary.

/// `env_logger` filter for a `-v` count. `RUST_LOG` takes precedence.
pub fn log_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8) {
    let env = env_logger::Env::default().filter_or("RUST_LOG", log_level(verbosity));

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(verbosity >= 2)
        .try_init();
}
