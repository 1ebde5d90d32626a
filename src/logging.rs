use tracing_subscriber::{fmt, EnvFilter};

/// Install the fmt subscriber on stderr. Stdout is reserved for CSV output.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks warn / info / debug.
pub fn init(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
