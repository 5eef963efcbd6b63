use tracing_subscriber::EnvFilter;

/// Installs the global subscriber for binaries. Filter comes from
/// `COURTSIDE_LOG`, then `RUST_LOG`, then `info`. Logs go to stderr so stdout
/// stays clean for `--json` output.
pub fn init() {
    let filter = std::env::var("COURTSIDE_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
