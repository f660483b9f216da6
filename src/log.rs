use tracing_subscriber::EnvFilter;

/// Inicializa el registro en stderr.
///
/// `RUST_LOG` tiene prioridad; si no existe se usa `warn`, o `debug` con
/// `--verbose`, sólo para este crate.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xray_tc_editor={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
