use lockwork::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    if let Err(err) = cli::run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

/// Log to stderr. `LOCKWORK_LOG`, then `RUST_LOG`, override the level
/// chosen by `--debug`.
fn init_tracing(debug: bool) {
    let filter = ["LOCKWORK_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .and_then(|v| EnvFilter::try_new(v).ok())
        })
        .unwrap_or_else(|| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
