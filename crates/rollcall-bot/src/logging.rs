use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` wins when set; otherwise `--verbose` picks debug for our crates.
pub fn init(verbose: bool) {
    let default = if verbose {
        "rollcall=debug,rollcall_app=debug,rollcall_adapters=debug,info"
    } else {
        "rollcall=info,rollcall_app=info,rollcall_adapters=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
