//! Logging init: structured events to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,relsync=debug"
    } else {
        "warn,relsync=info"
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(err) = result {
        eprintln!("logging already initialized: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(default_filter(false)).is_ok());
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
