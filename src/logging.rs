//! Tracing setup for hosts that don't install their own subscriber.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "hopshelf=info";

/// Installs a formatting subscriber filtered by `RUST_LOG`, with
/// `hopshelf=info` added when the variable does not mention the crate.
///
/// Returns `false` if a global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match DEFAULT_DIRECTIVE.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_repeatable() {
        init();
        assert!(!init());
    }
}
