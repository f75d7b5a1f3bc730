//! Log setup for the server binary.
//!
//! Output goes to stderr through `tracing-subscriber`'s fmt layer. The filter
//! comes from `RUST_LOG` and falls back to [`DEFAULT_FILTER`]:
//!
//! ```text
//! 2026-02-11T21:33:12.000Z  INFO folio::web_server: listening on http://127.0.0.1:3000
//! ```

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "folio=info,tower_http=info";

const LOG_ID_TRUNCATE_LEN: usize = 8;

/// Install the global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Shorten a UUID or session token for log lines.
pub fn short_id(id: &str) -> &str {
    let end = id
        .char_indices()
        .nth(LOG_ID_TRUNCATE_LEN)
        .map(|(i, _)| i)
        .unwrap_or(id.len());
    &id[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("7f3c9a2e-1b4d-4c8e-9f00-123456789abc"), "7f3c9a2e");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
    }
}
