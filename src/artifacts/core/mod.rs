//! Core utilities and shared types

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={level}")));

    // a second initialization (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// `Create`/`Update`/`Delete` commit message for an entry
pub fn entry_commit_message(action: &str, collection: &str, slug: &str) -> String {
    format!("{action} {collection} “{slug}”")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_commit_message_quotes_slug() {
        assert_eq!(
            entry_commit_message("Create", "posts", "hello-world"),
            "Create posts “hello-world”"
        );
    }
}
