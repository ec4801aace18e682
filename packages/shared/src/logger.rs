//! Logging setup utilities for the Rakugaki drawing server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose log output is enabled at the default level.
const LOG_TARGETS: [&str; 2] = ["rakugaki_server", "tower_http"];

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Binary names use `-` while tracing targets use `_`, so the binary name is
/// normalized before it is added to the directive.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");

    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect();
    if !LOG_TARGETS.contains(&binary_target.as_str()) {
        directives.push(format!("{}={}", binary_target, default_log_level));
    }

    directives.join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "rakugaki-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use rakugaki_shared::logger::setup_logger;
///
/// setup_logger("rakugaki-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_normalizes_binary_name() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let binary_name = "rakugaki-admin";

        // when (操作):
        let directive = default_directive(binary_name, "debug");

        // then (期待する結果):
        assert_eq!(
            directive,
            "rakugaki_server=debug,tower_http=debug,rakugaki_admin=debug"
        );
    }

    #[test]
    fn test_default_directive_does_not_duplicate_known_target() {
        // テスト項目: サーバーバイナリ名は既存ターゲットと重複しない
        // given (前提条件):
        let binary_name = "rakugaki-server";

        // when (操作):
        let directive = default_directive(binary_name, "info");

        // then (期待する結果):
        assert_eq!(directive, "rakugaki_server=info,tower_http=info");
    }
}
