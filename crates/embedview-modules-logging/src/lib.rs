//! Process-wide logger setup for embedview hosts.

use std::io::Write;

use embedview_core::LogConfig;
use env_logger::{Builder, Env};

/// Installs `env_logger` using `cfg.filter` unless `RUST_LOG` is set.
///
/// Fails if a logger is already installed; callers usually ignore that.
pub fn init(cfg: &LogConfig) -> Result<(), log::SetLoggerError> {
    builder(cfg).try_init()
}

fn builder(cfg: &LogConfig) -> Builder {
    let mut b = Builder::from_env(Env::default().default_filter_or(cfg.filter.as_str()));
    b.is_test(false);

    if cfg.timestamps {
        b.format_timestamp_millis();
    } else {
        b.format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_error() {
        let cfg = LogConfig {
            filter: "debug".into(),
            timestamps: false,
        };
        let _ = init(&cfg);
        assert!(init(&cfg).is_err());
        log::debug!(target: "logging", "still routed through the first logger");
    }
}
