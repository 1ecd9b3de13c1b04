use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// `"sgl_engine=debug,wgpu=warn"`. When unset, `RUST_LOG` is consulted and
/// the level falls back to `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter.or_else(|| std::env::var("RUST_LOG").ok()) {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                // wgpu is chatty at info.
                builder
                    .filter_level(log::LevelFilter::Info)
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        // A logger installed elsewhere (e.g. by a test harness) wins.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
