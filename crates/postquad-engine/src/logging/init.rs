use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one. wgpu and
/// naga log every resource at info.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. "postquad_engine=debug,wgpu=warn".
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
    /// Effective filter: the explicit one, else `rust_log`, else the default.
    pub fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
    }
}

static INIT: Once = Once::new();

/// Installs the `env_logger` backend. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();

        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let c = LoggingConfig {
            env_filter: Some("debug".into()),
            ..Default::default()
        };
        assert_eq!(c.resolve_filter(Some("trace".into())), "debug");
    }

    #[test]
    fn rust_log_then_default() {
        let c = LoggingConfig::default();
        assert_eq!(c.resolve_filter(Some("warn".into())), "warn");
        assert_eq!(c.resolve_filter(None), DEFAULT_FILTER);
        assert_eq!(c.resolve_filter(Some("  ".into())), DEFAULT_FILTER);
    }
}
