use crate::logger::format::LoggerFormat;

/// Logger configuration, passed explicitly to
/// [`logger_init`](crate::logger_init) — no environment-driven singletons.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Env-filter directive, e.g. `"info"` or `"info,ferro_tasks=debug"`.
    pub level: String,
    /// Include the emitting module path in each line.
    pub with_targets: bool,
    /// ANSI colors in text output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || atty::is(atty::Stream::Stdout);
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}
