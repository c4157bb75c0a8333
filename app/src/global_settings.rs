use std::{env, str::FromStr};

use quarry_lang_printer::ColorChoice;

/// Settings read from the environment, shared by all subcommands.
///
/// - `QUARRY_COLORIZE`: `always`, `always-ansi`, `auto` or `never`. Defaults to `never` when
///   `NO_COLOR` is set and to `auto` otherwise.
/// - `QUARRY_LOG_LEVEL`: `off`, `error`, `warn`, `info`, `debug` or `trace`. Defaults to `info`.
#[derive(Debug, Clone)]
pub struct GlobalSettings {
    pub colorize: ColorChoice,
    pub log_level: log::LevelFilter,
}

impl GlobalSettings {
    pub fn from_env() -> Self {
        let colorize = env::var("QUARRY_COLORIZE")
            .ok()
            .and_then(|var| ColorChoice::from_str(&var).ok())
            .unwrap_or(if env::var_os("NO_COLOR").is_some() {
                ColorChoice::Never
            } else {
                ColorChoice::Auto
            });

        let log_level = env::var("QUARRY_LOG_LEVEL")
            .ok()
            .and_then(|var| log::LevelFilter::from_str(&var.to_uppercase()).ok())
            .unwrap_or(log::LevelFilter::Info);

        Self { colorize, log_level }
    }

    /// Log to stderr at the configured level.
    pub fn init_logger(&self) {
        let write_style = match self.colorize {
            ColorChoice::Always | ColorChoice::AlwaysAnsi => env_logger::WriteStyle::Always,
            ColorChoice::Auto => env_logger::WriteStyle::Auto,
            ColorChoice::Never => env_logger::WriteStyle::Never,
        };
        env_logger::Builder::new()
            .filter_level(self.log_level)
            .write_style(write_style)
            .format_timestamp(None)
            .init();
    }
}
