#![cfg(feature = "logging")]

use crate::utils::{host_of, truncate_str};
use crate::PreviewCard;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt as subscriber_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub log_level: String,
    pub console_output: bool,
    pub file_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".into(),
            log_level: "info".into(),
            console_output: true,
            file_output: false,
        }
    }
}

const CARD_WIDTH: usize = 70;
const CONTENT_WIDTH: usize = CARD_WIDTH - 8;

/// One boxed row, padded by display width so wide characters keep the
/// right border aligned.
fn card_line(label: &str, value: &str) -> String {
    let width = CONTENT_WIDTH - label.width();
    let value = truncate_str(value, width);
    let padding = " ".repeat(width.saturating_sub(value.width()));
    format!("║ {label}{value}{padding} ║")
}

/// Dumps a rendered card as a boxed block at info level.
pub fn log_preview_card(card: &PreviewCard) {
    let border = "═".repeat(CARD_WIDTH - 2);
    let site = host_of(&card.link.href).unwrap_or_else(|| "N/A".into());
    let image = card.image.as_ref().map_or("N/A", |image| image.src.as_str());

    info!(
        "\n╔{}╗\n{}\n{}\n{}\n{}\n{}\n╚{}╝",
        border,
        card_line("URL:   ", &card.link.href),
        card_line("Title: ", card.title()),
        card_line("Desc:  ", &card.description),
        card_line("Image: ", image),
        card_line("Site:  ", &site),
        border,
    );
}

pub fn log_error_card<E: Error>(url: &str, error: &E) {
    let top_bottom = "═".repeat(CARD_WIDTH - 2);
    let middle = "─".repeat(CARD_WIDTH - 2);

    let mut error_details = error.to_string();
    if let Some(source) = error.source() {
        error_details = format!("{error_details} (caused by: {source})");
    }

    error!(
        "\n╔{}╗\n{}\n║{}║\n{}\n╚{}╝",
        top_bottom,
        card_line("URL:   ", url),
        middle,
        card_line("Error: ", &error_details),
        top_bottom,
    );
}

/// Installs the global subscriber: `RUST_LOG` wins over `log_level`, with an
/// optional daily-rotated file next to the console output.
pub fn setup_logging(config: LogConfig) -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let mut layers = Vec::new();

    if config.console_output {
        let console_layer = subscriber_fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .pretty();
        layers.push(console_layer.boxed());
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_dir)?;

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "link-preview-card.log");

        let file_layer = subscriber_fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_writer(file_appender);

        layers.push(file_layer.boxed());
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    debug!("Logging system initialized with config: {:?}", config);
    Ok(())
}

/// Scoped subscriber for tests and one-off debugging; reverts on drop.
pub struct LogLevelGuard {
    _guard: tracing::dispatcher::DefaultGuard,
}

impl LogLevelGuard {
    pub fn set_level(level: &str) -> Self {
        let filter = EnvFilter::new(level);
        let subscriber = tracing_subscriber::registry()
            .with(subscriber_fmt::layer().with_test_writer())
            .with(filter);

        LogLevelGuard {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
