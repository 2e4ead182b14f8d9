use clap::Parser;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    i18n::Locale,
};

const DEFAULT_CONFIG_PATH: &str = "config/payments_tui.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub token: String,
    pub company: String,
    pub locale: Locale,
    pub timezone: String,
    pub log_file: String,
    pub log_level: String,
    /// Rows fetched per page by the select lists.
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/v1/".to_string(),
            token: String::new(),
            company: "1".to_string(),
            locale: Locale::En,
            timezone: "Europe/Rome".to_string(),
            log_file: "payments_tui.log".to_string(),
            log_level: "info".to_string(),
            page_size: 15,
        }
    }
}

impl AppConfig {
    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.timezone.parse().map_err(|err| AppError::Setting {
            name: "timezone",
            reason: format!("{err}"),
        })
    }
}

/// Which payment the screen opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Add,
    Edit(i64),
    Record(i64),
}

#[derive(Debug, Parser)]
#[command(name = "payments_tui", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL of the invoicing API (e.g. http://127.0.0.1:8000/api/v1/).
    #[arg(long)]
    base_url: Option<String>,
    /// Override API token (prefer PAYMENTS_TUI_TOKEN).
    #[arg(long)]
    token: Option<String>,
    /// Override company id sent with every request.
    #[arg(long)]
    company: Option<String>,
    /// Override UI language (en, it).
    #[arg(long)]
    locale: Option<String>,
    /// Override timezone (IANA name) used for today's date.
    #[arg(long)]
    timezone: Option<String>,
    /// Override log file path.
    #[arg(long)]
    log_file: Option<String>,
    /// Edit an existing payment.
    #[arg(long, conflicts_with = "record")]
    edit: Option<i64>,
    /// Record a payment against an invoice.
    #[arg(long)]
    record: Option<i64>,
}

pub fn load() -> Result<(AppConfig, Launch)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("PAYMENTS_TUI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(token) = args.token {
        settings.token = token;
    }
    if let Some(company) = args.company {
        settings.company = company;
    }
    if let Some(locale) = args.locale {
        settings.locale = Locale::parse(&locale).ok_or(AppError::Setting {
            name: "locale",
            reason: format!("unsupported locale {locale:?}"),
        })?;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(log_file) = args.log_file {
        settings.log_file = log_file;
    }

    let launch = match (args.edit, args.record) {
        (Some(id), _) => Launch::Edit(id),
        (None, Some(invoice_id)) => Launch::Record(invoice_id),
        (None, None) => Launch::Add,
    };

    Ok((settings, launch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_timezone() {
        let config = AppConfig::default();
        assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn bad_timezone_is_reported() {
        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.timezone(),
            Err(AppError::Setting { name: "timezone", .. })
        ));
    }

    #[test]
    fn file_values_override_defaults() {
        let settings: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "base_url = \"https://invoices.example/api/v1/\"\nlocale = \"it\"\npage_size = 30",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.base_url, "https://invoices.example/api/v1/");
        assert_eq!(settings.locale, Locale::It);
        assert_eq!(settings.page_size, 30);
        assert_eq!(settings.company, "1");
    }
}
