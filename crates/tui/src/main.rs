mod app;
mod client;
mod config;
mod error;
mod i18n;
mod payment;
mod ui;

use std::{fs::OpenOptions, sync::Mutex};

use api_types::invoice::InvoiceToRecord;

use crate::{
    client::Client,
    config::{AppConfig, Launch},
    error::{AppError, Result},
    payment::{Mode, backend::PaymentBackend},
};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, launch) = config::load()?;
    init_tracing(&config)?;

    let client = Client::new(&config.base_url, &config.token, &config.company)?;
    let mode = resolve_mode(&client, launch).await?;

    let mut app = app::App::new(config, client, mode)?;
    app.run().await?;
    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_tracing(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("payments_tui={}", config.log_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn resolve_mode(client: &Client, launch: Launch) -> Result<Mode> {
    match launch {
        Launch::Add => Ok(Mode::Add),
        Launch::Edit(id) => Ok(Mode::Edit { id }),
        Launch::Record(invoice_id) => {
            let invoice = client.invoice(invoice_id).await.map_err(|err| {
                tracing::error!("cannot record against invoice {invoice_id}: {err}");
                AppError::Startup(format!("invoice {invoice_id}: {err}"))
            })?;
            Ok(Mode::RecordAgainstInvoice {
                invoice: InvoiceToRecord::from(invoice),
            })
        }
    }
}
