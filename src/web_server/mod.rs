//! folio-web: HTTP server for the portfolio API.
//!
//! Public read endpoints, the contact form, and the admin surface, backed by
//! SQLite and a local upload directory.

pub mod config;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
pub mod utils;
pub mod validation;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use crate::auth::bootstrap_admin;
use crate::mailer::{AdminNotifier, SmtpMailer};
use crate::storage::{db_path, Storage};
use crate::uploads::UploadStore;

use config::{Cli, Config};
use state::{AppState, ServerSettings};

/// Entry point: parse CLI, open storage, start server, close storage on exit.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli_and_env(cli);

    crate::logging::init();

    info!("folio-web starting");
    info!("  data directory: {}", config.data_dir.display());

    let database = db_path(&config.data_dir);
    let storage = Storage::open(&database)
        .with_context(|| format!("failed to open database {}", database.display()))?;
    info!("  database: {}", database.display());

    match (&config.admin_username, &config.admin_password) {
        (Some(username), Some(password)) => {
            if bootstrap_admin(&storage, username, password, Utc::now())? {
                info!("  admin: created account '{}'", username);
            }
        }
        _ => {
            if storage.count_admin_users()? == 0 {
                warn!("  admin: no account exists; set FOLIO_ADMIN_USERNAME and FOLIO_ADMIN_PASSWORD");
            }
        }
    }

    let uploads = UploadStore::open(&config.upload_dir)
        .with_context(|| format!("failed to open upload dir {}", config.upload_dir.display()))?;
    info!("  uploads: {}", config.upload_dir.display());

    let notifier = match &config.mail {
        Some(mail) => {
            let mailer = SmtpMailer::new(&mail.smtp).context("invalid SMTP settings")?;
            info!("  mail: {} via {}:{}", mail.admin_email, mail.smtp.host, mail.smtp.port);
            Some(AdminNotifier::new(Arc::new(mailer), mail.admin_email.clone()))
        }
        None => {
            info!("  mail: not configured (notifications disabled)");
            None
        }
    };

    let settings = ServerSettings {
        session_ttl: chrono::Duration::hours(config.session_ttl_hours as i64),
    };
    let state = AppState::new(storage, uploads, notifier, settings);

    let app = router::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("folio-web listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("folio-web shutting down");
    match Arc::try_unwrap(state) {
        Ok(state) => state.storage.into_inner().close()?,
        Err(_) => warn!("state still shared at shutdown; database closed on drop"),
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal");
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
