//! Configuration types and constants for the folio web server.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::mailer::SmtpSettings;

pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub(crate) const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
pub(crate) const DEFAULT_SMTP_PORT: u16 = 587;
pub(crate) const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Backend for a personal portfolio site.
///
/// Serves the public portfolio API and the admin API, and persists state in
/// SQLite. Mail notifications are sent when SMTP is configured.
///
/// Configuration can be set via CLI arguments or environment variables.
/// CLI arguments take precedence over environment variables.
#[derive(Parser, Debug, Default)]
#[command(name = "folio-web", version, about)]
pub struct Cli {
    /// HTTP server bind address [env: FOLIO_BIND] [default: 127.0.0.1:3000]
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Data directory for the database [env: FOLIO_HOME] [default: ~/.folio]
    #[arg(long, short = 'd')]
    pub data_dir: Option<PathBuf>,

    /// Directory for uploaded images [env: FOLIO_UPLOAD_DIR] [default: <data-dir>/uploads]
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Admin session lifetime in hours [env: FOLIO_SESSION_TTL_HOURS] [default: 24]
    #[arg(long)]
    pub session_ttl_hours: Option<u64>,

    /// SMTP relay host; mail is disabled without it [env: FOLIO_SMTP_HOST]
    #[arg(long)]
    pub smtp_host: Option<String>,

    /// SMTP port [env: FOLIO_SMTP_PORT] [default: 587]
    #[arg(long)]
    pub smtp_port: Option<u16>,

    /// SMTP username [env: FOLIO_SMTP_USERNAME]
    #[arg(long)]
    pub smtp_username: Option<String>,

    /// SMTP password [env: FOLIO_SMTP_PASSWORD]
    #[arg(long)]
    pub smtp_password: Option<String>,

    /// SMTP send timeout in seconds [env: FOLIO_SMTP_TIMEOUT_SECS] [default: 10]
    #[arg(long)]
    pub smtp_timeout_secs: Option<u64>,

    /// Sender address for notifications [env: FOLIO_MAIL_FROM]
    #[arg(long)]
    pub mail_from: Option<String>,

    /// Address that receives notifications [env: FOLIO_ADMIN_EMAIL]
    #[arg(long)]
    pub admin_email: Option<String>,
}

/// Mail settings, present only when SMTP and both addresses are configured.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp: SmtpSettings,
    pub admin_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub session_ttl_hours: u64,
    pub mail: Option<MailConfig>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env(key).and_then(|v| v.parse().ok())
}

impl Config {
    pub fn from_cli_and_env(cli: Cli) -> Self {
        let data_dir = cli
            .data_dir
            .or_else(|| env("FOLIO_HOME").map(PathBuf::from))
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(|h| PathBuf::from(h).join(".folio"))
                    .unwrap_or_else(|_| PathBuf::from(".folio"))
            });

        let upload_dir = cli
            .upload_dir
            .or_else(|| env("FOLIO_UPLOAD_DIR").map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join("uploads"));

        let bind_addr = cli
            .bind
            .or_else(|| env("FOLIO_BIND"))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let session_ttl_hours = cli
            .session_ttl_hours
            .or_else(|| env_parsed("FOLIO_SESSION_TTL_HOURS"))
            .filter(|h| *h > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);

        let host = cli.smtp_host.or_else(|| env("FOLIO_SMTP_HOST"));
        let from = cli.mail_from.or_else(|| env("FOLIO_MAIL_FROM"));
        let admin_email = cli.admin_email.or_else(|| env("FOLIO_ADMIN_EMAIL"));

        let mail = match (host, from, admin_email) {
            (Some(host), Some(from), Some(admin_email)) => Some(MailConfig {
                smtp: SmtpSettings {
                    host,
                    port: cli
                        .smtp_port
                        .or_else(|| env_parsed("FOLIO_SMTP_PORT"))
                        .unwrap_or(DEFAULT_SMTP_PORT),
                    username: cli.smtp_username.or_else(|| env("FOLIO_SMTP_USERNAME")),
                    password: cli.smtp_password.or_else(|| env("FOLIO_SMTP_PASSWORD")),
                    from,
                    timeout: Duration::from_secs(
                        cli.smtp_timeout_secs
                            .or_else(|| env_parsed("FOLIO_SMTP_TIMEOUT_SECS"))
                            .unwrap_or(DEFAULT_SMTP_TIMEOUT_SECS),
                    ),
                },
                admin_email,
            }),
            _ => None,
        };

        Self {
            bind_addr,
            data_dir,
            upload_dir,
            session_ttl_hours,
            mail,
            admin_username: env("FOLIO_ADMIN_USERNAME"),
            admin_password: env("FOLIO_ADMIN_PASSWORD"),
        }
    }
}
