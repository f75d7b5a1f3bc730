//! folio-web: HTTP server for the portfolio API.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio::web_server::run().await
}
