use anyhow::{Context, Result};
use portal_loadtest::{
    client::ApiClient, config::Config, runner::LoadTest, session, stats::Stats, telemetry,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::load().context("failed to load configuration")?;

    if cfg.run.duration_seconds.is_none() {
        warn!("No run duration configured - the test runs until Ctrl+C or SIGTERM");
    }

    info!(target_url = %cfg.target.base_url, users = cfg.run.users, "starting portal load test");

    let stats = Stats::new();
    let client = ApiClient::new(&cfg.target, stats).context("failed to build HTTP client")?;

    // Startup logins are fatal: without tokens no user may start.
    let session = session::bootstrap(&client, &cfg.credentials)
        .await
        .context("startup authentication failed")?;

    let cancel = CancellationToken::new();
    telemetry::cancel_on_shutdown(cancel.clone());

    let report = LoadTest::new(client, session, &cfg)?.run(cancel).await;
    report.log();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.total_failures > 0 {
        warn!(failures = report.total_failures, "run finished with failed requests");
    }
    Ok(())
}
