use dotenvy::dotenv;
use shopdesk::{
    auth::LocalIdentityProvider,
    config::{database, settings},
    errors::Result,
    router::{ActiveScreen, App},
    store::RecordStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (non-fatal, env vars can be set externally)
    let dotenv_loaded = dotenv().is_ok();

    // 2. Load settings; the log filter comes from here unless RUST_LOG is set
    let settings = settings::load_default_settings()?;

    // 3. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .init();
    info!("Loaded settings (.env present: {})", dotenv_loaded);

    // 4. Open the record store
    let db = database::create_connection(&settings.database_url)
        .await
        .inspect(|_| info!("Connected to {}", settings.database_url))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;
    let store = RecordStore::new(db);

    // 5. Identity provider and app shell
    let provider = Arc::new(LocalIdentityProvider::new(store.clone(), &settings.auth));
    let mut app = App::new(store, provider, settings.dashboard.clone());
    app.sync_session();

    // 6. Sign in with credentials from the environment, if any, and report the dashboard
    let (Ok(email), Ok(password)) = (
        std::env::var("SHOPDESK_EMAIL"),
        std::env::var("SHOPDESK_PASSWORD"),
    ) else {
        info!("SHOPDESK_EMAIL/SHOPDESK_PASSWORD not set, staying signed out");
        return Ok(());
    };
    if let Err(e) = app.sign_in(&email, &password).await {
        warn!("Sign-in failed: {}", e);
        return Ok(());
    }

    if let Some(shell) = app.shell_mut()
        && let ActiveScreen::Dashboard(dashboard) = shell.screen_mut()
    {
        dashboard.loaded().await;
        let report = dashboard.report()?;
        info!(
            "Dashboard {}..{}: revenue {:.2}, sales {} ({} organic, {} ads) over {} days",
            dashboard.filter().start,
            dashboard.filter().end,
            report.totals.revenue,
            report.totals.total_sales,
            report.totals.organic_sales(),
            report.totals.ad_sales,
            report.points.len()
        );
        info!("Pending affiliate events: {}", shell.pending_events());
    }

    app.sign_out().await?;
    Ok(())
}
