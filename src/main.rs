//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; routing decisions belong to the authorization gate.

use claims_portal::adapters::http::{HttpClaimsApi, MockClaimsApi};
use claims_portal::adapters::storage::{MemoryTabStorage, TabSessionStore, UnloadGuard};
use claims_portal::adapters::ui::tui::TuiInputPort;
use claims_portal::domain::routes;
use claims_portal::ports::{ClaimsApi, InputPort, SessionStorePort, TabStorage};
use claims_portal::shared::config::AppConfig;
use claims_portal::usecases::{AdminService, AuthService, PolicyholderService};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated latency of the offline portal, so loading states stay visible.
const OFFLINE_DELAY: Duration = Duration::from_millis(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    claims_portal::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    // --- Session: lives exactly as long as this process ---
    let storage: Arc<dyn TabStorage> = Arc::new(MemoryTabStorage::new());
    let store: Arc<dyn SessionStorePort> = Arc::new(TabSessionStore::new(storage));
    let _unload = UnloadGuard::new(Arc::clone(&store));

    // --- Portal API (offline mode swaps in the in-memory demo portal) ---
    let api: Arc<dyn ClaimsApi> = if cfg.is_offline() {
        warn!("CLAIMS_PORTAL_OFFLINE set, using the in-memory demo portal");
        Arc::new(MockClaimsApi::seeded(Arc::clone(&store)).with_delay(OFFLINE_DELAY))
    } else {
        let base_url = cfg.api_base_url_or_default();
        let timeout_secs = cfg.request_timeout_secs_or_default();
        info!(url = %base_url, timeout_secs, "using portal API");
        Arc::new(HttpClaimsApi::new(
            &base_url,
            Duration::from_secs(timeout_secs),
            Arc::clone(&store),
        )?)
    };

    // --- Services ---
    let auth_service = Arc::new(AuthService::new(Arc::clone(&api), Arc::clone(&store)));
    let admin_service = Arc::new(AdminService::new(Arc::clone(&api)));
    let policyholder_service = Arc::new(PolicyholderService::new(Arc::clone(&api)));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&store),
        Arc::clone(&api),
        auth_service,
        admin_service,
        policyholder_service,
    ));

    // --- Run (gate -> login / user dashboard / admin dashboard) ---
    let start_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| routes::ROOT.to_string());
    info!(path = %start_path, "starting");
    // Prompts read Ctrl-C as a key and return through the UI, where the
    // unload guard clears the session. This arm only fires while a request
    // is in flight and no prompt owns the terminal.
    tokio::select! {
        result = input_port.run(&start_path) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, clearing session");
            store.clear()?;
        }
    }

    Ok(())
}
