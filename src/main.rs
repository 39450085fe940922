use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use netreg::adapters::{MemoryStore, SysconfigStore, SysfsInventory};
use netreg::application::NetworkService;
use netreg::config::Config;
use netreg::interface::http::create_router;
use netreg::ports::{HardwareInventory, RawDeviceStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("netreg={},tower_http=info", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting netreg v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    // Initialize adapters
    let (store, inventory): (Arc<dyn RawDeviceStore>, Arc<dyn HardwareInventory>) = match &config.snapshot {
        Some(path) => {
            let snapshot = Arc::new(MemoryStore::from_file(path)?);
            info!("✓ Using snapshot {}", path.display());
            (
                snapshot.clone() as Arc<dyn RawDeviceStore>,
                snapshot as Arc<dyn HardwareInventory>,
            )
        }
        None => {
            if !config.sysconfig_path.is_dir() {
                warn!(
                    "⚠ {} is not a directory, no configured devices will be reported",
                    config.sysconfig_path.display()
                );
            }
            (
                Arc::new(SysconfigStore::new(config.sysconfig_path.clone())) as Arc<dyn RawDeviceStore>,
                Arc::new(SysfsInventory::new(config.sys_path.clone())) as Arc<dyn HardwareInventory>,
            )
        }
    };

    let network_service = Arc::new(NetworkService::new(store, inventory));

    let topology = network_service.topology();
    info!(
        "✓ Registry initialized: {} interfaces, {} bond slaves, {} bridge ports",
        network_service.registry().len(),
        topology.bonds.len(),
        topology.bridges.len()
    );
    for conflict in &topology.conflicts {
        warn!(
            "⚠ {} claimed by {} {} and {}",
            conflict.member, conflict.kind, conflict.first, conflict.second
        );
    }

    // Create HTTP server
    let app = create_router(network_service);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✓ netreg listening on {}", addr);
    info!("  → API: http://localhost:{}/api/interfaces", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
