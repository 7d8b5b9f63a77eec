use drainkeeper::server::{create_metrics, listen_for_termination, shutdown_channel};
use drainkeeper::{demo, Config, LifecycleCoordinator};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting drainkeeper");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        traffic = %config.traffic_addr,
        control = %config.control_addr,
        prestop_grace_secs = config.prestop_grace.as_secs(),
        "Configuration loaded"
    );

    let metrics = create_metrics()?;
    info!("Prometheus metrics registry initialized");

    // SIGTERM/SIGINT are registered before any listener comes up
    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let signal_task = listen_for_termination(shutdown_controller)?;

    let coordinator = LifecycleCoordinator::new(&config, metrics);
    let result = coordinator
        .run(demo::router(config.demo_work), shutdown_signal)
        .await;
    signal_task.abort();

    match result {
        Ok(()) => {
            info!("drainkeeper shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "drainkeeper stopped with an error");
            Err(e.into())
        }
    }
}
