use cataract_dashboard::cli::{Cli, Commands};
use cataract_dashboard::commands::{inspect, run_predict};
use cataract_dashboard::config::DashboardConfig;
use cataract_dashboard::server::run_server;
use cataract_dashboard::state::AppState;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_logging(args.verbose);

            let config = DashboardConfig::load(&args.config, &args)?;
            let addr = config.socket_addr()?;
            let metrics_handle = init_metrics()?;

            info!("Model artifact: {}", config.model.path.display());
            info!("Dataset: {}", config.dataset.path.display());

            let state = AppState::new(config, metrics_handle);
            run_server(state, addr).await?;
        }

        Commands::Predict(args) => {
            init_logging(args.verbose);
            let response = run_predict(&args)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Inspect { model } => {
            init_logging(false);
            let status = inspect(&model);
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.is_available() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "cataract_dashboard=debug,cataract_classifiers=debug,tower_http=debug"
    } else {
        "cataract_dashboard=info,cataract_classifiers=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    use cataract_telemetry::metrics::names;
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(names::PREDICTIONS_TOTAL, "Successful predictions by label");
    metrics::describe_counter!(
        names::PREDICTION_ERRORS_TOTAL,
        "Prediction requests that produced no result, by reason"
    );
    metrics::describe_histogram!(
        names::PREDICTION_LATENCY_US,
        metrics::Unit::Microseconds,
        "Prediction request latency in microseconds by outcome"
    );
    metrics::describe_counter!(names::MODEL_LOADS_TOTAL, "Model artifact load attempts by status");

    info!("Metrics exporter initialized");
    Ok(handle)
}
