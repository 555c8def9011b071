use anyhow::Context;
use sensei::{
    AppState, SenseiConfig,
    agents::Tutor,
    api::routes::create_router,
    cli::{Cli, Commands},
    utils::ConfigSource,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    let (mut config, source) = SenseiConfig::load_with_source(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    cli.apply_overrides(&mut config);

    init_tracing(&cli, &config);

    match &source {
        ConfigSource::File(path) => tracing::info!(path = %path.display(), "Loaded configuration"),
        ConfigSource::Defaults(path) => {
            tracing::info!(path = %path.display(), "No configuration file, using defaults")
        }
    }

    match cli.command {
        Some(Commands::Config { validate }) => show_config(&config, validate),
        Some(Commands::Serve) | None => serve(config).await,
    }
}

fn init_tracing(cli: &Cli, config: &SenseiConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter(config)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

fn show_config(config: &SenseiConfig, validate: bool) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    println!("{}", rendered);

    if validate {
        config
            .resolve_secrets()
            .context("Credentials are not available")?;
        println!("# configuration and credentials OK");
    }
    Ok(())
}

async fn serve(config: SenseiConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Sensei server");

    let tutor = Tutor::initialize(&config).context("Failed to initialize the tutor agent")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let app = create_router(AppState::new(config, tutor));

    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
