use std::path::Path;

use anyhow::Context;
use engine_logging::{engine_info, LogDestination};
use log::LevelFilter;
use tokenscope_engine::{log_destination, ServiceSettings, TokenizerBackend};
use tokenscope_server::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let destination = log_destination(|key| std::env::var(key).ok(), LogDestination::Terminal)?;
    engine_logging::initialize(
        destination,
        LevelFilter::Info,
        Path::new("./tokenscope-server.log"),
    );

    let settings = ServiceSettings::from_env()?;
    match settings.backend {
        TokenizerBackend::Subprocess => engine_info!(
            "Tokenizer: {} {}",
            settings.subprocess.program,
            settings.subprocess.args.join(" ")
        ),
        TokenizerBackend::Builtin => engine_info!("Tokenizer: built-in word estimator"),
    }

    let app = build_router(AppState::new(settings.build_provider()));
    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    engine_info!("Listening on http://{}", settings.bind_addr);

    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}
