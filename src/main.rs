// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    clap::Parser,
    std::path::PathBuf,
    tracing::info,
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt},
    wallet_pass_issuer::{
        config::IssuerConfig,
        server::{router, AppState},
        StaticAssets,
    },
};

/// Vehicle wallet pass issuing service.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Bind address for the HTTP server (overrides PASSKIT_BIND).
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory holding static pass images (overrides PASSKIT_ASSETS_DIR).
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// Increase logging verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "wallet_pass_issuer=info,tower_http=info".into()),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = IssuerConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(assets_dir) = cli.assets_dir {
        config.assets_dir = assets_dir;
    }

    let assets = StaticAssets::load(&config.assets_dir)?;

    let bind = config.bind.clone();
    let app = router(AppState::new(config, assets));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("pass issuer listening on {}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
