use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kiosk::app::AppContext;
use kiosk::cli::{commands, Cli, Commands};
use kiosk::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(&config)?;

    match cli.command {
        Commands::Headlines {
            categories,
            sources,
            countries,
            languages,
        } => {
            commands::headlines(
                &ctx,
                categories.as_deref(),
                sources.as_deref(),
                countries.as_deref(),
                languages.as_deref(),
            )
            .await?;
        }
        Commands::Search { keyword, sources } => {
            commands::search(&ctx, &keyword, sources.as_deref()).await?;
        }
        Commands::Sources => {
            commands::sources(&ctx).await?;
        }
        Commands::Feed { user } => {
            commands::feed(&ctx, &user).await?;
        }
        Commands::Check => {
            commands::check(&ctx).await?;
        }
        Commands::Run {
            warm_interval,
            probe_interval,
            no_initial_refresh,
        } => {
            commands::run(
                &ctx,
                &config,
                warm_interval.as_deref(),
                probe_interval.as_deref(),
                no_initial_refresh,
            )
            .await?;
        }
    }

    Ok(())
}
