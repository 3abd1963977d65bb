//! Point d'entrée CLI pour carte-pib

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod alias;
mod cli;
mod config;
mod dataset;
mod export;
mod reconcile;
mod render;
mod report;
mod scale;
mod sources;

use cli::Commands;

/// Carte choroplèthe du PIB mondial
#[derive(Parser)]
#[command(name = "carte-pib")]
#[command(author, version)]
#[command(about = "Carte choroplèthe du PIB mondial: rendu SVG et export GeoJSON")]
#[command(
    long_about = "Joint un document topologique (frontières de pays) à un dataset de PIB,\nrésout les identités pays par alias/nom/id, et produit une carte SVG\nou un export GeoJSON de la jointure."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Render {
            topology,
            dataset,
            aliases,
            object,
            year,
            scheme,
            width,
            height,
            no_legend,
            output,
            report,
        } => {
            cli::cmd_render(
                topology, dataset, aliases, object, year, &scheme, width, height, no_legend,
                &output, report,
            )
            .await?;
        }
        Commands::Export {
            topology,
            dataset,
            aliases,
            object,
            year,
            output,
        } => {
            cli::cmd_export(topology, dataset, aliases, object, year, &output).await?;
        }
        Commands::Stats { dataset, year, top } => {
            cli::cmd_stats(dataset, year, top).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
