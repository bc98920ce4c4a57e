mod catalog;
mod config;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use config::DevtoolsConfig;
use error::DevtoolsError;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Asteroid world developer tools", long_about = None)]
struct Cli {
    /// Devtools settings file.
    #[arg(long, global = true, default_value = "devtools.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the stored world configurations.
    List,
    /// Generate a world from a stored configuration or a JSON file.
    Generate {
        /// Configuration id, file stem or path.
        name: String,
        /// Overrides the configuration's own seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the world here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a configuration and store it with the others.
    Save { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let config = match DevtoolsConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &DevtoolsConfig) -> Result<(), DevtoolsError> {
    let configs_dir = Path::new(&config.paths.configs);
    match command {
        Command::List => {
            for entry in catalog::list_configs(configs_dir) {
                match entry.description {
                    Some(description) => println!("{}\t{description}", entry.id),
                    None => println!("{}", entry.id),
                }
            }
        }
        Command::Generate {
            name,
            seed,
            out,
            pretty,
        } => {
            let path = catalog::resolve_config(configs_dir, &name)?;
            let world_config = catalog::load_config(&path)?;
            let world = match seed.or(world_config.seed) {
                Some(seed) => {
                    info!("Generating {} with seed {seed}", path.display());
                    roid_world::generate_seeded(&world_config, seed)?
                }
                None => roid_world::generate(&world_config)?,
            };

            let stats = world.stats();
            info!(
                "World {}x{}: {} solid, {} space, {} lava, {} gas, {} aliens, {} item kinds",
                world.width,
                world.depth,
                stats.solid,
                stats.space,
                stats.lava,
                stats.gas,
                stats.aliens,
                stats.items.len()
            );

            let json = if pretty {
                serde_json::to_string_pretty(&world)?
            } else {
                serde_json::to_string(&world)?
            };
            match out {
                Some(out) => {
                    let target = if out.is_relative() {
                        Path::new(&config.paths.output).join(out)
                    } else {
                        out
                    };
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&target, json)?;
                    info!("Wrote world to {}", target.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Save { file } => {
            let saved = catalog::save_config(&file, configs_dir)?;
            println!("{}", saved.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "roid-devtools",
            "generate",
            "orange_rush",
            "--seed",
            "42",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("devtools.toml"));
        match cli.command {
            Command::Generate {
                name,
                seed,
                out,
                pretty,
            } => {
                assert_eq!(name, "orange_rush");
                assert_eq!(seed, Some(42));
                assert_eq!(out, None);
                assert!(pretty);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_config_flag() {
        let cli = Cli::try_parse_from(["roid-devtools", "list", "--config", "alt.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
        assert!(matches!(cli.command, Command::List));
    }
}
