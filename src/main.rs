//! `ext-settings` command-line tool.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use ext_settings::files::{
    apply_middleware_file, generate_merged_file, parse_file_to_json, write_output,
};
use ext_settings::middleware::{DefaultResolver, MiddlewareRegistry, VariantSelector};

#[derive(Parser)]
#[command(name = "ext-settings")]
#[command(about = "Generate .extSettings files from JSON configuration", version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON configuration into an .extSettings file
    Generate {
        /// Path to the input JSON configuration file
        #[arg(long)]
        json: PathBuf,

        /// Output path for the generated .extSettings file
        #[arg(long)]
        out: PathBuf,

        /// Additional JSON fragment to merge into the input (repeatable)
        #[arg(long = "merge", value_name = "JSON")]
        merges: Vec<PathBuf>,

        /// Sub-configuration of a split input that receives the fragments
        #[arg(long)]
        target: Option<String>,
    },

    /// Convert an .extSettings file back into JSON
    Parse {
        /// Path to the .extSettings file
        #[arg(long, short = 'i')]
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Merge a middleware into an .extSettings file
    Middleware {
        /// Middleware name (case-insensitive)
        name: String,

        /// The .extSettings file to merge into (created if missing)
        #[arg(long)]
        out: PathBuf,

        /// Directory of middleware definitions (*.json, *.toml)
        #[arg(long, env = "EXT_SETTINGS_MIDDLEWARE_DIR", default_value = "middlewares")]
        definitions: PathBuf,

        /// Middleware version (default: first version offering the variant)
        #[arg(long = "mw-version")]
        mw_version: Option<String>,

        /// Variant to apply
        #[arg(long)]
        variant: String,

        /// Sub-configuration of a split file to merge into (created if missing)
        #[arg(long)]
        target: Option<String>,

        /// Variable value, overriding the declared default (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=VALUE, got '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Generate {
            json,
            out,
            merges,
            target,
        } => {
            generate_merged_file(&json, &merges, target.as_deref(), &out)
                .with_context(|| format!("failed to generate {}", out.display()))?;
            println!(".ExtSettings file generated at {}", out.display());
        }
        Commands::Parse { input, out } => {
            let json = parse_file_to_json(&input)
                .with_context(|| format!("failed to parse {}", input.display()))?;
            match out {
                Some(out) => {
                    write_output(&out, &json)?;
                    println!("JSON written to {}", out.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Middleware {
            name,
            out,
            definitions,
            mw_version,
            variant,
            target,
            vars,
        } => {
            let registry = MiddlewareRegistry::load_dir(&definitions).with_context(|| {
                format!("failed to load middleware definitions from {}", definitions.display())
            })?;
            let selector = VariantSelector {
                version: mw_version,
                variant,
            };
            let mut resolver = DefaultResolver::new().with_overrides(vars);

            apply_middleware_file(
                &registry,
                &name,
                &out,
                &selector,
                target.as_deref(),
                &mut resolver,
            )
                .with_context(|| format!("failed to apply middleware '{name}'"))?;
            println!("Middleware {name} merged into {}", out.display());
        }
    }

    Ok(())
}
