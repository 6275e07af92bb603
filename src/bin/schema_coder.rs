//! Schema Coder CLI
//!
//! Writes and reads schema prefixes against a file-backed registry.

use std::path::PathBuf;

use anyhow::{bail, Context};
use apache_avro::Schema;
use clap::{Parser, Subcommand};
use familiar_schema_coder::{
    decode_prefix, encode_prefix, CachedRegistry, CoderSettings, FileRegistry, RegistryGateway,
    RegistrySchema, RegistrySchemaCoder, SchemaCoder, SchemaId, Subject, AUTO_REGISTER_SCHEMAS,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-coder")]
#[command(about = "Write and read schema registry wire prefixes")]
struct Cli {
    /// Config file (defaults to schema-coder.toml lookup)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the registry directory (overrides config)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a schema to its id and print the prefix
    Write {
        /// Avro schema file (.avsc)
        schema: PathBuf,
        /// Subject to use (overrides config)
        #[arg(short, long)]
        subject: Option<String>,
        /// Derive the subject from a topic using the configured strategy
        #[arg(short, long, conflicts_with = "subject")]
        topic: Option<String>,
        /// Only look up an existing id, never register
        #[arg(long)]
        no_auto_register: bool,
    },

    /// Resolve the schema named by a hex-encoded prefix
    Read {
        /// Hex bytes, at least the 5-byte prefix
        prefix: String,
    },

    /// Print the prefix for a schema id
    EncodePrefix {
        #[arg(allow_hyphen_values = true)]
        id: i32,
    },

    /// Print the schema id in a hex-encoded prefix
    DecodePrefix { prefix: String },

    /// List subjects and their versions
    Subjects,

    /// Show or initialize configuration
    Config {
        /// Write the effective configuration to this file
        #[arg(long)]
        init: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings =
        CoderSettings::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(path) = cli.registry {
        settings.registry.path = path;
    }

    match cli.command {
        Commands::Write { schema, subject, topic, no_auto_register } => {
            let text = std::fs::read_to_string(&schema)
                .with_context(|| format!("reading {}", schema.display()))?;
            let parsed = <Schema as RegistrySchema>::parse(&text)?;

            let subject = match (subject, topic) {
                (Some(name), _) => Some(Subject::new(name)?),
                (None, Some(topic)) => {
                    let record_name = record_name(&text).unwrap_or_default();
                    let strategy = settings.coder.subject_strategy;
                    Some(strategy.subject_for(&topic, &record_name, false)?)
                }
                (None, None) => settings.coder.subject()?,
            };

            let mut config = settings.coder.registry_config();
            if no_auto_register {
                config = Some(config.unwrap_or_default().with(AUTO_REGISTER_SCHEMAS, "false"));
            }

            let gateway = open_gateway(&settings)?;
            let coder = RegistrySchemaCoder::new(subject, gateway, config);
            let mut prefix = Vec::new();
            coder.write_schema(&parsed, &mut prefix)?;

            println!("✅ {} ({:?})", hex::encode(&prefix), coder.write_mode());
            Ok(())
        }

        Commands::Read { prefix } => {
            let bytes = hex::decode(prefix.trim()).context("invalid hex input")?;
            let coder = RegistrySchemaCoder::identifier_only(open_gateway(&settings)?);
            let schema = coder.read_schema(&mut bytes.as_slice())?;
            println!("{}", schema.full_text()?);
            Ok(())
        }

        Commands::EncodePrefix { id } => {
            println!("{}", hex::encode(encode_prefix(SchemaId(id))));
            Ok(())
        }

        Commands::DecodePrefix { prefix } => {
            let bytes = hex::decode(prefix.trim()).context("invalid hex input")?;
            let id = decode_prefix(&mut bytes.as_slice())?;
            println!("{}", id);
            Ok(())
        }

        Commands::Subjects => {
            let registry = FileRegistry::<Schema>::open(settings.registry_path())?;
            let subjects = registry.subjects();
            if subjects.is_empty() {
                println!("No subjects registered in {}", registry.root().display());
            }
            for subject in subjects {
                println!("{} {:?}", subject, registry.versions(&subject));
            }
            Ok(())
        }

        Commands::Config { init } => {
            match init {
                Some(path) => {
                    if std::path::Path::new(&path).exists() {
                        bail!("{} already exists", path);
                    }
                    settings.save(&path)?;
                    println!("✅ Configuration written to {}", path);
                }
                None => print!("{}", toml::to_string_pretty(&settings)?),
            }
            Ok(())
        }
    }
}

type Gateway = Box<dyn RegistryGateway<Schema = Schema>>;

fn open_gateway(settings: &CoderSettings) -> anyhow::Result<Gateway> {
    let registry = FileRegistry::<Schema>::open(settings.registry_path())?;
    Ok(if settings.registry.cache {
        Box::new(CachedRegistry::new(registry))
    } else {
        Box::new(registry)
    })
}

/// Full name of a record schema, for record-based subject strategies
fn record_name(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let name = value.get("name")?.as_str()?;
    Some(match value.get("namespace").and_then(|ns| ns.as_str()) {
        Some(ns) if !name.contains('.') => format!("{}.{}", ns, name),
        _ => name.to_string(),
    })
}
