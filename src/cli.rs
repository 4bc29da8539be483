/// # regstore CLI Interface (Module)
///
/// Command parsing and user-visible invocations for regstore. All mapping
/// logic (flattening, codecs, listings) lives in `regstore-core`; this module
/// only reads JSON files, calls the codecs and prints JSON.
///
/// ## How To Use
/// - Command-line users: `regstore --config regstore.yaml <command> --help`.
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`], or
///   [`execute`] with any `Store` (a mock in tests).
///
/// A lookup that finds nothing is reported as an error, so the process exits non-zero.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use regstore_core::contract::{Document, Store};
use regstore_core::{Diffs, Layers, Notices, Preambles, RegulationNode, Regulations};

use crate::es_store::EsStore;
use crate::load_config::load_config;

/// CLI for regstore: load and read regulation documents in a search index.
#[derive(Parser)]
#[clap(
    name = "regstore",
    version,
    about = "Store regulation trees, layers, notices, diffs and preambles in a search index"
)]
pub struct Cli {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flatten a regulation tree (JSON file) and store every node
    LoadRegulation {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        reg_version: String,
        /// Top-level regulation number, e.g. 1005
        #[clap(long)]
        regulation: String,
    },
    /// Print one stored regulation node
    GetRegulation {
        /// Dash-joined label, e.g. 1005-2-a
        #[clap(long)]
        label: String,
        #[clap(long)]
        reg_version: String,
    },
    /// List (version, label) pairs for a label, or for all regulation roots
    ListRegulations {
        #[clap(long)]
        label: Option<String>,
    },
    /// Store a layer (JSON array of entries, each with a `label` key)
    LoadLayer {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        reg_version: String,
        #[clap(long)]
        name: String,
        /// Label of the regulation the layer belongs to
        #[clap(long)]
        label: String,
    },
    GetLayer {
        #[clap(long)]
        name: String,
        #[clap(long)]
        label: String,
        #[clap(long)]
        reg_version: String,
    },
    PutNotice {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        document_number: String,
    },
    GetNotice {
        #[clap(long)]
        document_number: String,
    },
    /// List notice summaries, optionally only those touching a CFR part
    ListNotices {
        #[clap(long)]
        part: Option<String>,
    },
    PutDiff {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        label: String,
        #[clap(long)]
        old_version: String,
        #[clap(long)]
        new_version: String,
    },
    GetDiff {
        #[clap(long)]
        label: String,
        #[clap(long)]
        old_version: String,
        #[clap(long)]
        new_version: String,
    },
    PutPreamble {
        #[clap(long)]
        file: PathBuf,
        #[clap(long)]
        document_number: String,
    },
    GetPreamble {
        #[clap(long)]
        document_number: String,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON in {:?}", path))
}

fn found<T: serde::Serialize>(value: Option<T>, what: String) -> Result<String> {
    match value {
        Some(value) => Ok(serde_json::to_string_pretty(&value)?),
        None => anyhow::bail!("{what} not found"),
    }
}

/// Run one command against `store` and return what should be printed.
pub async fn execute<S: Store + ?Sized>(store: &S, command: Commands) -> Result<String> {
    tracing::info!(command = ?command, "Executing command");
    let output = match command {
        Commands::LoadRegulation {
            file,
            reg_version: version,
            regulation,
        } => {
            let root: RegulationNode = read_json(&file)?;
            let count = root.node_count();
            Regulations::new(store)
                .bulk_put(&root, &version, &regulation)
                .await?;
            format!("Stored {count} regulation nodes for {regulation} at version {version}")
        }
        Commands::GetRegulation {
            label,
            reg_version: version,
        } => {
            let node = Regulations::new(store).get(&label, &version).await?;
            found(node, format!("Regulation node {version}/{label}"))?
        }
        Commands::ListRegulations { label } => {
            let entries = Regulations::new(store).listing(label.as_deref()).await?;
            let listing: Vec<Value> = entries
                .into_iter()
                .map(|(version, label)| serde_json::json!({"version": version, "label": label}))
                .collect();
            serde_json::to_string_pretty(&listing)?
        }
        Commands::LoadLayer {
            file,
            reg_version: version,
            name,
            label,
        } => {
            let entries: Vec<Document> = read_json(&file)?;
            Layers::new(store)
                .bulk_put(&entries, &version, &name, &label)
                .await?;
            format!("Stored {} entries of layer {name} at version {version}", entries.len())
        }
        Commands::GetLayer {
            name,
            label,
            reg_version: version,
        } => {
            let layer = Layers::new(store).get(&name, &label, &version).await?;
            found(layer, format!("Layer {version}/{name}/{label}"))?
        }
        Commands::PutNotice {
            file,
            document_number,
        } => {
            let notice: Document = read_json(&file)?;
            Notices::new(store).put(&document_number, &notice).await?;
            format!("Stored notice {document_number}")
        }
        Commands::GetNotice { document_number } => {
            let notice = Notices::new(store).get(&document_number).await?;
            found(notice, format!("Notice {document_number}"))?
        }
        Commands::ListNotices { part } => {
            let summaries = Notices::new(store).listing(part.as_deref()).await?;
            serde_json::to_string_pretty(&summaries)?
        }
        Commands::PutDiff {
            file,
            label,
            old_version,
            new_version,
        } => {
            let diff: Value = read_json(&file)?;
            Diffs::new(store)
                .put(&label, &old_version, &new_version, &diff)
                .await?;
            format!("Stored diff {label}/{old_version}/{new_version}")
        }
        Commands::GetDiff {
            label,
            old_version,
            new_version,
        } => {
            let diff = Diffs::new(store)
                .get(&label, &old_version, &new_version)
                .await?;
            found(diff, format!("Diff {label}/{old_version}/{new_version}"))?
        }
        Commands::PutPreamble {
            file,
            document_number,
        } => {
            let preamble: Document = read_json(&file)?;
            Preambles::new(store).put(&document_number, &preamble).await?;
            format!("Stored preamble {document_number}")
        }
        Commands::GetPreamble { document_number } => {
            let preamble = Preambles::new(store).get(&document_number).await?;
            found(preamble, format!("Preamble {document_number}"))?
        }
    };
    Ok(output)
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(&cli.config)?;
    let store = EsStore::new(config.elasticsearch)
        .map_err(|e| anyhow::anyhow!("Failed to construct Elasticsearch store: {e}"))?;

    let output = execute(&store, cli.command).await?;
    println!("{output}");
    Ok(())
}
