//! Lineage CLI — assemble provenance graphs and correlate batches.
//!
//! Usage:
//!   lineage assemble --model m --seed 7 [--base-dt 2025-01-01T00:00:00Z] [input.json]
//!   lineage correlate --key entity graph1.json graph2.json ...

use clap::{Parser, Subcommand};
use lineage::{correlate_nodes_across_batches, to_utc_seconds, Graph, GraphAssembler, Record};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "lineage",
    version,
    about = "Deterministic provenance graph assembly"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a JSON array of records into a provenance graph
    Assemble {
        /// Model name stamped into every record
        #[arg(long)]
        model: String,
        /// Integer seed stamped into every record
        #[arg(long)]
        seed: i64,
        /// RFC3339 base instant; offsets are normalized to UTC and
        /// sub-second precision is truncated. Omitted means "now", which
        /// is not reproducible across runs.
        #[arg(long)]
        base_dt: Option<String>,
        /// Omit per-node audit blocks and the batch rollup
        #[arg(long)]
        minimal: bool,
        /// Input file with a JSON array of records (defaults to stdin)
        input: Option<PathBuf>,
    },
    /// Correlate a key field across previously assembled graphs
    Correlate {
        /// Record field to join on
        #[arg(long)]
        key: String,
        /// Graph JSON files, in batch order
        #[arg(required = true)]
        graphs: Vec<PathBuf>,
    },
}

fn read_records(input: Option<&Path>) -> Result<Vec<Record>, String> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };
    serde_json::from_str(&text).map_err(|e| format!("Input is not a JSON array of records: {}", e))
}

fn cmd_assemble(
    model: &str,
    seed: i64,
    base_dt: Option<&str>,
    minimal: bool,
    input: Option<&Path>,
) -> i32 {
    let base = match base_dt {
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(to_utc_seconds(&dt)),
            Err(e) => {
                eprintln!("Error: invalid --base-dt '{}': {}", raw, e);
                return 1;
            }
        },
        None => None,
    };
    let records = match read_records(input) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let assembler = GraphAssembler::new();
    let seed = serde_json::Value::from(seed);
    let result = if minimal {
        assembler.assemble_minimal(&records, model, &seed, base)
    } else {
        assembler.assemble_graph(&records, model, &seed, base)
    };
    match result {
        Ok(graph) => {
            println!("{}", serde_json::to_string_pretty(&graph).unwrap_or_default());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_correlate(key: &str, paths: &[PathBuf]) -> i32 {
    let mut graphs = Vec::with_capacity(paths.len());
    for path in paths {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("Error: failed to open {}: {}", path.display(), e);
                return 1;
            }
        };
        let graph: Graph = match serde_json::from_reader(BufReader::new(file)) {
            Ok(graph) => graph,
            Err(e) => {
                eprintln!("Error: {} is not a graph file: {}", path.display(), e);
                return 1;
            }
        };
        graphs.push(graph);
    }

    let correlation = correlate_nodes_across_batches(&graphs, key);
    println!(
        "{}",
        serde_json::to_string_pretty(&correlation).unwrap_or_default()
    );
    0
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Assemble {
            model,
            seed,
            base_dt,
            minimal,
            input,
        } => cmd_assemble(
            &model,
            seed,
            base_dt.as_deref(),
            minimal,
            input.as_deref(),
        ),
        Commands::Correlate { key, graphs } => cmd_correlate(&key, &graphs),
    };
    std::process::exit(code);
}
