use std::fs;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use contigfind::{AssemblerConfig, AssemblyDriver, BranchingFactor, InMemoryGraph, PositionalNode};

/// Demonstration CLI for the assembly core (spec Section 6, row L): reads a
/// toy textual node-graph format, runs the driver to completion, and prints
/// emitted contigs. Not a parser for any real genomics file format —
/// BAM/CRAM/VCF ingestion remains out of scope for the library.
#[derive(Parser)]
#[command(about = "Positional de Bruijn graph traversal demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the assembly driver over a toy node-graph file and print contigs
    Assemble {
        /// Path to a whitespace-delimited node-graph file (see format below)
        graph_file: String,

        /// k-mer size recorded in the emitted config (informational only;
        /// the toy format encodes node length directly)
        #[arg(long, default_value_t = contigfind::DEFAULT_KMER_SIZE)]
        k: usize,

        /// Per-node successor cap; omit for unbounded
        #[arg(long)]
        branching_factor: Option<u32>,

        /// Minimum supporting reads for the Acceptance Filter
        #[arg(long, default_value_t = contigfind::DEFAULT_MIN_READS)]
        min_reads: usize,

        /// Maximum contigs emitted per run
        #[arg(long, default_value_t = contigfind::DEFAULT_MAX_CONTIGS_PER_ITERATION)]
        max_contigs: usize,

        /// Run the optional debug acyclicity check before traversal
        #[arg(long)]
        validate_acyclic: bool,
    },
}

/// Parse one line of the toy format:
/// `kmer start end length weight is_ref [succ_index:sub_start:sub_end ...]`
fn parse_line(line: &str, line_no: usize) -> Result<(PositionalNode, Vec<(usize, u32, u32)>)> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| -> Result<&str> {
        fields
            .next()
            .with_context(|| format!("line {line_no}: missing field '{name}'"))
    };

    let kmer: u64 = next("kmer")?.parse().context("invalid kmer")?;
    let start: u32 = next("start")?.parse().context("invalid start")?;
    let end: u32 = next("end")?.parse().context("invalid end")?;
    let length: u32 = next("length")?.parse().context("invalid length")?;
    let weight: u32 = next("weight")?.parse().context("invalid weight")?;
    let is_ref: bool = next("is_ref")?.parse().context("invalid is_ref (use true/false)")?;

    let node = PositionalNode::new(kmer, start, end, length, weight, is_ref);

    let mut successors = Vec::new();
    for field in fields {
        let parts: Vec<&str> = field.split(':').collect();
        if parts.len() != 3 {
            bail!("line {line_no}: malformed successor '{field}', expected index:sub_start:sub_end");
        }
        let idx: usize = parts[0].parse().context("invalid successor index")?;
        let s: u32 = parts[1].parse().context("invalid successor sub_start")?;
        let e: u32 = parts[2].parse().context("invalid successor sub_end")?;
        successors.push((idx, s, e));
    }
    Ok((node, successors))
}

fn load_graph(path: &str) -> Result<InMemoryGraph> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let mut graph = InMemoryGraph::new();
    let mut pending_edges = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (node, successors) = parse_line(line, i + 1)?;
        let id = graph.add_node(node);
        pending_edges.push((id, successors));
    }

    // Edges reference nodes by file-order index, resolved once every node
    // has an id (mirrors the graph provider's own promise that a node's
    // identity is stable for the lifetime of traversal).
    let ids: Vec<_> = (0..pending_edges.len() as u32)
        .map(contigfind::PositionalNodeId)
        .collect();
    for (from, successors) in pending_edges {
        for (idx, s, e) in successors {
            let to = *ids
                .get(idx)
                .with_context(|| format!("successor index {idx} out of range"))?;
            graph.add_edge(from, to, s, e);
        }
    }
    Ok(graph)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            graph_file,
            k,
            branching_factor,
            min_reads,
            max_contigs,
            validate_acyclic,
        } => {
            let mut graph = load_graph(&graph_file)?;
            log::info!("loaded {} nodes from {}", graph.node_count(), graph_file);

            let config = AssemblerConfig {
                k,
                max_contigs_per_iteration: max_contigs,
                branching_factor: match branching_factor {
                    Some(n) => BranchingFactor::Limited(n),
                    None => BranchingFactor::Unbounded,
                },
                min_reads,
                debug_validate_acyclic: validate_acyclic,
                ..AssemblerConfig::default()
            };

            let driver = AssemblyDriver::new(&mut graph, config)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .context("building assembly driver")?;

            let mut emitted = 0;
            for outcome in driver {
                emitted += 1;
                let reasons = if outcome.filter_result.passes() {
                    "accepted".to_string()
                } else {
                    format!("rejected: {:?}", outcome.filter_result.reasons())
                };
                println!(
                    "contig {emitted}: weight={} path_length={} terminal_ranges={:?} [{reasons}]",
                    outcome.weight, outcome.path_length, outcome.terminal_ranges
                );
            }
            println!("total contigs: {emitted}");
        }
    }
    Ok(())
}
