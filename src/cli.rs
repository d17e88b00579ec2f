use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::config::{Config, load_config};
use crate::graph::build_render_graph;
use crate::layout::compute_layout;
use crate::layout::lineage::compute_lineage_layout;
use crate::layout_dump::LayoutDump;
use crate::lineage::{LineageResolution, resolve};
use crate::model::PersonRecord;
use crate::render::{render_svg, write_output_svg};
use crate::state::ViewState;
use crate::tree::{assemble, assign_branch_colors};

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree layout and SVG renderer")]
pub struct Args {
    /// Input person records (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Fetch records from this backend instead of reading a file
    #[cfg(feature = "api")]
    #[arg(long = "api-base")]
    pub api_base: Option<String>,

    /// Output file (svg/png/json). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Maximum generation depth to render
    #[arg(long = "max-generation")]
    pub max_generation: Option<i64>,

    /// Collapse these family ids before layout (repeatable)
    #[arg(long = "collapse")]
    pub collapse: Vec<String>,

    /// Highlight these node or person ids (repeatable)
    #[arg(long = "highlight")]
    pub highlight: Vec<String>,

    /// Founder person id the root selection should favor
    #[arg(long = "root")]
    pub root: Option<String>,

    /// Render the ancestor chain for this person instead of the full tree
    #[arg(long = "lineage")]
    pub lineage: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

/// Input documents come either as a bare record array or wrapped in a
/// `{"persons": [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersonsDocument {
    List(Vec<PersonRecord>),
    Wrapped { persons: Vec<PersonRecord> },
}

impl PersonsDocument {
    fn into_records(self) -> Vec<PersonRecord> {
        match self {
            Self::List(records) => records,
            Self::Wrapped { persons } => persons,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(max_generation) = args.max_generation {
        config.layout.tree.max_generation = max_generation;
    }
    if let Some(root) = &args.root {
        config.layout.tree.root_person_id = Some(root.clone());
    }

    let mut state = ViewState::new();
    for id in &args.collapse {
        state.toggle_collapsed(id);
    }
    for id in &args.highlight {
        state.highlight(id);
    }
    state.select(args.lineage.as_deref());

    let (records, ancestors) = load_records(&args)?;
    if records.is_empty() {
        bail!("no person records in input");
    }
    let graph = build_render_graph(&records, None);

    let layout = if let Some(target) = &args.lineage {
        match resolve(target, &graph, &ancestors, &config.layout.lineage) {
            LineageResolution::Chain(chain) => {
                compute_lineage_layout(&chain, &config.theme, &config.layout)
            }
            LineageResolution::NotFound { id } => bail!("person not found: {id}"),
            LineageResolution::NoData => bail!("no lineage data for {target}"),
        }
    } else {
        let mut root = assemble(&graph, &state, &config.layout.tree)
            .context("could not build a family tree")?;
        assign_branch_colors(&mut root, &config.layout.tree.branch_colors);
        compute_layout(&mut root, &state, &config.theme, &config.layout)
    };

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            write_png(&layout, &config, args.output.as_deref())?;
        }
        OutputFormat::Json => {
            LayoutDump::from_layout(&layout).write_json(args.output.as_deref())?;
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(feature = "png")]
fn write_png(layout: &crate::layout::Layout, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg(layout, &config.theme, &config.layout);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _layout: &crate::layout::Layout,
    _config: &Config,
    _output: Option<&Path>,
) -> Result<()> {
    bail!("png output requires the 'png' feature")
}

/// Records plus any pre-walked ancestor chain (API mode + --lineage).
fn load_records(args: &Args) -> Result<(Vec<PersonRecord>, Vec<PersonRecord>)> {
    #[cfg(feature = "api")]
    if let Some(base) = &args.api_base {
        return load_records_from_api(base, args.lineage.as_deref());
    }
    let input = read_input(args.input.as_deref())?;
    let document: PersonsDocument =
        serde_json::from_str(&input).context("input is not a person-record document")?;
    Ok((document.into_records(), Vec::new()))
}

#[cfg(feature = "api")]
fn load_records_from_api(
    base: &str,
    lineage_target: Option<&str>,
) -> Result<(Vec<PersonRecord>, Vec<PersonRecord>)> {
    use crate::api::ApiClient;

    const FETCH_LIMIT: usize = 5000;
    let client = ApiClient::new(base);
    if let Some(target) = lineage_target {
        let response = client
            .ancestors(target)
            .with_context(|| format!("ancestors fetch failed for {target}"))?;
        let mut records = response.ancestors_chain.clone();
        records.push(response.person);
        return Ok((records, response.ancestors_chain));
    }
    let records = client
        .fetch_all_records(FETCH_LIMIT)
        .context("record export failed")?;
    Ok((records, Vec::new()))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
