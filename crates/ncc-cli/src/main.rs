//! # ncc
//!
//! Command-line front end: compile flat router configuration text into a
//! NETCONF XML payload, or inspect the path tables built from a directory
//! of YIN schemas.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use config::{CliConfig, parse_attribute};
use ncc_compiler::{ConfigCompiler, ConfigInput};
use ncc_schema::{LeafKind, ModelEntry, ModelStats, Namespace, SchemaLoader, SchemaModel};
use ncc_xml::WriteOptions;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ncc")]
#[command(about = "Compile router configuration text into NETCONF XML")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a configuration file into XML
    Convert {
        /// Input file path, `-` for stdin
        input: String,

        /// Output file path, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        schema: SchemaArgs,

        /// Local name of the NETCONF root element
        #[arg(long)]
        root_tag: Option<String>,

        /// Extra root attribute as name=value (repeatable)
        #[arg(long = "attr", value_name = "NAME=VALUE")]
        attributes: Vec<String>,

        /// Write list keys as leaves and check their count
        #[arg(long)]
        write_keys: bool,

        /// Write without indentation
        #[arg(long)]
        compact: bool,

        /// Prepend an XML declaration
        #[arg(long)]
        xml_declaration: bool,
    },

    /// Dump the resolved schema path tables
    Inspect {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
}

#[derive(Args)]
struct SchemaArgs {
    /// Schema directory or .yin file (repeatable)
    #[arg(short, long = "schema", value_name = "PATH")]
    schemas: Vec<PathBuf>,

    /// Walk schema directories recursively
    #[arg(long)]
    recursive: bool,

    /// Top-level schema container
    #[arg(long)]
    root_element: Option<String>,

    /// Only layer modules whose namespace URI contains this string
    #[arg(long)]
    namespace_filter: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    match cli.command {
        Commands::Convert {
            input,
            output,
            schema,
            root_tag,
            attributes,
            write_keys,
            compact,
            xml_declaration,
        } => {
            let model = load_model(&schema, &config)?;

            let mut options = config.compile.clone();
            if let Some(tag) = root_tag {
                options.root_tag = tag;
            }
            for raw in &attributes {
                let (name, value) = parse_attribute(raw)?;
                options.root_attributes.push((name, value));
            }
            options.write_keys |= write_keys;

            let text = read_input(&input)?;
            let compiler = ConfigCompiler::new(&model).with_options(options);
            let document = compiler
                .compile_document(&ConfigInput::from(text))
                .with_context(|| format!("failed to compile {input}"))?
                .with_source(input.as_str());
            info!(
                "Compiled {} lines: {} containers, {} leaves",
                document.metadata.lines, document.metadata.containers, document.metadata.leaves
            );

            let mut write_options = if compact {
                WriteOptions::compact()
            } else {
                WriteOptions::default()
            };
            write_options = write_options.xml_declaration(xml_declaration);
            let xml = document.to_xml(&write_options)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{xml}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Wrote {}", path.display());
                }
                None => println!("{xml}"),
            }
        }
        Commands::Inspect { schema, json, pretty } => {
            let model = load_model(&schema, &config)?;
            if json {
                let report = InspectReport::new(&model);
                let rendered = if pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };
                println!("{rendered}");
            } else {
                print!("{}", render_text(&model));
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_model(args: &SchemaArgs, config: &CliConfig) -> Result<Arc<SchemaModel>> {
    let paths = if args.schemas.is_empty() {
        config.schema_paths.clone()
    } else {
        args.schemas.clone()
    };
    if paths.is_empty() {
        bail!("no schema paths given; pass --schema or set schema_paths in the config file");
    }

    let mut options = config.model_options();
    if let Some(root) = &args.root_element {
        options = options.with_root_element(root);
    }
    if let Some(filter) = &args.namespace_filter {
        options = options.with_namespace_filter(filter);
    }

    debug!("Loading schemas from {:?}", paths);
    let loader = SchemaLoader::new(paths)
        .with_options(options)
        .recursive(args.recursive || config.recursive);
    let model = loader.load().context("failed to load schema model")?;
    let stats = model.stats();
    info!(
        "Loaded {} modules: {} containers, {} leaves",
        stats.modules, stats.containers, stats.leaves
    );
    Ok(model)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    let path = Path::new(input);
    std::fs::read_to_string(path).with_context(|| format!("failed to read input file {}", path.display()))
}

#[derive(Serialize)]
struct InspectReport<'m> {
    root_element: &'m str,
    root_namespace: &'m Namespace,
    stats: &'m ModelStats,
    entries: Vec<ModelEntry>,
}

impl<'m> InspectReport<'m> {
    fn new(model: &'m SchemaModel) -> Self {
        Self {
            root_element: model.root_element(),
            root_namespace: model.root_namespace(),
            stats: model.stats(),
            entries: model.entries(),
        }
    }
}

fn render_text(model: &SchemaModel) -> String {
    let stats = model.stats();
    let mut out = format!(
        "# root {} ({})\n# files={} modules={} containers={} leaves={} identity-leaves={} groupings={} augments={}/{}\n",
        model.root_element(),
        model.root_namespace(),
        stats.files,
        stats.modules,
        stats.containers,
        stats.leaves,
        stats.identity_leaves,
        stats.groupings_inlined,
        stats.augments_merged,
        stats.augments_staged,
    );

    for ModelEntry { path, entry } in model.entries() {
        out.push_str(&path);
        if let Some(keys) = &entry.keys {
            out.push_str(" container");
            if !keys.is_empty() {
                out.push_str(&format!(" keys=[{}]", keys.join(",")));
            }
        }
        match entry.leaf {
            Some(LeafKind::Leaf) => out.push_str(" leaf"),
            Some(LeafKind::LeafList) => out.push_str(" leaf-list"),
            None => {}
        }
        if let Some(namespace) = &entry.namespace {
            out.push_str(&format!(" xmlns:{}=\"{}\"", namespace.prefix, namespace.uri));
        }
        if let Some(identities) = &entry.identities {
            let values: Vec<String> = identities
                .iter()
                .map(|(name, module)| format!("{}:{}", module.prefix, name))
                .collect();
            out.push_str(&format!(" identities=[{}]", values.join(",")));
        }
        out.push('\n');
    }
    out
}
