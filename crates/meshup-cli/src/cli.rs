//! Command-line interface for the meshup utility
//!
//! Loads graph documents stored as JSON and validates them, computes the
//! transform that fits them to a container, or renders them to SVG.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use meshup::core::logging::init_logging;
use meshup::{fit_transform, render_svg_with_config, Graph, MeshConfig, RenderConfig, ViewportConfig};

/// meshUp - render and check knowledge graph documents
#[derive(Parser)]
#[command(name = "meshup")]
#[command(about = "Validate, fit and render meshUp graph documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a graph document to SVG, fitted to the container
    Render {
        /// Graph JSON document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output SVG file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Container width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Container height in pixels
        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Largest scale the fit may choose
        #[arg(long)]
        max_scale: Option<f64>,

        /// Node circle radius
        #[arg(long)]
        node_radius: Option<f64>,

        /// Fit padding fraction, kept within 0.05..=0.10
        #[arg(long)]
        padding: Option<f64>,
    },

    /// Report broken invariants of a graph document
    Validate {
        /// Graph JSON document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the transform that fits a graph into a container
    Fit {
        /// Graph JSON document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Container width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Container height in pixels
        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Largest scale the fit may choose
        #[arg(long)]
        max_scale: Option<f64>,

        /// Print the transform as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
pub struct MeshApp {
    config: MeshConfig,
}

impl MeshApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(MeshConfig::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var("MESHUP_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var("MESHUP_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("meshup v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                input,
                output,
                width,
                height,
                max_scale,
                node_radius,
                padding,
            } => {
                let config = self.build_config(node_radius, padding);
                self.render_command(input, output, (width, height), max_scale, &config, cli.verbose)
            }
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Fit {
                input,
                width,
                height,
                max_scale,
                json,
            } => self.fit_command(input, (width, height), max_scale, json, cli.verbose),
        }
    }

    fn build_config(&self, node_radius: Option<f64>, padding: Option<f64>) -> MeshConfig {
        let mut render: RenderConfig = self.config.render.clone();
        if let Some(radius) = node_radius {
            render = render.with_node_radius(radius);
        }
        let mut viewport: ViewportConfig = self.config.viewport;
        if let Some(padding) = padding {
            viewport = viewport.with_fit_padding(padding);
        }
        self.config.clone().with_render(render).with_viewport(viewport)
    }

    fn render_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        (width, height): (f64, f64),
        max_scale: Option<f64>,
        config: &MeshConfig,
        verbose: bool,
    ) -> Result<()> {
        let graph = self.load_graph(input, verbose)?;
        let svg = render_svg_with_config(&graph, width, height, max_scale, config)?;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            bytes = svg.len(),
            "Rendered graph to SVG"
        );
        if verbose {
            eprintln!(
                "Rendered {} nodes and {} edges",
                graph.node_count(),
                graph.edge_count()
            );
        }
        self.write_output(output, &svg)
    }

    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let graph = self.load_graph(input, verbose)?;
        let violations = graph.violations();
        if violations.is_empty() {
            println!(
                "✓ Valid graph ({} nodes, {} edges)",
                graph.node_count(),
                graph.edge_count()
            );
            return Ok(());
        }

        println!("✗ Invalid graph:");
        for violation in &violations {
            println!("  - {}", violation);
        }
        Err(anyhow!("{} invariant violation(s)", violations.len()))
    }

    fn fit_command(
        &self,
        input: Option<PathBuf>,
        (width, height): (f64, f64),
        max_scale: Option<f64>,
        json: bool,
        verbose: bool,
    ) -> Result<()> {
        let graph = self.load_graph(input, verbose)?;
        let transform = fit_transform(&graph, width, height, max_scale, &self.config)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&transform)?);
        } else {
            println!("{}", transform);
        }
        Ok(())
    }

    /// Read and parse a graph document
    pub fn load_graph(&self, input: Option<PathBuf>, verbose: bool) -> Result<Graph> {
        let content = self.read_input(input)?;
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        let graph: Graph =
            serde_json::from_str(&content).context("Failed to parse graph document")?;
        debug!(graph = %graph.meta, nodes = graph.node_count(), "Graph document loaded");
        Ok(graph)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", content);
                if !content.is_empty() && !content.ends_with('\n') {
                    println!();
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for MeshApp {
    fn default() -> Self {
        Self::new()
    }
}
