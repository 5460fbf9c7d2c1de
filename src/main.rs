use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use monomorph::workspace::GenericKind;
use monomorph::{Workspace, WorkspaceError};

#[derive(Parser)]
#[command(name = "monomorph")]
#[command(author, version, about = "Instantiate generic declarations with concrete types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Go-like source text (default)
    #[value(name = "text")]
    Text,
    /// Emitted declarations as JSON
    #[value(name = "json")]
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Instantiate a generic function or type from a workspace
    Instantiate {
        /// The workspace file (JSON)
        workspace: PathBuf,

        /// Name of the generic declaration
        #[arg(short, long)]
        name: String,

        /// Package that declares it (defaults to the main package)
        #[arg(short, long)]
        package: Option<String>,

        /// Concrete type arguments, comma separated
        #[arg(short, long, value_delimiter = ',')]
        types: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List the generic declarations of a workspace
    List {
        /// The workspace file (JSON)
        workspace: PathBuf,
    },
    /// Write the bundled demo workspace
    Demo {
        /// Output file (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let result = match cli.command {
        Commands::Instantiate {
            workspace,
            name,
            package,
            types,
            format,
        } => instantiate(&workspace, &name, package.as_deref(), &types, format),
        Commands::List { workspace } => list(&workspace),
        Commands::Demo { output } => demo(output),
    };

    if let Err(e) = result {
        let fatal = e
            .downcast_ref::<WorkspaceError>()
            .is_some_and(WorkspaceError::is_fatal);
        let label = if fatal { "internal error" } else { "error" };
        eprintln!("{}: {:#}", label.red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn load(path: &Path) -> Result<Workspace> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read workspace: {:?}", path))?;
    let ws = Workspace::from_json(&json)
        .with_context(|| format!("Failed to parse workspace: {:?}", path))?;
    Ok(ws)
}

fn instantiate(
    path: &Path,
    name: &str,
    package: Option<&str>,
    types: &[String],
    format: OutputFormat,
) -> Result<()> {
    log::info!("Instantiating {}[{}]", name, types.join(", "));

    let ws = load(path)?;
    let inst = ws.instantiate(package, name, types)?;
    let decls = inst.translator.new_decls();
    log::debug!("{} declaration(s) emitted", decls.len());

    match format {
        OutputFormat::Text => {
            let kind = match inst.kind {
                GenericKind::Func => "function",
                GenericKind::Type => "type",
            };
            println!("// {} {} instantiated as {}", kind, name, inst.name);
            for decl in decls {
                println!("\n{}", decl);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(decls)?);
        }
    }
    Ok(())
}

fn list(path: &Path) -> Result<()> {
    let ws = load(path)?;
    let decls = ws.generic_declarations();
    if decls.is_empty() {
        println!("{}: no generic declarations", "info".blue().bold());
        return Ok(());
    }

    for decl in decls {
        println!(
            "{} {}.{}[{}]",
            decl.kind.to_string().cyan(),
            decl.package,
            decl.name,
            decl.type_params.join(", ")
        );
        if !decl.methods.is_empty() {
            println!("    methods: {}", decl.methods.join(", "));
        }
    }
    Ok(())
}

fn demo(output: Option<PathBuf>) -> Result<()> {
    let json = Workspace::demo().to_json()?;
    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write workspace: {:?}", path))?;
            println!("{}: wrote demo workspace to {:?}", "info".blue().bold(), path);
        }
        None => println!("{}", json),
    }
    Ok(())
}
