use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use lsxgen_editor::{BankDocument, ExpansionEngine, ExpansionReport, VariantSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INPUT_SUFFIX: &str = ".lsf.lsx";
pub const OUTPUT_SUFFIX: &str = "_generated.lsf.lsx";

#[derive(Debug, Args)]
pub struct ExpandArgs {
    /// Resource bank to expand (*.lsf.lsx)
    pub input: PathBuf,

    /// Comma-separated variant names; the first one is the base
    #[arg(
        short,
        long,
        value_delimiter = ',',
        required_unless_present = "variants_file",
        conflicts_with = "variants_file"
    )]
    pub variants: Vec<String>,

    /// File with one variant name per line
    #[arg(long)]
    pub variants_file: Option<PathBuf>,

    /// Output path (defaults to <name>_generated.lsf.lsx next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to lsxgen.config.json in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Print the expansion report as JSON
    #[arg(long, conflicts_with = "stdout")]
    pub json: bool,
}

pub fn expand(args: ExpandArgs, cwd: &str) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(&resolve(cwd, path))?,
        None => Config::load(cwd)?,
    };
    let options = config.expansion_options()?;

    let input = resolve(cwd, &args.input);
    validate_input(&input)?;

    let names = match &args.variants_file {
        Some(path) => read_variants_file(&resolve(cwd, path))?,
        None => args.variants.iter().map(|v| v.trim().to_string()).collect(),
    };
    let variants = VariantSource::new(names, &options.base_name)?;
    debug!(variants = ?variants.names(), "Variant list");

    let mut doc = BankDocument::load(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let mut engine = ExpansionEngine::new(options);
    let report = doc.expand(&mut engine, &variants)?;

    if args.stdout {
        print!("{}", doc.to_markup(&config.indent));
        return Ok(());
    }

    let output = match &args.output {
        Some(path) => resolve(cwd, path),
        None => default_output_path(&input)?,
    };
    doc.save_to(&output, &config.indent)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, &input, &output);
    }

    Ok(())
}

fn print_report(report: &ExpansionReport, input: &Path, output: &Path) {
    println!("{}", "🔨 Expanding variants...".bright_blue().bold());

    for template in &report.templates {
        println!(
            "  {} {} {}",
            "•".dimmed(),
            template.base.full.bright_white(),
            format!("at {}", template.path).dimmed()
        );
        for entry in &template.entries {
            println!("    {} {} ({})", "✓".green(), entry.name, entry.id.dimmed());
        }
    }

    println!();
    println!(
        "{} Generated {} entries from {} templates",
        "✅".green(),
        report.generated_count(),
        report.templates.len()
    );
    println!("   {} → {}", input.display(), output.display());
}

fn resolve(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

/// Input must be an existing `*.lsf.lsx` file
pub fn validate_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(anyhow!("Input file does not exist: {}", path.display()));
    }
    if !file_name(path)?.ends_with(INPUT_SUFFIX) {
        return Err(anyhow!(
            "Input file name must end with {}: {}",
            INPUT_SUFFIX,
            path.display()
        ));
    }
    Ok(())
}

/// `Body.lsf.lsx` → `Body_generated.lsf.lsx` in the same directory
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    let name = file_name(input)?;
    let stem = name.strip_suffix(INPUT_SUFFIX).ok_or_else(|| {
        anyhow!(
            "Cannot derive output name, {} does not end with {}",
            name,
            INPUT_SUFFIX
        )
    })?;
    Ok(input.with_file_name(format!("{}{}", stem, OUTPUT_SUFFIX)))
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid file name: {}", path.display()))
}

fn read_variants_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read variants file {}", path.display()))?;
    Ok(parse_variant_lines(&content))
}

/// One name per line; blank lines and `#` comments are skipped
pub fn parse_variant_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
