use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use lsxgen_editor::{BankDocument, ExpansionEngine};
use lsxgen_parser::Serializer;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Resource bank to inspect
    pub input: PathBuf,

    /// Config file (defaults to lsxgen.config.json in the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only list templates, without printing their markup
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(&PathBuf::from(cwd).join(path))?,
        None => Config::load(cwd)?,
    };

    let input = PathBuf::from(cwd).join(&args.input);
    let doc = BankDocument::load(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let engine = ExpansionEngine::new(config.expansion_options()?);
    let templates = engine.inspect(doc.tree());

    if templates.is_empty() {
        println!(
            "{} No template nodes match {}",
            "⚠️".yellow(),
            config.template_pattern.as_str().bright_white()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("🔍 Found {} template nodes", templates.len())
            .bright_blue()
            .bold()
    );

    let mut serializer = Serializer::with_indent(&config.indent);
    for template in &templates {
        match &template.base {
            Ok(base) => println!(
                "  {} {} (short {}) {}",
                "✓".green(),
                base.full.bright_white(),
                base.short,
                format!("at {}", template.path).dimmed()
            ),
            Err(e) => println!(
                "  {} {} - {}",
                "✗".red(),
                format!("at {}", template.path).dimmed(),
                e.to_string().red()
            ),
        }

        if !args.quiet {
            println!();
            print!("{}", serializer.serialize_fragment(template.node));
            println!();
        }
    }

    Ok(())
}
