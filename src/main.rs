use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use beat_styles::{PaperSize, StyleCatalog};

#[derive(Parser)]
#[command(name = "beat-styles", about = "Inspect screenplay stylesheets and export styled scripts")]
struct Args {
    /// Stylesheet to load instead of the bundled one
    #[arg(long, global = true)]
    stylesheet: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved style for each element (all defined ones by default)
    Show { elements: Vec<String> },
    /// Export an `element<TAB>text` script file to DOCX
    Export {
        /// Input script file
        input: PathBuf,
        /// Output DOCX file (defaults to input with .docx extension)
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Paper::A4)]
        paper: Paper,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PaperSize::A4,
            Paper::Letter => PaperSize::UsLetter,
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<StyleCatalog, beat_styles::Error> {
    match path {
        Some(path) => {
            let mut catalog = StyleCatalog::new();
            catalog.reload_from_path(path)?;
            Ok(catalog)
        }
        None => Ok(StyleCatalog::bundled()),
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let catalog = match load_catalog(args.stylesheet.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match args.command {
        Command::Show { elements } => {
            let names: Vec<String> = if elements.is_empty() {
                catalog.selectors().into_iter().map(String::from).collect()
            } else {
                elements
            };
            for name in &names {
                let marker = if catalog.contains(name) { "" } else { " /* fallback */" };
                println!("{name} {{ {} }}{marker}", catalog.for_element(name));
            }
            if !catalog.diagnostics().is_empty() {
                eprintln!("{} declaration(s) skipped:", catalog.diagnostics().len());
                for diagnostic in catalog.diagnostics() {
                    eprintln!("  {diagnostic}");
                }
            }
        }
        Command::Export { input, output, paper } => {
            if !input.is_file() {
                eprintln!("Error: not a file: {}", input.display());
                std::process::exit(1);
            }
            let output = output.unwrap_or_else(|| input.with_extension("docx"));
            if let Err(e) = beat_styles::export_script_to_docx(&catalog, &input, &output, paper.into()) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
}
