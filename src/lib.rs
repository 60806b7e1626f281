mod docx;
mod error;
mod handle;
mod model;
mod parser;
mod styles;

pub use docx::export as export_docx;
pub use error::Error;
pub use handle::StyleHandle;
pub use model::{PaperSize, ScriptLine, StyleRule, TextAlign};
pub use styles::{
    BUNDLED_STYLESHEET, Diagnostic, DiagnosticKind, PAGE_SELECTOR, StyleCatalog, ValueKind,
};

use std::path::Path;

/// Element used for script lines that do not name one.
pub const DEFAULT_ELEMENT: &str = "action";

/// Reads `element<TAB>text` lines. Lines without a tab are [`DEFAULT_ELEMENT`];
/// blank lines are skipped.
pub fn read_script(source: &str) -> Vec<ScriptLine> {
    source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match line.split_once('\t') {
            Some((element, text)) => ScriptLine::new(element.trim(), text),
            None => ScriptLine::new(DEFAULT_ELEMENT, line),
        })
        .collect()
}

pub fn export_script_to_docx(
    catalog: &StyleCatalog,
    input: &Path,
    output: &Path,
    paper: PaperSize,
) -> Result<(), Error> {
    let source = std::fs::read_to_string(input)?;
    let bytes = docx::export(catalog, &read_script(&source), paper)?;
    std::fs::write(output, bytes).map_err(Error::Io)
}
