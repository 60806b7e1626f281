use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use log::{debug, warn};

use crate::error::Error;
use crate::model::{StyleRule, TextAlign};
use crate::parser;

/// Stylesheet compiled into the crate, used when no other sheet is given.
pub const BUNDLED_STYLESHEET: &str = include_str!("../resources/screenplay.css");

pub const PAGE_SELECTOR: &str = "page";

/// Stylesheet keys that are spelled differently from the attribute they set.
/// Any other key is used as the attribute name as-is.
const KEY_NAMES: [(&str, &str); 12] = [
    ("width-a4", "widthA4"),
    ("width-us", "widthLetter"),
    ("text-align", "textAlign"),
    ("margin-top", "marginTop"),
    ("margin-bottom", "marginBottom"),
    ("margin-left", "marginLeft"),
    ("margin-right", "marginRight"),
    ("padding-left", "paddingLeft"),
    ("line-height", "lineHeight"),
    ("default-width-a4", "defaultWidthA4"),
    ("default-width-us", "defaultWidthLetter"),
    ("content-padding", "contentPadding"),
];

type Setter = fn(&mut StyleRule, &str) -> Result<(), ValueKind>;

static SETTERS: [(&str, Setter); 16] = [
    ("bold", |r, v| parse_bool(v).map(|b| r.bold = b)),
    ("italic", |r, v| parse_bool(v).map(|b| r.italic = b)),
    ("underline", |r, v| parse_bool(v).map(|b| r.underline = b)),
    ("uppercase", |r, v| parse_bool(v).map(|b| r.uppercase = b)),
    ("textAlign", |r, v| parse_align(v).map(|a| r.text_align = a)),
    ("marginTop", |r, v| parse_points(v).map(|n| r.margin_top = n)),
    ("marginLeft", |r, v| parse_points(v).map(|n| r.margin_left = n)),
    ("marginBottom", |r, v| parse_points(v).map(|n| r.margin_bottom = n)),
    ("marginRight", |r, v| parse_points(v).map(|n| r.margin_right = n)),
    ("paddingLeft", |r, v| parse_points(v).map(|n| r.padding_left = n)),
    ("contentPadding", |r, v| parse_points(v).map(|n| r.content_padding = n)),
    ("lineHeight", |r, v| parse_points(v).map(|n| r.line_height = n)),
    ("widthA4", |r, v| parse_points(v).map(|n| r.width_a4 = n)),
    ("widthLetter", |r, v| parse_points(v).map(|n| r.width_letter = n)),
    ("defaultWidthA4", |r, v| parse_points(v).map(|n| r.default_width_a4 = n)),
    ("defaultWidthLetter", |r, v| parse_points(v).map(|n| r.default_width_letter = n)),
];

/// The kind of value an attribute expected when its declaration was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
    Alignment,
}

impl ValueKind {
    fn describe(self) -> &'static str {
        match self {
            ValueKind::Number => "a number",
            ValueKind::Boolean => "true or false",
            ValueKind::Alignment => "left, center, right or justify",
        }
    }
}

fn parse_points(val: &str) -> Result<f32, ValueKind> {
    let digits = val
        .strip_suffix("px")
        .or_else(|| val.strip_suffix("pt"))
        .unwrap_or(val)
        .trim();
    digits
        .parse::<f32>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ValueKind::Number)
}

fn parse_bool(val: &str) -> Result<bool, ValueKind> {
    match val.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ValueKind::Boolean),
    }
}

fn parse_align(val: &str) -> Result<TextAlign, ValueKind> {
    TextAlign::parse(val).ok_or(ValueKind::Alignment)
}

fn attribute_name(key: &str) -> &str {
    KEY_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, attr)| *attr)
}

fn setter_for(attribute: &str) -> Option<Setter> {
    SETTERS
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, setter)| *setter)
}

#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticKind {
    UnknownAttribute,
    Malformed,
    InvalidValue { value: String, expected: ValueKind },
}

/// A declaration that was skipped while loading a stylesheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub selector: String,
    pub key: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} {{ {} }}: ", self.line, self.selector, self.key)?;
        match &self.kind {
            DiagnosticKind::UnknownAttribute => write!(f, "unknown style attribute"),
            DiagnosticKind::Malformed => write!(f, "expected `key: value`"),
            DiagnosticKind::InvalidValue { value, expected } => {
                write!(f, "invalid value '{value}', expected {}", expected.describe())
            }
        }
    }
}

/// Element name to [`StyleRule`] mapping built from one stylesheet.
#[derive(Clone, Debug, Default)]
pub struct StyleCatalog {
    rules: HashMap<String, StyleRule>,
    diagnostics: Vec<Diagnostic>,
}

impl StyleCatalog {
    /// An empty catalog. Lookups still succeed, with all-default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from stylesheet text.
    ///
    /// Only structural errors fail the whole sheet. Bad declarations are
    /// skipped, logged, and kept in [`StyleCatalog::diagnostics`].
    pub fn parse(source: &str) -> Result<Self, Error> {
        let blocks = parser::parse(source)?;
        let mut rules: HashMap<String, StyleRule> = HashMap::new();
        let mut diagnostics = Vec::new();

        for block in &blocks {
            if block.declarations.is_empty() {
                debug!("line {}: {} has no declarations", block.line, block.selectors.join(", "));
            }
            for selector in &block.selectors {
                let rule = rules.entry(selector.clone()).or_default();
                for decl in &block.declarations {
                    let kind = match (&decl.value, setter_for(attribute_name(&decl.key))) {
                        (None, _) => DiagnosticKind::Malformed,
                        (_, None) => DiagnosticKind::UnknownAttribute,
                        (Some(value), Some(set)) => match set(rule, value) {
                            Ok(()) => continue,
                            Err(expected) => DiagnosticKind::InvalidValue {
                                value: value.clone(),
                                expected,
                            },
                        },
                    };
                    let diagnostic = Diagnostic {
                        line: decl.line,
                        selector: selector.clone(),
                        key: decl.key.clone(),
                        kind,
                    };
                    warn!("Skipping style declaration, {diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }

        debug!(
            "Loaded {} styles from {} blocks ({} diagnostics)",
            rules.len(),
            blocks.len(),
            diagnostics.len()
        );
        Ok(StyleCatalog { rules, diagnostics })
    }

    /// Catalog for [`BUNDLED_STYLESHEET`].
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_STYLESHEET).unwrap_or_else(|e| {
            warn!("Bundled stylesheet failed to load: {e}");
            Self::new()
        })
    }

    /// Replaces every rule with the ones in `source`. On error the current
    /// rules are left untouched.
    pub fn reload(&mut self, source: &str) -> Result<(), Error> {
        match Self::parse(source) {
            Ok(catalog) => {
                *self = catalog;
                Ok(())
            }
            Err(e) => {
                warn!("Keeping previous styles, reload failed: {e}");
                Err(e)
            }
        }
    }

    pub fn reload_from_path(&mut self, path: &Path) -> Result<(), Error> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            warn!("Keeping previous styles, cannot read {}: {e}", path.display());
            Error::Io(e)
        })?;
        self.reload(&source)
    }

    pub fn page(&self) -> Result<&StyleRule, Error> {
        self.rules.get(PAGE_SELECTOR).ok_or(Error::MissingPageStyle)
    }

    /// Style for `name`, or a fallback carrying the page's default widths.
    pub fn for_element(&self, name: &str) -> StyleRule {
        if let Some(rule) = self.rules.get(name) {
            return *rule;
        }
        let mut fallback = StyleRule::default();
        if let Ok(page) = self.page() {
            fallback.width_a4 = page.default_width_a4;
            fallback.width_letter = page.default_width_letter;
        }
        fallback
    }

    pub fn get(&self, name: &str) -> Option<&StyleRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Defined selectors, sorted.
    pub fn selectors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
