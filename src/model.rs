use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn parse(val: &str) -> Option<TextAlign> {
        match val.to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaperSize {
    #[default]
    A4,
    UsLetter,
}

impl PaperSize {
    /// Nominal page size in points (width, height).
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::UsLetter => (612.0, 792.0),
        }
    }
}

/// Resolved formatting for one screenplay element (or for the page itself).
///
/// Lengths are in points. Every field defaults to zero, `false` or
/// [`TextAlign::Left`] when the stylesheet does not set it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StyleRule {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub uppercase: bool,
    pub text_align: TextAlign,
    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_bottom: f32,
    pub margin_right: f32,
    pub padding_left: f32,
    pub content_padding: f32,
    pub line_height: f32,
    pub width_a4: f32,
    pub width_letter: f32,
    pub default_width_a4: f32,
    pub default_width_letter: f32,
}

impl StyleRule {
    pub fn width_for(&self, paper: PaperSize) -> f32 {
        match paper {
            PaperSize::A4 => self.width_a4,
            PaperSize::UsLetter => self.width_letter,
        }
    }

    /// Every attribute as a stylesheet declaration, in stylesheet key order.
    pub fn declarations(&self) -> [(&'static str, String); 16] {
        [
            ("bold", self.bold.to_string()),
            ("italic", self.italic.to_string()),
            ("underline", self.underline.to_string()),
            ("uppercase", self.uppercase.to_string()),
            ("text-align", self.text_align.as_str().to_string()),
            ("margin-top", self.margin_top.to_string()),
            ("margin-left", self.margin_left.to_string()),
            ("margin-bottom", self.margin_bottom.to_string()),
            ("margin-right", self.margin_right.to_string()),
            ("padding-left", self.padding_left.to_string()),
            ("content-padding", self.content_padding.to_string()),
            ("line-height", self.line_height.to_string()),
            ("width-a4", self.width_a4.to_string()),
            ("width-us", self.width_letter.to_string()),
            ("default-width-a4", self.default_width_a4.to_string()),
            ("default-width-us", self.default_width_letter.to_string()),
        ]
    }
}

// Written back in stylesheet syntax so `show` output can be pasted into a sheet.
impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.declarations().iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

/// One line of a screenplay, tagged with the element type it renders as.
#[derive(Clone, Debug, PartialEq)]
pub struct ScriptLine {
    pub element: String,
    pub text: String,
}

impl ScriptLine {
    pub fn new(element: impl Into<String>, text: impl Into<String>) -> Self {
        ScriptLine {
            element: element.into(),
            text: text.into(),
        }
    }
}
