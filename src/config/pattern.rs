//! Output filename patterns
//!
//! A pattern is a filename template with the placeholders `{base}`, `{x}`,
//! `{y}` and `{ext}`. Each placeholder may carry a format specifier after a
//! colon, following the usual `[[fill]align][0][width][type]` layout:
//!
//! * `{x:04d}` - zero-padded to four digits
//! * `{y:>6}` - right-aligned in six columns
//! * `{base:_<12}` - left-aligned, padded with underscores
//!
//! `{{` and `}}` produce literal braces.
//!
//! An expansion names a single file inside the output directory; see
//! [`is_plain_filename`].

use std::path::{Component, Path};

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::{RetileError, RetileResult};

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\{\{|\}\}|\{([^{}:]*)(?::([^{}]*))?\}")
        .expect("token regex is valid");
}

/// Placeholders understood by [`OutputPattern`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Base,
    X,
    Y,
    Ext,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "base" => Some(Placeholder::Base),
            "x" => Some(Placeholder::X),
            "y" => Some(Placeholder::Y),
            "ext" => Some(Placeholder::Ext),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Placeholder::X | Placeholder::Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            _ => None,
        }
    }
}

/// Parsed format specifier of one placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Option<Align>,
    zero_pad: bool,
    width: usize,
}

impl Default for FormatSpec {
    fn default() -> Self {
        FormatSpec {
            fill: ' ',
            align: None,
            zero_pad: false,
            width: 0,
        }
    }
}

impl FormatSpec {
    fn parse(spec: &str, placeholder: Placeholder) -> Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = FormatSpec::default();
        let mut pos = 0;

        if chars.len() >= 2 && Align::from_char(chars[1]).is_some() {
            parsed.fill = chars[0];
            parsed.align = Align::from_char(chars[1]);
            pos = 2;
        } else if let Some(align) = chars.first().and_then(|c| Align::from_char(*c)) {
            parsed.align = Some(align);
            pos = 1;
        }

        if chars.get(pos) == Some(&'0') {
            parsed.zero_pad = true;
            pos += 1;
        }

        let digits_start = pos;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos > digits_start {
            let digits: String = chars[digits_start..pos].iter().collect();
            parsed.width = digits
                .parse()
                .map_err(|_| format!("width '{}' is too large", digits))?;
        }

        match chars.get(pos) {
            None => {}
            Some('d') if placeholder.is_numeric() => pos += 1,
            Some('s') if !placeholder.is_numeric() => pos += 1,
            Some(c) => return Err(format!("unsupported format type '{}'", c)),
        }

        if pos != chars.len() {
            return Err(format!("unexpected trailing characters in '{}'", spec));
        }

        Ok(parsed)
    }

    fn apply(&self, value: &str, numeric: bool) -> String {
        let len = value.chars().count();
        if len >= self.width {
            return value.to_string();
        }
        let padding = self.width - len;

        // Zero flag without explicit alignment pads between sign and digits;
        // coordinates are unsigned so that is simply the left side.
        if self.zero_pad && self.align.is_none() {
            let fill = if numeric { '0' } else { self.fill };
            return if numeric {
                format!("{}{}", fill.to_string().repeat(padding), value)
            } else {
                format!("{}{}", value, fill.to_string().repeat(padding))
            };
        }

        let fill = if self.zero_pad && self.fill == ' ' { '0' } else { self.fill };
        let pad = |n: usize| fill.to_string().repeat(n);
        let align = self
            .align
            .unwrap_or(if numeric { Align::Right } else { Align::Left });

        match align {
            Align::Left => format!("{}{}", value, pad(padding)),
            Align::Right => format!("{}{}", pad(padding), value),
            Align::Center => {
                let left = padding / 2;
                format!("{}{}{}", pad(left), value, pad(padding - left))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        placeholder: Placeholder,
        spec: FormatSpec,
    },
}

/// A parsed, reusable filename template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl OutputPattern {
    /// Parse a pattern string
    ///
    /// Fails on unknown placeholders, malformed specifiers and unmatched
    /// braces. Presence of `{base}`/`{ext}` is checked by the validator,
    /// not here.
    pub fn parse(pattern: &str) -> RetileResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in TOKEN.captures_iter(pattern) {
            let Some(whole) = caps.get(0) else { continue };
            push_literal(&mut literal, &pattern[last..whole.start()])?;
            last = whole.end();

            match whole.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                _ => {
                    let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                    let placeholder = Placeholder::from_name(name).ok_or_else(|| {
                        RetileError::pattern(format!("unknown placeholder '{{{}}}'", name))
                    })?;
                    let spec = match caps.get(2) {
                        Some(spec) => FormatSpec::parse(spec.as_str(), placeholder).map_err(|e| {
                            RetileError::pattern(format!("placeholder '{{{}}}': {}", name, e))
                        })?,
                        None => FormatSpec::default(),
                    };

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field { placeholder, spec });
                }
            }
        }

        push_literal(&mut literal, &pattern[last..])?;
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(OutputPattern {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as originally written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern references the given placeholder
    pub fn contains(&self, placeholder: Placeholder) -> bool {
        self.segments.iter().any(|segment| {
            matches!(segment, Segment::Field { placeholder: p, .. } if *p == placeholder)
        })
    }

    /// Expand the pattern for one tile
    pub fn expand(&self, base: &str, x: u32, y: u32, ext: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { placeholder, spec } => {
                    let value = match placeholder {
                        Placeholder::Base => base.to_string(),
                        Placeholder::X => x.to_string(),
                        Placeholder::Y => y.to_string(),
                        Placeholder::Ext => ext.to_string(),
                    };
                    out.push_str(&spec.apply(&value, placeholder.is_numeric()));
                }
            }
        }
        out
    }
}

/// Whether `name` is a single path component naming a file
///
/// Rejects empty names, separators, `.`/`..` and absolute or prefixed
/// paths, any of which would place a tile outside the output directory.
pub fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.ends_with(['/', '\\'])
}

fn push_literal(buffer: &mut String, text: &str) -> RetileResult<()> {
    if let Some(brace) = text.chars().find(|c| *c == '{' || *c == '}') {
        return Err(RetileError::pattern(format!("unmatched '{}' in pattern", brace)));
    }
    buffer.push_str(text);
    Ok(())
}
