use crate::core::io::traits::{StructureReader, StructureWriter};
use crate::core::models::connectivity::{ConnectivityError, ConnectivityTable};
use crate::core::models::info::{CONNECTIVITY_KEY, InfoValue};
use crate::core::models::structure::Structure;
use nalgebra::{Matrix3, Point3};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

const PROPERTIES: &str = "species:S:1:pos:R:3";
const RESERVED_KEYS: [&str; 3] = ["Lattice", "Properties", "pbc"];

#[derive(Debug, Error)]
pub enum ExtxyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ExtxyzParseErrorKind,
    },
    #[error("Info key '{0}' cannot be written to an extxyz comment line")]
    InvalidInfoKey(String),
    #[error("Input contains no frames")]
    MissingFrame,
}

#[derive(Debug, Error)]
pub enum ExtxyzParseErrorKind {
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unterminated quoted value for key '{0}'")]
    UnterminatedQuote(String),
    #[error("Lattice must contain nine numbers (value: '{0}')")]
    InvalidLattice(String),
    #[error("pbc must contain three T/F flags (value: '{0}')")]
    InvalidPbc(String),
    #[error("Unsupported Properties descriptor '{0}' (expected '{PROPERTIES}')")]
    UnsupportedProperties(String),
    #[error("Atom line must contain a symbol and three coordinates")]
    InvalidAtomLine,
    #[error("Invalid float value '{0}'")]
    InvalidFloat(String),
    #[error("Frame ended after {found} of {expected} atoms")]
    TruncatedFrame { expected: usize, found: usize },
    #[error("Invalid connectivity block: {0}")]
    InvalidConnectivity(#[from] ConnectivityError),
}

/// Extended XYZ reader and writer.
///
/// Frames carry a `Lattice` (when a cell is present), a fixed
/// `species:S:1:pos:R:3` property layout, every entry of the structure's info
/// map, and a `pbc` flag triple. Multi-frame files are plain concatenations.
pub struct ExtxyzFile;

fn format_float(value: f64) -> String {
    format!("{:.8}", value)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Strings that would be re-read as another type, or that break tokenization, are quoted.
fn format_info_value(value: &InfoValue) -> String {
    match value {
        InfoValue::Str(s) => {
            let needs_quotes = s.is_empty()
                || s.chars()
                    .any(|c| c.is_whitespace() || matches!(c, '"' | '=' | '\\'))
                || !matches!(parse_bare_value(s), InfoValue::Str(_));
            if needs_quotes { escape(s) } else { s.clone() }
        }
        InfoValue::Int(i) => i.to_string(),
        InfoValue::Float(x) => format!("{:?}", x),
        InfoValue::Bool(b) => if *b { "T" } else { "F" }.to_string(),
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '=' | '\\'))
}

fn parse_bare_value(raw: &str) -> InfoValue {
    if let Ok(i) = raw.parse::<i64>() {
        return InfoValue::Int(i);
    }
    if let Ok(x) = raw.parse::<f64>() {
        return InfoValue::Float(x);
    }
    match raw {
        "T" | "True" | "true" => InfoValue::Bool(true),
        "F" | "False" | "false" => InfoValue::Bool(false),
        _ => InfoValue::Str(raw.to_string()),
    }
}

/// One `key=value` pair from a comment line.
struct RawField {
    key: String,
    value: String,
    quoted: bool,
}

fn tokenize_comment(comment: &str, line_num: usize) -> Result<Vec<RawField>, ExtxyzError> {
    let mut fields = Vec::new();
    let mut chars = comment.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            chars.next();
        }

        if chars.peek() != Some(&'=') {
            // A bare key is a boolean flag.
            fields.push(RawField {
                key,
                value: "T".to_string(),
                quoted: false,
            });
            continue;
        }
        chars.next();

        let mut value = String::new();
        let quoted = chars.peek() == Some(&'"');
        if quoted {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some('n') => value.push('\n'),
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some(other) => {
                            value.push('\\');
                            value.push(other);
                        }
                        None => break,
                    },
                    _ => value.push(c),
                }
            }
            if !closed {
                return Err(ExtxyzError::Parse {
                    line: line_num,
                    kind: ExtxyzParseErrorKind::UnterminatedQuote(key),
                });
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        fields.push(RawField { key, value, quoted });
    }

    Ok(fields)
}

fn parse_float(token: &str, line_num: usize) -> Result<f64, ExtxyzError> {
    token.parse().map_err(|_| ExtxyzError::Parse {
        line: line_num,
        kind: ExtxyzParseErrorKind::InvalidFloat(token.to_string()),
    })
}

fn apply_comment(
    structure: &mut Structure,
    comment: &str,
    line_num: usize,
) -> Result<(), ExtxyzError> {
    let mut pbc = None;
    for field in tokenize_comment(comment, line_num)? {
        match field.key.as_str() {
            "Lattice" => {
                let values = field
                    .value
                    .split_whitespace()
                    .map(|t| t.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .ok()
                    .filter(|v| v.len() == 9)
                    .ok_or_else(|| ExtxyzError::Parse {
                        line: line_num,
                        kind: ExtxyzParseErrorKind::InvalidLattice(field.value.clone()),
                    })?;
                structure.cell = Some(Matrix3::from_row_slice(&values));
            }
            "Properties" => {
                if field.value != PROPERTIES {
                    return Err(ExtxyzError::Parse {
                        line: line_num,
                        kind: ExtxyzParseErrorKind::UnsupportedProperties(field.value),
                    });
                }
            }
            "pbc" => {
                let flags = field
                    .value
                    .split_whitespace()
                    .map(|t| match t {
                        "T" | "True" => Some(true),
                        "F" | "False" => Some(false),
                        _ => None,
                    })
                    .collect::<Option<Vec<_>>>()
                    .filter(|f| f.len() == 3)
                    .ok_or_else(|| ExtxyzError::Parse {
                        line: line_num,
                        kind: ExtxyzParseErrorKind::InvalidPbc(field.value.clone()),
                    })?;
                pbc = Some(flags.iter().all(|&f| f));
            }
            _ => {
                if field.key == CONNECTIVITY_KEY {
                    structure.connectivity =
                        ConnectivityTable::parse_block(&field.value).map_err(|e| {
                            ExtxyzError::Parse {
                                line: line_num,
                                kind: e.into(),
                            }
                        })?;
                }
                let value = if field.quoted {
                    InfoValue::Str(field.value)
                } else {
                    parse_bare_value(&field.value)
                };
                structure.info.insert(field.key, value);
            }
        }
    }
    structure.pbc = pbc.unwrap_or(structure.cell.is_some());
    Ok(())
}

impl ExtxyzFile {
    /// Reads one frame whose atom-count line has already been consumed.
    fn read_frame(
        lines: &mut impl Iterator<Item = (usize, io::Result<String>)>,
        count_line: &str,
        count_line_num: usize,
    ) -> Result<Structure, ExtxyzError> {
        let count: usize = count_line.trim().parse().map_err(|_| ExtxyzError::Parse {
            line: count_line_num,
            kind: ExtxyzParseErrorKind::InvalidAtomCount(count_line.trim().to_string()),
        })?;
        let truncated = |found: usize| ExtxyzError::Parse {
            line: count_line_num,
            kind: ExtxyzParseErrorKind::TruncatedFrame {
                expected: count,
                found,
            },
        };

        let mut structure = Structure::new();
        let (comment_num, comment) = lines.next().ok_or_else(|| truncated(0))?;
        apply_comment(&mut structure, &comment?, comment_num)?;

        for found in 0..count {
            let (line_num, line) = lines.next().ok_or_else(|| truncated(found))?;
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return Err(ExtxyzError::Parse {
                    line: line_num,
                    kind: ExtxyzParseErrorKind::InvalidAtomLine,
                });
            }
            let x = parse_float(parts[1], line_num)?;
            let y = parse_float(parts[2], line_num)?;
            let z = parse_float(parts[3], line_num)?;
            structure.push_atom(parts[0], Point3::new(x, y, z));
        }

        Ok(structure)
    }

    /// Reads every frame until end of input.
    ///
    /// Blank lines between frames are skipped.
    pub fn read_frames_from(reader: &mut impl BufRead) -> Result<Vec<Structure>, ExtxyzError> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        let mut frames = Vec::new();
        while let Some((line_num, line)) = lines.next() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            frames.push(Self::read_frame(&mut lines, &line, line_num)?);
        }
        Ok(frames)
    }

    pub fn read_frames_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Structure>, ExtxyzError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_frames_from(&mut reader)
    }
}

impl StructureReader for ExtxyzFile {
    type Error = ExtxyzError;

    /// Reads the first frame.
    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        Self::read_frames_from(reader)?
            .into_iter()
            .next()
            .ok_or(ExtxyzError::MissingFrame)
    }
}

impl StructureWriter for ExtxyzFile {
    type Error = ExtxyzError;

    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut fields = Vec::with_capacity(structure.info.len() + 3);
        if let Some(cell) = &structure.cell {
            let lattice: Vec<String> = cell
                .row_iter()
                .flat_map(|row| row.iter().map(|&v| format_float(v)).collect::<Vec<_>>())
                .collect();
            fields.push(format!("Lattice=\"{}\"", lattice.join(" ")));
        }
        fields.push(format!("Properties={}", PROPERTIES));
        for (key, value) in structure.info.iter() {
            if !is_valid_key(key) || RESERVED_KEYS.contains(&key) {
                return Err(ExtxyzError::InvalidInfoKey(key.to_string()));
            }
            fields.push(format!("{}={}", key, format_info_value(value)));
        }
        let flag = if structure.pbc { "T" } else { "F" };
        fields.push(format!("pbc=\"{flag} {flag} {flag}\""));

        writeln!(writer, "{}", structure.len())?;
        writeln!(writer, "{}", fields.join(" "))?;
        for (symbol, pos) in structure.symbols.iter().zip(&structure.positions) {
            writeln!(
                writer,
                "{:<2} {:>16.8} {:>16.8} {:>16.8}",
                symbol, pos.x, pos.y, pos.z
            )?;
        }
        Ok(())
    }
}
