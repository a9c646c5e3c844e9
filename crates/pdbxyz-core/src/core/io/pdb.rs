use crate::core::io::traits::StructureReader;
use crate::core::models::structure::Structure;
use crate::core::utils::elements;
use nalgebra::{Matrix3, Point3};
use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

const MIN_ATOM_LINE_LEN: usize = 54;
const MIN_CRYST1_LINE_LEN: usize = 54;
const CONECT_FIRST_PARTNER_COLUMN: usize = 11;
const CONECT_FIELD_WIDTH: usize = 5;
const RIGHT_ANGLE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("{record} record is too short (must be at least {min_len} chars)")]
    LineTooShort { record: &'static str, min_len: usize },
    #[error("Cannot determine element from '{value}'")]
    UnknownElement { value: String },
    #[error("CRYST1 angles do not describe a valid cell")]
    InvalidCellAngles,
}

/// Column slice that tolerates lines truncated before `end`.
fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_int(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    columns: &str,
) -> Result<usize, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
    columns: &str,
) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn cos_degrees(angle: f64) -> f64 {
    if (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE {
        0.0
    } else {
        angle.to_radians().cos()
    }
}

/// Builds lattice vectors (as rows) from cell lengths and angles in degrees.
///
/// The first vector lies along x and the second in the xy-plane.
/// Returns `None` when the angles cannot close a parallelepiped.
pub fn cell_from_parameters(lengths: [f64; 3], angles: [f64; 3]) -> Option<Matrix3<f64>> {
    let [a, b, c] = lengths;
    let [alpha, beta, gamma] = angles;

    let cos_a = cos_degrees(alpha);
    let cos_b = cos_degrees(beta);
    let cos_g = cos_degrees(gamma);
    let sin_g = if cos_g == 0.0 {
        1.0
    } else {
        gamma.to_radians().sin()
    };
    if sin_g.abs() < RIGHT_ANGLE_TOLERANCE {
        return None;
    }

    let term = (cos_a - cos_b * cos_g) / sin_g;
    let z_sq = 1.0 - cos_b * cos_b - term * term;
    if z_sq <= 0.0 {
        return None;
    }

    Some(Matrix3::new(
        a,
        0.0,
        0.0,
        b * cos_g,
        b * sin_g,
        0.0,
        c * cos_b,
        c * term,
        c * z_sq.sqrt(),
    ))
}

/// Raw `CONECT` record kept until every atom serial is known.
struct PendingConect {
    line: usize,
    owner: usize,
    partners: Vec<usize>,
}

/// Reader for Protein Data Bank files.
///
/// Produces a [`Structure`] with element symbols, positions, the `CRYST1` cell
/// and the `CONECT` table resolved from atom serials to 0-based indices.
/// When several `MODEL` blocks are present, the last one is kept.
pub struct PdbFile;

impl PdbFile {
    fn parse_cryst1(
        line: &str,
        line_num: usize,
        structure: &mut Structure,
    ) -> Result<(), PdbError> {
        if line.len() < MIN_CRYST1_LINE_LEN {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort {
                    record: "CRYST1",
                    min_len: MIN_CRYST1_LINE_LEN,
                },
            });
        }
        let lengths = [
            parse_float(line, line_num, 6, 15, "7-15")?,
            parse_float(line, line_num, 15, 24, "16-24")?,
            parse_float(line, line_num, 24, 33, "25-33")?,
        ];
        let angles = [
            parse_float(line, line_num, 33, 40, "34-40")?,
            parse_float(line, line_num, 40, 47, "41-47")?,
            parse_float(line, line_num, 47, 54, "48-54")?,
        ];

        if lengths.iter().any(|&l| l == 0.0) {
            debug!(
                line = line_num,
                "CRYST1 with zero cell length; treating as non-periodic."
            );
            structure.cell = None;
            structure.pbc = false;
        } else {
            let cell = cell_from_parameters(lengths, angles).ok_or(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidCellAngles,
            })?;
            structure.cell = Some(cell);
            structure.pbc = true;
        }

        let space_group = slice_and_trim(line, 55, 66);
        if !space_group.is_empty() {
            structure.info.insert("spacegroup", space_group);
        }
        Ok(())
    }

    /// Partner serials are read as 5-wide fields from column 12 to the end of
    /// the line, so writers that emit more than four partners keep every bond.
    fn parse_conect(line: &str, line_num: usize) -> Result<PendingConect, PdbError> {
        let owner = parse_int(line, line_num, 6, 11, "7-11")?;
        let mut partners = Vec::new();
        let field_starts = (CONECT_FIRST_PARTNER_COLUMN..line.len()).step_by(CONECT_FIELD_WIDTH);
        for start in field_starts {
            let end = start + CONECT_FIELD_WIDTH;
            if slice_and_trim(line, start, end).is_empty() {
                continue;
            }
            let columns = format!("{}-{}", start + 1, end);
            partners.push(parse_int(line, line_num, start, end, &columns)?);
        }
        Ok(PendingConect {
            line: line_num,
            owner,
            partners,
        })
    }
}

impl StructureReader for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new();
        let mut serial_to_index: HashMap<usize, usize> = HashMap::new();
        // Serials repeat once a file passes 99999 atoms; only CONECT needs them unique.
        let mut ambiguous_serials = HashSet::new();
        let mut pending_conect: Vec<PendingConect> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < MIN_ATOM_LINE_LEN {
                        return Err(PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::LineTooShort {
                                record: "ATOM/HETATM",
                                min_len: MIN_ATOM_LINE_LEN,
                            },
                        });
                    }

                    let serial = parse_int(&line, line_num, 6, 11, "7-11")?;
                    let x = parse_float(&line, line_num, 30, 38, "31-38")?;
                    let y = parse_float(&line, line_num, 38, 46, "39-46")?;
                    let z = parse_float(&line, line_num, 46, 54, "47-54")?;

                    let element_str = slice_and_trim(&line, 76, 78);
                    let symbol = if element_str.is_empty() {
                        let raw_name = line.get(12..16).unwrap_or("");
                        elements::infer_from_atom_name(raw_name).ok_or_else(|| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::UnknownElement {
                                value: raw_name.trim().into(),
                            },
                        })?
                    } else {
                        elements::normalize_symbol(element_str).ok_or_else(|| PdbError::Parse {
                            line: line_num,
                            kind: PdbParseErrorKind::UnknownElement {
                                value: element_str.into(),
                            },
                        })?
                    };

                    let index = structure.push_atom(symbol, Point3::new(x, y, z));
                    if serial_to_index.insert(serial, index).is_some() {
                        ambiguous_serials.insert(serial);
                    }
                }
                "CRYST1" => Self::parse_cryst1(&line, line_num, &mut structure)?,
                "CONECT" => pending_conect.push(Self::parse_conect(&line, line_num)?),
                "MODEL" => {
                    if !structure.is_empty() {
                        debug!(
                            line = line_num,
                            "New MODEL record; discarding atoms of the previous model."
                        );
                    }
                    structure.symbols.clear();
                    structure.positions.clear();
                    serial_to_index.clear();
                    ambiguous_serials.clear();
                }
                "END" => break,
                _ => {}
            }
        }

        if structure.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        let resolve = |serial: usize, line: usize| -> Result<usize, PdbError> {
            if ambiguous_serials.contains(&serial) {
                return Err(PdbError::Inconsistency(format!(
                    "CONECT record on line {} references ambiguous atom serial {}",
                    line, serial
                )));
            }
            serial_to_index.get(&serial).copied().ok_or_else(|| {
                PdbError::Inconsistency(format!(
                    "CONECT record on line {} references unknown atom serial {}",
                    line, serial
                ))
            })
        };
        for conect in pending_conect {
            let owner = resolve(conect.owner, conect.line)?;
            let partners = conect
                .partners
                .iter()
                .map(|&serial| resolve(serial, conect.line))
                .collect::<Result<Vec<_>, _>>()?;
            structure.connectivity.extend_partners(owner, partners);
        }

        Ok(structure)
    }
}
