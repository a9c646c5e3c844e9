use super::config::MergeConfig;
use super::error::WorkflowError;
use super::progress::{Progress, ProgressReporter};
use crate::core::io::extxyz::ExtxyzFile;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{StructureReader, StructureWriter};
use crate::core::models::info::CONNECTIVITY_KEY;
use crate::core::models::structure::Structure;
use glob::MatchOptions;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub output: PathBuf,
    /// Number of PDB files that were read.
    pub source_count: usize,
    /// Number of frames in the written file.
    pub frame_count: usize,
    /// Total number of atoms across all written frames.
    pub atom_count: usize,
}

/// Expands a glob pattern into a sorted list of paths.
///
/// Hidden files only match when the pattern spells out the leading dot.
///
/// # Errors
///
/// Returns [`WorkflowError::InvalidPattern`] for malformed patterns and
/// [`WorkflowError::NoMatchingFiles`] when nothing matches.
pub fn resolve_pattern(pattern: &str) -> Result<Vec<PathBuf>, WorkflowError> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let entries =
        glob::glob_with(pattern, options).map_err(|source| WorkflowError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| WorkflowError::Io {
            path: e.path().to_path_buf(),
            source: e.into(),
        })?;
        files.push(path);
    }
    files.sort();

    if files.is_empty() {
        return Err(WorkflowError::NoMatchingFiles {
            pattern: pattern.to_string(),
        });
    }
    Ok(files)
}

/// Concatenates structures into one periodic frame.
///
/// Atoms are appended in input order and the cell is taken from the first
/// structure only. Connectivity is folded sequentially with a running offset
/// equal to the number of atoms appended before each structure, so bond
/// `(i, j)` of the k-th structure becomes `(i + offset_k, j + offset_k)`.
/// The merged info map holds only the combined `connectivity` block.
///
/// # Return
///
/// The merged structure, or `None` if `structures` is empty.
pub fn merge_structures(structures: &[Structure]) -> Option<Structure> {
    let first = structures.first()?;
    let mut merged = Structure {
        cell: first.cell,
        pbc: true,
        ..Default::default()
    };

    let mut lines = Vec::new();
    let mut offset = 0;
    for structure in structures {
        merged.symbols.extend(structure.symbols.iter().cloned());
        merged.positions.extend(structure.positions.iter().copied());
        lines.extend(structure.connectivity.lines(offset));
        for (owner, partners) in structure.connectivity.iter() {
            merged
                .connectivity
                .extend_partners(owner + offset, partners.iter().map(|p| p + offset));
        }
        offset += structure.len();
    }

    merged.info.insert(CONNECTIVITY_KEY, lines.join("\n"));
    Some(merged)
}

/// Merges all PDB files matched by a glob pattern into a single extxyz file.
///
/// Every matched file is read, with its own offset-zero connectivity attached,
/// before anything is written. With `multiframe` set, each structure becomes a
/// frame of its own; otherwise they are combined by [`merge_structures`] and
/// written as one frame.
///
/// # Arguments
///
/// * `config` - Pattern, output path and frame mode.
/// * `reporter` - Receives read and write progress.
///
/// # Errors
///
/// Fails before any I/O when the pattern is invalid or matches nothing. Any
/// read failure aborts the merge without creating the output file.
#[instrument(skip_all, name = "merge_workflow")]
pub fn run(
    config: &MergeConfig,
    reporter: &ProgressReporter,
) -> Result<MergeSummary, WorkflowError> {
    let files = resolve_pattern(&config.pattern)?;
    info!(
        "Merging {} PDB file(s) matching '{}' into {:?} ({}).",
        files.len(),
        config.pattern,
        config.output,
        if config.multiframe { "multi-frame" } else { "single frame" }
    );

    reporter.report(Progress::PhaseStart {
        name: "Reading structures",
    });
    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });
    let mut structures = Vec::with_capacity(files.len());
    for path in &files {
        let mut structure = PdbFile::read_from_path(path).map_err(|source| WorkflowError::Read {
            path: path.clone(),
            source,
        })?;
        structure.attach_connectivity();
        debug!("Read {:?} with {} atoms.", path, structure.len());
        structures.push(structure);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Writing output",
    });
    let write_err = |source| WorkflowError::Write {
        path: config.output.clone(),
        source,
    };
    let (frame_count, atom_count) = if config.multiframe {
        ExtxyzFile::write_frames_to_path(&structures, &config.output).map_err(write_err)?;
        (
            structures.len(),
            structures.iter().map(Structure::len).sum::<usize>(),
        )
    } else {
        let merged = merge_structures(&structures).ok_or_else(|| WorkflowError::NoMatchingFiles {
            pattern: config.pattern.clone(),
        })?;
        ExtxyzFile::write_to_path(&merged, &config.output).map_err(write_err)?;
        (1, merged.len())
    };
    reporter.report(Progress::PhaseFinish);

    info!(
        "Wrote {:?}: {} frame(s), {} atom(s) from {} PDB source(s).",
        config.output,
        frame_count,
        atom_count,
        structures.len()
    );

    Ok(MergeSummary {
        output: config.output.clone(),
        source_count: structures.len(),
        frame_count,
        atom_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::connectivity::ConnectivityTable;
    use crate::workflows::config::MergeConfigBuilder;
    use nalgebra::{Matrix3, Point3};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn pdb_text(
        atoms: &[(&str, [f64; 3])],
        cell: Option<f64>,
        bonds: &[(usize, Vec<usize>)],
    ) -> String {
        let mut lines = Vec::new();
        if let Some(a) = cell {
            lines.push(format!(
                "CRYST1{:9.3}{:9.3}{:9.3}{:7.2}{:7.2}{:7.2} P 1           1",
                a, a, a, 90.0, 90.0, 90.0
            ));
        }
        for (i, (element, pos)) in atoms.iter().enumerate() {
            lines.push(format!(
                "HETATM{:>5} {:<4} {:>3} {:1}{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                i + 1,
                element,
                "MOL",
                "A",
                1,
                pos[0],
                pos[1],
                pos[2],
                1.0,
                0.0,
                element
            ));
        }
        for (owner, partners) in bonds {
            let mut line = format!("CONECT{:>5}", owner + 1);
            for p in partners.iter() {
                line.push_str(&format!("{:>5}", p + 1));
            }
            lines.push(line);
        }
        lines.push("END".to_string());
        lines.join("\n")
    }

    /// `a.pdb`: two bonded atoms in a 10 Å box; `b.pdb`: one atom in a 20 Å box.
    fn write_two_files(dir: &Path) {
        fs::write(
            dir.join("a.pdb"),
            pdb_text(
                &[("C", [0.0, 0.0, 0.0]), ("O", [1.2, 0.0, 0.0])],
                Some(10.0),
                &[(0, vec![1])],
            ),
        )
        .unwrap();
        fs::write(
            dir.join("b.pdb"),
            pdb_text(&[("N", [5.0, 5.0, 5.0])], Some(20.0), &[]),
        )
        .unwrap();
    }

    fn config(dir: &TempDir, pattern: &str, multiframe: bool) -> MergeConfig {
        MergeConfigBuilder::new()
            .pattern(dir.path().join(pattern).to_string_lossy())
            .output(dir.path().join("merged.xyz"))
            .multiframe(multiframe)
            .build()
            .unwrap()
    }

    fn structure(n_atoms: usize, cell: Option<f64>, bonds: &[(usize, Vec<usize>)]) -> Structure {
        let mut s = match cell {
            Some(a) => Structure::with_cell(Matrix3::from_diagonal_element(a)),
            None => Structure::new(),
        };
        for i in 0..n_atoms {
            s.push_atom("C", Point3::new(i as f64, 0.0, 0.0));
        }
        for (owner, partners) in bonds {
            s.connectivity.extend_partners(*owner, partners.iter().copied());
        }
        s.attach_connectivity();
        s
    }

    #[test]
    fn merge_structures_of_empty_slice_is_none() {
        assert!(merge_structures(&[]).is_none());
    }

    #[test]
    fn merged_atom_count_is_sum_of_inputs() {
        let inputs = vec![
            structure(3, Some(10.0), &[]),
            structure(1, None, &[]),
            structure(5, Some(30.0), &[]),
        ];
        let merged = merge_structures(&inputs).unwrap();
        assert_eq!(merged.len(), 9);
        assert_eq!(merged.positions.len(), 9);
        assert_eq!(merged.positions[3], inputs[1].positions[0]);
    }

    #[test]
    fn merged_cell_comes_from_first_structure_and_is_periodic() {
        let inputs = vec![structure(1, Some(10.0), &[]), structure(1, Some(99.0), &[])];
        let merged = merge_structures(&inputs).unwrap();
        assert_eq!(merged.cell, Some(Matrix3::from_diagonal_element(10.0)));
        assert!(merged.pbc);

        let no_cell_first = vec![structure(1, None, &[]), structure(1, Some(99.0), &[])];
        let merged = merge_structures(&no_cell_first).unwrap();
        assert!(merged.cell.is_none());
        assert!(merged.pbc);
    }

    #[test]
    fn merged_connectivity_is_offset_by_preceding_atom_counts() {
        let inputs = vec![
            structure(2, None, &[(0, vec![1]), (1, vec![0])]),
            structure(3, None, &[(2, vec![0, 1])]),
            structure(2, None, &[(1, vec![0])]),
        ];
        let merged = merge_structures(&inputs).unwrap();
        assert_eq!(merged.connectivity_block(), Some("0 1\n1 0\n4 2 3\n6 5"));

        let table = ConnectivityTable::parse_block(merged.connectivity_block().unwrap()).unwrap();
        let mut offset = 0;
        for input in &inputs {
            for (owner, partners) in input.connectivity.iter() {
                let expected: Vec<usize> = partners.iter().map(|p| p + offset).collect();
                assert_eq!(table.partners(owner + offset), Some(expected.as_slice()));
            }
            offset += input.len();
        }
        assert_eq!(merged.connectivity, table);
    }

    #[test]
    fn merged_info_holds_only_connectivity() {
        let mut first = structure(1, None, &[]);
        first.info.insert("spacegroup", "P 1");
        let merged = merge_structures(&[first]).unwrap();
        assert_eq!(merged.info.len(), 1);
        assert_eq!(merged.connectivity_block(), Some(""));
    }

    #[test]
    fn merge_mode_writes_one_frame_with_combined_connectivity() {
        let dir = tempfile::tempdir().unwrap();
        write_two_files(dir.path());

        let summary = run(&config(&dir, "*.pdb", false), &ProgressReporter::new()).unwrap();
        assert_eq!(summary.source_count, 2);
        assert_eq!(summary.frame_count, 1);
        assert_eq!(summary.atom_count, 3);

        let frames = ExtxyzFile::read_frames_from_path(&summary.output).unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.symbols, vec!["C", "O", "N"]);
        assert_eq!(frame.connectivity_block(), Some("0 1"));
        assert!(frame.connectivity.partners(2).is_none());
        assert_eq!(frame.cell, Some(Matrix3::from_diagonal_element(10.0)));
        assert!(frame.pbc);
    }

    #[test]
    fn multiframe_mode_keeps_per_file_connectivity_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        write_two_files(dir.path());

        let summary = run(&config(&dir, "*.pdb", true), &ProgressReporter::new()).unwrap();
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.atom_count, 3);

        let frames = ExtxyzFile::read_frames_from_path(&summary.output).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].connectivity_block(), Some("0 1"));
        assert_eq!(frames[1].connectivity_block(), Some(""));
        assert_eq!(frames[0].cell, Some(Matrix3::from_diagonal_element(10.0)));
        assert_eq!(frames[1].cell, Some(Matrix3::from_diagonal_element(20.0)));
        assert_eq!(
            frames[1].info.get("spacegroup").and_then(|v| v.as_str()),
            Some("P 1")
        );
    }

    #[test]
    fn multiframe_connectivity_is_not_cumulative() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x1.pdb", "x2.pdb"] {
            fs::write(
                dir.path().join(name),
                pdb_text(
                    &[("C", [0.0, 0.0, 0.0]), ("C", [1.5, 0.0, 0.0])],
                    None,
                    &[(0, vec![1]), (1, vec![0])],
                ),
            )
            .unwrap();
        }
        let summary = run(&config(&dir, "x*.pdb", true), &ProgressReporter::new()).unwrap();
        let frames = ExtxyzFile::read_frames_from_path(&summary.output).unwrap();
        for frame in &frames {
            assert_eq!(frame.connectivity_block(), Some("0 1\n1 0"));
        }
    }

    #[test]
    fn files_are_merged_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("z.pdb"), pdb_text(&[("S", [0.0; 3])], None, &[])).unwrap();
        fs::write(dir.path().join("m.pdb"), pdb_text(&[("P", [0.0; 3])], None, &[])).unwrap();
        fs::write(dir.path().join("a.pdb"), pdb_text(&[("K", [0.0; 3])], None, &[])).unwrap();

        let summary = run(&config(&dir, "*.pdb", false), &ProgressReporter::new()).unwrap();
        let frame = ExtxyzFile::read_from_path(&summary.output).unwrap();
        assert_eq!(frame.symbols, vec!["K", "P", "S"]);
    }

    #[test]
    fn zero_matches_is_a_configuration_error_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, "*.pdb", false);
        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::NoMatchingFiles { .. }));
        assert!(!config.output.exists());
    }

    #[test]
    fn wildcards_skip_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        write_two_files(dir.path());
        fs::write(dir.path().join("._a.pdb"), [0x00u8, 0x05, 0x16, 0x07]).unwrap();
        fs::write(dir.path().join(".x.pdb"), "REMARK hidden\nEND\n").unwrap();

        let pattern = dir.path().join("*.pdb");
        let files = resolve_pattern(&pattern.to_string_lossy()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdb", "b.pdb"]);

        let summary = run(&config(&dir, "*.pdb", false), &ProgressReporter::new()).unwrap();
        assert_eq!(summary.source_count, 2);
    }

    #[test]
    fn hidden_files_match_an_explicit_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".x.pdb"), "END\n").unwrap();
        let files = resolve_pattern(&dir.path().join(".*.pdb").to_string_lossy()).unwrap();
        assert_eq!(files, vec![dir.path().join(".x.pdb")]);
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = resolve_pattern("[unclosed").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidPattern { .. }));
    }

    #[test]
    fn read_failure_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        write_two_files(dir.path());
        fs::write(dir.path().join("c.pdb"), "REMARK nothing here\nEND\n").unwrap();

        let config = config(&dir, "*.pdb", false);
        let err = run(&config, &ProgressReporter::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::Read { path, .. } if path.ends_with("c.pdb")));
        assert!(!config.output.exists());
    }
}
