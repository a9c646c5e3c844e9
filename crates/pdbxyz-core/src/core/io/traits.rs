use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for parsing a structure file format.
///
/// Implementors handle format-specific parsing; the path-based helper
/// takes care of opening and buffering the file.
pub trait StructureReader {
    /// The error type for read operations.
    type Error: Error + From<io::Error>;

    /// Reads a single structure from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Return
    ///
    /// Returns the parsed structure, including any metadata the format attaches.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Structure, Self::Error>;

    /// Reads a single structure from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Structure, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for serializing structures to a file format.
pub trait StructureWriter {
    /// The error type for write operations.
    type Error: Error + From<io::Error>;

    /// Writes one structure, including its info map, as a single frame.
    ///
    /// # Arguments
    ///
    /// * `structure` - The structure to write.
    /// * `writer` - The writer to output to.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(structure: &Structure, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes several structures as consecutive frames.
    ///
    /// The default implementation writes each frame in order with [`write_to`](Self::write_to).
    fn write_frames_to(frames: &[Structure], writer: &mut impl Write) -> Result<(), Self::Error> {
        for frame in frames {
            Self::write_to(frame, writer)?;
        }
        Ok(())
    }

    /// Writes one structure to a file path, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(structure: &Structure, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(structure, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes several structures as frames of one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_frames_to_path<P: AsRef<Path>>(
        frames: &[Structure],
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_frames_to(frames, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
