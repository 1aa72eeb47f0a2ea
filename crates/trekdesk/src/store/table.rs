//! One data file viewed as a table of records.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::codec::{self, Record};
use crate::error::{Error, Result};

/// Records of type `R` stored in a single pipe-delimited file.
///
/// Methods do not lock; callers hold the store lock around them.
#[derive(Debug)]
pub struct Table<R> {
    path: PathBuf,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Table<R> {
    /// Table backed by `R::FILE_NAME` inside `data_dir`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(R::FILE_NAME),
            _record: PhantomData,
        }
    }

    /// Path to the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            fs::write(&self.path, "").map_err(|source| self.write_err(source))?;
            debug!(path = %self.path.display(), "Created data file");
        }
        Ok(())
    }

    /// Raw non-empty lines, in file order. A missing file reads as empty.
    fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(Error::StorageRead {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Replace the file contents through a temporary sibling and a rename.
    fn write_lines(&self, lines: &[String]) -> Result<()> {
        let tmp = self.path.with_extension("txt.tmp");
        let mut body = lines.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        fs::write(&tmp, body).map_err(|source| self.write_err(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.write_err(source))?;
        Ok(())
    }

    fn write_err(&self, source: std::io::Error) -> Error {
        Error::StorageWrite {
            path: self.path.clone(),
            source,
        }
    }

    /// All well-formed records in file order.
    ///
    /// Lines that fail to decode are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load(&self) -> Result<Vec<R>> {
        let lines = self.read_lines()?;
        let mut records = Vec::with_capacity(lines.len());
        for (number, line) in lines.iter().enumerate() {
            match codec::decode::<R>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    file = R::FILE_NAME,
                    line = number + 1,
                    error = %e,
                    "Skipping malformed record"
                ),
            }
        }
        Ok(records)
    }

    /// Number of well-formed records.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Whether the file holds no lines at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_lines()?.is_empty())
    }

    /// Find a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn find(&self, id: &str) -> Result<Option<R>> {
        self.find_by(|record| record.id() == id)
    }

    /// First record matching `predicate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn find_by(&self, predicate: impl Fn(&R) -> bool) -> Result<Option<R>> {
        Ok(self.load()?.into_iter().find(|record| predicate(record)))
    }

    /// All records matching `predicate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn filter(&self, predicate: impl Fn(&R) -> bool) -> Result<Vec<R>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|record| predicate(record))
            .collect())
    }

    /// Append a record as a new line.
    ///
    /// A file whose last line lacks its newline gets one first, so the new
    /// record never joins the previous row.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn append(&self, record: &R) -> Result<()> {
        let line = codec::encode(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.write_err(source))?;
        if !ends_with_newline(&mut file).map_err(|source| self.write_err(source))? {
            writeln!(file).map_err(|source| self.write_err(source))?;
        }
        writeln!(file, "{line}").map_err(|source| self.write_err(source))?;
        debug!(file = R::FILE_NAME, id = record.id(), "Appended record");
        Ok(())
    }

    /// Rewrite the line carrying `record`'s id.
    ///
    /// Returns `false` when no line has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or the file rewritten.
    pub fn replace(&self, record: &R) -> Result<bool> {
        let encoded = codec::encode(record)?;
        let mut found = false;
        let lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .map(|line| {
                if codec::line_id(&line) == record.id() {
                    found = true;
                    encoded.clone()
                } else {
                    line
                }
            })
            .collect();

        if found {
            self.write_lines(&lines)?;
            debug!(file = R::FILE_NAME, id = record.id(), "Replaced record");
        }
        Ok(found)
    }

    /// Drop the line with `id`.
    ///
    /// Returns `false` when no line has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let lines = self.read_lines()?;
        let before = lines.len();
        let kept: Vec<String> = lines
            .into_iter()
            .filter(|line| codec::line_id(line) != id)
            .collect();

        if kept.len() == before {
            return Ok(false);
        }
        self.write_lines(&kept)?;
        debug!(file = R::FILE_NAME, id, "Removed record");
        Ok(true)
    }
}

/// True for an empty file or one whose last byte is `\n`.
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
