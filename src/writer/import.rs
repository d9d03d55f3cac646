use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{fields, SongRecord};
use crate::storage::store::RecordStore;

const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub blank_lines: usize,
    pub text_index: bool,
}

/// Buffered song writer for bulk loads
pub struct SongImporter<'a> {
    pub store: &'a dyn RecordStore,
    pub buffer: Vec<SongRecord>,
    pub batch_size: usize,
    pub imported: usize,
}

impl<'a> SongImporter<'a> {
    pub fn new(store: &'a dyn RecordStore, batch_size: usize) -> Self {
        SongImporter {
            store,
            buffer: Vec::with_capacity(batch_size),
            batch_size: batch_size.max(1),
            imported: 0,
        }
    }

    pub fn add(&mut self, record: SongRecord) -> Result<()> {
        self.buffer.push(record);

        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        for record in self.buffer.drain(..) {
            self.store.insert(record.into_fields())?;
            self.imported += 1;
        }
        debug!(imported = self.imported, "flushed import batch");
        Ok(())
    }

    /// Flushes the rest and returns how many songs were stored.
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.imported)
    }
}

/// Parses newline-delimited song records.
///
/// Blank lines are skipped and counted. Every line is validated before anything
/// is stored, so a malformed line fails the whole import.
pub fn parse_songs(reader: impl BufRead) -> Result<(Vec<SongRecord>, usize)> {
    let mut records = Vec::new();
    let mut blank = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            blank += 1;
            continue;
        }
        let record: SongRecord = serde_json::from_str(&line).map_err(|e| {
            Error::new(ErrorKind::Parse, format!("line {}: {}", index + 1, e))
        })?;
        records.push(record);
    }

    Ok((records, blank))
}

/// Loads the song file at `path` into `store`, then builds the text index over
/// title and artist unless told not to.
pub fn import_file(store: &dyn RecordStore, path: &Path, text_index: bool) -> Result<ImportReport> {
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::Io, format!("cannot open {}: {}", path.display(), e))
    })?;
    let (records, blank_lines) = parse_songs(BufReader::new(file))?;
    let total = records.len();
    info!(path = %path.display(), songs = total, "importing songs");

    let mut importer = SongImporter::new(store, PROGRESS_EVERY);
    for record in records {
        importer.add(record)?;
        if importer.imported > 0 && importer.buffer.is_empty() {
            info!(imported = importer.imported, total, "import progress");
        }
    }
    let imported = importer.finish()?;

    if text_index {
        store.create_text_index(&[fields::TITLE, fields::ARTIST])?;
    }

    info!(imported, blank_lines, text_index, "import finished");
    Ok(ImportReport {
        imported,
        blank_lines,
        text_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_lines_are_skipped() {
        let input = concat!(
            r#"{"title":"A","artist":"X","difficulty":1.5,"level":3,"released":"2016-01-01"}"#, "\n",
            "   \n",
            r#"{"title":"B","artist":"Y","difficulty":2,"level":4,"released":"2016-01-02"}"#, "\n",
        );
        let (records, blank) = parse_songs(Cursor::new(input)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].difficulty, 2.0);
        assert_eq!(blank, 1);
    }

    #[test]
    fn malformed_line_is_reported_by_number() {
        let input = concat!(
            r#"{"title":"A","artist":"X","difficulty":1.5,"level":3,"released":"2016-01-01"}"#, "\n",
            "\n",
            r#"{"title":"B","artist":"Y","difficulty":"hard","level":4,"released":"2016-01-02"}"#, "\n",
        );
        let err = parse_songs(Cursor::new(input)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.context.starts_with("line 3:"), "{}", err);
    }
}
