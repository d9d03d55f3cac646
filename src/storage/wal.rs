use std::fs::{File, OpenOptions};
use std::io::{BufReader, ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;
use crate::core::error::{Error, ErrorKind, Result};

const MAX_ENTRY_LEN: usize = 10_000_000;   // 10MB max per entry

/// Write-ahead log for durability
///
/// Frame layout: `len: u32 LE | crc32: u32 LE | bincode(WALEntry<Op>)`.
pub struct WAL<Op> {
    pub file: File,
    pub position: u64,
    pub sync_mode: SyncMode,
    pub sequence: u64,
    torn: bool,                 // A failed append may have left bytes past `position`
    _op: PhantomData<fn() -> Op>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Immediate,  // fsync after every write
    None,       // Let OS handle it
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WALEntry<Op> {
    pub sequence: u64,
    pub operation: Op,
    pub timestamp: DateTime<Utc>,
}

impl<Op: Serialize + DeserializeOwned> WAL<Op> {
    /// Opens the log at `path`, returning it together with every intact entry.
    ///
    /// Replay stops at the first torn or corrupt frame; that tail is cut off so
    /// later appends start from a clean boundary.
    pub fn open(path: &Path, sync_mode: SyncMode) -> Result<(Self, Vec<WALEntry<Op>>)> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let (entries, valid_len) = read_entries(&mut file, 0)?;
        let file_len = file.metadata()?.len();
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                discarded_bytes = file_len - valid_len,
                "truncating torn tail of write-ahead log"
            );
            file.set_len(valid_len)?;
        }

        let sequence = entries.last().map(|e| e.sequence + 1).unwrap_or(0);

        Ok((
            WAL {
                file,
                position: valid_len,
                sync_mode,
                sequence,
                torn: false,
                _op: PhantomData,
            },
            entries,
        ))
    }

    pub fn append(&mut self, operation: Op) -> Result<()> {
        if self.torn {
            self.discard_torn_frame()?;
        }

        let entry = WALEntry {
            sequence: self.sequence,
            operation,
            timestamp: Utc::now(),
        };

        let data = bincode::serialize(&entry)?;
        let len = data.len() as u32;
        let checksum = crc32fast::hash(&data);

        let mut frame = Vec::with_capacity(8 + data.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&checksum.to_le_bytes());
        frame.extend_from_slice(&data);
        if let Err(err) = self.file.write_all(&frame) {
            self.torn = true;
            if let Err(cleanup) = self.discard_torn_frame() {
                warn!(error = %cleanup, "torn frame left in write-ahead log until the next append");
            }
            return Err(err.into());
        }

        self.sequence += 1;
        self.position += frame.len() as u64;

        if self.sync_mode == SyncMode::Immediate {
            self.file.sync_data()?;
        }

        Ok(())
    }

    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Cuts the file back to the last acknowledged frame.
    fn discard_torn_frame(&mut self) -> Result<()> {
        self.file.set_len(self.position)?;
        self.torn = false;
        Ok(())
    }
}

/// Read-only view of a log another process appends to.
///
/// Each call to `read_new` returns the complete frames written since the last
/// call. A frame still being written is left for the next call.
pub struct WALTail<Op> {
    pub path: PathBuf,
    pub position: u64,
    file: Option<File>,
    _op: PhantomData<fn() -> Op>,
}

impl<Op: Serialize + DeserializeOwned> WALTail<Op> {
    pub fn new(path: PathBuf) -> Self {
        WALTail {
            path,
            position: 0,
            file: None,
            _op: PhantomData,
        }
    }

    pub fn read_new(&mut self) -> Result<Vec<WALEntry<Op>>> {
        if self.file.is_none() {
            match File::open(&self.path) {
                Ok(file) => self.file = Some(file),
                // Nothing written yet
                Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            }
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(Vec::new());
        };

        if file.metadata()?.len() < self.position {
            warn!(path = %self.path.display(), "write-ahead log shrank, replaying from the start");
            self.position = 0;
        }

        let (entries, end) = read_entries(file, self.position)?;
        self.position = end;
        Ok(entries)
    }
}

/// Reads the intact entries starting at byte `start`; returns them with the
/// offset just past the last one.
fn read_entries<Op: DeserializeOwned>(file: &mut File, start: u64) -> Result<(Vec<WALEntry<Op>>, u64)> {
    let mut entries = Vec::new();
    let mut valid_len = start;

    file.seek(SeekFrom::Start(start))?;
    let mut reader = BufReader::new(&mut *file);

    loop {
        let mut header = [0u8; 8];
        match reader.read_exact(&mut header) {
            Ok(_) => {}
            Err(e) if e.kind() == IoErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::new(ErrorKind::Io, format!("Failed to read WAL: {}", e))),
        }

        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let checksum = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if len > MAX_ENTRY_LEN {
            break;
        }

        let mut data = vec![0u8; len];
        match reader.read_exact(&mut data) {
            Ok(_) => {}
            Err(e) if e.kind() == IoErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        if crc32fast::hash(&data) != checksum {
            break;
        }

        match bincode::deserialize::<WALEntry<Op>>(&data) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("stopping WAL replay at undecodable entry: {}", e);
                break;
            }
        }
        valid_len += 8 + len as u64;
    }

    Ok((entries, valid_len))
}
