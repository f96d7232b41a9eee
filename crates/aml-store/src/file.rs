use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use aml_types::Block;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::memory::{check_linkage, slice_range};
use crate::traits::{ChainReader, ChainWriter};

/// Frame header: 4 bytes payload length + 4 bytes CRC32, little-endian.
const HEADER_SIZE: usize = 8;

/// Bounded retries for a durable write before the append attempt fails.
const WRITE_RETRIES: u32 = 3;

/// Durable, append-only chain store backed by a single block log.
///
/// On-disk format, one frame per block:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Block)]
/// ```
///
/// Every append is flushed and `fsync`ed before returning, so an
/// acknowledged block survives a crash. On open the log is scanned
/// front-to-back; any damaged frame — bad CRC, truncated tail, broken
/// linkage — is fatal and surfaced as [`StoreError::Corrupt`], never
/// silently truncated.
#[derive(Debug)]
pub struct FileChainStore {
    path: PathBuf,
    /// Append state; the single serialization point for writers.
    writer: Mutex<LogWriter>,
    /// Decoded blocks for random-access reads.
    blocks: RwLock<Vec<Block>>,
}

#[derive(Debug)]
struct LogWriter {
    file: File,
    /// Current end-of-log offset.
    offset: u64,
}

impl FileChainStore {
    /// Open (or create) the block log at `path` and replay it.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let blocks = Self::replay(path)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)
            .map_err(io_err)?;
        let offset = file.metadata().map_err(io_err)?.len();

        debug!(
            path = %path.display(),
            blocks = blocks.len(),
            offset,
            "chain log opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter { file, offset }),
            blocks: RwLock::new(blocks),
        })
    }

    /// Path to the block log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode every frame in the log, verifying CRC and structural linkage.
    fn replay(path: &Path) -> Result<Vec<Block>, StoreError> {
        if !path.exists() {
            return Ok(vec![]);
        }

        let file = File::open(path).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();
        let mut reader = BufReader::new(file);
        let mut blocks: Vec<Block> = Vec::new();
        let mut offset: u64 = 0;

        while offset < file_len {
            if offset + HEADER_SIZE as u64 > file_len {
                return Err(StoreError::Corrupt {
                    offset,
                    reason: "truncated frame header".into(),
                });
            }

            let mut header = [0u8; HEADER_SIZE];
            reader.read_exact(&mut header).map_err(io_err)?;
            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
                return Err(StoreError::Corrupt {
                    offset,
                    reason: format!("invalid frame length {length}"),
                });
            }

            let mut payload = vec![0u8; length as usize];
            reader.read_exact(&mut payload).map_err(io_err)?;

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                return Err(StoreError::Corrupt {
                    offset,
                    reason: format!("CRC mismatch: expected {expected_crc}, got {actual_crc}"),
                });
            }

            let block: Block = bincode::deserialize(&payload).map_err(|e| StoreError::Corrupt {
                offset,
                reason: format!("undecodable block: {e}"),
            })?;

            check_linkage(blocks.last(), &block).map_err(|e| StoreError::Corrupt {
                offset,
                reason: format!("linkage broken: {e}"),
            })?;

            blocks.push(block);
            offset += HEADER_SIZE as u64 + length as u64;
        }

        debug!(blocks = blocks.len(), "chain log replay complete");
        Ok(blocks)
    }

    /// Write one frame durably, rolling back the log on partial failure.
    fn write_frame(w: &mut LogWriter, payload: &[u8]) -> Result<(), StoreError> {
        let length = payload.len() as u32;
        let crc = crc32fast::hash(payload);
        let start = w.offset;

        let mut last_error = String::new();
        for attempt in 1..=WRITE_RETRIES {
            let result = (|| -> std::io::Result<()> {
                w.file.seek(SeekFrom::Start(start))?;
                w.file.write_all(&length.to_le_bytes())?;
                w.file.write_all(&crc.to_le_bytes())?;
                w.file.write_all(payload)?;
                w.file.flush()?;
                w.file.sync_all()
            })();

            match result {
                Ok(()) => {
                    w.offset = start + HEADER_SIZE as u64 + payload.len() as u64;
                    return Ok(());
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(attempt, error = %last_error, "durable write failed");
                    // Undo any partial frame so the prior chain state is untouched.
                    let _ = w.file.set_len(start);
                }
            }
        }

        Err(StoreError::Persistence(last_error))
    }
}

impl ChainWriter for FileChainStore {
    fn append(&self, block: Block) -> Result<(), StoreError> {
        let mut w = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;

        // Linkage is checked under the writer lock; readers never mutate.
        {
            let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
            check_linkage(blocks.last(), &block)?;
        }

        let payload =
            bincode::serialize(&block).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Self::write_frame(&mut w, &payload)?;

        debug!(
            index = block.index,
            hash = %block.hash.short_hex(),
            records = block.records.len(),
            "block appended"
        );

        let mut blocks = self.blocks.write().map_err(|_| StoreError::LockPoisoned)?;
        blocks.push(block);
        Ok(())
    }
}

impl ChainReader for FileChainStore {
    fn head(&self) -> Result<Option<Block>, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(blocks.last().cloned())
    }

    fn get(&self, index: u64) -> Result<Block, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        blocks
            .get(index as usize)
            .cloned()
            .ok_or(StoreError::NotFound { index })
    }

    fn range(&self, start: u64, end: u64) -> Result<Vec<Block>, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        slice_range(&blocks, start, end)
    }

    fn len(&self) -> Result<u64, StoreError> {
        let blocks = self.blocks.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(blocks.len() as u64)
    }
}

fn io_err(e: std::io::Error) -> StoreError {
    StoreError::Persistence(e.to_string())
}
