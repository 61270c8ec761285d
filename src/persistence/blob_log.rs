use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crc32fast::Hasher;
use parking_lot::Mutex;

use crate::error::TmError;
use crate::Result;

/// Pointer to a blob record inside the blob log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlobPointer {
    pub offset: u64,
    pub len: u32,
    pub crc32: u32,
}

impl BlobPointer {
    pub fn new(offset: u64, len: u32, crc32: u32) -> Self {
        Self { offset, len, crc32 }
    }

    /// Offset just past this record
    pub fn end(&self) -> u64 {
        self.offset + RECORD_HEADER_LEN + self.len as u64
    }
}

const RECORD_HEADER_LEN: u64 = 8;

/// Append-only blob log for document bodies.
///
/// Record format:
/// - u32 length (little endian)
/// - u32 crc32 of payload
/// - raw payload bytes
///
/// Bytes past the last committed offset are discarded with [`BlobLog::truncate`].
pub struct BlobLog {
    file: Mutex<File>,
}

impl BlobLog {
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Append a payload and return its pointer.
    pub fn append(&self, payload: &[u8]) -> Result<BlobPointer> {
        let len = u32::try_from(payload.len())
            .map_err(|_| TmError::InvalidRequest(format!("blob of {} bytes is too large", payload.len())))?;

        let mut file = self.file.lock();
        let offset = file.seek(SeekFrom::End(0))?;

        let mut hasher = Hasher::new();
        hasher.update(payload);
        let crc32 = hasher.finalize();

        file.write_all(&len.to_le_bytes())?;
        file.write_all(&crc32.to_le_bytes())?;
        file.write_all(payload)?;

        Ok(BlobPointer::new(offset, len, crc32))
    }

    /// Read a payload given its pointer, validating checksum.
    pub fn read(&self, ptr: BlobPointer) -> Result<Vec<u8>> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(ptr.offset))?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf)?;
        let len = u32::from_le_bytes(len_buf);

        let mut crc_buf = [0u8; 4];
        file.read_exact(&mut crc_buf)?;
        let stored_crc = u32::from_le_bytes(crc_buf);

        if len != ptr.len {
            return Err(TmError::Corrupt(format!(
                "blob length mismatch at offset {}: expected {}, found {}",
                ptr.offset, ptr.len, len
            )));
        }

        let mut payload = vec![0u8; len as usize];
        file.read_exact(&mut payload)?;

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();
        if crc != stored_crc || crc != ptr.crc32 {
            return Err(TmError::Corrupt(format!(
                "blob checksum mismatch at offset {}",
                ptr.offset
            )));
        }

        Ok(payload)
    }

    /// Current length of the log in bytes
    pub fn len(&self) -> Result<u64> {
        let file = self.file.lock();
        Ok(file.metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every byte past `len`. A no-op when the log is already shorter.
    pub fn truncate(&self, len: u64) -> Result<()> {
        let file = self.file.lock();
        if file.metadata()?.len() > len {
            file.set_len(len)?;
        }
        Ok(())
    }

    /// Flush appended records to stable storage.
    pub fn sync(&self) -> Result<()> {
        let file = self.file.lock();
        file.sync_data()?;
        Ok(())
    }
}
