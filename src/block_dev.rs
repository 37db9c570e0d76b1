use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use parking_lot::Mutex;
use tracing::{info, trace};

use crate::config::BLOCK_SIZE;
use crate::error::{FsError, Result};

pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads a block of data from the block device.
    /// buf.len() must be equal to block_size().
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<()>;

    /// Writes a block of data to the block device.
    /// buf.len() must be equal to block_size().
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()>;

    /// Flushes any buffered data to the underlying storage.
    fn flush(&self) -> Result<()>;

    /// Returns the size of each block in bytes.
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }
}

/// Block device backed by a disk image on the host file system.
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
    num_blocks: usize,
}

impl FileDisk {
    /// Creates (or truncates) an image holding `num_blocks` zeroed blocks.
    pub fn create(path: impl AsRef<Path>, num_blocks: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        file.set_len((num_blocks * BLOCK_SIZE) as u64)?;
        info!(path = %path.as_ref().display(), num_blocks, "created disk image");
        Ok(Self {
            file: Mutex::new(file),
            num_blocks,
        })
    }

    /// Opens an existing image. A missing image is `NoDisk`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = match OpenOptions::new().read(true).write(true).open(path.as_ref()) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(FsError::NoDisk),
            Err(e) => return Err(e.into()),
        };
        let num_blocks = (file.metadata()?.len() / BLOCK_SIZE as u64) as usize;
        info!(path = %path.as_ref().display(), num_blocks, "opened disk image");
        Ok(Self {
            file: Mutex::new(file),
            num_blocks,
        })
    }

    fn check(&self, block_id: usize, len: usize) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id));
        }
        if len != BLOCK_SIZE {
            return Err(FsError::BadBlockBuffer {
                expected: BLOCK_SIZE,
                actual: len,
            });
        }
        Ok(())
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<()> {
        self.check(block_id, buf.len())?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.read_exact(buf)?;
        trace!(block_id, "disk read");
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
        self.check(block_id, buf.len())?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.write_all(buf)?;
        trace!(block_id, "disk write");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut file = self.file.lock();
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }
}
