use alloc::vec::Vec;

use tracing::{debug, info, warn};

use crate::file::{fread, fseek, fwrite};
use crate::oft::OpenFileTable;
use crate::{BlockDevice, Config, Error, Fd, OpenFile, Result, Volume, Whence};

/// A mounted volume together with its open-file table.
#[derive(Debug)]
pub struct FileSystem<V: Volume> {
    volume: V,
    table: OpenFileTable,
    config: Config,
}

impl<V: Volume> FileSystem<V> {
    /// Formats `volume` and opens a session on it.
    pub fn format(mut volume: V, config: Config) -> Result<Self> {
        volume.format()?;
        info!(num_blocks = volume.device().num_blocks(), "volume formatted");
        Ok(Self::new(volume, config))
    }

    /// Opens a session on an already formatted volume.
    pub fn mount(mut volume: V, config: Config) -> Result<Self> {
        volume.mount()?;
        info!(num_blocks = volume.device().num_blocks(), "volume mounted");
        Ok(Self::new(volume, config))
    }

    fn new(volume: V, config: Config) -> Self {
        Self {
            volume,
            table: OpenFileTable::new(config.max_open_files),
            config,
        }
    }

    // Following methods operate on the session directly, wrap a lock around it if it must be shared.

    pub fn open(&mut self, name: &str) -> Result<Fd> {
        let inode = self.volume.lookup(name)?;
        self.bind(inode)
    }

    /// Creates `name`, truncating any existing file of that name.
    pub fn create(&mut self, name: &str) -> Result<Fd> {
        let inode = self.volume.create(name)?;
        self.bind(inode)
    }

    fn bind(&mut self, inode: u32) -> Result<Fd> {
        self.volume.retain(inode)?;
        match self.table.bind(inode) {
            Ok(fd) => {
                debug!(%fd, inode, "bound descriptor");
                Ok(fd)
            }
            Err(e) => {
                self.volume.release(inode)?;
                Err(e)
            }
        }
    }

    pub fn close(&mut self, fd: Fd) -> Result<()> {
        let entry = self.table.release(fd)?;
        self.volume.release(entry.inode)?;
        debug!(%fd, inode = entry.inode, "released descriptor");
        Ok(())
    }

    /// Reads up to `len` bytes at the cursor and advances it by the number returned.
    pub fn read(&mut self, fd: Fd, len: usize) -> Result<Vec<u8>> {
        let entry = *self.table.get(fd)?;
        let OpenFile { inode, cursor } = entry;
        let data = fread(&self.volume, inode, cursor, len, self.config.read_policy)?;
        // fread never runs past u64::MAX.
        self.table.get_mut(fd)?.cursor = cursor + data.len() as u64;
        debug!(%fd, inode, cursor, fbn = entry.fbn(), len, got = data.len(), "read");
        Ok(data)
    }

    /// Writes all of `data` at the cursor and advances it past the written bytes.
    pub fn write(&mut self, fd: Fd, data: &[u8]) -> Result<()> {
        let entry = *self.table.get(fd)?;
        let OpenFile { inode, cursor } = entry;
        let end = fwrite(&mut self.volume, inode, cursor, data)?;
        self.table.get_mut(fd)?.cursor = end;
        debug!(%fd, inode, cursor, fbn = entry.fbn(), len = data.len(), "write");
        Ok(())
    }

    /// Moves the cursor and returns its new position.
    /// On failure the cursor is left where it was.
    pub fn seek(&mut self, fd: Fd, offset: i64, whence: Whence) -> Result<u64> {
        let OpenFile { inode, cursor } = *self.table.get(fd)?;
        let size = match whence {
            Whence::End => self.volume.file_size(inode)?,
            _ => 0,
        };
        let target = fseek(cursor, size, offset, whence).inspect_err(|e| {
            warn!(%fd, offset, ?whence, error = %e, "seek rejected");
        })?;
        self.table.get_mut(fd)?.cursor = target;
        Ok(target)
    }

    /// Like [`FileSystem::seek`], with the origin given as `SEEK_SET`, `SEEK_CUR` or `SEEK_END`.
    /// A negative offset is reported before an unknown origin.
    pub fn seek_raw(&mut self, fd: Fd, offset: i64, whence: i32) -> Result<u64> {
        self.table.get(fd)?;
        if offset < 0 {
            return Err(Error::InvalidCursor(offset.into()));
        }
        let whence = Whence::try_from(whence)?;
        self.seek(fd, offset, whence)
    }

    pub fn tell(&self, fd: Fd) -> Result<u64> {
        Ok(self.table.get(fd)?.cursor)
    }

    pub fn size(&self, fd: Fd) -> Result<u64> {
        let inode = self.table.get(fd)?.inode;
        self.volume.file_size(inode)
    }

    pub fn flush(&self) -> Result<()> {
        self.volume.device().flush()
    }

    pub fn open_files(&self) -> usize {
        self.table.len()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// Ends the session, dropping every open descriptor.
    pub fn into_volume(self) -> V {
        self.volume
    }
}
