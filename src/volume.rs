//! The volume manager seam.
//!
//! Everything that knows about the on-disk layout lives behind [`Volume`]:
//! the inode table, the free list and the directory. The file layer only asks
//! it to translate file block numbers, allocate blocks and report sizes.

use crate::{BlockDevice, Result};

pub trait Volume {
    type Device: BlockDevice;

    /// Block store holding file data.
    fn device(&self) -> &Self::Device;

    /// Lays out a fresh, empty volume.
    fn format(&mut self) -> Result<()>;

    /// Checks that the volume exists and can be used.
    fn mount(&mut self) -> Result<()>;

    /// Resolves `name` to its inode. Fails with `NotFound`.
    fn lookup(&self, name: &str) -> Result<u32>;

    /// Creates `name`, truncating it if it already exists. Fails with `CreateFailed`.
    fn create(&mut self, name: &str) -> Result<u32>;

    /// Disk block backing block `fbn` of `inode`, or `None` if never allocated.
    fn translate_block(&self, inode: u32, fbn: u64) -> Result<Option<usize>>;

    /// Backs block `fbn` of `inode` with a fresh disk block.
    fn allocate_block(&mut self, inode: u32, fbn: u64) -> Result<()>;

    /// Highest offset ever written or explicitly extended.
    fn file_size(&self, inode: u32) -> Result<u64>;

    /// Grows the recorded size of `inode` to at least `size`.
    fn extend(&mut self, inode: u32, size: u64) -> Result<()>;

    /// Takes a reference on `inode` for a new descriptor.
    fn retain(&mut self, _inode: u32) -> Result<()> {
        Ok(())
    }

    /// Drops a reference taken by [`Volume::retain`].
    fn release(&mut self, _inode: u32) -> Result<()> {
        Ok(())
    }
}
