//! Common utilities for tests
#![allow(unused)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use bfs::{BlockDevice, Config, Error, FileSystem, Result, Volume, BLOCK_SIZE};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder {}", 1) -> println!("[test] placeholder 1");
#[macro_export]
macro_rules! log {
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
}

pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_blocks: usize,
}

impl RamDisk {
    /// Creates a new RamDisk with the specified number of blocks.
    /// Each block is BLOCK_SIZE bytes.
    pub fn new(num_blocks: usize) -> Self {
        let size = num_blocks * BLOCK_SIZE;
        let inner = Arc::new(Mutex::new(vec![0u8; size]));
        RamDisk { inner, num_blocks }
    }

    /// Raw copy of a block, bypassing the file layer.
    pub fn block(&self, block_id: usize) -> Vec<u8> {
        let start = block_id * BLOCK_SIZE;
        self.inner.lock().unwrap()[start..start + BLOCK_SIZE].to_vec()
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(Error::InvalidBlockId(block_id));
        }
        if buf.len() != BLOCK_SIZE {
            return Err(Error::BadBlockBuffer { expected: BLOCK_SIZE, actual: buf.len() });
        }
        let start = block_id * BLOCK_SIZE;
        let data = self.inner.lock().unwrap();
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(Error::InvalidBlockId(block_id));
        }
        if buf.len() != BLOCK_SIZE {
            return Err(Error::BadBlockBuffer { expected: BLOCK_SIZE, actual: buf.len() });
        }
        let start = block_id * BLOCK_SIZE;
        let mut data = self.inner.lock().unwrap();
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // In a RAM disk, flushing is a no-op since data is already in memory.
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemInode {
    pub blocks: BTreeMap<u64, usize>,
    pub size: u64,
}

/// Volume manager keeping its metadata in memory and file data on `D`.
pub struct MemVolume<D: BlockDevice = RamDisk> {
    device: D,
    formatted: bool,
    free: Vec<usize>,
    inodes: Vec<Option<MemInode>>,
    names: HashMap<String, u32>,
    refs: HashMap<u32, u32>,
    max_inodes: usize,
}

impl<D: BlockDevice> MemVolume<D> {
    pub fn new(device: D, max_inodes: usize) -> Self {
        MemVolume {
            device,
            formatted: false,
            free: Vec::new(),
            inodes: Vec::new(),
            names: HashMap::new(),
            refs: HashMap::new(),
            max_inodes,
        }
    }

    fn inode(&self, inode: u32) -> Result<&MemInode> {
        self.inodes
            .get(inode as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidInode(inode))
    }

    fn inode_mut(&mut self, inode: u32) -> Result<&mut MemInode> {
        self.inodes
            .get_mut(inode as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidInode(inode))
    }

    /// Number of blocks currently backing `inode`.
    pub fn allocated_blocks(&self, inode: u32) -> usize {
        self.inode(inode).map(|i| i.blocks.len()).unwrap_or(0)
    }

    pub fn free_blocks(&self) -> usize {
        self.free.len()
    }

    pub fn refs(&self, inode: u32) -> u32 {
        self.refs.get(&inode).copied().unwrap_or(0)
    }
}

impl<D: BlockDevice> Volume for MemVolume<D> {
    type Device = D;

    fn device(&self) -> &D {
        &self.device
    }

    fn format(&mut self) -> Result<()> {
        // Hand out low block numbers first.
        self.free = (0..self.device.num_blocks()).rev().collect();
        self.inodes.clear();
        self.names.clear();
        self.refs.clear();
        self.formatted = true;
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        if !self.formatted {
            return Err(Error::NoDisk);
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<u32> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    fn create(&mut self, name: &str) -> Result<u32> {
        if let Some(&inode) = self.names.get(name) {
            let old = std::mem::take(self.inode_mut(inode)?);
            self.free.extend(old.blocks.into_values());
            return Ok(inode);
        }
        if self.inodes.len() >= self.max_inodes {
            return Err(Error::CreateFailed(name.to_string()));
        }
        self.inodes.push(Some(MemInode::default()));
        let inode = (self.inodes.len() - 1) as u32;
        self.names.insert(name.to_string(), inode);
        Ok(inode)
    }

    fn translate_block(&self, inode: u32, fbn: u64) -> Result<Option<usize>> {
        Ok(self.inode(inode)?.blocks.get(&fbn).copied())
    }

    fn allocate_block(&mut self, inode: u32, fbn: u64) -> Result<()> {
        self.inode(inode)?;
        let dbn = self.free.pop().ok_or(Error::AllocationFailure { inode, fbn })?;
        self.device.write_block(dbn, &[0u8; BLOCK_SIZE])?;
        self.inode_mut(inode)?.blocks.insert(fbn, dbn);
        Ok(())
    }

    fn file_size(&self, inode: u32) -> Result<u64> {
        Ok(self.inode(inode)?.size)
    }

    fn extend(&mut self, inode: u32, size: u64) -> Result<()> {
        let node = self.inode_mut(inode)?;
        node.size = node.size.max(size);
        Ok(())
    }

    fn retain(&mut self, inode: u32) -> Result<()> {
        self.inode(inode)?;
        *self.refs.entry(inode).or_insert(0) += 1;
        Ok(())
    }

    fn release(&mut self, inode: u32) -> Result<()> {
        if let Some(count) = self.refs.get_mut(&inode) {
            *count -= 1;
            if *count == 0 {
                self.refs.remove(&inode);
            }
        }
        Ok(())
    }
}

/// Formats a fresh RAM-backed volume of `num_blocks` blocks.
pub fn ram_fs(num_blocks: usize) -> FileSystem<MemVolume> {
    ram_fs_with(num_blocks, Config::default())
}

pub fn ram_fs_with(num_blocks: usize, config: Config) -> FileSystem<MemVolume> {
    FileSystem::format(MemVolume::new(RamDisk::new(num_blocks), 16), config).unwrap()
}

/// `len` bytes of a repeating non-zero pattern.
pub fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1 + seed % 4).collect()
}
