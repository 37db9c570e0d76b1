//! Open-file table: binds descriptors to (inode, cursor) pairs.

use alloc::vec::Vec;

use crate::{Error, Fd, OpenFile, Result};

#[derive(Debug)]
pub struct OpenFileTable {
    slots: Vec<Option<OpenFile>>,
    capacity: usize,
}

impl OpenFileTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Binds a new entry for `inode` with its cursor at 0.
    /// The lowest free descriptor is used; a bound descriptor is never handed out twice.
    pub fn bind(&mut self, inode: u32) -> Result<Fd> {
        let entry = Some(OpenFile::new(inode));
        if let Some(idx) = self.slots.iter().position(Option::is_none) {
            self.slots[idx] = entry;
            return Ok(Fd(idx as u32));
        }
        if self.slots.len() >= self.capacity {
            return Err(Error::TooManyOpenFiles);
        }
        self.slots.push(entry);
        Ok(Fd((self.slots.len() - 1) as u32))
    }

    /// Unbinds `fd`, returning the entry it held.
    pub fn release(&mut self, fd: Fd) -> Result<OpenFile> {
        self.slots
            .get_mut(fd.0 as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidDescriptor(fd))
    }

    pub fn get(&self, fd: Fd) -> Result<&OpenFile> {
        self.slots
            .get(fd.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidDescriptor(fd))
    }

    pub fn get_mut(&mut self, fd: Fd) -> Result<&mut OpenFile> {
        self.slots
            .get_mut(fd.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidDescriptor(fd))
    }

    /// Number of bound descriptors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
