use core::fmt;

use crate::config::*;
use crate::Error;
use crate::Result;

/// Handle to an open file. Only meaningful to the session that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fd(pub(crate) u32);

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Origin of a seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(raw: i32) -> Result<Self> {
        match raw {
            SEEK_SET => Ok(Whence::Start),
            SEEK_CUR => Ok(Whence::Current),
            SEEK_END => Ok(Whence::End),
            other => Err(Error::InvalidSeekMode(other)),
        }
    }
}

/// Open-file table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFile {
    pub inode: u32,
    pub cursor: u64, // Byte offset, may lie past EOF
}

impl OpenFile {
    pub fn new(inode: u32) -> Self {
        Self { inode, cursor: 0 }
    }

    /// File block number holding the cursor.
    pub fn fbn(&self) -> u64 {
        self.cursor / BLOCK_SIZE as u64
    }
}
