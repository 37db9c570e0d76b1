use thiserror::Error;

use crate::Fd;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("bad file descriptor {0}")]
    InvalidDescriptor(Fd),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("cannot create file: {0}")]
    CreateFailed(String),
    #[error("invalid cursor offset {0}")]
    InvalidCursor(i128),
    #[error("invalid seek mode {0}")]
    InvalidSeekMode(i32),
    #[error("cannot allocate block {fbn} for inode {inode}")]
    AllocationFailure { inode: u32, fbn: u64 },
    #[error("too many open files")]
    TooManyOpenFiles,
    #[error("invalid inode {0}")]
    InvalidInode(u32),
    #[error("block {0} is out of range")]
    InvalidBlockId(usize),
    #[error("block buffer of {actual} bytes, expected {expected}")]
    BadBlockBuffer { expected: usize, actual: usize },
    #[error("disk image not found")]
    NoDisk,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, FsError>;
