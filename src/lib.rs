//! BFS is the per-file I/O layer of a small block file system.
//! It turns byte-range reads and writes on open files into whole-block operations.
//!
//! BFS's 4 layers (from bottom to top):
//! 1. Block Device: Abstraction for low level devices.            Fixed-size block transfers        | User implemented (or `FileDisk`)
//! 2. Volume: Inode table, free list and directory.               Block translation and allocation  | User implemented
//! 3. File: Block splitting, merge-on-write, end-of-file trimming.                                   | Fs implemented
//! 4. FileSystem: Session owning the open-file table.             Descriptors and cursors           | Fs implemented
//!
//! The session is single-threaded: every operation takes `&mut self` and runs to completion.

extern crate alloc;

mod config;
mod block_dev;
mod structs;
mod volume;
mod oft;
mod file;
mod fs;
mod error;

pub use block_dev::{BlockDevice, FileDisk};
pub use config::*;
pub use structs::*;
pub use volume::Volume;
pub use oft::OpenFileTable;
pub use file::*;
pub use fs::*;
pub use error::FsError as Error;
pub use error::Result;
