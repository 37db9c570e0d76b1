//! Byte-range reads and writes over whole blocks.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use tracing::trace;

use crate::{BlockDevice, Error, ReadPolicy, Result, Volume, Whence, BLOCK_SIZE};

/// Fills `buf` with block `fbn` of `inode`.
/// Blocks that were never allocated read as zeros without touching the device.
fn load_block<V: Volume>(volume: &V, inode: u32, fbn: u64, buf: &mut [u8]) -> Result<()> {
    match volume.translate_block(inode, fbn)? {
        Some(dbn) => {
            trace!(inode, fbn, dbn, "load block");
            volume.device().read_block(dbn, buf)
        }
        None => {
            trace!(inode, fbn, "load unallocated block");
            buf.fill(0);
            Ok(())
        }
    }
}

/// Returns the disk block backing `fbn`, allocating it if needed.
/// The flag is true when the block was freshly allocated.
fn backing_block<V: Volume>(volume: &mut V, inode: u32, fbn: u64) -> Result<(usize, bool)> {
    if let Some(dbn) = volume.translate_block(inode, fbn)? {
        return Ok((dbn, false));
    }
    volume.allocate_block(inode, fbn)?;
    let dbn = volume
        .translate_block(inode, fbn)?
        .ok_or(Error::AllocationFailure { inode, fbn })?;
    trace!(inode, fbn, dbn, "allocated block");
    Ok((dbn, true))
}

/// Backs every unallocated block between the current end of file and `upto`
/// (exclusive) with a zero-filled block.
/// The size grows with each block, so it always covers what was allocated.
fn fill_gap<V: Volume>(volume: &mut V, inode: u32, upto: u64) -> Result<()> {
    let size = volume.file_size(inode)?;
    let first = size.div_ceil(BLOCK_SIZE as u64);
    if first >= upto {
        return Ok(());
    }
    let zero_block = Box::new([0u8; BLOCK_SIZE]);
    for fbn in first..upto {
        let (dbn, fresh) = backing_block(volume, inode, fbn)?;
        if fresh {
            volume.device().write_block(dbn, &zero_block[..])?;
        }
        volume.extend(inode, (fbn + 1) * BLOCK_SIZE as u64)?;
    }
    Ok(())
}

/// Reads up to `len` bytes of `inode` starting at `cursor`.
///
/// Under [`ReadPolicy::TrailingZeroTrim`] a request longer than one block
/// treats the trailing zero bytes of the last block it fetches as lying past
/// the end of the file, and returns that many bytes fewer. The whole block is
/// inspected, even the part past the request. Shorter requests always return
/// `len` bytes.
///
/// Requests never run past `u64::MAX`.
pub fn fread<V: Volume>(
    volume: &V,
    inode: u32,
    cursor: u64,
    len: usize,
    policy: ReadPolicy,
) -> Result<Vec<u8>> {
    let len = len.min(usize::try_from(u64::MAX - cursor).unwrap_or(usize::MAX));
    let len = match policy {
        ReadPolicy::TrailingZeroTrim => len,
        ReadPolicy::SizeBounded => {
            let remaining = volume.file_size(inode)?.saturating_sub(cursor);
            len.min(usize::try_from(remaining).unwrap_or(usize::MAX))
        }
    };
    if len == 0 {
        return Ok(Vec::new());
    }

    let first_fbn = cursor / BLOCK_SIZE as u64;
    let start = (cursor % BLOCK_SIZE as u64) as usize;
    let num_blocks = (start + len).div_ceil(BLOCK_SIZE);

    let mut staging = vec![0u8; num_blocks * BLOCK_SIZE];
    for (i, block) in staging.chunks_exact_mut(BLOCK_SIZE).enumerate() {
        load_block(volume, inode, first_fbn + i as u64, block)?;
    }

    let end = start + len;
    let mut out = staging[start..end].to_vec();

    if policy == ReadPolicy::TrailingZeroTrim && len > BLOCK_SIZE {
        let zeros = staging[(num_blocks - 1) * BLOCK_SIZE..]
            .iter()
            .rev()
            .take_while(|&&b| b == 0)
            .count();
        out.truncate(len.saturating_sub(zeros));
        trace!(inode, len, zeros, "trimmed trailing zeros");
    }

    Ok(out)
}

/// Writes all of `data` to `inode` starting at `cursor`, allocating blocks as needed.
///
/// Blocks only partly covered by the write keep the bytes around the written
/// range. Fully covered blocks are overwritten without being read first.
/// The recorded size follows each block written, so a failed write never
/// leaves allocated blocks past the end of file.
/// Returns the offset just past the last byte written.
pub fn fwrite<V: Volume>(volume: &mut V, inode: u32, cursor: u64, data: &[u8]) -> Result<u64> {
    if data.is_empty() {
        return Ok(cursor);
    }
    if cursor.checked_add(data.len() as u64).is_none() {
        return Err(Error::InvalidCursor(cursor as i128 + data.len() as i128));
    }

    fill_gap(volume, inode, cursor / BLOCK_SIZE as u64)?;

    let mut size = volume.file_size(inode)?;
    let mut written = 0;
    let mut offset = cursor;
    let mut block_buf = Box::new([0u8; BLOCK_SIZE]);

    while written < data.len() {
        let fbn = offset / BLOCK_SIZE as u64;
        let start = (offset % BLOCK_SIZE as u64) as usize;
        let chunk = (BLOCK_SIZE - start).min(data.len() - written);

        let (dbn, fresh) = backing_block(volume, inode, fbn)?;
        if chunk < BLOCK_SIZE {
            // Merge with what is already there.
            if fresh {
                block_buf.fill(0);
            } else {
                volume.device().read_block(dbn, &mut block_buf[..])?;
            }
        }
        block_buf[start..start + chunk].copy_from_slice(&data[written..written + chunk]);
        volume.device().write_block(dbn, &block_buf[..])?;
        trace!(inode, fbn, dbn, start, chunk, "wrote block");

        written += chunk;
        offset += chunk as u64;
        if offset > size {
            volume.extend(inode, offset)?;
            size = offset;
        }
    }

    Ok(offset)
}

/// Computes the cursor a seek would produce.
/// Negative offsets are rejected whatever the origin.
pub fn fseek(cursor: u64, size: u64, offset: i64, whence: Whence) -> Result<u64> {
    if offset < 0 {
        return Err(Error::InvalidCursor(offset.into()));
    }
    let base = match whence {
        Whence::Start => 0,
        Whence::Current => cursor,
        Whence::End => size,
    };
    base.checked_add(offset as u64)
        .ok_or(Error::InvalidCursor(base as i128 + offset as i128))
}
