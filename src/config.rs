pub const BLOCK_SIZE: usize = 512;
pub const MAX_OPEN_FILES: usize = 32; // Open-file table capacity

// Raw seek modes, as accepted by `FileSystem::seek_raw`.
pub const SEEK_SET: i32 = 0;
pub const SEEK_CUR: i32 = 1;
pub const SEEK_END: i32 = 2;

/// How a read decides where the file ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Reads longer than one block drop the trailing run of zero bytes found
    /// in the last block they touch. Files that genuinely end in zero bytes
    /// are under-reported.
    #[default]
    TrailingZeroTrim,
    /// Reads are clamped to the size reported by the volume. No trimming.
    SizeBounded,
}

/// Per-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub read_policy: ReadPolicy,
    pub max_open_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::default(),
            max_open_files: MAX_OPEN_FILES,
        }
    }
}
