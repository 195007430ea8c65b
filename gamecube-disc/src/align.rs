/// Alignment of each file payload on the disc.
pub const FILE_ALIGNMENT: u32 = 0x10;

/// Alignment of the first file payload after the file system table.
pub const FS_TABLE_ALIGNMENT: u32 = 0x100;

/// Returns the number of bytes needed to advance `offset` to a multiple of `boundary`.
///
/// The result is always less than `boundary`.
///
/// # Panics
///
/// Panics if `boundary` is zero.
pub fn padding(offset: u32, boundary: u32) -> u32 {
    (boundary - offset % boundary) % boundary
}

/// Rounds `offset` up to a multiple of `boundary`, or returns `None` if that doesn't fit in 32 bits.
pub fn align_up(offset: u32, boundary: u32) -> Option<u32> {
    offset.checked_add(padding(offset, boundary))
}
