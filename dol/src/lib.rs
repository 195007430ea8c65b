mod reader;
mod section;

pub use crate::reader::{Error, Reader};
pub use crate::section::Section;

/// The number of sections described by a DOL header: 7 text sections followed by 11 data sections.
pub const SECTION_COUNT: usize = 18;

/// The number of leading sections that hold code.
pub const TEXT_SECTION_COUNT: usize = 7;

/// The size in bytes of a DOL header.
pub const HEADER_SIZE: usize = 0x100;
