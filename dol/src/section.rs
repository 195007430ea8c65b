#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Section {
    pub index: usize,
    pub offset: u32,
    pub load_address: u32,
    pub size: u32,
}

impl Section {
    pub fn is_text(self) -> bool {
        self.index < crate::TEXT_SECTION_COUNT
    }

    /// Unused sections have a size of zero and are ignored when sizing the executable.
    pub fn is_empty(self) -> bool {
        self.size == 0
    }

    /// The file offset one past the last byte of this section.
    pub fn end(self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}
