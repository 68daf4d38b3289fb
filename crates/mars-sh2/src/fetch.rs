/// Reference to a compiled block in the recompiler's block table.
///
/// The interpreter path never produces blocks; it stores [`BlockRef::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRef(u32);

impl BlockRef {
    pub const INVALID: BlockRef = BlockRef(u32::MAX);

    pub const fn new(table_index: u32) -> Self {
        Self(table_index)
    }

    pub const fn table_index(self) -> Option<u32> {
        if self.0 == u32::MAX {
            None
        } else {
            Some(self.0)
        }
    }

    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Default for BlockRef {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Most recently fetched instruction and the block it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchResult {
    pub pc: u32,
    pub opcode: u16,
    pub block: BlockRef,
}

impl FetchResult {
    pub const fn invalid() -> Self {
        Self {
            pc: 0,
            opcode: 0,
            block: BlockRef::INVALID,
        }
    }

    /// Whether the instruction came out of a compiled block.
    pub const fn has_block(&self) -> bool {
        self.block.is_valid()
    }
}
