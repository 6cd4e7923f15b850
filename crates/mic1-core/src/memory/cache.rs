//! Direct-mapped, write-through cache.
//!
//! An address splits into `offset = addr % block`, `index = (addr / block) %
//! lines` and `tag = addr / (block * lines)`. Reads refill a whole block on a
//! miss. Writes always go to main memory and only patch the cached copy when
//! the line is already resident, so lines are never dirty and can be evicted
//! without a write-back.

use super::MainMemory;

/// Default number of cache lines.
pub const CACHE_SIZE: usize = 16;
/// Default words per block.
pub const BLOCK_SIZE: usize = 4;

/// Outcome of the most recent cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CacheAccess {
    /// No access since construction.
    #[default]
    Idle,
    /// Read served from a resident line.
    ReadHit,
    /// Read refilled a line from memory.
    ReadMiss,
    /// Write updated memory and the resident line.
    WriteHit,
    /// Write updated memory only.
    WriteMiss,
}

impl CacheAccess {
    /// Returns `true` for either hit variant.
    #[must_use]
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::ReadHit | Self::WriteHit)
    }
}

/// Line count and block size of a direct-mapped cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheGeometry {
    /// Number of lines (one per index).
    pub lines: usize,
    /// Words per line.
    pub block_size: usize,
}

impl Default for CacheGeometry {
    fn default() -> Self {
        Self {
            lines: CACHE_SIZE,
            block_size: BLOCK_SIZE,
        }
    }
}

/// Address fields used to locate a word in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitAddress {
    /// High address bits identifying the block.
    pub tag: usize,
    /// Line selected by the address.
    pub index: usize,
    /// Word within the block.
    pub offset: usize,
}

impl CacheGeometry {
    /// Splits an address into tag, index and offset.
    ///
    /// Both dimensions must be non-zero; [`crate::CoreConfig::validate`]
    /// enforces this for engine-built caches.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn split(self, addr: u16) -> SplitAddress {
        let addr = addr as usize;
        let block = addr / self.block_size;
        SplitAddress {
            tag: block / self.lines,
            index: block % self.lines,
            offset: addr % self.block_size,
        }
    }
}

/// One cache line: valid bit, tag and a block of words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLine {
    valid: bool,
    tag: usize,
    data: Vec<u16>,
}

impl CacheLine {
    fn empty(block_size: usize) -> Self {
        Self {
            valid: false,
            tag: 0,
            data: vec![0; block_size],
        }
    }

    /// Returns `true` when the line holds a block.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Tag of the resident block.
    #[must_use]
    pub const fn tag(&self) -> usize {
        self.tag
    }

    /// Cached words of the resident block.
    #[must_use]
    pub fn data(&self) -> &[u16] {
        &self.data
    }

    fn holds(&self, tag: usize) -> bool {
        self.valid && self.tag == tag
    }
}

/// Direct-mapped write-through cache owning its backing memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMappedCache {
    geometry: CacheGeometry,
    lines: Vec<CacheLine>,
    memory: MainMemory,
    last_access: CacheAccess,
}

impl Default for DirectMappedCache {
    fn default() -> Self {
        Self::new(CacheGeometry::default(), MainMemory::default())
    }
}

impl DirectMappedCache {
    /// Creates an empty (all lines invalid) cache over `memory`.
    #[must_use]
    pub fn new(geometry: CacheGeometry, memory: MainMemory) -> Self {
        Self {
            geometry,
            lines: (0..geometry.lines)
                .map(|_| CacheLine::empty(geometry.block_size))
                .collect(),
            memory,
            last_access: CacheAccess::Idle,
        }
    }

    /// Reads a word, refilling its line from memory on a miss.
    #[allow(clippy::cast_possible_truncation)]
    pub fn read(&mut self, addr: u16) -> u16 {
        let split = self.geometry.split(addr);
        let line = &mut self.lines[split.index];

        if line.holds(split.tag) {
            self.last_access = CacheAccess::ReadHit;
            tracing::trace!(addr, index = split.index, "cache read hit");
            return line.data[split.offset];
        }

        self.last_access = CacheAccess::ReadMiss;
        tracing::trace!(addr, index = split.index, "cache read miss");

        // offset < block_size <= addr + 1, so this cannot underflow
        let block_start = addr - split.offset as u16;
        line.data = self.memory.get_block(block_start, self.geometry.block_size);
        line.tag = split.tag;
        line.valid = true;
        line.data[split.offset]
    }

    /// Writes a word through to memory, patching the line on a write-hit.
    pub fn write(&mut self, addr: u16, value: u16) {
        self.memory.write(addr, value);

        let split = self.geometry.split(addr);
        let line = &mut self.lines[split.index];
        if line.holds(split.tag) {
            line.data[split.offset] = value;
            self.last_access = CacheAccess::WriteHit;
            tracing::trace!(addr, index = split.index, "cache write hit");
        } else {
            self.last_access = CacheAccess::WriteMiss;
            tracing::trace!(addr, index = split.index, "cache write miss");
        }
    }

    /// Returns the value a read of `addr` would produce, without touching
    /// any line or the access status.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u16 {
        let split = self.geometry.split(addr);
        let line = &self.lines[split.index];
        if line.holds(split.tag) {
            line.data[split.offset]
        } else {
            self.memory.read(addr)
        }
    }

    /// Returns `true` when the block containing `addr` is resident.
    #[must_use]
    pub fn is_resident(&self, addr: u16) -> bool {
        let split = self.geometry.split(addr);
        self.lines[split.index].holds(split.tag)
    }

    /// Marks every line invalid and clears the access status.
    pub fn invalidate(&mut self) {
        for line in &mut self.lines {
            line.valid = false;
        }
        self.last_access = CacheAccess::Idle;
    }

    /// Outcome of the most recent read or write.
    #[must_use]
    pub const fn last_access(&self) -> CacheAccess {
        self.last_access
    }

    /// Cache dimensions.
    #[must_use]
    pub const fn geometry(&self) -> CacheGeometry {
        self.geometry
    }

    /// All lines in index order.
    #[must_use]
    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Backing main memory.
    #[must_use]
    pub const fn memory(&self) -> &MainMemory {
        &self.memory
    }

    /// Mutable backing memory, used for program preload before stepping.
    ///
    /// Writes made here bypass the cache; preload before the first read.
    pub fn memory_mut(&mut self) -> &mut MainMemory {
        &mut self.memory
    }
}
