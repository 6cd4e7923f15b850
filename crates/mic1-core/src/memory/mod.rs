//! Main memory and the direct-mapped cache in front of it.

/// Direct-mapped write-through cache.
pub mod cache;

pub use cache::{
    CacheAccess, CacheGeometry, CacheLine, DirectMappedCache, SplitAddress, BLOCK_SIZE, CACHE_SIZE,
};

/// Default main-memory size in words (12-bit address space).
pub const MEMORY_SIZE: usize = 4096;
/// Largest memory a 16-bit `MAR` can address.
pub const MAX_MEMORY_SIZE: usize = u16::MAX as usize + 1;

/// Flat word-addressed main memory.
///
/// Every access is bounds-checked: reads outside the array return zero and
/// writes outside it are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainMemory {
    words: Box<[u16]>,
}

impl Default for MainMemory {
    fn default() -> Self {
        Self::new(MEMORY_SIZE)
    }
}

impl MainMemory {
    /// Allocates `size` zeroed words.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size].into_boxed_slice(),
        }
    }

    /// Number of words in memory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` for a zero-sized memory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads one word; zero when `addr` is out of range.
    #[must_use]
    pub fn read(&self, addr: u16) -> u16 {
        self.words.get(usize::from(addr)).copied().unwrap_or(0)
    }

    /// Writes one word; ignored when `addr` is out of range.
    pub fn write(&mut self, addr: u16, value: u16) {
        if let Some(word) = self.words.get_mut(usize::from(addr)) {
            *word = value;
        }
    }

    /// Burst-reads `len` consecutive words from `start`, zero-padding past
    /// the end of memory.
    #[must_use]
    pub fn get_block(&self, start: u16, len: usize) -> Vec<u16> {
        let start = usize::from(start);
        (start..start + len)
            .map(|addr| self.words.get(addr).copied().unwrap_or(0))
            .collect()
    }

    /// Copies a program image into memory starting at address 0.
    ///
    /// Returns the number of words stored; words beyond the end of memory are
    /// dropped.
    pub fn load_image(&mut self, image: &[u16]) -> usize {
        let count = image.len().min(self.words.len());
        self.words[..count].copy_from_slice(&image[..count]);
        count
    }

    /// Returns the whole memory as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::{MainMemory, MEMORY_SIZE};

    #[test]
    fn default_memory_is_zeroed_4k_words() {
        let memory = MainMemory::default();
        assert_eq!(memory.len(), MEMORY_SIZE);
        assert!(memory.as_slice().iter().all(|word| *word == 0));
    }

    #[test]
    fn out_of_range_access_is_a_silent_no_op() {
        let mut memory = MainMemory::new(8);
        memory.write(8, 0xFFFF);
        memory.write(u16::MAX, 0xFFFF);
        assert_eq!(memory.read(8), 0);
        assert_eq!(memory.read(u16::MAX), 0);
        assert!(memory.as_slice().iter().all(|word| *word == 0));
    }

    #[test]
    fn block_read_zero_pads_past_the_end() {
        let mut memory = MainMemory::new(6);
        for addr in 0_u16..6 {
            memory.write(addr, addr + 1);
        }
        assert_eq!(memory.get_block(0, 4), vec![1, 2, 3, 4]);
        assert_eq!(memory.get_block(4, 4), vec![5, 6, 0, 0]);
        assert_eq!(memory.get_block(100, 2), vec![0, 0]);
    }

    #[test]
    fn image_load_starts_at_zero_and_truncates() {
        let mut memory = MainMemory::new(3);
        assert_eq!(memory.load_image(&[0xA, 0xB, 0xC, 0xD]), 3);
        assert_eq!(memory.as_slice(), &[0xA, 0xB, 0xC]);
    }
}
