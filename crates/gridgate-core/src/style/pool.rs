//! Number format pool for deduplication

use super::NumberFormat;
use ahash::AHashMap;

/// Pool of distinct number formats referenced by cells
///
/// Index 0 is always [`NumberFormat::General`]. Cells store an index instead of
/// a format, so a column of a thousand dates carries one format value.
#[derive(Debug)]
pub struct FormatPool {
    formats: Vec<NumberFormat>,
    index_map: AHashMap<NumberFormat, u32>,
}

impl FormatPool {
    /// Create a new pool with General at index 0
    pub fn new() -> Self {
        let mut pool = Self {
            formats: Vec::with_capacity(8),
            index_map: AHashMap::with_capacity(8),
        };
        pool.formats.push(NumberFormat::General);
        pool.index_map.insert(NumberFormat::General, 0);
        pool
    }

    /// Get or add a format, returning its index
    pub fn get_or_insert(&mut self, format: NumberFormat) -> u32 {
        if let Some(&idx) = self.index_map.get(&format) {
            return idx;
        }
        let idx = self.formats.len() as u32;
        self.index_map.insert(format.clone(), idx);
        self.formats.push(format);
        idx
    }

    /// Get a format by index
    pub fn get(&self, index: u32) -> Option<&NumberFormat> {
        self.formats.get(index as usize)
    }

    /// Get the number of formats (General included)
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Check if the pool only holds General
    pub fn is_empty(&self) -> bool {
        self.formats.len() <= 1
    }

    /// Iterate over all formats with their indices
    pub fn iter(&self) -> impl Iterator<Item = (u32, &NumberFormat)> {
        self.formats.iter().enumerate().map(|(i, f)| (i as u32, f))
    }
}

impl Default for FormatPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format() {
        let pool = FormatPool::new();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0), Some(&NumberFormat::General));
    }

    #[test]
    fn test_deduplication() {
        let mut pool = FormatPool::new();

        let idx1 = pool.get_or_insert(NumberFormat::date_short());
        let idx2 = pool.get_or_insert(NumberFormat::date_short());
        let idx3 = pool.get_or_insert(NumberFormat::from_string("d/m/yy"));

        assert_eq!(idx1, idx2);
        assert_ne!(idx1, idx3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get_or_insert(NumberFormat::General), 0);
    }
}
