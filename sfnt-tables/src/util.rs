//! Misc utility functions

/// The binary-search helper fields found in the table directory and in
/// cmap format 4 subtables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// Compute the fields for `n_items` records of `item_size` bytes each.
    ///
    /// `searchRange` is `item_size * 2^floor(log2(n_items))`, `entrySelector`
    /// is `floor(log2(n_items))`, and `rangeShift` covers the remainder.
    pub fn compute(n_items: usize, item_size: usize) -> Self {
        if n_items == 0 {
            return Self::default();
        }
        let entry_selector = n_items.ilog2();
        let search_range = (1usize << entry_selector) * item_size;
        let range_shift = (n_items * item_size).saturating_sub(search_range);
        SearchRange {
            search_range: saturate_u16(search_range),
            entry_selector: entry_selector as u16,
            range_shift: saturate_u16(range_shift),
        }
    }
}

fn saturate_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// The sfnt checksum: the wrapping sum of the data as big-endian u32s,
/// with the final partial word zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(4);
    let mut sum = chunks
        .by_ref()
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .fold(0u32, u32::wrapping_add);
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut last = [0u8; 4];
        last[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_be_bytes(last));
    }
    sum
}
