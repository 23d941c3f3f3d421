/// A dense, fixed-size array of bits.
///
/// Bits are stored in 32-bit words. The array is sized once with
/// [`BitArray::new`] or [`BitArray::resize_and_clear`] and never grows
/// implicitly: accessing a bit beyond [`BitArray::len`] panics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BitArray {
    words: Vec<u32>,
    len: u32,
}

impl BitArray {
    /// Creates a bit array of `len` bits, all cleared.
    pub fn new(len: u32) -> Self {
        let mut result = Self::default();
        result.resize_and_clear(len);
        result
    }

    /// Resizes this array to `len` bits and clears all of them.
    pub fn resize_and_clear(&mut self, len: u32) {
        self.words.clear();
        self.words.resize(Self::word_count(len), 0);
        self.len = len;
    }

    #[inline(always)]
    fn word_count(len: u32) -> usize {
        len.div_ceil(32) as usize
    }

    /// The number of bits of this array.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Does this array contain zero bits?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets the `i`-th bit to 1.
    #[inline]
    pub fn set(&mut self, i: u32) {
        debug_assert!(i < self.len, "bit index {} out of bounds ({})", i, self.len);
        self.words[(i >> 5) as usize] |= 1 << (i & 31);
    }

    /// Sets the `i`-th bit to 0.
    #[inline]
    pub fn reset(&mut self, i: u32) {
        debug_assert!(i < self.len, "bit index {} out of bounds ({})", i, self.len);
        self.words[(i >> 5) as usize] &= !(1 << (i & 31));
    }

    /// Is the `i`-th bit set to 1?
    #[inline]
    pub fn is_set(&self, i: u32) -> bool {
        debug_assert!(i < self.len, "bit index {} out of bounds ({})", i, self.len);
        self.words[(i >> 5) as usize] & (1 << (i & 31)) != 0
    }

    /// Clears every bit.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Is at least one bit set?
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// The number of bits set to 1.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Finds the greatest index `j <= i` such that the `j`-th bit is set.
    ///
    /// `i` may be out of bounds, in which case the search starts from the last bit.
    pub fn last_set_at_or_below(&self, i: u32) -> Option<u32> {
        if self.len == 0 {
            return None;
        }

        let i = i.min(self.len - 1);
        let word_id = (i >> 5) as usize;
        let bit = i & 31;
        let mask = if bit == 31 {
            u32::MAX
        } else {
            (1u32 << (bit + 1)) - 1
        };

        let word = self.words[word_id] & mask;
        if word != 0 {
            return Some(((word_id as u32) << 5) + 31 - word.leading_zeros());
        }

        self.words[..word_id]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)
            .map(|(id, w)| ((id as u32) << 5) + 31 - w.leading_zeros())
    }

    /// The raw words of this array.
    ///
    /// Bit `i` is stored in the word `i / 32`, at the position `i % 32`.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// An approximation of the memory dynamically-allocated by this struct.
    pub fn heap_memory_size(&self) -> usize {
        self.words.capacity() * size_of::<u32>()
    }
}
