//! Fixed-length bit set used for atom selections and derived atom sets.

const WORD_BITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitArray {
    len: usize,
    words: Vec<u64>,
}

impl BitArray {
    /// Creates `len` bits, all set to `value`.
    pub fn new(len: usize, value: bool) -> Self {
        let mut bits = Self {
            len,
            words: vec![0; len.div_ceil(WORD_BITS)],
        };
        if value {
            bits.set_all();
        }
        bits
    }

    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = Self::new(len, false);
        for i in indices {
            bits.set(i);
        }
        bits
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    pub fn clear(&mut self, index: usize) {
        assert!(index < self.len, "bit index {index} out of range {}", self.len);
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
    }

    pub fn set_all(&mut self) {
        self.words.fill(u64::MAX);
        self.trim_tail();
    }

    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Sets every bit in `range`.
    pub fn set_range(&mut self, range: std::ops::Range<usize>) {
        for i in range {
            self.set(i);
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn any(&self) -> bool {
        self.words.iter().any(|&w| w != 0)
    }

    pub fn all(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Whether any bit in `range` is set.
    pub fn any_in(&self, range: std::ops::Range<usize>) -> bool {
        range.clone().any(|i| self.get(i))
    }

    pub fn intersect_with(&mut self, other: &BitArray) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
        for a in self.words.iter_mut().skip(other.words.len()) {
            *a = 0;
        }
    }

    pub fn union_with(&mut self, other: &BitArray) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
        self.trim_tail();
    }

    /// Indices of set bits, ascending.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let offset = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * WORD_BITS + offset)
            })
        })
    }

    fn trim_tail(&mut self) {
        let rem = self.len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_with_true_sets_exactly_len_bits() {
        let bits = BitArray::new(70, true);
        assert_eq!(bits.count_ones(), 70);
        assert!(bits.all());
    }

    #[test]
    fn set_get_and_clear_round_trip() {
        let mut bits = BitArray::new(130, false);
        bits.set(0);
        bits.set(64);
        bits.set(129);
        assert!(bits.get(64));
        assert!(!bits.get(65));
        bits.clear(64);
        assert!(!bits.get(64));
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 129]);
    }

    #[test]
    fn clear_all_after_set_all_leaves_no_bits() {
        let mut bits = BitArray::new(70, false);
        bits.set_all();
        assert_eq!(bits.count_ones(), 70);
        bits.clear_all();
        assert_eq!(bits.count_ones(), 0);
        assert!(!bits.any());
        assert_eq!(bits.len(), 70);
    }

    #[test]
    fn intersect_and_union_combine_sets() {
        let mut a = BitArray::from_indices(10, [1, 2, 3]);
        let b = BitArray::from_indices(10, [2, 3, 4]);
        let mut u = a.clone();
        a.intersect_with(&b);
        u.union_with(&b);
        assert_eq!(a.iter_ones().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(u.iter_ones().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn any_in_checks_only_requested_range() {
        let bits = BitArray::from_indices(20, [15]);
        assert!(!bits.any_in(0..15));
        assert!(bits.any_in(10..16));
        assert!(bits.any());
    }

    #[test]
    #[should_panic]
    fn get_out_of_range_panics() {
        BitArray::new(3, false).get(3);
    }
}
