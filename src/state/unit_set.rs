use smallvec::SmallVec;

const WORD_BITS: usize = 64;

/// Fixed-size bitset over unit indices of one side
///
/// Sets for the same side are always created with the same capacity, so the
/// derived equality and hash compare like for like.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnitSet {
    words: SmallVec<[u64; 2]>,
}

impl UnitSet {
    pub fn with_capacity(units: usize) -> Self {
        let words = units.div_ceil(WORD_BITS);
        Self {
            words: SmallVec::from_elem(0, words),
        }
    }

    /// Returns true when the unit was not already present
    pub fn insert(&mut self, unit: usize) -> bool {
        let (word, bit) = (unit / WORD_BITS, unit % WORD_BITS);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn remove(&mut self, unit: usize) -> bool {
        let (word, bit) = (unit / WORD_BITS, unit % WORD_BITS);
        match self.words.get_mut(word) {
            Some(bits) => {
                let mask = 1u64 << bit;
                let present = *bits & mask != 0;
                *bits &= !mask;
                present
            }
            None => false,
        }
    }

    pub fn contains(&self, unit: usize) -> bool {
        self.words
            .get(unit / WORD_BITS)
            .is_some_and(|bits| bits & (1u64 << (unit % WORD_BITS)) != 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&bits| bits == 0)
    }

    pub fn union_with(&mut self, other: &UnitSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *mine |= theirs;
        }
    }

    pub fn clear(&mut self) {
        for bits in self.words.iter_mut() {
            *bits = 0;
        }
    }

    /// Unit indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &bits)| {
            (0..WORD_BITS)
                .filter(move |bit| bits & (1u64 << bit) != 0)
                .map(move |bit| index * WORD_BITS + bit)
        })
    }
}
