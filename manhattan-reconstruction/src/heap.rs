use float_ord::FloatOrd;
use std::collections::HashMap;
use std::hash::Hash;

/// A binary max-heap of keys ordered by a score that can change while the key is queued.
///
/// A position map tracks where each key lives in the heap, so scores can be updated
/// in logarithmic time. Equal scores pop the smaller key first.
#[derive(Debug, Clone)]
pub struct MaxHeap<K> {
    entries: Vec<(K, f64)>,
    positions: HashMap<K, usize>,
}

impl<K> Default for MaxHeap<K> {
    fn default() -> Self {
        Self {
            entries: vec![],
            positions: HashMap::new(),
        }
    }
}

impl<K> MaxHeap<K>
where
    K: Copy + Eq + Ord + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.positions.contains_key(&key)
    }

    pub fn score(&self, key: K) -> Option<f64> {
        self.positions.get(&key).map(|&i| self.entries[i].1)
    }

    /// Inserts a key, or updates its score if it is already queued.
    pub fn push(&mut self, key: K, score: f64) {
        if !self.set_score(key, score) {
            self.entries.push((key, score));
            let position = self.entries.len() - 1;
            self.positions.insert(key, position);
            self.sift_up(position);
        }
    }

    /// Changes the score of a queued key. Returns `false` if the key is not queued.
    pub fn set_score(&mut self, key: K, score: f64) -> bool {
        let position = match self.positions.get(&key) {
            Some(&position) => position,
            None => return false,
        };
        let old = self.entries[position].1;
        self.entries[position].1 = score;
        if FloatOrd(score) > FloatOrd(old) {
            self.sift_up(position);
        } else {
            self.sift_down(position);
        }
        true
    }

    /// The key with the highest score and its score.
    pub fn top(&self) -> Option<(K, f64)> {
        self.entries.first().copied()
    }

    /// Removes and returns the key with the highest score and its score.
    pub fn pop(&mut self) -> Option<(K, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let top = self.entries.pop()?;
        self.positions.remove(&top.0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Whether the entry at `a` belongs above the entry at `b`.
    fn above(&self, a: usize, b: usize) -> bool {
        let (key_a, score_a) = self.entries[a];
        let (key_b, score_b) = self.entries[b];
        (FloatOrd(score_a), std::cmp::Reverse(key_a)) > (FloatOrd(score_b), std::cmp::Reverse(key_b))
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].0, a);
        self.positions.insert(self.entries[b].0, b);
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if !self.above(position, parent) {
                break;
            }
            self.swap(position, parent);
            position = parent;
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            let mut largest = position;
            if left < self.entries.len() && self.above(left, largest) {
                largest = left;
            }
            if right < self.entries.len() && self.above(right, largest) {
                largest = right;
            }
            if largest == position {
                break;
            }
            self.swap(position, largest);
            position = largest;
        }
    }
}

impl<K> FromIterator<(K, f64)> for MaxHeap<K>
where
    K: Copy + Eq + Ord + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut heap = Self::new();
        for (key, score) in iter {
            heap.push(key, score);
        }
        heap
    }
}
