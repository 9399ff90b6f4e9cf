//! Append-only sequence over an [`Arena`], growing as a chain of fixed-size
//! chunks rather than one contiguous buffer.
//!
//! Millions of per-term arrays need to coexist without each one paying for
//! realloc-and-copy growth, and without the crate chasing down a
//! per-term heap allocation. A [`DynamicArray`] solves this by asking the
//! arena for a new chunk (sized by `growth_factor` against the previous
//! one) whenever the current chunk fills, and leaving already-written
//! chunks untouched.

use crate::arena::Arena;
use std::marker::PhantomData;

const DEFAULT_FIRST_CHUNK_LEN: usize = 8;
const DEFAULT_GROWTH_FACTOR: f64 = 1.5;

struct Chunk<T> {
    // Raw pointer into arena-owned memory; the arena outlives every
    // DynamicArray built on top of it, which is the invariant this type
    // leans on instead of carrying a lifetime through every user of it.
    data: *mut T,
    cap: usize,
    len: usize,
}

/// An append-only sequence of `T`, chunk-chained over an [`Arena`].
///
/// Forward iteration only; there is no random-access indexing because the
/// accumulator never needs one (it only ever reads the structure back in
/// order, or bumps the very last element via [`DynamicArray::back_mut`]).
pub struct DynamicArray<'a, T> {
    arena: &'a Arena,
    chunks: Vec<Chunk<T>>,
    growth_factor: f64,
    total_len: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: Copy + Default> DynamicArray<'a, T> {
    pub fn new(arena: &'a Arena) -> Self {
        Self::with_growth(arena, DEFAULT_GROWTH_FACTOR)
    }

    pub fn with_growth(arena: &'a Arena, growth_factor: f64) -> Self {
        debug_assert!(growth_factor > 1.0);
        Self {
            arena,
            chunks: Vec::new(),
            growth_factor,
            total_len: 0,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.total_len
    }

    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    fn push_chunk(&mut self, cap: usize) {
        let slice = self.arena.alloc_slice(cap, T::default());
        self.chunks.push(Chunk {
            data: slice.as_mut_ptr(),
            cap,
            len: 0,
        });
    }

    /// Amortized O(1) append.
    pub fn push_back(&mut self, value: T) {
        let needs_new_chunk = match self.chunks.last() {
            None => true,
            Some(chunk) => chunk.len == chunk.cap,
        };

        if needs_new_chunk {
            let next_cap = match self.chunks.last() {
                None => DEFAULT_FIRST_CHUNK_LEN,
                Some(chunk) => ((chunk.cap as f64) * self.growth_factor).ceil() as usize,
            };
            self.push_chunk(next_cap.max(1));
        }

        let chunk = self.chunks.last_mut().expect("chunk just pushed");
        unsafe {
            std::ptr::write(chunk.data.add(chunk.len), value);
        }
        chunk.len += 1;
        self.total_len += 1;
    }

    /// Mutable reference to the last pushed element.
    ///
    /// Used by the postings accumulator to bump a term frequency in
    /// place without appending a new docid.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let chunk = self.chunks.last_mut()?;
        if chunk.len == 0 {
            return None;
        }
        unsafe { Some(&mut *chunk.data.add(chunk.len - 1)) }
    }

    pub fn back(&self) -> Option<&T> {
        let chunk = self.chunks.last()?;
        if chunk.len == 0 {
            return None;
        }
        unsafe { Some(&*chunk.data.add(chunk.len - 1)) }
    }

    /// Forward iterator that hides chunk boundaries.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chunks: &self.chunks,
            chunk_idx: 0,
            offset: 0,
        }
    }
}

pub struct Iter<'a, T> {
    chunks: &'a [Chunk<T>],
    chunk_idx: usize,
    offset: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let chunk = self.chunks.get(self.chunk_idx)?;
            if self.offset >= chunk.len {
                self.chunk_idx += 1;
                self.offset = 0;
                continue;
            }
            let item = unsafe { &*chunk.data.add(self.offset) };
            self.offset += 1;
            return Some(item);
        }
    }
}

impl<'a, 'b, T> IntoIterator for &'b DynamicArray<'a, T> {
    type Item = &'b T;
    type IntoIter = Iter<'b, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Chunks point into arena memory the DynamicArray was built from; the
// values themselves are plain Copy integers, so sending the array across
// threads is sound as long as the arena is not concurrently mutated
// (callers already uphold "one arena per indexing thread").
unsafe impl<'a, T: Send> Send for DynamicArray<'a, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_iterate_preserves_order() {
        let arena = Arena::new();
        let mut array: DynamicArray<u32> = DynamicArray::new(&arena);
        for i in 0..1000u32 {
            array.push_back(i);
        }
        let collected: Vec<u32> = array.iter().copied().collect();
        let expected: Vec<u32> = (0..1000).collect();
        assert_eq!(collected, expected);
        assert_eq!(array.len(), 1000);
    }

    #[test]
    fn back_mut_bumps_last_element() {
        let arena = Arena::new();
        let mut array: DynamicArray<u16> = DynamicArray::new(&arena);
        array.push_back(1);
        *array.back_mut().unwrap() += 1;
        assert_eq!(array.back().copied(), Some(2));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn chunk_growth_crosses_many_chunk_boundaries() {
        let arena = Arena::new();
        let mut array: DynamicArray<u8> = DynamicArray::with_growth(&arena, 1.2);
        for i in 0..100_000u32 {
            array.push_back((i % 256) as u8);
        }
        assert_eq!(array.len(), 100_000);
        let mut iter = array.iter();
        for i in 0..100_000u32 {
            assert_eq!(iter.next().copied(), Some((i % 256) as u8));
        }
        assert_eq!(iter.next(), None);
    }
}
