//! Fixed-size circular buffer with modular indexing.
//!
//! All index arithmetic in the winnower goes through [`Ring::slot`], which
//! reduces any signed position into `0..capacity`. Positions may therefore be
//! expressed as plain offsets such as `end - n - delta` without tracking
//! wrap-around by hand.

#[derive(Debug, Clone)]
pub(crate) struct Ring<T> {
    slots: Vec<T>,
}

impl<T: Copy + Default> Ring<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity.max(1)],
        }
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reduce any signed position to a slot index.
    pub(crate) fn slot(&self, position: isize) -> usize {
        position.rem_euclid(self.slots.len() as isize) as usize
    }

    pub(crate) fn get(&self, position: isize) -> T {
        self.slots[self.slot(position)]
    }

    pub(crate) fn set(&mut self, position: isize, value: T) {
        let slot = self.slot(position);
        self.slots[slot] = value;
    }

    /// `len` consecutive values starting at `position`, wrapping.
    pub(crate) fn run(&self, position: isize, len: usize) -> impl Iterator<Item = T> + '_ {
        (0..len).map(move |i| self.get(position + i as isize))
    }
}
