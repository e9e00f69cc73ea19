use crate::arch::RegisterGeometry;

/// Fixed-capacity sample register addressed by absolute sample index
///
/// Holds a contiguous run `[lo, hi)` of a source buffer. Index `i` lives in
/// slot `i % capacity`, so topping up at one end silently evicts the other.
#[derive(Debug, Clone)]
pub struct SampleRegister<T> {
    slots: Vec<T>,
    load: usize,
    lo: usize,
    hi: usize,
    loads: usize,
}

impl<T: Copy + Default> SampleRegister<T> {
    pub fn new(geometry: RegisterGeometry) -> Self {
        Self {
            slots: vec![T::default(); geometry.capacity],
            load: geometry.load,
            lo: 0,
            hi: 0,
            loads: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop the contents; the next ensure starts a fresh fill
    pub fn clear(&mut self) {
        self.lo = 0;
        self.hi = 0;
    }

    /// Number of chunk loads issued since construction
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Make `[need_lo, need_hi]` resident, loading upwards from the current top
    ///
    /// Requires `need_hi - need_lo + load <= capacity`.
    pub fn ensure_ascending(&mut self, src: &[T], need_lo: usize, need_hi: usize) {
        if self.lo == self.hi || need_lo < self.lo || need_lo > self.hi {
            self.lo = need_lo;
            self.hi = need_lo;
        }
        while self.hi <= need_hi {
            let end = (self.hi + self.load).min(src.len());
            for i in self.hi..end {
                let slot = i % self.capacity();
                self.slots[slot] = src[i];
            }
            self.hi = end;
            self.loads += 1;
            if self.hi - self.lo > self.capacity() {
                self.lo = self.hi - self.capacity();
            }
        }
        debug_assert!(
            self.lo <= need_lo && need_hi < self.hi,
            "register holds [{}, {}) but [{}, {}] is needed",
            self.lo,
            self.hi,
            need_lo,
            need_hi
        );
    }

    /// Make `[need_lo, need_hi]` resident, loading downwards from the current bottom
    ///
    /// Requires `need_hi - need_lo + load <= capacity`.
    pub fn ensure_descending(&mut self, src: &[T], need_lo: usize, need_hi: usize) {
        if self.lo == self.hi || need_hi >= self.hi || need_hi + 1 < self.lo {
            self.lo = need_hi + 1;
            self.hi = need_hi + 1;
        }
        while self.lo > need_lo {
            let start = self.lo.saturating_sub(self.load);
            for i in start..self.lo {
                let slot = i % self.capacity();
                self.slots[slot] = src[i];
            }
            self.lo = start;
            self.loads += 1;
            if self.hi - self.lo > self.capacity() {
                self.hi = self.lo + self.capacity();
            }
        }
        debug_assert!(
            self.lo <= need_lo && need_hi < self.hi,
            "register holds [{}, {}) but [{}, {}] is needed",
            self.lo,
            self.hi,
            need_lo,
            need_hi
        );
    }

    #[inline]
    pub fn get(&self, index: usize) -> T {
        debug_assert!(
            self.lo <= index && index < self.hi,
            "sample {} outside resident range [{}, {})",
            index,
            self.lo,
            self.hi
        );
        self.slots[index % self.capacity()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> SampleRegister<u32> {
        SampleRegister::new(RegisterGeometry {
            capacity: 16,
            load: 4,
        })
    }

    #[test]
    fn test_ascending_tops_up_lazily() {
        let src: Vec<u32> = (0..64).collect();
        let mut reg = register();
        reg.ensure_ascending(&src, 2, 9);
        assert_eq!(reg.loads(), 2);
        assert_eq!(reg.get(2), 2);
        assert_eq!(reg.get(9), 9);

        // already resident
        reg.ensure_ascending(&src, 4, 9);
        assert_eq!(reg.loads(), 2);

        reg.ensure_ascending(&src, 8, 20);
        assert_eq!(reg.loads(), 5);
        assert_eq!(reg.get(8), 8);
        assert_eq!(reg.get(20), 20);
    }

    #[test]
    fn test_ascending_evicts_oldest() {
        let src: Vec<u32> = (0..64).collect();
        let mut reg = register();
        reg.ensure_ascending(&src, 0, 11);
        reg.ensure_ascending(&src, 10, 22);
        assert_eq!(reg.get(10), 10);
        assert_eq!(reg.get(22), 22);
    }

    #[test]
    fn test_descending_loads_from_the_top() {
        let src: Vec<u32> = (0..64).collect();
        let mut reg = register();
        reg.ensure_descending(&src, 30, 40);
        assert_eq!(reg.loads(), 3);
        assert_eq!(reg.get(30), 30);
        assert_eq!(reg.get(40), 40);

        reg.ensure_descending(&src, 25, 33);
        assert_eq!(reg.get(25), 25);
        assert_eq!(reg.get(33), 33);
    }

    #[test]
    fn test_descending_stops_at_zero() {
        let src: Vec<u32> = (0..64).collect();
        let mut reg = register();
        reg.ensure_descending(&src, 0, 5);
        assert_eq!(reg.get(0), 0);
        assert_eq!(reg.get(5), 5);
    }

    #[test]
    fn test_clear_forces_reload() {
        let src: Vec<u32> = (0..64).collect();
        let mut reg = register();
        reg.ensure_ascending(&src, 0, 3);
        reg.clear();
        reg.ensure_ascending(&src, 0, 3);
        assert_eq!(reg.loads(), 2);
    }
}
