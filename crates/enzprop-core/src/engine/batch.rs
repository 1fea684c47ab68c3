/// Collects items into fixed-size batches.
///
/// Batch boundaries only decide when items are handed on; every pushed item
/// comes out exactly once, in push order.
#[derive(Debug)]
pub struct Batcher<T> {
    size: usize,
    pending: Vec<T>,
}

impl<T> Batcher<T> {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            pending: Vec::with_capacity(size),
        }
    }

    /// Adds `items`, returning every batch that became full.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) -> Vec<Vec<T>> {
        let mut full = Vec::new();
        for item in items {
            self.pending.push(item);
            if self.pending.len() == self.size {
                full.push(std::mem::replace(
                    &mut self.pending,
                    Vec::with_capacity(self.size),
                ));
            }
        }
        full
    }

    /// Returns the partially filled batch, if any.
    pub fn finish(&mut self) -> Option<Vec<T>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
