/// Hands out small integer ids, recycling released ones
///
/// Used for native object ids, where 0 is reserved for "no object": the first id
/// is configurable and releasing an id that is not live is reported instead of
/// corrupting the pool.
///
/// # Example
///
/// ```
/// use rhi_engine::utils::IdAllocator;
///
/// let mut ids = IdAllocator::with_first_id(1);
/// let a = ids.allocate();      // 1
/// let _b = ids.allocate();     // 2
/// assert!(ids.release(a));
/// assert_eq!(ids.allocate(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct IdAllocator {
    first_id: u32,
    /// Liveness per id, indexed by `id - first_id`
    live: Vec<bool>,
    released: Vec<u32>,
    number_of_live_ids: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_first_id(0)
    }

    pub fn with_first_id(first_id: u32) -> Self {
        Self {
            first_id,
            live: Vec::new(),
            released: Vec::new(),
            number_of_live_ids: 0,
        }
    }

    /// Most recently released id, or a fresh one
    pub fn allocate(&mut self) -> u32 {
        let id = match self.released.pop() {
            Some(id) => id,
            None => {
                self.live.push(false);
                self.first_id + (self.live.len() as u32 - 1)
            }
        };
        self.live[(id - self.first_id) as usize] = true;
        self.number_of_live_ids += 1;
        id
    }

    /// Return `id` to the pool; false if it was not live
    pub fn release(&mut self, id: u32) -> bool {
        if !self.is_live(id) {
            return false;
        }
        self.live[(id - self.first_id) as usize] = false;
        self.released.push(id);
        self.number_of_live_ids -= 1;
        true
    }

    pub fn is_live(&self, id: u32) -> bool {
        id.checked_sub(self.first_id)
            .and_then(|index| self.live.get(index as usize).copied())
            .unwrap_or(false)
    }

    /// One past the highest id ever handed out
    pub fn high_water_mark(&self) -> u32 {
        self.first_id + self.live.len() as u32
    }

    pub fn len(&self) -> u32 {
        self.number_of_live_ids
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_live_ids == 0
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "id_allocator_tests.rs"]
mod tests;
