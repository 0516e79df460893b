/// Route-parameter value slots.
///
/// Capacity is fixed to the largest parameter count any registered route
/// declares; slot buffers are reused across requests.
#[derive(Debug, Default, Clone)]
pub struct ParamValues {
    slots: Box<[String]>,
    len: usize,
}

impl ParamValues {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![String::new(); capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grows the slot array when the route table outgrew it.
    pub(crate) fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.slots.len() {
            *self = Self::with_capacity(capacity);
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots[..self.len] {
            slot.clear();
        }
        self.len = 0;
    }

    /// Stores the next value. Returns false once every slot is occupied.
    pub fn push(&mut self, value: &str) -> bool {
        let Some(slot) = self.slots.get_mut(self.len) else {
            return false;
        };
        slot.clear();
        slot.push_str(value);
        self.len += 1;
        true
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots[..self.len].get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slots[..self.len].iter().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "params_test.rs"]
mod params_test;
