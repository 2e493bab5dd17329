//! Fixed-capacity arena with a permanent sentinel at index 0.
//!
//! Every lookup by an out-of-range or free index resolves to the sentinel
//! record instead of failing, so read paths never branch on "null". Mutable
//! access is only handed out for live slots; the sentinel is never writable.

use super::PoolError;

/// Index types that address a [`SlotPool`].
pub trait PoolIndex: Copy + Eq {
    fn from_index(index: usize) -> Self;
    fn to_index(self) -> usize;
}

macro_rules! impl_pool_index {
    ($name:ty, $repr:ty) => {
        impl PoolIndex for $name {
            #[inline]
            fn from_index(index: usize) -> Self {
                Self(index as $repr)
            }

            #[inline]
            fn to_index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

impl_pool_index!(super::CreatureId, u16);
impl_pool_index!(super::ControlIndex, u16);

#[derive(Clone, Debug)]
pub struct SlotPool<I: PoolIndex, T: Default> {
    slots: Vec<T>,
    live: Vec<bool>,
    /// Free indices, highest first, so `pop` yields the lowest free slot.
    free: Vec<usize>,
    _index: std::marker::PhantomData<I>,
}

impl<I: PoolIndex, T: Default> SlotPool<I, T> {
    /// Creates a pool with `capacity` slots, one of which is the sentinel.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            live: vec![false; capacity],
            free: (1..capacity).rev().collect(),
            _index: std::marker::PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    pub fn is_empty(&self) -> bool {
        self.free.len() + 1 == self.slots.len()
    }

    pub fn contains(&self, id: I) -> bool {
        let index = id.to_index();
        index != 0 && self.live.get(index).copied().unwrap_or(false)
    }

    /// Record for `id`, or the sentinel when `id` is not live.
    pub fn get(&self, id: I) -> &T {
        if self.contains(id) {
            &self.slots[id.to_index()]
        } else {
            &self.slots[0]
        }
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        if self.contains(id) {
            self.slots.get_mut(id.to_index())
        } else {
            None
        }
    }

    pub fn sentinel(&self) -> &T {
        &self.slots[0]
    }

    /// Takes the lowest free slot and fills it with `value`.
    pub fn allocate(&mut self, value: T) -> Result<I, PoolError> {
        let index = self.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.slots.len() - 1,
        })?;
        self.slots[index] = value;
        self.live[index] = true;
        Ok(I::from_index(index))
    }

    /// Zeroes the slot and returns it to the free list.
    pub fn release(&mut self, id: I) -> Result<T, PoolError> {
        if !self.contains(id) {
            return Err(PoolError::StaleIndex(id.to_index()));
        }
        let index = id.to_index();
        self.live[index] = false;
        let position = self.free.partition_point(|free| *free > index);
        self.free.insert(position, index);
        Ok(std::mem::take(&mut self.slots[index]))
    }

    /// Live ids in ascending index order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter(|(_, live)| **live)
            .map(|(index, _)| I::from_index(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.ids().map(move |id| (id, &self.slots[id.to_index()]))
    }

    /// Releases every slot.
    pub fn clear(&mut self) {
        let capacity = self.slots.len();
        *self = Self::new(capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CreatureId;

    #[test]
    fn invalid_ids_resolve_to_sentinel() {
        let mut pool: SlotPool<CreatureId, u32> = SlotPool::new(4);
        assert_eq!(*pool.get(CreatureId(0)), 0);
        assert_eq!(*pool.get(CreatureId(99)), 0);
        assert!(pool.get_mut(CreatureId::NONE).is_none());

        let id = pool.allocate(7).unwrap();
        assert_eq!(id, CreatureId(1));
        assert_eq!(*pool.get(id), 7);
    }

    #[test]
    fn allocation_reuses_lowest_free_slot() {
        let mut pool: SlotPool<CreatureId, u32> = SlotPool::new(4);
        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(2).unwrap();
        let c = pool.allocate(3).unwrap();
        assert!(pool.allocate(4).is_err());

        pool.release(b).unwrap();
        pool.release(a).unwrap();
        assert_eq!(pool.allocate(5).unwrap(), a);
        assert_eq!(pool.allocate(6).unwrap(), b);
        assert_eq!(pool.len(), 3);
        assert_eq!(*pool.get(c), 3);
    }

    #[test]
    fn release_zeroes_and_rejects_stale_ids() {
        let mut pool: SlotPool<CreatureId, u32> = SlotPool::new(3);
        let id = pool.allocate(9).unwrap();
        assert_eq!(pool.release(id).unwrap(), 9);
        assert_eq!(*pool.get(id), 0);
        assert_eq!(pool.release(id), Err(PoolError::StaleIndex(1)));
    }
}
