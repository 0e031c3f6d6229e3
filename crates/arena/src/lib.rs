//! Generational arena for the live page tree.
//!
//! Patch batches detach and release nodes while overlay sets and the
//! remembered-node cache may still hold their handles. A generation counter
//! per slot turns every such stale handle into a clean `None` instead of
//! aliasing whatever node reuses the slot.

use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenIndex {
    pub index: u32,
    pub generation: u32,
}

impl Hash for GenIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
    next_free: Option<u32>,
}

pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Store `value`, reusing the most recently released slot if any.
    pub fn allocate(&mut self, value: T) -> GenIndex {
        self.len += 1;
        match self.free_head {
            Some(i) => {
                let slot = &mut self.slots[i as usize];
                self.free_head = slot.next_free.take();
                slot.value = Some(value);
                GenIndex {
                    index: i,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                    next_free: None,
                });
                GenIndex {
                    index,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: GenIndex) -> Option<&T> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, id: GenIndex) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Release the slot behind `id`. Every outstanding copy of `id` goes stale.
    pub fn deallocate(&mut self, id: GenIndex) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.next_free = self.free_head;
        self.free_head = Some(id.index);
        self.len -= 1;
        Some(value)
    }

    pub fn contains(&self, id: GenIndex) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (GenIndex, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    GenIndex {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_handle_goes_stale() {
        let mut arena = Arena::new();
        let text = arena.allocate("old text");
        assert_eq!(arena.deallocate(text), Some("old text"));
        let replacement = arena.allocate("new text");

        assert_eq!(text.index, replacement.index);
        assert_eq!(arena.get(text), None);
        assert_eq!(arena.get(replacement), Some(&"new text"));
    }

    #[test]
    fn double_release_is_rejected() {
        let mut arena = Arena::new();
        let id = arena.allocate(7);
        assert_eq!(arena.deallocate(id), Some(7));
        assert_eq!(arena.deallocate(id), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn free_list_is_lifo() {
        let mut arena = Arena::new();
        let a = arena.allocate('a');
        let b = arena.allocate('b');
        let _c = arena.allocate('c');
        arena.deallocate(a);
        arena.deallocate(b);

        assert_eq!(arena.allocate('d').index, b.index);
        assert_eq!(arena.allocate('e').index, a.index);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn iter_skips_released_slots() {
        let mut arena = Arena::new();
        arena.allocate(1);
        let gone = arena.allocate(2);
        arena.allocate(3);
        arena.deallocate(gone);

        let values: Vec<i32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 3]);
    }

    #[test]
    fn get_mut_and_contains() {
        let mut arena = Arena::new();
        let id = arena.allocate(String::from("div"));
        arena.get_mut(id).unwrap().push_str(".box");
        assert_eq!(arena.get(id).map(String::as_str), Some("div.box"));
        assert!(arena.contains(id));

        let bogus = GenIndex { index: 40, generation: 0 };
        assert!(!arena.contains(bogus));
    }

    #[test]
    fn generation_wraps() {
        let mut arena = Arena::new();
        arena.slots.push(Slot {
            generation: u32::MAX,
            value: Some(1),
            next_free: None,
        });
        arena.len = 1;
        arena.deallocate(GenIndex { index: 0, generation: u32::MAX });
        let id = arena.allocate(2);
        assert_eq!(id.generation, 0);
        assert_eq!(arena.get(id), Some(&2));
    }
}
