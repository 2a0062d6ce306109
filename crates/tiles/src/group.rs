//! Pooled slots and the render group that holds them.

use model::TileSize;

use crate::{RenderGroupConfig, TileGridError};

/// Packed `0xRRGGBB` color multiplier.
pub type Tint = u32;

/// One reusable renderable unit.
///
/// The size is fixed when the slot is created. Position, content, tint and
/// visibility are overwritten by every update pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    position: (f32, f32),
    size: (f32, f32),
    content: Option<T>,
    tint: Option<Tint>,
    visible: bool,
}

impl<T> Slot<T> {
    fn new(size: TileSize) -> Self {
        Self {
            position: (0.0, 0.0),
            size: (size.width(), size.height()),
            content: None,
            tint: None,
            visible: false,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        self.position
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    pub fn tint(&self) -> Option<Tint> {
        self.tint
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn assign(&mut self, texture: T, tint: Option<Tint>, x: f32, y: f32) {
        self.content = Some(texture);
        self.tint = tint;
        self.position = (x, y);
        self.visible = true;
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }
}

#[derive(Debug, Clone)]
pub struct SlotGroup<T> {
    kind: RenderGroupConfig,
    slots: Vec<Slot<T>>,
}

impl<T> SlotGroup<T> {
    pub fn new(kind: RenderGroupConfig) -> Result<Self, TileGridError> {
        if kind.capacity() == Some(0) {
            return Err(TileGridError::InvalidCapacity);
        }
        Ok(Self {
            kind,
            slots: Vec::new(),
        })
    }

    pub fn kind(&self) -> RenderGroupConfig {
        self.kind
    }

    pub fn capacity(&self) -> Option<usize> {
        self.kind.capacity()
    }

    pub fn allows_tint(&self) -> bool {
        self.kind.allows_tint()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }

    pub fn ensure_capacity(&self, required: usize) -> Result<(), TileGridError> {
        match self.capacity() {
            Some(capacity) if required > capacity => {
                Err(TileGridError::PoolCapacityExceeded { required, capacity })
            }
            _ => Ok(()),
        }
    }

    /// Appends fresh slots until the group holds `len` of them.
    ///
    /// Returns how many slots were created.
    pub fn grow_to(&mut self, len: usize, size: TileSize) -> Result<usize, TileGridError> {
        self.ensure_capacity(len)?;
        let created = len.saturating_sub(self.slots.len());
        self.slots.reserve(created);
        self.slots.extend((0..created).map(|_| Slot::new(size)));
        Ok(created)
    }

    /// Rewrites the size of every existing slot.
    pub fn reassert_sizes(&mut self, size: TileSize) {
        for slot in &mut self.slots {
            slot.size = (size.width(), size.height());
        }
    }

    /// Drops trailing slots beyond `len`, returning how many were removed.
    pub fn truncate(&mut self, len: usize) -> usize {
        let removed = self.slots.len().saturating_sub(len);
        self.slots.truncate(len);
        removed
    }

    /// Switches off every slot at or beyond `start`, returning how many were
    /// visible.
    pub fn hide_from(&mut self, start: usize) -> usize {
        let mut hidden = 0;
        for slot in self.slots.iter_mut().skip(start) {
            hidden += slot.visible as usize;
            slot.hide();
        }
        hidden
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Slot<T>> {
        self.slots.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> TileSize {
        TileSize::new(16.0, 8.0).expect("tile size")
    }

    #[test]
    fn zero_capacity_batched_group_is_rejected() {
        let result = SlotGroup::<u32>::new(RenderGroupConfig::Batched {
            max_tiles: 0,
            tint: false,
        });
        assert!(matches!(result, Err(TileGridError::InvalidCapacity)));
    }

    #[test]
    fn grow_creates_hidden_slots_with_tile_size() {
        let mut group = SlotGroup::<u32>::new(RenderGroupConfig::Container).expect("group");
        assert_eq!(group.grow_to(3, tile()).expect("grow"), 3);
        assert_eq!(group.grow_to(2, tile()).expect("grow smaller"), 0);

        assert_eq!(group.len(), 3);
        for slot in group.slots() {
            assert_eq!(slot.size(), (16.0, 8.0));
            assert!(!slot.is_visible());
            assert_eq!(slot.content(), None);
        }
    }

    #[test]
    fn batched_group_refuses_to_grow_past_capacity() {
        let mut group = SlotGroup::<u32>::new(RenderGroupConfig::Batched {
            max_tiles: 4,
            tint: false,
        })
        .expect("group");
        group.grow_to(4, tile()).expect("grow to capacity");

        assert_eq!(
            group.grow_to(5, tile()),
            Err(TileGridError::PoolCapacityExceeded {
                required: 5,
                capacity: 4
            })
        );
        assert_eq!(group.len(), 4);
    }

    #[test]
    fn hide_from_switches_off_the_tail_only() {
        let mut group = SlotGroup::<u32>::new(RenderGroupConfig::Container).expect("group");
        group.grow_to(4, tile()).expect("grow");
        for index in 0..3 {
            let slot = group.get_mut(index).expect("slot");
            slot.assign(index as u32, None, 0.0, 0.0);
        }

        assert_eq!(group.hide_from(1), 2);
        assert!(group.slots()[0].is_visible());
        assert!(group.slots()[1..].iter().all(|slot| !slot.is_visible()));
        assert_eq!(group.slots()[1].content(), Some(&1));
        assert_eq!(group.hide_from(1), 0);
    }

    #[test]
    fn truncate_reports_removed_slots() {
        let mut group = SlotGroup::<u32>::new(RenderGroupConfig::Container).expect("group");
        group.grow_to(5, tile()).expect("grow");
        assert_eq!(group.truncate(2), 3);
        assert_eq!(group.truncate(4), 0);
        assert_eq!(group.len(), 2);
    }
}
