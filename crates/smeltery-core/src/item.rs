use crate::id::ItemId;
use serde::{Deserialize, Serialize};

/// Default per-slot stack limit for [`ItemInventory`].
pub const DEFAULT_SLOT_LIMIT: u32 = 64;

/// A stack of identical items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u32,
}

impl ItemStack {
    pub const EMPTY: ItemStack = ItemStack {
        item: ItemId::AIR,
        count: 0,
    };

    pub fn new(item: ItemId, count: u32) -> Self {
        if item.is_air() || count == 0 {
            return Self::EMPTY;
        }
        Self { item, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item.is_air()
    }

    /// Same item type; counts are ignored.
    pub fn is_same_item(&self, other: &ItemStack) -> bool {
        !self.is_empty() && !other.is_empty() && self.item == other.item
    }

    pub fn copy_with_count(&self, count: u32) -> ItemStack {
        ItemStack::new(self.item, count)
    }

    pub fn shrink(&mut self, count: u32) {
        self.count = self.count.saturating_sub(count);
        if self.count == 0 {
            *self = Self::EMPTY;
        }
    }
}

/// Slot-indexed item storage.
pub trait ItemHandler {
    fn slots(&self) -> usize;

    /// Contents of `slot`. Empty when out of range.
    fn stack_in_slot(&self, slot: usize) -> ItemStack;

    /// Insert into `slot`, returning what did not fit.
    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> ItemStack;

    /// Extract up to `amount` from `slot`, returning what was (or would be) removed.
    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> ItemStack;

    fn slot_limit(&self, slot: usize) -> u32;
}

/// Insert `stack` anywhere in `handler`: first merging into matching stacks,
/// then into empty slots. Returns the remainder that did not fit.
pub fn insert_item_stacked(
    handler: &mut dyn ItemHandler,
    stack: ItemStack,
    simulate: bool,
) -> ItemStack {
    if stack.is_empty() {
        return ItemStack::EMPTY;
    }
    let mut remaining = stack;

    for slot in 0..handler.slots() {
        if handler.stack_in_slot(slot).is_same_item(&remaining) {
            remaining = handler.insert_item(slot, remaining, simulate);
            if remaining.is_empty() {
                return ItemStack::EMPTY;
            }
        }
    }

    for slot in 0..handler.slots() {
        if handler.stack_in_slot(slot).is_empty() {
            remaining = handler.insert_item(slot, remaining, simulate);
            if remaining.is_empty() {
                return ItemStack::EMPTY;
            }
        }
    }

    remaining
}

/// A fixed number of item slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInventory {
    slots: Vec<ItemStack>,
    slot_limit: u32,
}

impl ItemInventory {
    pub fn new(slots: usize) -> Self {
        Self::with_limit(slots, DEFAULT_SLOT_LIMIT)
    }

    pub fn with_limit(slots: usize, slot_limit: u32) -> Self {
        Self {
            slots: vec![ItemStack::EMPTY; slots],
            slot_limit,
        }
    }

    /// Overwrite a slot directly. Out-of-range slots are ignored.
    pub fn set_stack(&mut self, slot: usize, stack: ItemStack) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = stack;
        }
    }

    /// Total items of `item` across all slots.
    pub fn count(&self, item: ItemId) -> u32 {
        self.slots
            .iter()
            .filter(|s| !s.is_empty() && s.item == item)
            .map(|s| s.count)
            .sum()
    }
}

impl ItemHandler for ItemInventory {
    fn slots(&self) -> usize {
        self.slots.len()
    }

    fn stack_in_slot(&self, slot: usize) -> ItemStack {
        self.slots.get(slot).copied().unwrap_or(ItemStack::EMPTY)
    }

    fn insert_item(&mut self, slot: usize, stack: ItemStack, simulate: bool) -> ItemStack {
        if stack.is_empty() {
            return ItemStack::EMPTY;
        }
        let limit = self.slot_limit;
        let Some(existing) = self.slots.get_mut(slot) else {
            return stack;
        };
        if !existing.is_empty() && existing.item != stack.item {
            return stack;
        }
        let current = if existing.is_empty() { 0 } else { existing.count };
        let accepted = stack.count.min(limit.saturating_sub(current));
        if accepted == 0 {
            return stack;
        }
        if !simulate {
            *existing = stack.copy_with_count(current + accepted);
        }
        stack.copy_with_count(stack.count - accepted)
    }

    fn extract_item(&mut self, slot: usize, amount: u32, simulate: bool) -> ItemStack {
        let Some(existing) = self.slots.get_mut(slot) else {
            return ItemStack::EMPTY;
        };
        if existing.is_empty() || amount == 0 {
            return ItemStack::EMPTY;
        }
        let taken = amount.min(existing.count);
        let extracted = existing.copy_with_count(taken);
        if !simulate {
            existing.shrink(taken);
        }
        extracted
    }

    fn slot_limit(&self, slot: usize) -> u32 {
        if slot < self.slots.len() { self.slot_limit } else { 0 }
    }
}
