use crate::id::*;
use crate::item::ItemStack;
use std::collections::HashMap;

/// A fluid type definition in the registry.
#[derive(Debug, Clone)]
pub struct FluidDef {
    pub name: String,
}

/// An item type definition in the registry.
#[derive(Debug, Clone)]
pub struct ItemDef {
    pub name: String,
    /// Furnace burn time in ticks. Zero means the item is not fuel.
    pub burn_time: u32,
    /// Item left behind after this one is used up (e.g. an empty bucket).
    pub crafting_remainder: Option<ItemId>,
}

/// Builder for constructing an immutable Registry.
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    fluids: Vec<FluidDef>,
    fluid_name_to_id: HashMap<String, FluidId>,
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fluid type. Ids start at 1; 0 is [`FluidId::EMPTY`].
    pub fn register_fluid(&mut self, name: &str) -> Result<FluidId, RegistryError> {
        if self.fluid_name_to_id.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = FluidId(self.fluids.len() as u32 + 1);
        self.fluids.push(FluidDef {
            name: name.to_string(),
        });
        self.fluid_name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Register an item type. Ids start at 1; 0 is [`ItemId::AIR`].
    pub fn register_item(
        &mut self,
        name: &str,
        burn_time: u32,
        crafting_remainder: Option<ItemId>,
    ) -> Result<ItemId, RegistryError> {
        if self.item_name_to_id.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        let id = ItemId(self.items.len() as u32 + 1);
        self.items.push(ItemDef {
            name: name.to_string(),
            burn_time,
            crafting_remainder,
        });
        self.item_name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Mutate an existing item by name.
    pub fn mutate_item<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut ItemDef),
    {
        let id = self
            .item_name_to_id
            .get(name)
            .ok_or(RegistryError::NotFound(name.to_string()))?;
        f(&mut self.items[id.0 as usize - 1]);
        Ok(())
    }

    pub fn fluid_id(&self, name: &str) -> Option<FluidId> {
        self.fluid_name_to_id.get(name).copied()
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        // Validate: remainders must point at registered items.
        for item in &self.items {
            if let Some(rem) = item.crafting_remainder {
                if rem.is_air() || rem.0 as usize > self.items.len() {
                    return Err(RegistryError::InvalidItemRef(rem));
                }
            }
        }

        Ok(Registry {
            fluids: self.fluids,
            fluid_name_to_id: self.fluid_name_to_id,
            items: self.items,
            item_name_to_id: self.item_name_to_id,
        })
    }
}

/// Immutable registry of fluid and item types. Frozen after build().
#[derive(Debug, Default)]
pub struct Registry {
    fluids: Vec<FluidDef>,
    fluid_name_to_id: HashMap<String, FluidId>,
    items: Vec<ItemDef>,
    item_name_to_id: HashMap<String, ItemId>,
}

impl Registry {
    pub fn get_fluid(&self, id: FluidId) -> Option<&FluidDef> {
        (id.0 as usize).checked_sub(1).and_then(|i| self.fluids.get(i))
    }

    pub fn get_item(&self, id: ItemId) -> Option<&ItemDef> {
        (id.0 as usize).checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn fluid_id(&self, name: &str) -> Option<FluidId> {
        self.fluid_name_to_id.get(name).copied()
    }

    pub fn item_id(&self, name: &str) -> Option<ItemId> {
        self.item_name_to_id.get(name).copied()
    }

    pub fn fluid_count(&self) -> usize {
        self.fluids.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Furnace burn time of `stack`'s item. Zero for empty stacks and unknown items.
    pub fn burn_time(&self, stack: &ItemStack) -> u32 {
        if stack.is_empty() {
            return 0;
        }
        self.get_item(stack.item).map(|def| def.burn_time).unwrap_or(0)
    }

    /// What one unit of `stack` leaves behind once used. Empty if nothing.
    pub fn crafting_remainder(&self, stack: &ItemStack) -> ItemStack {
        if stack.is_empty() {
            return ItemStack::EMPTY;
        }
        self.get_item(stack.item)
            .and_then(|def| def.crafting_remainder)
            .map(|rem| ItemStack::new(rem, 1))
            .unwrap_or(ItemStack::EMPTY)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate name: {0}")]
    Duplicate(String),
    #[error("invalid item reference: {0:?}")]
    InvalidItemRef(ItemId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> RegistryBuilder {
        let mut b = RegistryBuilder::new();
        b.register_fluid("lava").unwrap();
        b.register_fluid("blazing_blood").unwrap();
        let bucket = b.register_item("bucket", 0, None).unwrap();
        b.register_item("lava_bucket", 20_000, Some(bucket)).unwrap();
        b.register_item("coal", 1_600, None).unwrap();
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.fluid_count(), 2);
        assert_eq!(reg.item_count(), 3);
    }

    #[test]
    fn ids_skip_the_empty_id() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.fluid_id("lava"), Some(FluidId(1)));
        assert_eq!(reg.item_id("bucket"), Some(ItemId(1)));
        assert!(reg.get_item(ItemId::AIR).is_none());
        assert!(reg.get_fluid(FluidId::EMPTY).is_none());
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut b = setup_builder();
        assert!(matches!(
            b.register_item("coal", 1, None),
            Err(RegistryError::Duplicate(_))
        ));
        assert!(matches!(
            b.register_fluid("lava"),
            Err(RegistryError::Duplicate(_))
        ));
    }

    #[test]
    fn burn_time_and_remainder() {
        let reg = setup_builder().build().unwrap();
        let lava_bucket = reg.item_id("lava_bucket").unwrap();
        let bucket = reg.item_id("bucket").unwrap();
        let stack = ItemStack::new(lava_bucket, 3);
        assert_eq!(reg.burn_time(&stack), 20_000);
        assert_eq!(reg.crafting_remainder(&stack), ItemStack::new(bucket, 1));
        assert_eq!(reg.burn_time(&ItemStack::EMPTY), 0);
        assert!(reg.crafting_remainder(&ItemStack::new(bucket, 1)).is_empty());
    }

    #[test]
    fn unknown_remainder_fails_build() {
        let mut b = RegistryBuilder::new();
        b.register_item("weird", 10, Some(ItemId(42))).unwrap();
        assert!(matches!(b.build(), Err(RegistryError::InvalidItemRef(ItemId(42)))));
    }

    #[test]
    fn mutate_item_by_name() {
        let mut b = setup_builder();
        b.mutate_item("coal", |def| def.burn_time = 800).unwrap();
        let reg = b.build().unwrap();
        let coal = reg.item_id("coal").unwrap();
        assert_eq!(reg.burn_time(&ItemStack::new(coal, 1)), 800);
        assert!(matches!(
            setup_builder().mutate_item("missing", |_| {}),
            Err(RegistryError::NotFound(_))
        ));
    }
}
