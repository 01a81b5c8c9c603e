//! Engines running on a catalog and registry loaded from data files.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use smeltery_core::fluid::FluidStack;
use smeltery_core::id::BlockPos;
use smeltery_core::item::{ItemHandler, ItemInventory, ItemStack};
use smeltery_core::tank::FluidTank;
use smeltery_core::test_utils::TestLevel;
use smeltery_data::load_fuel_data;
use smeltery_fuel::multitank::MultitankFuelModule;
use smeltery_fuel::{FuelModule, SolidFuelModule};

/// Data directory removed on drop.
struct DataDir(PathBuf);

impl DataDir {
    fn new(label: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "smeltery_it_{label}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.0.join(name), content).unwrap();
    }
}

impl Drop for DataDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn write_pack(dir: &DataDir) {
    dir.write(
        "fluids.toml",
        r#"
        [[fluids]]
        name = "water"

        [[fluids]]
        name = "lava"

        [[fluids]]
        name = "blazing_blood"
        "#,
    );
    dir.write(
        "items.ron",
        r#"[
            (name: "charcoal", burn_time: 1600),
            (name: "bucket"),
            (name: "lava_bucket", burn_time: 20000, crafting_remainder: Some("bucket")),
        ]"#,
    );
    dir.write(
        "fuels.json",
        r#"{
            "fuels": [
                {"fluid": "lava", "temperature": 1000, "duration": 80, "amount": 50, "rate": 10},
                {"fluid": "blazing_blood", "temperature": 1500, "duration": 100, "amount": 50, "rate": 20}
            ],
            "solid": {"temperature": 800, "rate": 6}
        }"#,
    );
}

#[test]
fn loaded_catalog_drives_tank_pool() {
    let dir = DataDir::new("pool");
    write_pack(&dir);
    let data = load_fuel_data(&dir.0).unwrap();
    let water = data.registry.fluid_id("water").unwrap();
    let blood = data.registry.fluid_id("blazing_blood").unwrap();

    let level = Rc::new(TestLevel::new());
    let a = BlockPos::new(0, 1, 0);
    let b = BlockPos::new(0, 2, 0);
    level.add_tank(a, FluidTank::with_fluid(1000, FluidStack::new(water, 1000)));
    let blood_tank = level.add_tank(b, FluidTank::with_fluid(1000, FluidStack::new(blood, 120)));

    let mut fuel = MultitankFuelModule::new(Rc::new(data.catalog), level.clone(), BlockPos::ORIGIN, vec![a, b]);
    assert_eq!(fuel.find_fuel(true), 1500);
    assert_eq!(fuel.rate(), 20);
    assert_eq!(fuel.fuel(), 100);
    assert_eq!(blood_tank.borrow().amount(), 70);

    fuel.find_fuel(true);
    assert_eq!(blood_tank.borrow().amount(), 20);
    assert_eq!(fuel.find_fuel(true), 0);
    assert_eq!(fuel.fuel(), 200);
}

#[test]
fn loaded_registry_drives_item_fuel() {
    let dir = DataDir::new("items");
    write_pack(&dir);
    let data = load_fuel_data(&dir.0).unwrap();
    let charcoal = data.registry.item_id("charcoal").unwrap();
    let lava_bucket = data.registry.item_id("lava_bucket").unwrap();
    let bucket = data.registry.item_id("bucket").unwrap();

    let level = Rc::new(TestLevel::new());
    let pos = BlockPos::new(7, 7, 7);
    let mut inv = ItemInventory::new(2);
    inv.set_stack(0, ItemStack::new(lava_bucket, 1));
    inv.set_stack(1, ItemStack::new(charcoal, 4));
    let inv = level.add_inventory(pos, inv);

    let mut fuel = SolidFuelModule::new(Rc::new(data.catalog), Rc::new(data.registry), level.clone(), pos);
    assert_eq!(fuel.find_fuel(true), 800);
    assert_eq!(fuel.fuel(), 5000);
    assert_eq!(inv.borrow().stack_in_slot(0), ItemStack::new(bucket, 1));

    assert_eq!(fuel.find_fuel(true), 800);
    assert_eq!(fuel.fuel(), 5400);
    assert_eq!(inv.borrow().count(charcoal), 3);
    assert!(level.dropped_items().is_empty());
}
