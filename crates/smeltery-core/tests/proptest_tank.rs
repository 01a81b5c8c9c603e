//! Property-based tests for tanks.
//!
//! Uses proptest to generate random fill/drain sequences against scaled
//! tanks, then verify the bundle invariant holds after every step.

use smeltery_core::fluid::{FluidAction, FluidStack, ResourceContainer};
use smeltery_core::tank::{Tank, TankTag};
use smeltery_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum TankOp {
    Fill(u32, FluidAction),
    Drain(u32, FluidAction),
    DrainAmount(u32, FluidAction),
    SetCapacity(u32),
    Reload(u32),
}

fn arb_action() -> impl Strategy<Value = FluidAction> {
    prop_oneof![Just(FluidAction::Execute), Just(FluidAction::Simulate)]
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<TankOp>> {
    proptest::collection::vec(
        prop_oneof![
            (0..500u32, arb_action()).prop_map(|(a, m)| TankOp::Fill(a, m)),
            (0..500u32, arb_action()).prop_map(|(a, m)| TankOp::Drain(a, m)),
            (0..500u32, arb_action()).prop_map(|(a, m)| TankOp::DrainAmount(a, m)),
            (0..2_000u32).prop_map(TankOp::SetCapacity),
            (0..200u32).prop_map(TankOp::Reload),
        ],
        1..=max_ops,
    )
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Stored amount, capacity, and every moved amount are whole bundles.
    #[test]
    fn scaled_tank_amounts_stay_multiples_of_scale(
        scale in 1..10u32,
        base in 1..100u32,
        ops in arb_ops(40),
    ) {
        let mut tank = Tank::scaled(base, scale);
        for op in ops {
            match op {
                TankOp::Fill(amount, action) => {
                    let filled = tank.fill(&stack(lava(), amount), action);
                    prop_assert_eq!(filled % scale, 0);
                }
                TankOp::Drain(amount, action) => {
                    let drained = tank.drain(&stack(lava(), amount), action);
                    prop_assert_eq!(drained.amount % scale, 0);
                }
                TankOp::DrainAmount(amount, action) => {
                    let drained = tank.drain_amount(amount, action);
                    prop_assert_eq!(drained.amount % scale, 0);
                }
                TankOp::SetCapacity(capacity) => tank.set_capacity(capacity),
                TankOp::Reload(units) => tank.read_tag(&TankTag { fluid: lava(), amount: units }),
            }
            prop_assert_eq!(tank.fluid().amount % scale, 0);
            prop_assert_eq!(tank.capacity() % scale, 0);
            prop_assert!(tank.fluid().amount <= tank.capacity());
        }
    }

    /// Simulated operations never change the contents.
    #[test]
    fn simulate_is_side_effect_free(
        scale in 1..6u32,
        initial in 0..50u32,
        amount in 0..500u32,
    ) {
        let mut tank = Tank::scaled(100, scale);
        tank.set_fluid(FluidStack::new(lava(), initial * scale));
        let before = tank.fluid();
        let _ = tank.fill(&stack(lava(), amount), FluidAction::Simulate);
        let _ = tank.drain_amount(amount, FluidAction::Simulate);
        let _ = tank.drain(&stack(lava(), amount), FluidAction::Simulate);
        prop_assert_eq!(tank.fluid(), before);
    }
}
