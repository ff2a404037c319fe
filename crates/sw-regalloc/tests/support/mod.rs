//! Shared fixtures for sw-regalloc integration tests.

#![allow(dead_code)]

pub mod generate;
pub mod machine;

use sw_bytecode::{Function, Inst, Slot, VReg};
use sw_regalloc::{FunctionPass, RegAllocOptions, RegAllocPass, RegAllocReport};

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Function with `count` plain locals, so local `i` lands in slot `i`.
pub fn function_with_locals(name: &str, count: usize) -> (Function, Vec<VReg>) {
    let mut func = Function::new(name);
    let locals = (0..count).map(|_| func.new_local()).collect();
    (func, locals)
}

pub fn verifying_pass() -> RegAllocPass {
    RegAllocPass::new(RegAllocOptions::default().with_verify(true))
}

pub fn legalize(func: &mut Function) -> RegAllocReport {
    init_tracing();
    verifying_pass().run(func).expect("regalloc should succeed")
}

pub fn slot(func: &Function, reg: VReg) -> Slot {
    func.regs.slot(reg).expect("register should have a slot")
}

/// Slots of every register operand of `inst`, in operand order.
pub fn operand_slots(func: &Function, inst: &Inst) -> Vec<Slot> {
    inst.registers().map(|reg| slot(func, reg)).collect()
}

/// Position of the only non-move instruction in a legalized stream.
pub fn position_of_non_mov(func: &Function) -> usize {
    let positions: Vec<_> = func
        .insts
        .iter()
        .enumerate()
        .filter(|(_, inst)| inst.opcode != sw_bytecode::Opcode::Mov)
        .map(|(index, _)| index)
        .collect();
    assert_eq!(positions.len(), 1, "expected exactly one non-move instruction");
    positions[0]
}
