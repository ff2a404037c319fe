//! Symbolic interpreter for instruction streams.
//!
//! `mov.dyn` copies a value. Every other instruction reads the operands its
//! format marks as read and writes a fresh value, named after the
//! instruction's ordinal among non-move instructions, into the operands it
//! marks as written. Running a function before legalization over virtual
//! registers and after legalization over slots must produce the same reads
//! and leave every declared register with the same value.

use std::collections::HashMap;

use sw_bytecode::{Function, Inst, Opcode, Operand, OperandRole, Slot, VReg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Param(usize),
    Initial(VReg),
    Defined { inst: usize, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Read {
    pub inst: usize,
    pub opcode: Opcode,
    pub position: usize,
    pub value: Value,
}

fn role_at(inst: &Inst, position: usize) -> OperandRole {
    let format = inst.selected_format().or_else(|| inst.formats.first());
    match format.and_then(|format| format.slot(position)) {
        Some(field) => field.role,
        // Trailing operands of a range run share the role of its first field.
        None => OperandRole::Src,
    }
}

/// Executes `insts` where `location` maps each register to a storage key.
fn execute<K, F>(
    insts: &[Inst],
    state: &mut HashMap<K, Value>,
    location: F,
    initial: impl Fn(K) -> Value,
) -> Vec<Read>
where
    K: std::hash::Hash + Eq + Copy,
    F: Fn(VReg) -> K,
{
    let mut reads = Vec::new();
    let mut ordinal = 0;
    let load = |state: &mut HashMap<K, Value>, key: K| {
        state.entry(key).or_insert_with(|| initial(key)).clone()
    };

    for inst in insts {
        if inst.opcode == Opcode::Mov {
            let (Some(Operand::Reg(dst)), Some(Operand::Reg(src))) =
                (inst.operands.first(), inst.operands.get(1))
            else {
                panic!("malformed move {:?}", inst);
            };
            let value = load(&mut *state, location(*src));
            state.insert(location(*dst), value);
            continue;
        }

        for (position, operand) in inst.operands.iter().enumerate() {
            let Operand::Reg(reg) = operand else { continue };
            if role_at(inst, position).reads() {
                let value = load(&mut *state, location(*reg));
                reads.push(Read {
                    inst: ordinal,
                    opcode: inst.opcode,
                    position,
                    value,
                });
            }
        }
        for (position, operand) in inst.operands.iter().enumerate() {
            let Operand::Reg(reg) = operand else { continue };
            if role_at(inst, position).writes() {
                state.insert(
                    location(*reg),
                    Value::Defined {
                        inst: ordinal,
                        position,
                    },
                );
            }
        }
        ordinal += 1;
    }
    reads
}

pub struct Outcome<K> {
    pub reads: Vec<Read>,
    pub state: HashMap<K, Value>,
}

/// Runs a function that has not been legalized, over virtual registers.
pub fn run_virtual(func: &Function) -> Outcome<VReg> {
    let params: HashMap<VReg, usize> = func
        .parameter_locals()
        .iter()
        .enumerate()
        .map(|(index, reg)| (*reg, index))
        .collect();
    let mut state = HashMap::new();
    let reads = execute(&func.insts, &mut state, |reg| reg, |reg| match params.get(&reg) {
        Some(index) => Value::Param(*index),
        None => Value::Initial(reg),
    });
    Outcome { reads, state }
}

/// Runs a legalized function over frame slots. Parameter entry slots start
/// out holding the parameters.
pub fn run_slots(func: &Function) -> Outcome<Slot> {
    let owners: HashMap<Slot, VReg> = func
        .regs
        .iter()
        .filter_map(|(reg, slot)| slot.map(|slot| (slot, reg)))
        .collect();
    let entries: HashMap<Slot, usize> = func
        .insts
        .iter()
        .take(func.params as usize)
        .enumerate()
        .map(|(index, inst)| {
            let src = inst.operands[1].as_reg().expect("prologue move source");
            (func.regs.expect_slot(src), index)
        })
        .collect();

    let mut state = HashMap::new();
    let reads = execute(
        &func.insts,
        &mut state,
        |reg| func.regs.expect_slot(reg),
        |slot| match entries.get(&slot) {
            Some(index) => Value::Param(*index),
            None => Value::Initial(owners[&slot]),
        },
    );
    Outcome { reads, state }
}

/// Asserts that `after` (legalized) behaves like `before` on every declared
/// register.
pub fn assert_preserves_values(before: &Function, after: &Function) {
    let ideal = run_virtual(before);
    let actual = run_slots(after);
    pretty_assertions::assert_eq!(ideal.reads, actual.reads, "reads differ");

    let declared = before
        .locals
        .iter()
        .chain(&before.temps)
        .copied()
        .chain(before.cache.materialized().map(|(_, reg)| reg));
    for reg in declared {
        let expected = ideal.state.get(&reg).cloned().unwrap_or_else(|| {
            match before.parameter_locals().iter().position(|param| *param == reg) {
                Some(index) => Value::Param(index),
                None => Value::Initial(reg),
            }
        });
        let slot = after.regs.expect_slot(reg);
        let found = actual.state.get(&slot).cloned().unwrap_or(Value::Initial(reg));
        assert_eq!(expected, found, "final value of {} in {}", reg, slot);
    }
}
