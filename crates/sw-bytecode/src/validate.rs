use std::collections::HashSet;

use thiserror::Error;

use crate::function::Function;
use crate::inst::Inst;
use crate::isa::Opcode;
use crate::vreg::VReg;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    #[error("function {function}: {message}")]
    Function { function: String, message: String },
    #[error("function {function}, instruction {index} ({opcode}): {message}")]
    Instruction {
        function: String,
        index: usize,
        opcode: Opcode,
        message: String,
    },
}

/// Structural checks on a generated function before register legalization:
/// declarations, operand/format arity and range markers.
pub fn validate_function(function: &Function) -> Result<(), BytecodeError> {
    let fail = |message: String| BytecodeError::Function {
        function: function.name.clone(),
        message,
    };

    if function.params as usize > function.locals.len() {
        return Err(fail(format!(
            "{} params but only {} locals",
            function.params,
            function.locals.len()
        )));
    }

    let mut declared = HashSet::new();
    let cache_regs = function.cache.materialized().map(|(_, reg)| reg);
    for reg in function
        .locals
        .iter()
        .chain(&function.temps)
        .copied()
        .chain(cache_regs)
    {
        if !function.regs.contains(reg) {
            return Err(fail(format!("register {} is not in the register file", reg)));
        }
        if let Some(slot) = function.regs.slot(reg) {
            return Err(fail(format!("register {} already has slot {}", reg, slot)));
        }
        if !declared.insert(reg) {
            return Err(fail(format!("register {} declared twice", reg)));
        }
    }

    for (index, inst) in function.insts.iter().enumerate() {
        validate_inst(inst, &declared).map_err(|message| BytecodeError::Instruction {
            function: function.name.clone(),
            index,
            opcode: inst.opcode,
            message,
        })?;
    }
    Ok(())
}

fn validate_inst(inst: &Inst, declared: &HashSet<VReg>) -> Result<(), String> {
    if inst.formats.is_empty() {
        return Err("no candidate formats".to_string());
    }
    for reg in inst.registers() {
        if !declared.contains(&reg) {
            return Err(format!("register {} is used but never declared", reg));
        }
    }

    match inst.range {
        Some(range) => {
            if range.first >= inst.operands.len() {
                return Err(format!(
                    "range run starts at operand {} but there are {} operands",
                    range.first,
                    inst.operands.len()
                ));
            }
            if inst.formats[0].slot(range.first).is_none() {
                return Err(format!(
                    "first format declares no width for range operand {}",
                    range.first
                ));
            }
            if let Some(position) = inst.operands[..range.first]
                .iter()
                .position(|op| op.as_reg().is_some())
            {
                return Err(format!(
                    "register operand {} lies outside the range run",
                    position
                ));
            }
            if let Some(position) = inst.run().iter().position(|op| op.as_reg().is_none()) {
                return Err(format!(
                    "range operand {} is not a register",
                    range.first + position
                ));
            }
        }
        None => {
            for (index, format) in inst.formats.iter().enumerate() {
                if format.arity() != inst.operands.len() {
                    return Err(format!(
                        "format {} has {} positions for {} operands",
                        index,
                        format.arity(),
                        inst.operands.len()
                    ));
                }
            }
        }
    }

    if let Some(index) = inst.format {
        if index >= inst.formats.len() {
            return Err(format!("selected format {} does not exist", index));
        }
    }
    Ok(())
}
