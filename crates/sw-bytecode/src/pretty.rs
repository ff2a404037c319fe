use itertools::Itertools;

use crate::function::Function;
use crate::inst::Inst;
use crate::operand::Operand;
use crate::vreg::RegisterFile;

/// Renders a function in assembler-like text. Registers print as their slot
/// (`v12`) once assigned and as their virtual id (`%12`) before that.
pub fn format_function(function: &Function) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "fn {}(params: {}, locals: {}, temps: {}",
        function.name,
        function.params,
        function.locals.len(),
        function.temps.len()
    ));
    if let Some(total) = function.total_registers {
        output.push_str(&format!(", regs: {}", total));
    }
    output.push_str(")\n");
    for (kind, reg) in function.cache.materialized() {
        let name: &'static str = kind.into();
        output.push_str(&format!(
            "  .cache {} {}\n",
            name,
            format_operand(&Operand::Reg(reg), &function.regs)
        ));
    }
    for (index, inst) in function.insts.iter().enumerate() {
        output.push_str(&format!("  {:>4}: {}\n", index, format_inst(inst, &function.regs)));
    }
    output
}

pub fn format_inst(inst: &Inst, regs: &RegisterFile) -> String {
    if inst.operands.is_empty() {
        return inst.opcode.to_string();
    }
    format!(
        "{} {}",
        inst.opcode,
        inst.operands
            .iter()
            .map(|operand| format_operand(operand, regs))
            .join(", ")
    )
}

fn format_operand(operand: &Operand, regs: &RegisterFile) -> String {
    match operand {
        Operand::Reg(reg) => match regs.slot(*reg) {
            Some(slot) => slot.to_string(),
            None => reg.to_string(),
        },
        Operand::Imm(value) => value.to_string(),
        Operand::Label(label) => format!("L{}", label),
    }
}
