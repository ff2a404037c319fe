use sw_bytecode::{validate_function, BytecodeError, Function, Inst, Program, RegisterFile, VReg};

use crate::assign::Allocator;
use crate::error::RegAllocError;
use crate::format::select_format;
use crate::legalize::{legalize_operands, Legalized};
use crate::options::RegAllocOptions;
use crate::prologue::parameter_moves;
use crate::range::{adjust, check_contiguous, RunPlacement};
use crate::verify::verify_function;

/// A transformation applied to one function at a time.
pub trait FunctionPass {
    type Report;
    type Error: std::error::Error + Send + Sync + 'static;

    fn name(&self) -> &'static str;
    fn run(&self, function: &mut Function) -> Result<Self::Report, Self::Error>;
}

/// Final frame of a legalized function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Slots `0..total_registers`, including the parameter entry slots.
    pub total_registers: u32,
    pub params: u32,
}

impl FrameLayout {
    /// Slots used by the body: locals, temporaries, cache and spill
    /// registers.
    pub fn body_slots(&self) -> u32 {
        self.total_registers - self.params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegAllocReport {
    pub function: String,
    pub frame: FrameLayout,
    pub moves_inserted: usize,
    pub instructions_adjusted: usize,
    pub spill_slots: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub moves_inserted: usize,
    pub instructions_adjusted: usize,
}

/// Legalizes one instruction stream against slots already held by
/// `allocator`. Every output instruction carries its selected format.
pub fn legalize_stream(
    allocator: &mut Allocator,
    regs: &mut RegisterFile,
    function_name: &str,
    insts: Vec<Inst>,
) -> Result<(Vec<Inst>, StreamStats), RegAllocError> {
    let mut output = Vec::with_capacity(insts.len());
    let mut stats = StreamStats::default();

    for (index, mut inst) in insts.into_iter().enumerate() {
        let legalized = if inst.is_range() {
            match check_contiguous(&inst, regs)? {
                RunPlacement::Legal => {
                    inst.format = Some(0);
                    Legalized::unchanged(inst)
                }
                RunPlacement::NeedsAdjust { start, limit } => {
                    sw_core::trace!("{}: run at {} is above {}", inst.opcode, start, limit);
                    adjust(allocator, regs, inst, limit)?
                }
            }
        } else {
            let (format, score) =
                select_format(&inst, regs).ok_or_else(|| BytecodeError::Instruction {
                    function: function_name.to_string(),
                    index,
                    opcode: inst.opcode,
                    message: "no candidate formats".to_string(),
                })?;
            if score == 0 {
                inst.format = Some(format);
                Legalized::unchanged(inst)
            } else {
                legalize_operands(allocator, regs, inst, format)?
            }
        };

        if legalized.moves() > 0 {
            stats.instructions_adjusted += 1;
            stats.moves_inserted += legalized.moves();
        }
        output.extend(legalized.into_insts());
        debug_assert!(
            !allocator.has_busy(),
            "busy flags left set after instruction {}",
            index
        );
    }
    Ok((output, stats))
}

/// Assigns frame slots to every register of a function and rewrites its
/// instructions so each one is encodable.
#[derive(Debug, Clone, Default)]
pub struct RegAllocPass {
    options: RegAllocOptions,
}

impl RegAllocPass {
    pub fn new(options: RegAllocOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RegAllocOptions {
        &self.options
    }

    fn assign_declared(
        allocator: &mut Allocator,
        function: &mut Function,
    ) -> Result<(), RegAllocError> {
        let order: Vec<VReg> = function
            .locals
            .iter()
            .chain(&function.temps)
            .copied()
            .chain(function.cache.materialized().map(|(_, reg)| reg))
            .collect();
        for reg in order {
            allocator.assign(&mut function.regs, reg)?;
        }
        Ok(())
    }
}

impl FunctionPass for RegAllocPass {
    type Report = RegAllocReport;
    type Error = RegAllocError;

    fn name(&self) -> &'static str {
        "regalloc"
    }

    fn run(&self, function: &mut Function) -> Result<RegAllocReport, RegAllocError> {
        validate_function(function)?;

        let limit = self.options.limit();
        let mut allocator = Allocator::new(limit);
        Self::assign_declared(&mut allocator, function)?;

        let insts = std::mem::take(&mut function.insts);
        let (body, stats) =
            match legalize_stream(&mut allocator, &mut function.regs, &function.name, insts.clone())
            {
                Ok(result) => result,
                Err(err) => {
                    function.insts = insts;
                    return Err(err);
                }
            };

        let prologue = match parameter_moves(&mut allocator, function) {
            Ok(moves) => moves,
            Err(err) => {
                function.insts = insts;
                return Err(err);
            }
        };
        function.insts = prologue.into_iter().chain(body).collect();
        function.total_registers = Some(allocator.total());

        if self.options.verify {
            if let Err(err) = verify_function(function, limit) {
                function.insts = insts;
                function.total_registers = None;
                return Err(err);
            }
        }

        let report = RegAllocReport {
            function: function.name.clone(),
            frame: FrameLayout {
                total_registers: allocator.total(),
                params: function.params,
            },
            moves_inserted: stats.moves_inserted,
            instructions_adjusted: stats.instructions_adjusted,
            spill_slots: allocator.spills_created(),
        };
        sw_core::debug!(
            "regalloc {}: {} slots, {} moves over {} instructions, {} spill slots",
            report.function,
            report.frame.total_registers,
            report.moves_inserted,
            report.instructions_adjusted,
            report.spill_slots
        );
        Ok(report)
    }
}

/// Runs `pass` over every function in order, stopping at the first failure.
pub fn run_program<P: FunctionPass>(
    pass: &P,
    program: &mut Program,
) -> sw_core::Result<Vec<P::Report>> {
    let mut reports = Vec::with_capacity(program.functions.len());
    for function in &mut program.functions {
        match pass.run(function) {
            Ok(report) => reports.push(report),
            Err(err) => {
                sw_core::warn!("{} aborted in `{}`: {}", pass.name(), function.name, err);
                return Err(sw_core::Error::pass(pass.name(), function.name.clone(), err));
            }
        }
    }
    Ok(reports)
}
