use serde::{Deserialize, Serialize};

use crate::cache::{CacheKind, VRegCache};
use crate::inst::Inst;
use crate::vreg::{RegisterFile, VReg};

/// One compiled function as handed from the code generator to register
/// legalization and from there to the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub insts: Vec<Inst>,
    pub regs: RegisterFile,
    /// Declaration order. The first `params` locals receive the incoming
    /// arguments.
    pub locals: Vec<VReg>,
    pub temps: Vec<VReg>,
    pub params: u32,
    #[serde(default)]
    pub cache: VRegCache,
    /// Frame size written into the function header, set by legalization.
    #[serde(default)]
    pub total_registers: Option<u32>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insts: Vec::new(),
            regs: RegisterFile::new(),
            locals: Vec::new(),
            temps: Vec::new(),
            params: 0,
            cache: VRegCache::new(),
            total_registers: None,
        }
    }

    /// Declares a parameter local. Parameters must be declared before any
    /// other local.
    pub fn new_param(&mut self) -> VReg {
        debug_assert_eq!(
            self.locals.len(),
            self.params as usize,
            "parameters must be declared before other locals"
        );
        self.params += 1;
        self.new_local()
    }

    pub fn new_local(&mut self) -> VReg {
        let reg = self.regs.create();
        self.locals.push(reg);
        reg
    }

    pub fn new_temp(&mut self) -> VReg {
        let reg = self.regs.create();
        self.temps.push(reg);
        reg
    }

    pub fn cache_register(&mut self, kind: CacheKind) -> VReg {
        self.cache.get_or_create(kind, &mut self.regs)
    }

    pub fn push(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    pub fn parameter_locals(&self) -> &[VReg] {
        let count = (self.params as usize).min(self.locals.len());
        &self.locals[..count]
    }

    pub fn from_json(text: &str) -> sw_core::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> sw_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// All functions of one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }
}
