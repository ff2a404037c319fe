use serde::Deserialize;
use sw_bytecode::MAX_REGISTERS;
use sw_core::config::{u32_from_env, verify_mode};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegAllocOptions {
    /// Re-check the legalized output of every function.
    pub verify: bool,
    /// Slot cap per function. Values above the VM limit are clamped to it.
    pub max_registers: u32,
}

impl Default for RegAllocOptions {
    fn default() -> Self {
        Self {
            verify: false,
            max_registers: MAX_REGISTERS,
        }
    }
}

impl RegAllocOptions {
    /// Reads `SLOTWISE_VERIFY` and `SLOTWISE_MAX_REGISTERS`.
    pub fn from_env() -> sw_core::Result<Self> {
        let mut options = Self::default();
        options.verify = verify_mode();
        if let Some(max) = u32_from_env("SLOTWISE_MAX_REGISTERS")? {
            options.max_registers = max;
        }
        Ok(options.clamped())
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_max_registers(mut self, max_registers: u32) -> Self {
        self.max_registers = max_registers;
        self.clamped()
    }

    pub fn limit(&self) -> u32 {
        self.max_registers.min(MAX_REGISTERS)
    }

    fn clamped(mut self) -> Self {
        self.max_registers = self.limit();
        self
    }
}
