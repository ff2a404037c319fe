//! Opcode table: mnemonics, candidate encodings and range markers.
//!
//! The code generator attaches these formats when it builds an [`Inst`] with
//! [`Inst::new`]; the legalization pass uses the `mov.dyn` row for the moves
//! it inserts. Formats are listed narrowest first.
//!
//! [`Inst`]: crate::Inst
//! [`Inst::new`]: crate::Inst::new

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

use crate::operand::{Format, FormatSlot};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
pub enum Opcode {
    #[strum(serialize = "mov.dyn")]
    Mov,
    #[strum(serialize = "lda.dyn")]
    Lda,
    #[strum(serialize = "sta.dyn")]
    Sta,
    #[strum(serialize = "ldai.dyn")]
    Ldai,
    #[strum(serialize = "add2.dyn")]
    Add2,
    #[strum(serialize = "sub2.dyn")]
    Sub2,
    #[strum(serialize = "mul2.dyn")]
    Mul2,
    #[strum(serialize = "div2.dyn")]
    Div2,
    #[strum(serialize = "strictnoteq.dyn")]
    StrictNotEq,
    #[strum(serialize = "tonumeric.dyn")]
    ToNumeric,
    #[strum(serialize = "ldobjbyname")]
    LdObjByName,
    #[strum(serialize = "stobjbyname")]
    StObjByName,
    #[strum(serialize = "ldlexvar.dyn")]
    LdLexVar,
    #[strum(serialize = "stlexvar.dyn")]
    StLexVar,
    #[strum(serialize = "callarg0.dyn")]
    CallArg0,
    #[strum(serialize = "callarg1.dyn")]
    CallArg1,
    #[strum(serialize = "callargs2.dyn")]
    CallArgs2,
    #[strum(serialize = "callargs3.dyn")]
    CallArgs3,
    #[strum(serialize = "calli.dyn.range")]
    CalliRange,
    #[strum(serialize = "newobjdyn.range")]
    NewObjRange,
    #[strum(serialize = "jmp")]
    Jmp,
    #[strum(serialize = "jeqz")]
    Jeqz,
    #[strum(serialize = "return.dyn")]
    Return,
    #[strum(serialize = "returnundefined")]
    ReturnUndefined,
}

fn by_width(build: impl Fn(u8) -> Vec<FormatSlot>, widths: &[u8]) -> Vec<Format> {
    widths.iter().map(|&width| Format::new(build(width))).collect()
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    pub fn formats(self) -> Vec<Format> {
        use FormatSlot as S;
        match self {
            Opcode::Mov => by_width(|w| vec![S::dst(w), S::src(w)], &[4, 8, 16]),
            Opcode::Lda | Opcode::Add2 | Opcode::Sub2 | Opcode::Mul2 | Opcode::Div2 => {
                by_width(|w| vec![S::src(w)], &[8])
            }
            Opcode::StrictNotEq => by_width(|w| vec![S::src(w)], &[8]),
            Opcode::Sta => by_width(|w| vec![S::dst(w)], &[8]),
            Opcode::ToNumeric => by_width(|w| vec![S::src_dst(w)], &[8]),
            Opcode::Ldai => vec![Format::new(vec![S::imm(32)])],
            Opcode::LdObjByName | Opcode::StObjByName => {
                by_width(|w| vec![S::imm(32), S::src(w)], &[8])
            }
            Opcode::LdLexVar => vec![
                Format::new(vec![S::imm(4), S::imm(4)]),
                Format::new(vec![S::imm(8), S::imm(8)]),
                Format::new(vec![S::imm(16), S::imm(16)]),
            ],
            Opcode::StLexVar => vec![
                Format::new(vec![S::imm(4), S::imm(4), S::src(8)]),
                Format::new(vec![S::imm(8), S::imm(8), S::src(8)]),
                Format::new(vec![S::imm(16), S::imm(16), S::src(8)]),
            ],
            Opcode::CallArg0 => by_width(|w| vec![S::src(w)], &[8]),
            Opcode::CallArg1 => by_width(|w| vec![S::src(w), S::src(w)], &[4, 8]),
            Opcode::CallArgs2 => by_width(|w| vec![S::src(w); 3], &[4, 8]),
            Opcode::CallArgs3 => by_width(|w| vec![S::src(w); 4], &[4, 8]),
            // The register field holds only the first slot of the run.
            Opcode::CalliRange | Opcode::NewObjRange => {
                vec![Format::new(vec![S::imm(16), S::src(8)])]
            }
            Opcode::Jmp | Opcode::Jeqz => vec![
                Format::new(vec![S::imm(8)]),
                Format::new(vec![S::imm(16)]),
                Format::new(vec![S::imm(32)]),
            ],
            Opcode::Return | Opcode::ReturnUndefined => vec![Format::new(Vec::new())],
        }
    }

    /// Operand index where the contiguous register run of a range
    /// instruction begins.
    pub fn range_start(self) -> Option<usize> {
        match self {
            Opcode::CalliRange | Opcode::NewObjRange => Some(1),
            _ => None,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
