//! Deterministic generator of well-formed functions.

use sw_bytecode::{CacheKind, Function, Inst, Opcode, Operand, VReg};

#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub params: usize,
    pub locals: usize,
    pub temps: usize,
    pub insts: usize,
    pub seed: u64,
}

struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

/// Builds a function of the given shape. Range runs are always drawn from
/// consecutive locals, so they are contiguous once assigned.
pub fn generate(shape: Shape) -> Function {
    assert!(shape.locals >= shape.params && shape.locals >= 4);
    let mut rng = XorShift(shape.seed.max(1));
    let mut func = Function::new(format!("generated_{}", shape.seed));
    let mut pool = Vec::new();
    let mut locals = Vec::new();
    for index in 0..shape.locals {
        let reg = if index < shape.params {
            func.new_param()
        } else {
            func.new_local()
        };
        locals.push(reg);
        pool.push(reg);
    }
    for _ in 0..shape.temps {
        pool.push(func.new_temp());
    }
    pool.push(func.cache_register(CacheKind::Undefined));
    pool.push(func.cache_register(CacheKind::Global));

    let pick = |rng: &mut XorShift| -> VReg { pool[rng.below(pool.len())] };
    let mut insts = Vec::with_capacity(shape.insts);
    for _ in 0..shape.insts {
        let inst = match rng.below(12) {
            0 => Inst::new(Opcode::Lda, vec![pick(&mut rng).into()]),
            1 => Inst::new(Opcode::Sta, vec![pick(&mut rng).into()]),
            2 => Inst::new(Opcode::ToNumeric, vec![pick(&mut rng).into()]),
            3 => Inst::new(Opcode::Add2, vec![pick(&mut rng).into()]),
            4 => Inst::new(
                Opcode::CallArg1,
                vec![pick(&mut rng).into(), pick(&mut rng).into()],
            ),
            5 => Inst::new(
                Opcode::CallArgs3,
                (0..4).map(|_| Operand::Reg(pick(&mut rng))).collect(),
            ),
            6 => Inst::new(
                Opcode::StLexVar,
                vec![Operand::Imm(0), Operand::Imm(1), pick(&mut rng).into()],
            ),
            7 | 8 => {
                let len = 1 + rng.below(4);
                let start = rng.below(locals.len() - len + 1);
                let opcode = if rng.below(2) == 0 {
                    Opcode::CalliRange
                } else {
                    Opcode::NewObjRange
                };
                Inst::range_call(opcode, &locals[start..start + len])
            }
            9 => Inst::new(Opcode::Ldai, vec![Operand::Imm(rng.below(1000) as i64)]),
            10 => Inst::new(Opcode::Jmp, vec![Operand::Label(rng.below(8) as u32)]),
            _ => Inst::mov(pick(&mut rng), pick(&mut rng)),
        };
        insts.push(inst);
    }
    insts.push(Inst::new(Opcode::ReturnUndefined, Vec::new()));
    func.insts = insts;
    func
}

pub fn shapes() -> Vec<Shape> {
    vec![
        Shape {
            params: 2,
            locals: 10,
            temps: 3,
            insts: 60,
            seed: 7,
        },
        Shape {
            params: 3,
            locals: 300,
            temps: 20,
            insts: 200,
            seed: 11,
        },
        Shape {
            params: 0,
            locals: 280,
            temps: 0,
            insts: 300,
            seed: 0x5eed,
        },
        Shape {
            params: 5,
            locals: 600,
            temps: 40,
            insts: 400,
            seed: 42,
        },
    ]
}
