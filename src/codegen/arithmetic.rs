/*
Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

// ADD, SUB, MUL, SHL, SHR: the widening-overflow family.
// ADD/SUB/MUL/SHL share one 32-bit-widen-then-split shape; SHR widens the
// dividend before shifting instead, so it gets its own lowering.

use crate::ast::{Instruction, Opcode, Register};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::{to_lvalue_store, to_rvalue};

use super::LowerResult;

pub fn lower(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    match instr.opcode {
        Opcode::Shr => lower_shr(instr, cache, out),
        _ => lower_widening(instr, cache, out),
    }
}

/// `ADD`/`SUB`/`MUL`/`SHL`: widen both operands to 32 bits, perform the op,
/// truncate the low 16 bits into the destination, and take bits `[31:16]`
/// as the new value of `O`.
fn lower_widening(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let mnemonic = match instr.opcode {
        Opcode::Add => "add",
        Opcode::Sub => "sub",
        Opcode::Mul => "mul",
        Opcode::Shl => "shl",
        _ => unreachable!("lower_widening only handles ADD/SUB/MUL/SHL"),
    };

    let a = to_rvalue(&instr.operands[0], cache, out);
    let b = to_rvalue(&instr.operands[1], cache, out);

    let a32 = out.fresh_temp();
    out.write_line(&format!("{a32} = zext i16 {a} to i32"));
    let b32 = out.fresh_temp();
    out.write_line(&format!("{b32} = zext i16 {b} to i32"));
    let wide = out.fresh_temp();
    out.write_line(&format!("{wide} = {mnemonic} i32 {a32}, {b32}"));
    let lo = out.fresh_temp();
    out.write_line(&format!("{lo} = trunc i32 {wide} to i16"));
    let hi32 = out.fresh_temp();
    out.write_line(&format!("{hi32} = lshr i32 {wide}, 16"));
    let hi = out.fresh_temp();
    out.write_line(&format!("{hi} = trunc i32 {hi32} to i16"));

    to_lvalue_store(&instr.operands[0], lo, cache, out);
    cache.write(Register::O, hi);
    LowerResult::straight()
}

/// `SHR`: left-shift the dividend by 16 first, then right-shift the 32-bit
/// value by `b`; the high half of that result is the destination, the low
/// half (the bits shifted out) becomes `O`.
fn lower_shr(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let a = to_rvalue(&instr.operands[0], cache, out);
    let b = to_rvalue(&instr.operands[1], cache, out);

    let a32 = out.fresh_temp();
    out.write_line(&format!("{a32} = zext i16 {a} to i32"));
    let widened = out.fresh_temp();
    out.write_line(&format!("{widened} = shl i32 {a32}, 16"));
    let b32 = out.fresh_temp();
    out.write_line(&format!("{b32} = zext i16 {b} to i32"));
    let shifted = out.fresh_temp();
    out.write_line(&format!("{shifted} = lshr i32 {widened}, {b32}"));
    let hi32 = out.fresh_temp();
    out.write_line(&format!("{hi32} = lshr i32 {shifted}, 16"));
    let hi = out.fresh_temp();
    out.write_line(&format!("{hi} = trunc i32 {hi32} to i16"));
    let lo = out.fresh_temp();
    out.write_line(&format!("{lo} = trunc i32 {shifted} to i16"));

    to_lvalue_store(&instr.operands[0], hi, cache, out);
    cache.write(Register::O, lo);
    LowerResult::straight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Operand;
    use crate::ir::ProgramWriter;

    #[test]
    fn add_widens_and_splits_overflow_into_o() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Add,
            vec![Operand::Register(Register::A), Operand::Number(2)],
        );
        lower(&instr, &mut cache, &mut func);
        cache.flush(false, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("zext i16"));
        assert!(ir.contains("add i32"));
        assert!(ir.contains("store i16"));
        assert!(ir.contains(", i16* %O"));
    }

    #[test]
    fn sub_uses_sub_i32_for_borrow_capture() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Sub,
            vec![Operand::Register(Register::A), Operand::Number(1)],
        );
        lower(&instr, &mut cache, &mut func);
        func.finish();
        assert!(program.into_ir().contains("sub i32"));
    }

    #[test]
    fn shr_shifts_dividend_left_before_splitting() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Shr,
            vec![Operand::Register(Register::A), Operand::Number(1)],
        );
        lower(&instr, &mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("shl i32"));
        assert_eq!(ir.matches("lshr i32").count(), 2);
    }
}
