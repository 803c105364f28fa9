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

// AND, OR, XOR: plain 16-bit bitwise ops, no overflow.

use crate::ast::{Instruction, Opcode};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::{to_lvalue_store, to_rvalue};

use super::LowerResult;

pub fn lower(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let mnemonic = match instr.opcode {
        Opcode::And => "and",
        Opcode::Or => "or",
        Opcode::Xor => "xor",
        _ => unreachable!("bitwise::lower only handles AND/OR/XOR"),
    };

    let a = to_rvalue(&instr.operands[0], cache, out);
    let b = to_rvalue(&instr.operands[1], cache, out);
    let tmp = out.fresh_temp();
    out.write_line(&format!("{tmp} = {mnemonic} i16 {a}, {b}"));
    to_lvalue_store(&instr.operands[0], tmp, cache, out);
    LowerResult::straight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Operand, Register};
    use crate::ir::ProgramWriter;

    #[test]
    fn xor_emits_xor_and_stores_result() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Xor,
            vec![Operand::Register(Register::A), Operand::Register(Register::B)],
        );
        lower(&instr, &mut cache, &mut func);
        cache.flush(false, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("xor i16"));
        assert!(ir.contains("store i16 %tmp2, i16* %A"));
    }
}
