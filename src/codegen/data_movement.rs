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

// SET and its two indirect-branch forms.

use crate::ast::Instruction;
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::{to_lvalue_store, to_rvalue};

use super::control_flow;
use super::LowerResult;

pub fn lower_set(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    if let Some(label) = instr.jump_label() {
        return control_flow::lower_unconditional_branch(label, cache, out);
    }
    if instr.is_return() {
        return control_flow::lower_return(cache, out);
    }

    let value = to_rvalue(&instr.operands[1], cache, out);
    to_lvalue_store(&instr.operands[0], value, cache, out);
    LowerResult::straight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Opcode, Operand, Register};
    use crate::ir::ProgramWriter;

    #[test]
    fn plain_set_stores_rvalue_into_lvalue() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Set,
            vec![Operand::Register(Register::A), Operand::Number(0x41)],
        );
        let result = lower_set(&instr, &mut cache, &mut func);
        assert!(!result.terminates_block);
        cache.flush(false, &mut func);
        func.finish();
        assert!(program.into_ir().contains("store i16 65, i16* %A"));
    }

    #[test]
    fn set_pc_label_terminates_and_flushes() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        cache.read(Register::B, &mut func);
        let instr = Instruction::new(
            None,
            Opcode::Set,
            vec![
                Operand::Register(Register::Pc),
                Operand::Label("loop_top".to_string()),
            ],
        );
        let result = lower_set(&instr, &mut cache, &mut func);
        assert!(result.terminates_block);
        assert_eq!(result.branch_target.as_deref(), Some("loop_top"));
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("store i16 %tmp0, i16* %B"));
        assert!(ir.contains("br label %loop_top"));
    }

    #[test]
    fn set_pc_pop_returns() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let instr = Instruction::new(
            None,
            Opcode::Set,
            vec![Operand::Register(Register::Pc), Operand::Pop],
        );
        let result = lower_set(&instr, &mut cache, &mut func);
        assert!(result.terminates_block);
        assert!(result.branch_target.is_none());
        func.finish();
        assert!(program.into_ir().contains("ret void"));
    }
}
