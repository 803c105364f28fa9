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

// OUT, DBG: the two VM-only debugging hooks.

use crate::ast::{Instruction, Opcode};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::to_rvalue;

use super::LowerResult;

pub fn lower(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    match instr.opcode {
        Opcode::Out => {
            let value = to_rvalue(&instr.operands[0], cache, out);
            out.write_line(&format!("call void @output(i16 {value})"));
        }
        Opcode::Dbg => {
            // Flush including PC so the debugger sees the precise
            // architectural state, not just the registers a block happened
            // to touch.
            cache.flush(true, out);
            out.write_line("call void @debug(%struct.VMState* nocapture %state)");
        }
        _ => unreachable!("debug::lower only handles OUT/DBG"),
    }
    LowerResult::straight()
}
