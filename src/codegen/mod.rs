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

// Opcode catalog: one lowering rule per opcode, split by instruction family.

pub mod arithmetic;
pub mod bitwise;
pub mod control_flow;
pub mod data_movement;
pub mod debug;
pub mod divmod;

use crate::ast::{Instruction, Opcode};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;

/// A deferred "close the skip arm" action pushed by a conditional. Carries
/// only the label that must be opened once the guarded instruction has
/// been emitted — no closures needed.
pub struct PostCondition {
    pub continuation_label: String,
}

/// The three signals a lowering emits back to the block renderer.
pub struct LowerResult {
    pub terminates_block: bool,
    pub branch_target: Option<String>,
    pub post_condition: Option<PostCondition>,
}

impl LowerResult {
    fn straight() -> Self {
        LowerResult {
            terminates_block: false,
            branch_target: None,
            post_condition: None,
        }
    }

    fn terminating(branch_target: Option<String>) -> Self {
        LowerResult {
            terminates_block: true,
            branch_target,
            post_condition: None,
        }
    }

    fn conditional(post_condition: PostCondition) -> Self {
        LowerResult {
            terminates_block: false,
            branch_target: None,
            post_condition: Some(post_condition),
        }
    }
}

/// Lowers one instruction, dispatching by opcode family. Every instruction is
/// preceded by a comment line carrying its original disassembly.
pub fn lower(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    out.write_comment(&instr.to_disassembly());
    match instr.opcode {
        Opcode::Set => data_movement::lower_set(instr, cache, out),
        Opcode::And | Opcode::Or | Opcode::Xor => bitwise::lower(instr, cache, out),
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Shl | Opcode::Shr => {
            arithmetic::lower(instr, cache, out)
        }
        Opcode::Div | Opcode::Mod => divmod::lower(instr, cache, out),
        Opcode::Ife | Opcode::Ifn | Opcode::Ifg | Opcode::Ifb => {
            control_flow::lower_conditional(instr, cache, out)
        }
        Opcode::Jsr => control_flow::lower_jsr(instr, cache, out),
        Opcode::Out | Opcode::Dbg => debug::lower(instr, cache, out),
    }
}
