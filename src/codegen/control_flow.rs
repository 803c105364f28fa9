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

// IFE/IFN/IFG/IFB, JSR, and the two indirect-branch forms of SET.

use crate::ast::{Instruction, Opcode};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::to_rvalue;

use super::{LowerResult, PostCondition};

/// Evaluates the predicate, then branches over the *next* instruction: on
/// entry we open the "body" label inline (the guarded instruction renders
/// straight into it) and hand the block emitter a post-condition that closes
/// the skip arm once that instruction has been emitted.
pub fn lower_conditional(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let a = to_rvalue(&instr.operands[0], cache, out);
    let b = to_rvalue(&instr.operands[1], cache, out);

    let cond = match instr.opcode {
        Opcode::Ife => {
            let cond = out.fresh_temp();
            out.write_line(&format!("{cond} = icmp eq i16 {a}, {b}"));
            cond
        }
        Opcode::Ifn => {
            let cond = out.fresh_temp();
            out.write_line(&format!("{cond} = icmp ne i16 {a}, {b}"));
            cond
        }
        Opcode::Ifg => {
            let cond = out.fresh_temp();
            out.write_line(&format!("{cond} = icmp ugt i16 {a}, {b}"));
            cond
        }
        Opcode::Ifb => {
            let masked = out.fresh_temp();
            out.write_line(&format!("{masked} = and i16 {a}, {b}"));
            let cond = out.fresh_temp();
            out.write_line(&format!("{cond} = icmp ne i16 {masked}, 0"));
            cond
        }
        _ => unreachable!("lower_conditional only handles IFE/IFN/IFG/IFB"),
    };

    let body_label = out.fresh_label();
    let continuation_label = out.fresh_label();
    out.write_line(&format!(
        "br i1 {cond}, label %{body_label}, label %{continuation_label}"
    ));
    out.write_label(&body_label);

    LowerResult::conditional(PostCondition { continuation_label })
}

/// `JSR label`: flush so the callee sees committed state, call, then reset
/// since the callee may have mutated any register.
pub fn lower_jsr(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let target = instr
        .operands
        .first()
        .and_then(|op| op.label_name())
        .expect("JSR's only operand is always a label");
    cache.flush(false, out);
    out.write_line(&format!("call void @{target}(%struct.VMState* nocapture %state)"));
    cache.reset();
    LowerResult::straight()
}

/// `SET PC, <label>`: unconditional intra-function branch. Ends the block.
pub fn lower_unconditional_branch(
    label: &str,
    cache: &mut RegisterCache,
    out: &mut FunctionWriter,
) -> LowerResult {
    cache.flush(false, out);
    out.write_line(&format!("br label %{label}"));
    LowerResult::terminating(Some(label.to_string()))
}

/// `SET PC, POP`: function return. Ends the block.
pub fn lower_return(cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    cache.flush(false, out);
    out.write_line("ret void");
    LowerResult::terminating(None)
}
