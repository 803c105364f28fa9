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

// CFG builder / block emitter: per function, a worklist of pending block
// entry points rendered smallest-index-first, with a LIFO of
// post-conditions closing conditional skips.

use std::collections::BTreeSet;

use crate::ast::Register;
use crate::cache::RegisterCache;
use crate::codegen;
use crate::ir::ProgramWriter;
use crate::linker::Program;

/// Renders one function: prologue, the full block worklist, epilogue.
pub fn render_function(name: &str, entry_index: usize, program: &Program, prog_writer: &mut ProgramWriter) {
    let mut func = prog_writer.begin_function(name);
    func.emit_prologue();

    let mut pending: BTreeSet<usize> = BTreeSet::new();
    pending.insert(entry_index);
    let mut rendered: BTreeSet<usize> = BTreeSet::new();

    while let Some(&start) = pending.iter().next() {
        pending.remove(&start);
        if rendered.contains(&start) {
            continue;
        }
        rendered.insert(start);
        log::trace!("rendering block '{name}' @ instruction {start}");
        let mut cache = RegisterCache::new();
        render_block(start, program, &mut cache, &mut func, &mut pending, &rendered);
    }

    func.emit_epilogue();
    func.finish();
}

/// Walks instructions from `start`, emitting each until a label boundary (a
/// new successor) or a terminator with no pending post-conditions is hit.
fn render_block(
    start: usize,
    program: &Program,
    cache: &mut RegisterCache,
    out: &mut crate::ir::FunctionWriter,
    pending: &mut BTreeSet<usize>,
    rendered: &BTreeSet<usize>,
) {
    // Every block reached via a branch target or a fallthrough boundary is
    // keyed by a label; open it here so earlier blocks' `br label %<this>`
    // resolves, even when this block also happens to be the function's
    // first block (a label can double as a back-edge target, e.g. `:loop`
    // at instruction 0 with a trailing `SET PC, loop`).
    if let Some(label) = &program.instructions[start].label {
        out.write_label(label);
    }

    let mut index = start;
    let mut post_conditions = Vec::new();

    while index < program.instructions.len() {
        let instr = &program.instructions[index];

        if index != start && instr.label.is_some() {
            while let Some(post_condition) = post_conditions.pop() {
                out.write_line(&format!("br label %{}", post_condition.continuation_label));
                out.write_label(&post_condition.continuation_label);
            }
            let label = instr.label.as_ref().expect("checked by instr.label.is_some() above");
            out.write_line(&format!("br label %{label}"));
            enqueue(index, pending, rendered);
            break;
        }

        cache.write(Register::Pc, instr.pc.to_string());
        let result = codegen::lower(instr, cache, out);

        if let Some(post_condition) = result.post_condition {
            post_conditions.push(post_condition);
        } else {
            while let Some(post_condition) = post_conditions.pop() {
                out.write_line(&format!("br label %{}", post_condition.continuation_label));
                out.write_label(&post_condition.continuation_label);
            }
        }

        if let Some(target) = &result.branch_target {
            if let Some(&target_index) = program.label_map.get(target) {
                enqueue(target_index, pending, rendered);
            }
        }

        let done = result.terminates_block && post_conditions.is_empty();
        index += 1;
        if done {
            break;
        }
    }
}

fn enqueue(index: usize, pending: &mut BTreeSet<usize>, rendered: &BTreeSet<usize>) {
    if !rendered.contains(&index) {
        pending.insert(index);
    }
}
