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

// Program linker: assigns each instruction a PC value, builds the
// label→index map, and discovers callable function entries by scanning
// call sites.

use std::collections::HashMap;

use crate::ast::Instruction;

pub const ENTRY_FUNCTION: &str = "runMachine";

/// The result of linking: the instruction list with PCs filled in, a
/// label→index map, and the ordered set of function entry labels (in first-
/// JSR-site order, after the implicit `runMachine` entry at instruction 0).
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub label_map: HashMap<String, usize>,
    pub function_starts: Vec<String>,
}

/// Links a freshly parsed instruction list. This does not verify that every
/// referenced label actually exists in the label map — a dangling branch
/// target produces IR referencing an undefined label, which is left for the
/// downstream assembler to reject.
pub fn link(mut instructions: Vec<Instruction>) -> Program {
    let mut pc: u32 = 0;
    for instr in &mut instructions {
        instr.pc = pc as u16;
        pc += instr.length();
    }

    let mut label_map = HashMap::new();
    for (index, instr) in instructions.iter().enumerate() {
        if let Some(label) = &instr.label {
            label_map.insert(label.clone(), index);
        }
    }

    let mut function_starts = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for instr in &instructions {
        if instr.opcode == crate::ast::Opcode::Jsr {
            if let Some(target) = instr.operands[0].label_name() {
                if seen.insert(target.to_string()) {
                    function_starts.push(target.to_string());
                }
            }
        }
    }

    log::debug!(
        "linked {} instructions, {} labels, {} function(s) discovered",
        instructions.len(),
        label_map.len(),
        function_starts.len()
    );

    Program {
        instructions,
        label_map,
        function_starts,
    }
}

impl Program {
    /// The full, ordered list of function entries this program defines:
    /// `runMachine` at instruction 0, then each JSR-targeted label in
    /// first-occurrence order.
    pub fn functions(&self) -> Vec<(String, usize)> {
        let mut entries = vec![(ENTRY_FUNCTION.to_string(), 0)];
        for label in &self.function_starts {
            if let Some(&index) = self.label_map.get(label) {
                entries.push((label.clone(), index));
            }
        }
        entries
    }
}
