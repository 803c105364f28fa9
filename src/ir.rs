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

// IR sink: line-oriented emission with indentation and monotonic counters
// for temporaries and internal labels. Owns a `String` buffer rather than
// writing straight to a file handle, since the driver writes its result to
// stdout in one shot.

use std::fmt::Write as _;

use crate::ast::Register;

/// Program-level output: accumulates the header (type + declarations) and
/// each function body in turn.
pub struct ProgramWriter {
    buffer: String,
}

impl ProgramWriter {
    pub fn new() -> Self {
        ProgramWriter {
            buffer: String::new(),
        }
    }

    pub fn write_header(&mut self) {
        self.buffer
            .push_str("%struct.VMState = type { [11 x i16], [65536 x i16] }\n");
        self.buffer.push_str("declare void @output(i16)\n");
        self.buffer
            .push_str("declare void @debug(%struct.VMState* nocapture)\n");
        self.buffer
            .push_str("declare void @memory_referenced(%struct.VMState* nocapture, i16)\n");
    }

    pub fn begin_function(&mut self, name: &str) -> FunctionWriter<'_> {
        writeln!(
            self.buffer,
            "\ndefine void @{name}(%struct.VMState* nocapture %state) nounwind {{"
        )
        .unwrap();
        FunctionWriter {
            program: self,
            indent: 1,
            tmp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn into_ir(self) -> String {
        self.buffer
    }
}

impl Default for ProgramWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-function output: owns the temporary/internal-label counters, both
/// reset at function entry.
pub struct FunctionWriter<'a> {
    program: &'a mut ProgramWriter,
    indent: usize,
    tmp_counter: u32,
    label_counter: u32,
}

impl FunctionWriter<'_> {
    pub fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.program.buffer.push_str("  ");
        }
        self.program.buffer.push_str(line);
        self.program.buffer.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.program.buffer.push('\n');
    }

    /// A disassembly comment line, preceding every emitted instruction.
    pub fn write_comment(&mut self, text: &str) {
        self.write_line(&format!("; {text}"));
    }

    /// A branch-target label, flush against the margin per LLVM-IR convention
    /// (unlike ordinary instructions, which this writer always indents).
    pub fn write_label(&mut self, name: &str) {
        writeln!(self.program.buffer, "{name}:").unwrap();
    }

    /// A fresh SSA temporary name, e.g. `%tmp0`.
    pub fn fresh_temp(&mut self) -> String {
        let name = format!("%tmp{}", self.tmp_counter);
        self.tmp_counter += 1;
        name
    }

    /// A fresh internal branch-target label, e.g. `label0`.
    pub fn fresh_label(&mut self) -> String {
        let name = format!("label{}", self.label_counter);
        self.label_counter += 1;
        name
    }

    pub fn emit_prologue(&mut self) {
        for register in Register::ALL {
            self.write_line(&format!(
                "%{name} = getelementptr %struct.VMState, %struct.VMState* %state, i32 0, i32 0, i32 {offset}",
                name = register.name(),
                offset = register.offset(),
            ));
        }
        self.write_line(
            "%memory = getelementptr %struct.VMState, %struct.VMState* %state, i32 0, i32 1, i32 0",
        );
    }

    pub fn emit_epilogue(&mut self) {
        self.blank_line();
        self.write_line("ret void");
    }

    pub fn finish(self) {
        self.program.buffer.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_and_label_counters_reset_per_function() {
        let mut program = ProgramWriter::new();
        {
            let mut func = program.begin_function("a");
            assert_eq!(func.fresh_temp(), "%tmp0");
            assert_eq!(func.fresh_temp(), "%tmp1");
            assert_eq!(func.fresh_label(), "label0");
            func.finish();
        }
        let mut func = program.begin_function("b");
        assert_eq!(func.fresh_temp(), "%tmp0");
        assert_eq!(func.fresh_label(), "label0");
    }

    #[test]
    fn labels_are_not_indented() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        func.write_label("label0");
        func.finish();
        assert!(program.into_ir().contains("\nlabel0:\n"));
    }

    #[test]
    fn header_declares_all_three_runtime_functions() {
        let mut program = ProgramWriter::new();
        program.write_header();
        let ir = program.into_ir();
        assert!(ir.contains("declare void @output(i16)"));
        assert!(ir.contains("declare void @debug"));
        assert!(ir.contains("declare void @memory_referenced"));
    }
}
