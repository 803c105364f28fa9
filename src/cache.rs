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

// Per-block register cache: promotes virtual CPU registers from
// memory-resident cells to SSA values, load-once and store-before-leaving.

use std::collections::HashMap;

use crate::ast::Register;
use crate::ir::FunctionWriter;

enum Entry {
    /// Not yet loaded this block; reading emits a load from the cell.
    NotLoaded,
    /// Holds the current SSA name for this register, not yet necessarily
    /// stored back to its cell.
    Ssa(String),
}

pub struct RegisterCache {
    entries: HashMap<Register, Entry>,
}

impl RegisterCache {
    pub fn new() -> Self {
        RegisterCache {
            entries: HashMap::new(),
        }
    }

    /// Emits a load on first access within the block; returns the SSA name
    /// holding the register's current value either way.
    pub fn read(&mut self, register: Register, out: &mut FunctionWriter) -> String {
        if let Some(Entry::Ssa(name)) = self.entries.get(&register) {
            return name.clone();
        }
        let tmp = out.fresh_temp();
        out.write_line(&format!(
            "{tmp} = load i16, i16* %{}",
            register.name()
        ));
        self.entries.insert(register, Entry::Ssa(tmp.clone()));
        tmp
    }

    /// Records a new value for `register` without emitting a store; the
    /// store is deferred to the next `flush`.
    pub fn write(&mut self, register: Register, value: String) {
        self.entries.insert(register, Entry::Ssa(value));
    }

    /// Stores every cached register back to its cell. `PC` is skipped
    /// unless `include_pc` is set — only `DBG` needs the precise
    /// architectural PC, since every instruction already stamps its own PC
    /// watermark directly.
    pub fn flush(&mut self, include_pc: bool, out: &mut FunctionWriter) {
        let mut registers: Vec<Register> = self.entries.keys().copied().collect();
        registers.sort_by_key(|r| r.offset());
        for register in registers {
            if register == Register::Pc && !include_pc {
                continue;
            }
            if let Some(Entry::Ssa(name)) = self.entries.get(&register) {
                out.write_line(&format!(
                    "store i16 {name}, i16* %{}",
                    register.name()
                ));
            }
        }
    }

    /// Forgets all cached values. Used at block entry and after a `JSR`,
    /// since a callee may have mutated any register.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

impl Default for RegisterCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ProgramWriter;

    #[test]
    fn repeated_reads_load_once() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let first = cache.read(Register::A, &mut func);
        let second = cache.read(Register::A, &mut func);
        assert_eq!(first, second);
        func.finish();
        let ir = program.into_ir();
        assert_eq!(ir.matches("load i16, i16* %A").count(), 1);
    }

    #[test]
    fn write_then_read_skips_reload() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        cache.write(Register::B, "%tmp7".to_string());
        let value = cache.read(Register::B, &mut func);
        assert_eq!(value, "%tmp7");
        func.finish();
        let ir = program.into_ir();
        assert!(!ir.contains("load i16, i16* %B"));
    }

    #[test]
    fn flush_excludes_pc_by_default() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        cache.write(Register::A, "%tmp0".to_string());
        cache.write(Register::Pc, "%tmp1".to_string());
        cache.flush(false, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("store i16 %tmp0, i16* %A"));
        assert!(!ir.contains("store i16 %tmp1, i16* %PC"));
    }

    #[test]
    fn dbg_flush_includes_pc() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        cache.write(Register::Pc, "%tmp2".to_string());
        cache.flush(true, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("store i16 %tmp2, i16* %PC"));
    }

    #[test]
    fn reset_forces_reload_after_jsr() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        cache.read(Register::A, &mut func);
        cache.reset();
        cache.read(Register::A, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert_eq!(ir.matches("load i16, i16* %A").count(), 2);
    }
}
