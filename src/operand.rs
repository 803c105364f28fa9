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

// Operand lowering: turns each operand variant into the IR that
// materializes its rvalue, or commits a value to its lvalue.

use crate::ast::{Operand, Register};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;

/// Emits IR to materialize `operand`'s current 16-bit value and returns the
/// SSA name holding it.
pub fn to_rvalue(operand: &Operand, cache: &mut RegisterCache, out: &mut FunctionWriter) -> String {
    match operand {
        Operand::Register(register) => cache.read(*register, out),
        Operand::Number(n) => n.to_string(),
        Operand::Label(name) => name.clone(),
        Operand::Addition(number, register) => {
            let reg_value = cache.read(*register, out);
            let tmp = out.fresh_temp();
            out.write_line(&format!("{tmp} = add i16 {number}, {reg_value}"));
            tmp
        }
        Operand::Dereference(inner) => {
            let addr = to_rvalue(inner, cache, out);
            let ptr = gep_memory(&addr, out);
            let value = out.fresh_temp();
            out.write_line(&format!("{value} = load i16, i16* {ptr}"));
            call_memory_referenced(&addr, out);
            value
        }
        Operand::Pop => stack_pop_rvalue(cache, out),
        Operand::Peek => stack_peek_rvalue(cache, out),
        Operand::Push => stack_push_rvalue(cache, out),
    }
}

/// Emits IR to commit `value` to the location `operand` represents.
/// Literals and labels have no lvalue form and are never dispatched here by
/// a well-formed catalog entry.
pub fn to_lvalue_store(
    operand: &Operand,
    value: String,
    cache: &mut RegisterCache,
    out: &mut FunctionWriter,
) {
    match operand {
        Operand::Register(register) => cache.write(*register, value),
        Operand::Dereference(inner) => {
            let addr = to_rvalue(inner, cache, out);
            let ptr = gep_memory(&addr, out);
            out.write_line(&format!("store i16 {value}, i16* {ptr}"));
            call_memory_referenced(&addr, out);
        }
        Operand::Pop => stack_pop_lvalue(value, cache, out),
        Operand::Peek => stack_peek_lvalue(value, cache, out),
        Operand::Push => stack_push_lvalue(value, cache, out),
        Operand::Number(_) | Operand::Label(_) | Operand::Addition(_, _) => {
            unreachable!("operand {operand:?} has no lvalue form")
        }
    }
}

fn gep_memory(addr: &str, out: &mut FunctionWriter) -> String {
    let ptr = out.fresh_temp();
    out.write_line(&format!(
        "{ptr} = getelementptr i16, i16* %memory, i16 {addr}"
    ));
    ptr
}

/// Invoked on every `Dereference` read and write, per the mandatory
/// memory-reference contract. Stack pseudo-operands are a distinct operand
/// kind from `Dereference` and deliberately do not trigger this callback.
fn call_memory_referenced(addr: &str, out: &mut FunctionWriter) {
    out.write_line(&format!(
        "call void @memory_referenced(%struct.VMState* %state, i16 {addr})"
    ));
}

// --- Stack pseudo-operands -------------------------------------------------
//
// Rather than only handling POP as the second argument of `SET PC, POP`,
// every stack singleton gets a total, symmetric SP-relative definition:
//   POP  — consume the current top of stack, then advance SP past it.
//   PUSH — reserve a new slot below SP, then use it.
//   PEEK — use the current top of stack without moving SP.
// Each direction (rvalue/lvalue) adjusts SP the same way regardless of
// whether it reads or writes, so `SET PUSH, A` and `SET A, PUSH` move SP
// identically; only the data direction differs.

fn stack_pop_rvalue(cache: &mut RegisterCache, out: &mut FunctionWriter) -> String {
    let sp = cache.read(Register::Sp, out);
    let ptr = gep_memory(&sp, out);
    let value = out.fresh_temp();
    out.write_line(&format!("{value} = load i16, i16* {ptr}"));
    advance_sp(&sp, 1, cache, out);
    value
}

fn stack_pop_lvalue(value: String, cache: &mut RegisterCache, out: &mut FunctionWriter) {
    let sp = cache.read(Register::Sp, out);
    let ptr = gep_memory(&sp, out);
    out.write_line(&format!("store i16 {value}, i16* {ptr}"));
    advance_sp(&sp, 1, cache, out);
}

fn stack_push_rvalue(cache: &mut RegisterCache, out: &mut FunctionWriter) -> String {
    let sp = cache.read(Register::Sp, out);
    let new_sp = advance_sp(&sp, -1, cache, out);
    let ptr = gep_memory(&new_sp, out);
    let value = out.fresh_temp();
    out.write_line(&format!("{value} = load i16, i16* {ptr}"));
    value
}

fn stack_push_lvalue(value: String, cache: &mut RegisterCache, out: &mut FunctionWriter) {
    let sp = cache.read(Register::Sp, out);
    let new_sp = advance_sp(&sp, -1, cache, out);
    let ptr = gep_memory(&new_sp, out);
    out.write_line(&format!("store i16 {value}, i16* {ptr}"));
}

fn stack_peek_rvalue(cache: &mut RegisterCache, out: &mut FunctionWriter) -> String {
    let sp = cache.read(Register::Sp, out);
    let ptr = gep_memory(&sp, out);
    let value = out.fresh_temp();
    out.write_line(&format!("{value} = load i16, i16* {ptr}"));
    value
}

fn stack_peek_lvalue(value: String, cache: &mut RegisterCache, out: &mut FunctionWriter) {
    let sp = cache.read(Register::Sp, out);
    let ptr = gep_memory(&sp, out);
    out.write_line(&format!("store i16 {value}, i16* {ptr}"));
}

/// Adjusts SP by `delta` words (16-bit wraparound, no overflow capture —
/// unlike `ADD`/`SUB`, stack-pointer housekeeping never touches `O`) and
/// writes the new SP back into the cache. Returns the new SP's SSA name.
fn advance_sp(sp: &str, delta: i32, cache: &mut RegisterCache, out: &mut FunctionWriter) -> String {
    let tmp = out.fresh_temp();
    if delta >= 0 {
        out.write_line(&format!("{tmp} = add i16 {sp}, {delta}"));
    } else {
        out.write_line(&format!("{tmp} = sub i16 {sp}, {}", -delta));
    }
    cache.write(Register::Sp, tmp.clone());
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ProgramWriter;

    #[test]
    fn register_rvalue_reads_through_cache() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let value = to_rvalue(&Operand::Register(Register::A), &mut cache, &mut func);
        assert_eq!(value, "%tmp0");
        func.finish();
        assert!(program.into_ir().contains("load i16, i16* %A"));
    }

    #[test]
    fn dereference_read_calls_memory_referenced() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let operand = Operand::Dereference(Box::new(Operand::Number(0x10)));
        to_rvalue(&operand, &mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert_eq!(ir.matches("call void @memory_referenced").count(), 1);
    }

    #[test]
    fn dereference_write_calls_memory_referenced_once() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        let operand = Operand::Dereference(Box::new(Operand::Number(0x10)));
        to_lvalue_store(&operand, "%tmp9".to_string(), &mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert_eq!(ir.matches("call void @memory_referenced").count(), 1);
        assert!(ir.contains("store i16 %tmp9"));
    }

    #[test]
    fn pop_advances_sp_forward() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        stack_pop_rvalue(&mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("add i16"));
        assert!(!ir.contains("call void @memory_referenced"));
    }

    #[test]
    fn push_moves_sp_backward_before_storing() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        stack_push_lvalue("%tmp3".to_string(), &mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(ir.contains("sub i16"));
        assert!(ir.contains("store i16 %tmp3"));
    }

    #[test]
    fn peek_does_not_move_sp() {
        let mut program = ProgramWriter::new();
        let mut func = program.begin_function("f");
        let mut cache = RegisterCache::new();
        stack_peek_rvalue(&mut cache, &mut func);
        func.finish();
        let ir = program.into_ir();
        assert!(!ir.contains("add i16"));
        assert!(!ir.contains("sub i16"));
    }
}
