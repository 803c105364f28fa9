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

// DIV, MOD: the one pair of opcodes that branches inline rather than
// computing straight-line, since division by zero must yield dest = O = 0
// without the VM ever trapping.

use crate::ast::{Instruction, Opcode, Register};
use crate::cache::RegisterCache;
use crate::ir::FunctionWriter;
use crate::operand::{to_lvalue_store, to_rvalue};

use super::LowerResult;

pub fn lower(instr: &Instruction, cache: &mut RegisterCache, out: &mut FunctionWriter) -> LowerResult {
    let a = to_rvalue(&instr.operands[0], cache, out);
    let b = to_rvalue(&instr.operands[1], cache, out);

    let zero_label = out.fresh_label();
    let nonzero_label = out.fresh_label();
    let end_label = out.fresh_label();

    let is_zero = out.fresh_temp();
    out.write_line(&format!("{is_zero} = icmp eq i16 {b}, 0"));
    out.write_line(&format!(
        "br i1 {is_zero}, label %{zero_label}, label %{nonzero_label}"
    ));

    out.write_label(&zero_label);
    out.write_line(&format!("br label %{end_label}"));

    out.write_label(&nonzero_label);
    let (dest_nonzero, o_nonzero) = match instr.opcode {
        Opcode::Div => lower_div_nonzero(&a, &b, out),
        Opcode::Mod => lower_mod_nonzero(&a, &b, out),
        _ => unreachable!("divmod::lower only handles DIV/MOD"),
    };
    out.write_line(&format!("br label %{end_label}"));

    out.write_label(&end_label);
    let dest = out.fresh_temp();
    out.write_line(&format!(
        "{dest} = phi i16 [ 0, %{zero_label} ], [ {dest_nonzero}, %{nonzero_label} ]"
    ));
    let o = out.fresh_temp();
    out.write_line(&format!(
        "{o} = phi i16 [ 0, %{zero_label} ], [ {o_nonzero}, %{nonzero_label} ]"
    ));

    to_lvalue_store(&instr.operands[0], dest, cache, out);
    cache.write(Register::O, o);
    LowerResult::straight()
}

/// Widen, shift the dividend left by 16, unsigned-divide by the widened
/// divisor: the high 16 bits are the quotient, the low 16 bits are the
/// fractional remainder that lands in `O`.
fn lower_div_nonzero(a: &str, b: &str, out: &mut FunctionWriter) -> (String, String) {
    let a32 = out.fresh_temp();
    out.write_line(&format!("{a32} = zext i16 {a} to i32"));
    let widened = out.fresh_temp();
    out.write_line(&format!("{widened} = shl i32 {a32}, 16"));
    let b32 = out.fresh_temp();
    out.write_line(&format!("{b32} = zext i16 {b} to i32"));
    let quotient32 = out.fresh_temp();
    out.write_line(&format!("{quotient32} = udiv i32 {widened}, {b32}"));
    let hi32 = out.fresh_temp();
    out.write_line(&format!("{hi32} = lshr i32 {quotient32}, 16"));
    let quotient = out.fresh_temp();
    out.write_line(&format!("{quotient} = trunc i32 {hi32} to i16"));
    let fractional = out.fresh_temp();
    out.write_line(&format!("{fractional} = trunc i32 {quotient32} to i16"));
    (quotient, fractional)
}

fn lower_mod_nonzero(a: &str, b: &str, out: &mut FunctionWriter) -> (String, String) {
    let remainder = out.fresh_temp();
    out.write_line(&format!("{remainder} = urem i16 {a}, {b}"));
    (remainder, "0".to_string())
}
