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

pub mod ast;
pub mod cache;
pub mod cfg;
pub mod codegen;
pub mod errors;
pub mod ir;
pub mod linker;
pub mod operand;
pub mod parser;

extern crate pest;
extern crate pest_derive;

use errors::AssemblyError;
use ir::ProgramWriter;

/// Runs the full pipeline over `source`: parse, link, build each function's
/// CFG and lower it, and return the finished IR text.
pub fn translate(source: &str) -> Result<String, AssemblyError> {
    let instructions = parser::parse_source(source)?;
    log::debug!("parsed {} instruction(s)", instructions.len());

    let program = linker::link(instructions);

    let mut writer = ProgramWriter::new();
    writer.write_header();

    for (name, entry_index) in program.functions() {
        log::debug!("rendering function '{name}'");
        cfg::render_function(&name, entry_index, &program, &mut writer);
    }

    Ok(writer.into_ir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_rejects_malformed_input() {
        assert!(translate("SET A,\n").is_err());
    }

    #[test]
    fn translate_emits_header_and_entry_function() {
        let ir = translate("SET A, 1\nOUT A\n").unwrap();
        assert!(ir.contains("%struct.VMState = type"));
        assert!(ir.contains("define void @runMachine"));
    }
}
