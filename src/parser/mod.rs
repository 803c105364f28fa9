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

// Parser for the target ISA assembly: a `pest` grammar file plus a thin
// AST-building pass over the resulting pairs.

use crate::ast::{Instruction, Opcode, Operand, Register};
use crate::errors::AssemblyError;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct AsmParser;

/// Parses a full source file into an ordered instruction list.
///
/// A label on a line with no instruction (e.g. `:sub` on its own line)
/// labels the address of whatever instruction follows it, exactly like a
/// label sharing a line with an instruction. A label with nothing following
/// it by end of file has no instruction to attach to and is dropped — the
/// translator does not verify or report anything beyond syntax.
pub fn parse_source(source: &str) -> Result<Vec<Instruction>, AssemblyError> {
    let pairs = AsmParser::parse(Rule::program, source)?;
    let mut instructions = Vec::new();
    let mut pending_label: Option<String> = None;

    for program_pair in pairs {
        if program_pair.as_rule() != Rule::program {
            continue;
        }
        for line_pair in program_pair.into_inner() {
            if line_pair.as_rule() != Rule::line {
                continue;
            }
            let (label, instruction) = build_line(line_pair)?;
            if label.is_some() {
                pending_label = label;
            }
            if let Some(mut instr) = instruction {
                instr.label = pending_label.take();
                instructions.push(instr);
            }
        }
    }

    Ok(instructions)
}

fn build_line(line_pair: Pair<Rule>) -> Result<(Option<String>, Option<Instruction>), AssemblyError> {
    let mut label = None;
    let mut instruction = None;

    for pair in line_pair.into_inner() {
        match pair.as_rule() {
            Rule::label => {
                label = Some(pair.into_inner().next().unwrap().as_str().to_string());
            }
            Rule::instruction => {
                instruction = Some(build_instruction(pair)?);
            }
            _ => {}
        }
    }

    Ok((label, instruction))
}

fn build_instruction(pair: Pair<Rule>) -> Result<Instruction, AssemblyError> {
    let mut inner = pair.into_inner();
    let opcode_pair = inner.next().expect("instruction always has an opcode");
    let opcode = Opcode::from_mnemonic(opcode_pair.as_str())
        .expect("grammar only accepts catalog mnemonics");

    let operands = inner.map(build_operand).collect::<Result<Vec<_>, _>>()?;
    Ok(Instruction::new(None, opcode, operands))
}

fn build_operand(pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let arg_pair = pair.into_inner().next().expect("arg always wraps one form");
    build_operand_inner(arg_pair)
}

fn build_operand_inner(pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    match pair.as_rule() {
        Rule::dereference => {
            let inner = pair.into_inner().next().expect("dereference wraps one form");
            Ok(Operand::Dereference(Box::new(build_operand_inner(inner)?)))
        }
        Rule::addition => {
            let mut inner = pair.into_inner();
            let number = parse_number(inner.next().unwrap().as_str());
            let register = parse_register(inner.next().unwrap().as_str());
            Ok(Operand::Addition(number, register))
        }
        Rule::register => Ok(Operand::Register(parse_register(pair.as_str()))),
        Rule::number => Ok(Operand::Number(parse_number(pair.as_str()))),
        Rule::pop_kw => Ok(Operand::Pop),
        Rule::peek_kw => Ok(Operand::Peek),
        Rule::push_kw => Ok(Operand::Push),
        Rule::identifier => Ok(Operand::Label(pair.as_str().to_string())),
        other => unreachable!("unexpected operand rule: {other:?}"),
    }
}

fn parse_register(text: &str) -> Register {
    Register::from_name(text).expect("grammar only accepts catalog register names")
}

fn parse_number(text: &str) -> u16 {
    if let Some(hex) = text.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).expect("grammar only accepts valid hex digits")
    } else {
        text.parse().expect("grammar only accepts valid decimal digits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_with_hex_immediate() {
        let instrs = parse_source("SET A, 0x41\n").unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].opcode, Opcode::Set);
        assert_eq!(
            instrs[0].operands,
            vec![Operand::Register(Register::A), Operand::Number(0x41)]
        );
    }

    #[test]
    fn parses_label_and_instruction_on_one_line() {
        let instrs = parse_source(":loop\nADD A, 1\n").unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].label.as_deref(), Some("loop"));
        assert_eq!(instrs[0].opcode, Opcode::Add);
    }

    #[test]
    fn standalone_label_line_attaches_to_next_instruction() {
        let instrs = parse_source(":sub\nSET A, 42\nSET PC, POP\n").unwrap();
        assert_eq!(instrs.len(), 2);
        assert_eq!(instrs[0].label.as_deref(), Some("sub"));
        assert_eq!(instrs[0].opcode, Opcode::Set);
        assert_eq!(instrs[1].label, None);
    }

    #[test]
    fn trailing_label_with_no_instruction_is_dropped() {
        let instrs = parse_source("OUT A\n:dangling\n").unwrap();
        assert_eq!(instrs.len(), 1);
    }

    #[test]
    fn parses_dereference_of_addition() {
        let instrs = parse_source("SET A, [2+X]\n").unwrap();
        assert_eq!(
            instrs[0].operands[1],
            Operand::Dereference(Box::new(Operand::Addition(2, Register::X)))
        );
    }

    #[test]
    fn parses_stack_pseudo_operands() {
        let instrs = parse_source("SET PC, POP\nSET PUSH, A\nSET A, PEEK\n").unwrap();
        assert_eq!(instrs[0].operands[1], Operand::Pop);
        assert_eq!(instrs[1].operands[0], Operand::Push);
        assert_eq!(instrs[2].operands[1], Operand::Peek);
    }

    #[test]
    fn parses_comment_and_blank_lines() {
        let instrs = parse_source("; a comment\nSET A, 1 ; trailing\n\nOUT A\n").unwrap();
        assert_eq!(instrs.len(), 2);
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_source("SET A,\n").is_err());
    }

    #[test]
    fn parses_jsr_label_operand() {
        let instrs = parse_source("JSR sub\n").unwrap();
        assert_eq!(instrs[0].opcode, Opcode::Jsr);
        assert_eq!(instrs[0].operands, vec![Operand::Label("sub".to_string())]);
    }
}
