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

// Operand and instruction model for the target ISA.

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    B,
    C,
    X,
    Y,
    Z,
    I,
    J,
    Sp,
    Pc,
    O,
}

impl Register {
    pub const ALL: [Register; 11] = [
        Register::A,
        Register::B,
        Register::C,
        Register::X,
        Register::Y,
        Register::Z,
        Register::I,
        Register::J,
        Register::Sp,
        Register::Pc,
        Register::O,
    ];

    /// Fixed offset into the `[11 x i16]` register array. Part of the ABI
    /// shared with the emitted runtime.
    pub fn offset(self) -> u32 {
        match self {
            Register::A => 0,
            Register::B => 1,
            Register::C => 2,
            Register::X => 3,
            Register::Y => 4,
            Register::Z => 5,
            Register::I => 6,
            Register::J => 7,
            Register::Sp => 8,
            Register::Pc => 9,
            Register::O => 10,
        }
    }

    /// The symbolic name used both in disassembly text and as the SSA name
    /// for this register's cell pointer (`%A`, `%B`, ... `%O`).
    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::X => "X",
            Register::Y => "Y",
            Register::Z => "Z",
            Register::I => "I",
            Register::J => "J",
            Register::Sp => "SP",
            Register::Pc => "PC",
            Register::O => "O",
        }
    }

    pub fn from_name(name: &str) -> Option<Register> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

/// One opcode from the catalog. `Opcode::is_vm_only` marks the two
/// debugging hooks that contribute no bytes to PC accounting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Opcode {
    Set,
    And,
    Or,
    Xor,
    Add,
    Sub,
    Mul,
    Shl,
    Shr,
    Div,
    Mod,
    Ife,
    Ifn,
    Ifg,
    Ifb,
    Jsr,
    Out,
    Dbg,
}

impl Opcode {
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        Some(match mnemonic {
            "SET" => Opcode::Set,
            "AND" => Opcode::And,
            "OR" => Opcode::Or,
            "XOR" => Opcode::Xor,
            "ADD" => Opcode::Add,
            "SUB" => Opcode::Sub,
            "MUL" => Opcode::Mul,
            "SHL" => Opcode::Shl,
            "SHR" => Opcode::Shr,
            "DIV" => Opcode::Div,
            "MOD" => Opcode::Mod,
            "IFE" => Opcode::Ife,
            "IFN" => Opcode::Ifn,
            "IFG" => Opcode::Ifg,
            "IFB" => Opcode::Ifb,
            "JSR" => Opcode::Jsr,
            "OUT" => Opcode::Out,
            "DBG" => Opcode::Dbg,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Set => "SET",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Shl => "SHL",
            Opcode::Shr => "SHR",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Ife => "IFE",
            Opcode::Ifn => "IFN",
            Opcode::Ifg => "IFG",
            Opcode::Ifb => "IFB",
            Opcode::Jsr => "JSR",
            Opcode::Out => "OUT",
            Opcode::Dbg => "DBG",
        }
    }

    /// VM-only opcodes are debugging hooks with no encoded form; they
    /// contribute 0 to PC accounting regardless of their operands.
    pub fn is_vm_only(self) -> bool {
        matches!(self, Opcode::Dbg | Opcode::Out)
    }
}

/// All forms an instruction argument can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(Register),
    Number(u16),
    Label(String),
    Addition(u16, Register),
    Dereference(Box<Operand>),
    Pop,
    Peek,
    Push,
}

impl Operand {
    /// Extra target-ISA words this operand adds to an instruction's encoded
    /// length, beyond the opcode word itself.
    pub fn extra_length(&self) -> u32 {
        match self {
            Operand::Register(_) => 0,
            Operand::Number(_) => 0,
            Operand::Label(_) => 0,
            Operand::Addition(_, _) => 1,
            Operand::Dereference(inner) => inner.extra_length(),
            Operand::Pop | Operand::Peek | Operand::Push => 0,
        }
    }

    /// The label name of a `Label` operand, used by opcodes that branch to
    /// labels (`JSR`, `SET PC, <label>`).
    pub fn label_name(&self) -> Option<&str> {
        match self {
            Operand::Label(name) => Some(name),
            _ => None,
        }
    }

    pub fn to_disassembly(&self) -> String {
        match self {
            Operand::Register(r) => r.name().to_string(),
            Operand::Number(n) => n.to_string(),
            Operand::Label(l) => l.clone(),
            Operand::Addition(n, r) => format!("{n}+{}", r.name()),
            Operand::Dereference(inner) => format!("[{}]", inner.to_disassembly()),
            Operand::Pop => "POP".to_string(),
            Operand::Peek => "PEEK".to_string(),
            Operand::Push => "PUSH".to_string(),
        }
    }
}

/// A single parsed line: optional entry label, opcode, operands, and a
/// program-counter value filled in by the linker.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub label: Option<String>,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
    pub pc: u16,
}

impl Instruction {
    pub fn new(label: Option<String>, opcode: Opcode, operands: Vec<Operand>) -> Self {
        Instruction {
            label,
            opcode,
            operands,
            pc: 0,
        }
    }

    /// `1 + Σ operand.extra_length`, except VM-only opcodes which are 0
    /// regardless of operand shape.
    pub fn length(&self) -> u32 {
        if self.opcode.is_vm_only() {
            return 0;
        }
        1 + self.operands.iter().map(Operand::extra_length).sum::<u32>()
    }

    /// `true` for `SET PC, <label>` where label is an ordinary jump target
    /// (not the `POP` return idiom).
    pub fn is_unconditional_branch(&self) -> bool {
        self.jump_label().is_some()
    }

    pub fn jump_label(&self) -> Option<&str> {
        if !self.is_set_pc() {
            return None;
        }
        self.operands[1].label_name()
    }

    /// `true` for `SET PC, POP`, the function-return idiom.
    pub fn is_return(&self) -> bool {
        self.is_set_pc() && matches!(self.operands.get(1), Some(Operand::Pop))
    }

    fn is_set_pc(&self) -> bool {
        self.opcode == Opcode::Set
            && matches!(self.operands.first(), Some(Operand::Register(Register::Pc)))
    }

    pub fn to_disassembly(&self) -> String {
        let args = self
            .operands
            .iter()
            .map(Operand::to_disassembly)
            .collect::<Vec<_>>()
            .join(", ");
        if args.is_empty() {
            self.opcode.mnemonic().to_string()
        } else {
            format!("{} {args}", self.opcode.mnemonic())
        }
    }
}
