//! RV32I Assembler.
//!
//! A two-pass assembler for the PQR5 assembly dialect. It performs:
//! 1. **Tokenizing:** One instruction per line. `#` starts a comment, a trailing `;`
//!    is optional, and operands are separated by spaces or commas. `imm(rs1)` is
//!    accepted wherever `rs1, imm` is.
//! 2. **Layout:** The first pass assigns addresses to labels. `.ORIGIN <addr>`
//!    before the first instruction sets the base address (default 0).
//! 3. **Encoding:** The second pass encodes the 37 base instructions and the
//!    pseudo instructions `MV MVI NOP J NOT INV SEQZ SNEZ BEQZ BNEZ LI LA JR`.
//!
//! Numeric immediates are decimal, `0x` hex or a quoted character (`'A'`, `'\n'`)
//! and are truncated to the width of their field. Labels used by branches and
//! jumps become PC-relative offsets; `LA` loads the absolute address.

use std::collections::BTreeMap;

use crate::common::error::{AsmError, AsmErrorKind};
use crate::core::pipeline::signals::{AluOp, BranchCond, MemWidth};
use crate::isa::abi::{REG_RA, REG_ZERO, parse_register};
use crate::isa::decode::Instruction;
use crate::sim::loader::Program;

/// Reach of a B-type offset in bytes.
const BRANCH_RANGE: i64 = 1 << 12;
/// Reach of a J-type offset in bytes.
const JUMP_RANGE: i64 = 1 << 20;

/// Result of a successful assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listing {
    /// Address of the first instruction.
    pub base: u32,
    /// Encoded instruction words in program order.
    pub words: Vec<u32>,
    /// Label addresses.
    pub labels: BTreeMap<String, u32>,
}

impl Listing {
    /// Size of the program in bytes.
    pub fn size_bytes(&self) -> u32 {
        (self.words.len() * 4) as u32
    }

    /// Converts the listing into a loadable program whose entry is `base`.
    pub fn into_program(self) -> Program {
        Program::from_words(self.base, &self.words)
    }
}

/// Assembles `source` into a loadable program.
///
/// # Examples
///
/// ```
/// use pqr5_core::isa::asm::assemble;
///
/// let program = assemble("mvi x1, 5\nj end\nmvi x1, 7\nend:\n").unwrap();
/// assert_eq!(program.entry, 0);
/// ```
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    assemble_listing(source).map(Listing::into_program)
}

/// Assembles `source`, returning the words, base address and label table.
pub fn assemble_listing(source: &str) -> Result<Listing, AsmError> {
    let lines = parse_lines(source)?;

    let mut base = 0u32;
    let mut labels = BTreeMap::new();
    let mut offset = 0u32;
    for line in &lines {
        match &line.body {
            LineBody::Origin(addr) => {
                if offset != 0 {
                    return Err(err(line.number, AsmErrorKind::BadDirective(".ORIGIN".into())));
                }
                base = *addr;
            }
            LineBody::Label(name) => {
                if labels.insert(name.clone(), offset).is_some() {
                    return Err(err(line.number, AsmErrorKind::DuplicateLabel(name.clone())));
                }
            }
            LineBody::Instruction { mnemonic, .. } => {
                offset += 4 * expansion_len(mnemonic);
            }
        }
    }
    for addr in labels.values_mut() {
        *addr = base.wrapping_add(*addr);
    }

    let mut words = Vec::new();
    let mut pc = base;
    for line in &lines {
        if let LineBody::Instruction { mnemonic, operands } = &line.body {
            let ctx = LineContext {
                number: line.number,
                pc,
                labels: &labels,
            };
            for inst in ctx.encode(mnemonic, operands)? {
                words.push(inst.encode());
                pc = pc.wrapping_add(4);
            }
        }
    }

    Ok(Listing {
        base,
        words,
        labels,
    })
}

fn err(line: usize, kind: AsmErrorKind) -> AsmError {
    AsmError { line, kind }
}

/// Number of machine instructions a mnemonic expands to.
fn expansion_len(mnemonic: &str) -> u32 {
    match mnemonic {
        "li" | "la" => 2,
        _ => 1,
    }
}

#[derive(Debug)]
enum LineBody {
    Origin(u32),
    Label(String),
    Instruction {
        mnemonic: String,
        operands: Vec<String>,
    },
}

#[derive(Debug)]
struct SourceLine {
    number: usize,
    body: LineBody,
}

fn parse_lines(source: &str) -> Result<Vec<SourceLine>, AsmError> {
    let mut out = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let mut tokens = tokenize(strip_comment(raw));
        if tokens.last().is_some_and(|t| t == ";") {
            let _ = tokens.pop();
        }
        if tokens.is_empty() {
            continue;
        }

        let first = &tokens[0];
        if first.starts_with('.') {
            if !first.eq_ignore_ascii_case(".origin") || tokens.len() != 2 {
                return Err(err(number, AsmErrorKind::BadDirective(tokens.join(" "))));
            }
            let addr = parse_number(&tokens[1])
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| err(number, AsmErrorKind::BadDirective(tokens.join(" "))))?;
            out.push(SourceLine {
                number,
                body: LineBody::Origin(addr),
            });
            continue;
        }

        let mut rest = tokens.as_slice();
        if let Some(name) = rest[0].strip_suffix(':') {
            if !is_valid_label(name) {
                return Err(err(number, AsmErrorKind::BadDirective(rest[0].clone())));
            }
            out.push(SourceLine {
                number,
                body: LineBody::Label(name.to_string()),
            });
            rest = &rest[1..];
            if rest.is_empty() {
                continue;
            }
        }

        out.push(SourceLine {
            number,
            body: LineBody::Instruction {
                mnemonic: rest[0].to_ascii_lowercase(),
                operands: split_offsets(&rest[1..]),
            },
        });
    }
    Ok(out)
}

/// Drops everything from the first `#` outside a character literal.
fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut prev = '\0';
    for (i, c) in line.char_indices() {
        match c {
            '\'' if prev != '\\' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..i],
            _ => {}
        }
        prev = c;
    }
    line
}

/// Splits on whitespace and commas, keeping quoted characters intact and
/// detaching a trailing `;`.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                current.push(c);
                while let Some(q) = chars.next() {
                    current.push(q);
                    if q == '\\' {
                        if let Some(esc) = chars.next() {
                            current.push(esc);
                        }
                    } else if q == '\'' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() || c == ',' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            ';' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(";".to_string());
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Rewrites `imm(reg)` operands into `reg imm`.
fn split_offsets(operands: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(operands.len() + 1);
    for op in operands {
        match op.strip_suffix(')').and_then(|s| s.split_once('(')) {
            Some((imm, reg)) => {
                out.push(reg.trim().to_string());
                let imm = imm.trim();
                out.push(if imm.is_empty() { "0".into() } else { imm.to_string() });
            }
            None => out.push(op.clone()),
        }
    }
    out
}

fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Parses a decimal, `0x` hex or character literal.
fn parse_number(text: &str) -> Option<i64> {
    if let Some(body) = text.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        return match body {
            "\\n" => Some(0x0A),
            "\\r" => Some(0x0D),
            "\\t" => Some(0x09),
            "\\0" => Some(0x00),
            "\\'" => Some(0x27),
            "\\\\" => Some(0x5C),
            _ => {
                let mut chars = body.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if (' '..='~').contains(&c) => Some(c as i64),
                    _ => None,
                }
            }
        };
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i64>().ok()?,
    };
    let value = if negative { -magnitude } else { magnitude };
    (i64::from(i32::MIN)..=i64::from(u32::MAX))
        .contains(&value)
        .then_some(value)
}

/// Sign-extends the low 12 bits of `value`.
const fn low12(value: i64) -> i32 {
    ((value as i32) << 20) >> 20
}

struct LineContext<'a> {
    number: usize,
    pc: u32,
    labels: &'a BTreeMap<String, u32>,
}

impl LineContext<'_> {
    fn fail(&self, kind: AsmErrorKind) -> AsmError {
        err(self.number, kind)
    }

    fn expect(&self, operands: &[String], count: usize) -> Result<(), AsmError> {
        if operands.len() == count {
            Ok(())
        } else {
            Err(self.fail(AsmErrorKind::OperandCount {
                expected: count,
                found: operands.len(),
            }))
        }
    }

    fn reg(&self, text: &str) -> Result<usize, AsmError> {
        parse_register(text).ok_or_else(|| self.fail(AsmErrorKind::BadRegister(text.to_string())))
    }

    fn imm(&self, text: &str) -> Result<i64, AsmError> {
        parse_number(text).ok_or_else(|| self.fail(AsmErrorKind::BadImmediate(text.to_string())))
    }

    /// A numeric offset or a label turned PC-relative, checked against `range`.
    fn target(&self, text: &str, range: i64) -> Result<i32, AsmError> {
        if let Some(value) = parse_number(text) {
            return Ok(value as i32);
        }
        let addr = self
            .labels
            .get(text)
            .ok_or_else(|| self.fail(AsmErrorKind::UndefinedLabel(text.to_string())))?;
        let offset = i64::from(*addr) - i64::from(self.pc);
        if offset < -range || offset >= range || offset % 2 != 0 {
            return Err(self.fail(AsmErrorKind::OffsetRange(offset)));
        }
        Ok(offset as i32)
    }

    /// A numeric value or the absolute address of a label.
    fn absolute(&self, text: &str) -> Result<i64, AsmError> {
        if let Some(value) = parse_number(text) {
            return Ok(value);
        }
        self.labels
            .get(text)
            .map(|&addr| i64::from(addr))
            .ok_or_else(|| self.fail(AsmErrorKind::UndefinedLabel(text.to_string())))
    }

    fn load_upper(rd: usize, value: i64) -> [Instruction; 2] {
        let value = value as u32;
        [
            Instruction::Lui {
                rd,
                imm: value.wrapping_add(0x800) & 0xFFFF_F000,
            },
            Instruction::OpImm {
                op: AluOp::Add,
                rd,
                rs1: rd,
                imm: low12(i64::from(value)),
            },
        ]
    }

    fn encode(&self, mnemonic: &str, ops: &[String]) -> Result<Vec<Instruction>, AsmError> {
        if let Some(op) = reg_op(mnemonic) {
            self.expect(ops, 3)?;
            return one(Instruction::Op {
                op,
                rd: self.reg(&ops[0])?,
                rs1: self.reg(&ops[1])?,
                rs2: self.reg(&ops[2])?,
            });
        }
        if let Some(op) = imm_op(mnemonic) {
            self.expect(ops, 3)?;
            let raw = self.imm(&ops[2])?;
            let imm = if matches!(op, AluOp::Sll | AluOp::Srl | AluOp::Sra) {
                (raw & 0x1F) as i32
            } else {
                low12(raw)
            };
            return one(Instruction::OpImm {
                op,
                rd: self.reg(&ops[0])?,
                rs1: self.reg(&ops[1])?,
                imm,
            });
        }
        if let Some((width, signed)) = load_op(mnemonic) {
            self.expect(ops, 3)?;
            return one(Instruction::Load {
                width,
                signed,
                rd: self.reg(&ops[0])?,
                rs1: self.reg(&ops[1])?,
                offset: low12(self.imm(&ops[2])?),
            });
        }
        if let Some(width) = store_op(mnemonic) {
            self.expect(ops, 3)?;
            return one(Instruction::Store {
                width,
                rs2: self.reg(&ops[0])?,
                rs1: self.reg(&ops[1])?,
                offset: low12(self.imm(&ops[2])?),
            });
        }
        if let Some(cond) = branch_op(mnemonic) {
            self.expect(ops, 3)?;
            return one(Instruction::Branch {
                cond,
                rs1: self.reg(&ops[0])?,
                rs2: self.reg(&ops[1])?,
                offset: self.target(&ops[2], BRANCH_RANGE)?,
            });
        }

        match mnemonic {
            "lui" | "auipc" => {
                self.expect(ops, 2)?;
                let rd = self.reg(&ops[0])?;
                let imm = (self.imm(&ops[1])? as u32) << 12;
                one(if mnemonic == "lui" {
                    Instruction::Lui { rd, imm }
                } else {
                    Instruction::Auipc { rd, imm }
                })
            }
            "jal" => match ops.len() {
                1 => one(Instruction::Jal {
                    rd: REG_RA,
                    offset: self.target(&ops[0], JUMP_RANGE)?,
                }),
                _ => {
                    self.expect(ops, 2)?;
                    one(Instruction::Jal {
                        rd: self.reg(&ops[0])?,
                        offset: self.target(&ops[1], JUMP_RANGE)?,
                    })
                }
            },
            "jalr" => {
                self.expect(ops, 3)?;
                one(Instruction::Jalr {
                    rd: self.reg(&ops[0])?,
                    rs1: self.reg(&ops[1])?,
                    offset: low12(self.imm(&ops[2])?),
                })
            }
            "mv" => {
                self.expect(ops, 2)?;
                one(Instruction::OpImm {
                    op: AluOp::Add,
                    rd: self.reg(&ops[0])?,
                    rs1: self.reg(&ops[1])?,
                    imm: 0,
                })
            }
            "mvi" => {
                self.expect(ops, 2)?;
                one(Instruction::OpImm {
                    op: AluOp::Add,
                    rd: self.reg(&ops[0])?,
                    rs1: REG_ZERO,
                    imm: low12(self.imm(&ops[1])?),
                })
            }
            "nop" => {
                self.expect(ops, 0)?;
                one(Instruction::default())
            }
            "j" => {
                self.expect(ops, 1)?;
                one(Instruction::Jal {
                    rd: REG_ZERO,
                    offset: self.target(&ops[0], JUMP_RANGE)?,
                })
            }
            "not" => {
                self.expect(ops, 2)?;
                one(Instruction::OpImm {
                    op: AluOp::Xor,
                    rd: self.reg(&ops[0])?,
                    rs1: self.reg(&ops[1])?,
                    imm: -1,
                })
            }
            "inv" => {
                self.expect(ops, 1)?;
                let rd = self.reg(&ops[0])?;
                one(Instruction::OpImm {
                    op: AluOp::Xor,
                    rd,
                    rs1: rd,
                    imm: -1,
                })
            }
            "seqz" => {
                self.expect(ops, 2)?;
                one(Instruction::OpImm {
                    op: AluOp::Sltu,
                    rd: self.reg(&ops[0])?,
                    rs1: self.reg(&ops[1])?,
                    imm: 1,
                })
            }
            "snez" => {
                self.expect(ops, 2)?;
                one(Instruction::Op {
                    op: AluOp::Sltu,
                    rd: self.reg(&ops[0])?,
                    rs1: REG_ZERO,
                    rs2: self.reg(&ops[1])?,
                })
            }
            "beqz" | "bnez" => {
                self.expect(ops, 2)?;
                one(Instruction::Branch {
                    cond: if mnemonic == "beqz" {
                        BranchCond::Eq
                    } else {
                        BranchCond::Ne
                    },
                    rs1: self.reg(&ops[0])?,
                    rs2: REG_ZERO,
                    offset: self.target(&ops[1], BRANCH_RANGE)?,
                })
            }
            "li" => {
                self.expect(ops, 2)?;
                let rd = self.reg(&ops[0])?;
                Ok(Self::load_upper(rd, self.imm(&ops[1])?).to_vec())
            }
            "la" => {
                self.expect(ops, 2)?;
                let rd = self.reg(&ops[0])?;
                Ok(Self::load_upper(rd, self.absolute(&ops[1])?).to_vec())
            }
            "jr" => {
                self.expect(ops, 1)?;
                one(Instruction::Jalr {
                    rd: REG_ZERO,
                    rs1: self.reg(&ops[0])?,
                    offset: 0,
                })
            }
            _ => Err(self.fail(AsmErrorKind::UnknownMnemonic(mnemonic.to_string()))),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn one(inst: Instruction) -> Result<Vec<Instruction>, AsmError> {
    Ok(vec![inst])
}

fn reg_op(mnemonic: &str) -> Option<AluOp> {
    Some(match mnemonic {
        "add" => AluOp::Add,
        "sub" => AluOp::Sub,
        "sll" => AluOp::Sll,
        "slt" => AluOp::Slt,
        "sltu" => AluOp::Sltu,
        "xor" => AluOp::Xor,
        "srl" => AluOp::Srl,
        "sra" => AluOp::Sra,
        "or" => AluOp::Or,
        "and" => AluOp::And,
        _ => return None,
    })
}

fn imm_op(mnemonic: &str) -> Option<AluOp> {
    Some(match mnemonic {
        "addi" => AluOp::Add,
        "slti" => AluOp::Slt,
        "sltiu" => AluOp::Sltu,
        "xori" => AluOp::Xor,
        "ori" => AluOp::Or,
        "andi" => AluOp::And,
        "slli" => AluOp::Sll,
        "srli" => AluOp::Srl,
        "srai" => AluOp::Sra,
        _ => return None,
    })
}

fn load_op(mnemonic: &str) -> Option<(MemWidth, bool)> {
    Some(match mnemonic {
        "lb" => (MemWidth::Byte, true),
        "lh" => (MemWidth::Half, true),
        "lw" => (MemWidth::Word, true),
        "lbu" => (MemWidth::Byte, false),
        "lhu" => (MemWidth::Half, false),
        _ => return None,
    })
}

fn store_op(mnemonic: &str) -> Option<MemWidth> {
    Some(match mnemonic {
        "sb" => MemWidth::Byte,
        "sh" => MemWidth::Half,
        "sw" => MemWidth::Word,
        _ => return None,
    })
}

fn branch_op(mnemonic: &str) -> Option<BranchCond> {
    Some(match mnemonic {
        "beq" => BranchCond::Eq,
        "bne" => BranchCond::Ne,
        "blt" => BranchCond::Lt,
        "bge" => BranchCond::Ge,
        "bltu" => BranchCond::Ltu,
        "bgeu" => BranchCond::Geu,
        _ => return None,
    })
}
