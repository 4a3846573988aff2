//! Program Loading.
//!
//! This module turns program files into a [`Program`] that the memory system can
//! place. It performs:
//! 1. **PQR5 container:** Big-endian image framed by a preamble (`0xF0F0F0F0` from the
//!    assembler, `0xC0C0C0C0` from the binary converter), a byte size, a base address
//!    and the `0xE0E0E0E0` postamble.
//! 2. **Hex text:** One 32-bit hex word per line, loaded at address 0.
//! 3. **Raw binary:** Little-endian bytes loaded at address 0, zero-padded to a word.
//! 4. **ELF:** `PT_LOAD` segments of a 32-bit little-endian RISC-V executable.
//!
//! [`load_file`] detects the format from the file contents and name.

use std::fs;
use std::path::Path;

use object::LittleEndian;
use object::elf::{EM_RISCV, FileHeader32, PT_LOAD};
use object::read::elf::{FileHeader, ProgramHeader};
use tracing::debug;

use crate::common::constants::{
    PQR5_ASM_PREAMBLE, PQR5_BIN_PREAMBLE, PQR5_HEADER_BYTES, PQR5_POSTAMBLE,
};
use crate::common::error::{LoadError, SimError};

const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];
const ELFCLASS32: u8 = 1;
const ELFDATA2LSB: u8 = 1;

/// A contiguous block of bytes to place at `addr`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Segment {
    /// Load address of the first byte.
    pub addr: u32,
    /// Contents, little-endian as they appear in memory.
    pub data: Vec<u8>,
}

/// A loadable program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Address of the first instruction to execute.
    pub entry: u32,
    /// Memory contents in load order.
    pub segments: Vec<Segment>,
}

impl Program {
    /// Builds a single-segment program from instruction words, entering at `base`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pqr5_core::sim::loader::Program;
    ///
    /// let p = Program::from_words(0x100, &[0x0000_0013, 0x0000_006F]);
    /// assert_eq!(p.entry, 0x100);
    /// assert_eq!(p.segments[0].data[..4], [0x13, 0, 0, 0]);
    /// ```
    pub fn from_words(base: u32, words: &[u32]) -> Self {
        let data = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Self {
            entry: base,
            segments: vec![Segment { addr: base, data }],
        }
    }

    /// Words of the segment containing the entry point, starting at that segment's base.
    ///
    /// Trailing bytes that do not fill a word are zero-padded.
    pub fn words(&self) -> (u32, Vec<u32>) {
        let seg = self
            .segments
            .iter()
            .find(|s| {
                self.entry >= s.addr && ((self.entry - s.addr) as usize) < s.data.len()
            })
            .or_else(|| self.segments.first());
        match seg {
            Some(seg) => (seg.addr, bytes_to_words(&seg.data)),
            None => (self.entry, Vec::new()),
        }
    }

    /// Total number of bytes across all segments.
    pub fn size_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.data.len()).sum()
    }
}

fn bytes_to_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect()
}

fn be_word(bytes: &[u8], offset: usize) -> Result<u32, LoadError> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
        .ok_or(LoadError::Truncated {
            expected: offset + 4,
            actual: bytes.len(),
        })
}

/// Returns `true` if `bytes` start with either PQR5 preamble.
pub fn is_pqr5_bin(bytes: &[u8]) -> bool {
    matches!(be_word(bytes, 0), Ok(PQR5_ASM_PREAMBLE | PQR5_BIN_PREAMBLE))
}

/// Parses a PQR5 container.
///
/// # Returns
///
/// A single-segment program entering at the container's base address.
///
/// # Errors
///
/// `BadPreamble`, `Unaligned` (size not a multiple of 4), `Truncated` or
/// `BadPostamble`.
pub fn parse_pqr5_bin(bytes: &[u8]) -> Result<Program, LoadError> {
    let preamble = be_word(bytes, 0)?;
    if preamble != PQR5_ASM_PREAMBLE && preamble != PQR5_BIN_PREAMBLE {
        return Err(LoadError::BadPreamble(preamble));
    }
    let size = be_word(bytes, 4)?;
    let base = be_word(bytes, 8)?;
    if size % 4 != 0 {
        return Err(LoadError::Unaligned(size));
    }

    let body_end = PQR5_HEADER_BYTES + size as usize;
    if bytes.len() < body_end + 4 {
        return Err(LoadError::Truncated {
            expected: body_end + 4,
            actual: bytes.len(),
        });
    }
    let postamble = be_word(bytes, body_end)?;
    if postamble != PQR5_POSTAMBLE {
        return Err(LoadError::BadPostamble(postamble));
    }

    let words: Vec<u32> = bytes[PQR5_HEADER_BYTES..body_end]
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    debug!(
        base = format_args!("{base:#010x}"),
        words = words.len(),
        "PQR5 container parsed"
    );
    Ok(Program::from_words(base, &words))
}

/// Serializes instruction words as a PQR5 container with the assembler preamble.
///
/// # Examples
///
/// ```
/// use pqr5_core::sim::loader::{parse_pqr5_bin, write_pqr5_bin};
///
/// let bytes = write_pqr5_bin(0x40, &[0x0000_006F]);
/// assert_eq!(bytes.len(), 20);
/// assert_eq!(parse_pqr5_bin(&bytes).unwrap().entry, 0x40);
/// ```
pub fn write_pqr5_bin(base: u32, words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(PQR5_HEADER_BYTES + words.len() * 4 + 4);
    out.extend_from_slice(&PQR5_ASM_PREAMBLE.to_be_bytes());
    out.extend_from_slice(&((words.len() * 4) as u32).to_be_bytes());
    out.extend_from_slice(&base.to_be_bytes());
    for w in words {
        out.extend_from_slice(&w.to_be_bytes());
    }
    out.extend_from_slice(&PQR5_POSTAMBLE.to_be_bytes());
    out
}

/// Parses a hex text image: one word per line, optional `0x`, blank lines skipped.
pub fn parse_hex_text(text: &str) -> Result<Program, LoadError> {
    let mut words = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let word = u32::from_str_radix(digits, 16).map_err(|_| LoadError::HexParse {
            line: idx + 1,
            text: trimmed.to_string(),
        })?;
        words.push(word);
    }
    Ok(Program::from_words(0, &words))
}

/// Writes instruction words as a hex text image (8 digits per line).
pub fn write_hex_text(words: &[u32]) -> String {
    words.iter().map(|w| format!("{w:08x}\n")).collect()
}

/// Wraps raw little-endian bytes as a program at `base`, padding to a whole word.
pub fn parse_raw(bytes: &[u8], base: u32) -> Program {
    let mut data = bytes.to_vec();
    data.resize(bytes.len().next_multiple_of(4), 0);
    Program {
        entry: base,
        segments: vec![Segment { addr: base, data }],
    }
}

/// Parses a 32-bit little-endian RISC-V ELF executable.
///
/// Every non-empty `PT_LOAD` segment becomes a [`Segment`], zero-filled up to its
/// memory size.
pub fn parse_elf(bytes: &[u8]) -> Result<Program, LoadError> {
    if bytes.len() < 6 || bytes[..4] != ELF_MAGIC {
        return Err(LoadError::Elf("missing ELF magic".into()));
    }
    if bytes[4] != ELFCLASS32 || bytes[5] != ELFDATA2LSB {
        return Err(LoadError::WrongArchitecture);
    }

    let elf_err = |e: object::read::Error| LoadError::Elf(e.to_string());
    let header = FileHeader32::<LittleEndian>::parse(bytes).map_err(elf_err)?;
    let endian = header.endian().map_err(elf_err)?;
    if header.e_machine(endian) != EM_RISCV {
        return Err(LoadError::WrongArchitecture);
    }

    let mut segments = Vec::new();
    for phdr in header.program_headers(endian, bytes).map_err(elf_err)? {
        if phdr.p_type(endian) != PT_LOAD || phdr.p_memsz(endian) == 0 {
            continue;
        }
        let addr = phdr.p_paddr(endian);
        let mem_size = phdr.p_memsz(endian) as usize;
        let file_data = phdr
            .data(endian, bytes)
            .map_err(|()| LoadError::Elf(format!("segment at {addr:#010x} exceeds file")))?;

        let mut data = file_data.to_vec();
        data.resize(mem_size.max(file_data.len()), 0);
        debug!(
            addr = format_args!("{addr:#010x}"),
            filesz = file_data.len(),
            memsz = mem_size,
            "ELF segment"
        );
        segments.push(Segment { addr, data });
    }

    Ok(Program {
        entry: header.e_entry(endian),
        segments,
    })
}

/// Reads a program file, detecting its format.
///
/// ELF files and PQR5 containers are recognised by their leading bytes; files whose
/// name ends in `.txt` are hex text; anything else is a raw binary at address 0.
pub fn load_file(path: impl AsRef<Path>) -> Result<Program, SimError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| SimError::io(path, e))?;

    let program = if bytes.starts_with(&ELF_MAGIC) {
        parse_elf(&bytes)?
    } else if is_pqr5_bin(&bytes) {
        parse_pqr5_bin(&bytes)?
    } else if path.extension().is_some_and(|ext| ext == "txt") {
        parse_hex_text(&String::from_utf8_lossy(&bytes))?
    } else {
        parse_raw(&bytes, 0)
    };

    debug!(
        path = %path.display(),
        entry = format_args!("{:#010x}", program.entry),
        bytes = program.size_bytes(),
        "program loaded"
    );
    Ok(program)
}
