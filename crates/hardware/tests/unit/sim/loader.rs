//! Program Loader Tests.
//!
//! PQR5 containers (both preambles), hex text, raw binaries and minimal
//! hand-built ELF images, plus detection in `load_file`.

use std::io::Write;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::{Builder, NamedTempFile};

use pqr5_core::common::constants::{PQR5_BIN_PREAMBLE, PQR5_POSTAMBLE};
use pqr5_core::common::error::{LoadError, SimError};
use pqr5_core::sim::loader::{
    Program, Segment, is_pqr5_bin, load_file, parse_elf, parse_hex_text, parse_pqr5_bin,
    parse_raw, write_hex_text, write_pqr5_bin,
};

const WORDS: [u32; 3] = [0x0050_0093, 0x0010_8113, 0x0000_006F];

fn be(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// One-segment ELF32 image for `machine`, `class` and the given load layout.
fn elf(machine: u16, class: u8, entry: u32, addr: u32, body: &[u8], memsz: u32) -> Vec<u8> {
    const EHSIZE: u32 = 52;
    const PHENTSIZE: u32 = 32;
    let mut out = Vec::new();
    out.extend_from_slice(&[0x7F, b'E', b'L', b'F', class, 1, 1, 0]);
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    out.extend_from_slice(&machine.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&entry.to_le_bytes());
    out.extend_from_slice(&EHSIZE.to_le_bytes()); // e_phoff
    out.extend_from_slice(&0u32.to_le_bytes()); // e_shoff
    out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    out.extend_from_slice(&(EHSIZE as u16).to_le_bytes());
    out.extend_from_slice(&(PHENTSIZE as u16).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    out.extend_from_slice(&40u16.to_le_bytes()); // e_shentsize
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx

    for field in [
        1,                    // PT_LOAD
        EHSIZE + PHENTSIZE,   // p_offset
        addr,                 // p_vaddr
        addr,                 // p_paddr
        body.len() as u32,    // p_filesz
        memsz,                // p_memsz
        5,                    // R+X
        4,                    // p_align
    ] {
        out.extend_from_slice(&u32::to_le_bytes(field));
    }
    out.extend_from_slice(body);
    out
}

fn temp_file(suffix: &str, bytes: &[u8]) -> NamedTempFile {
    let mut file = match Builder::new().suffix(suffix).tempfile() {
        Ok(f) => f,
        Err(e) => panic!("cannot create temp file: {e}"),
    };
    if let Err(e) = file.write_all(bytes) {
        panic!("cannot write temp file: {e}");
    }
    file
}

// ══════════════════════════════════════════════════════════
// 1. PQR5 container
// ══════════════════════════════════════════════════════════

#[test]
fn container_layout_is_big_endian() {
    let bytes = write_pqr5_bin(0x40, &WORDS);
    assert_eq!(&bytes[..4], &[0xF0, 0xF0, 0xF0, 0xF0]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 12], "size in bytes");
    assert_eq!(&bytes[8..12], &[0, 0, 0, 0x40], "base address");
    assert_eq!(&bytes[12..16], &[0x00, 0x50, 0x00, 0x93]);
    assert_eq!(&bytes[24..], &[0xE0, 0xE0, 0xE0, 0xE0]);
    assert!(is_pqr5_bin(&bytes));
}

#[test]
fn container_parses_into_little_endian_memory_image() {
    let program = match parse_pqr5_bin(&write_pqr5_bin(0x40, &WORDS)) {
        Ok(p) => p,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(program.entry, 0x40);
    assert_eq!(program.words(), (0x40, WORDS.to_vec()));
    assert_eq!(&program.segments[0].data[..4], &[0x93, 0x00, 0x50, 0x00]);
}

#[test]
fn converter_preamble_is_accepted() {
    let mut bytes = be(&[PQR5_BIN_PREAMBLE, 4, 0]);
    bytes.extend(be(&[0x0000_006F, PQR5_POSTAMBLE]));
    assert!(is_pqr5_bin(&bytes));
    let Ok(program) = parse_pqr5_bin(&bytes) else {
        panic!("0xC0C0C0C0 container must parse");
    };
    assert_eq!(program.words().1, vec![0x6F]);
}

#[test]
fn container_errors() {
    let good = write_pqr5_bin(0, &WORDS);

    let mut bad_pre = good.clone();
    bad_pre[0] = 0;
    assert!(matches!(
        parse_pqr5_bin(&bad_pre),
        Err(LoadError::BadPreamble(0x00F0_F0F0))
    ));

    let mut bad_post = good.clone();
    let last = bad_post.len() - 1;
    bad_post[last] = 0;
    assert!(matches!(
        parse_pqr5_bin(&bad_post),
        Err(LoadError::BadPostamble(0xE0E0_E000))
    ));

    let truncated = &good[..good.len() - 8];
    assert!(matches!(
        parse_pqr5_bin(truncated),
        Err(LoadError::Truncated { expected: 28, actual: 20 })
    ));

    let mut unaligned = good;
    unaligned[7] = 10;
    assert!(matches!(
        parse_pqr5_bin(&unaligned),
        Err(LoadError::Unaligned(10))
    ));

    assert!(!is_pqr5_bin(&[0xF0, 0xF0]));
}

// ══════════════════════════════════════════════════════════
// 2. Hex text and raw
// ══════════════════════════════════════════════════════════

#[test]
fn hex_text_accepts_prefixes_and_blank_lines() {
    let text = "00500093\n\n0x00108113\n  0X0000006f  \n";
    let Ok(program) = parse_hex_text(text) else {
        panic!("hex text must parse");
    };
    assert_eq!(program.entry, 0);
    assert_eq!(program.words().1, WORDS.to_vec());
}

#[test]
fn hex_text_error_names_the_line() {
    let Err(e) = parse_hex_text("00000013\nnot-hex\n") else {
        panic!("second line is not hex");
    };
    assert_eq!(e.to_string(), "line 2: invalid hex word `not-hex`");
}

#[test]
fn hex_text_writer_emits_eight_digits_per_line() {
    assert_eq!(write_hex_text(&[0x13, 0xDEAD_BEEF]), "00000013\ndeadbeef\n");
}

#[test]
fn raw_bytes_are_padded_to_a_word() {
    let program = parse_raw(&[1, 2, 3, 4, 5], 0x100);
    assert_eq!(
        program,
        Program {
            entry: 0x100,
            segments: vec![Segment {
                addr: 0x100,
                data: vec![1, 2, 3, 4, 5, 0, 0, 0]
            }],
        }
    );
    assert_eq!(program.words().1, vec![0x0403_0201, 5]);
    assert_eq!(program.size_bytes(), 8);
}

// ══════════════════════════════════════════════════════════
// 3. ELF
// ══════════════════════════════════════════════════════════

#[test]
fn elf_load_segment_is_zero_filled_to_memsz() {
    let body: Vec<u8> = WORDS.iter().flat_map(|w| w.to_le_bytes()).collect();
    let image = elf(243, 1, 0x104, 0x100, &body, 16);
    let program = match parse_elf(&image) {
        Ok(p) => p,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(program.entry, 0x104);
    assert_eq!(program.segments.len(), 1);
    assert_eq!(program.segments[0].addr, 0x100);
    assert_eq!(program.segments[0].data.len(), 16);
    assert_eq!(program.words(), (0x100, vec![WORDS[0], WORDS[1], WORDS[2], 0]));
}

#[rstest]
#[case::x86(62, 1)]
#[case::elf64(243, 2)]
fn elf_for_another_target_is_rejected(#[case] machine: u16, #[case] class: u8) {
    let image = elf(machine, class, 0, 0, &[0; 4], 4);
    assert!(matches!(parse_elf(&image), Err(LoadError::WrongArchitecture)));
}

#[test]
fn non_elf_bytes_are_rejected() {
    assert!(matches!(parse_elf(b"\x7FELX...."), Err(LoadError::Elf(_))));
    assert!(matches!(parse_elf(&[0x7F]), Err(LoadError::Elf(_))));
}

// ══════════════════════════════════════════════════════════
// 4. Format detection
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::container(".bin", write_pqr5_bin(0x20, &WORDS), 0x20)]
#[case::container_any_name(".txt", write_pqr5_bin(0x20, &WORDS), 0x20)]
#[case::hex_text(".txt", write_hex_text(&WORDS).into_bytes(), 0)]
#[case::raw(".img", WORDS.iter().flat_map(|w| w.to_le_bytes()).collect(), 0)]
fn load_file_detects_format(#[case] suffix: &str, #[case] bytes: Vec<u8>, #[case] entry: u32) {
    let file = temp_file(suffix, &bytes);
    let program = match load_file(file.path()) {
        Ok(p) => p,
        Err(e) => panic!("{e}"),
    };
    assert_eq!(program.entry, entry);
    assert_eq!(program.words().1, WORDS.to_vec());
}

#[test]
fn load_file_detects_elf() {
    let body: Vec<u8> = WORDS.iter().flat_map(|w| w.to_le_bytes()).collect();
    let file = temp_file(".elf", &elf(243, 1, 0, 0, &body, body.len() as u32));
    let Ok(program) = load_file(file.path()) else {
        panic!("ELF must load");
    };
    assert_eq!(program.words().1, WORDS.to_vec());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    };
    let path = dir.path().join("absent.bin");
    match load_file(&path) {
        Err(SimError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected an i/o error, got {other:?}"),
    }
}

#[test]
fn malformed_container_surfaces_as_load_error() {
    let mut bytes = write_pqr5_bin(0, &WORDS);
    let last = bytes.len() - 1;
    bytes[last] = 0;
    let file = temp_file(".bin", &bytes);
    assert!(matches!(
        load_file(file.path()),
        Err(SimError::Load(LoadError::BadPostamble(_)))
    ));
}
