// SPDX-License-Identifier: MIT
//
// WinAnsi (CP1252) encoding for PDF text strings.
//
// All drawn text — school names, dates, QR captions — is German, which
// WinAnsi covers completely, so simple single-byte fonts suffice and no
// CID machinery is needed. Characters outside the encoding degrade to '?'.

/// The 0x80–0x9F block where CP1252 diverges from Latin-1.
const HIGH_BLOCK: [(char, u8); 27] = [
    ('\u{20AC}', 0x80), // €
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84), // „
    ('\u{2026}', 0x85), // …
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93), // “
    ('\u{201D}', 0x94), // ”
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96), // –
    ('\u{2014}', 0x97), // —
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Encode one character, or `None` if WinAnsi cannot represent it.
pub fn encode_char(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        0xA0..=0xFF => Some(code as u8),
        _ => HIGH_BLOCK.iter().find(|(ch, _)| *ch == c).map(|(_, b)| *b),
    }
}

/// Encode a string, substituting '?' for unrepresentable characters.
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| encode_char(c).unwrap_or(b'?'))
        .collect()
}

/// The Unicode character a WinAnsi code maps to, used when building the
/// per-code advance-width table from a TrueType face.
pub fn decode(code: u8) -> char {
    match code {
        0x20..=0x7E => code as char,
        0xA0..=0xFF => code as char,
        _ => HIGH_BLOCK
            .iter()
            .find(|(_, b)| *b == code)
            .map(|(ch, _)| *ch)
            .unwrap_or(' '),
    }
}
