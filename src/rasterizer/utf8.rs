//! Lenient UTF-8 to codepoint decoding.
//!
//! The leading byte's top nibble picks how many continuation bytes follow
//! (`0xf0` → 3, `0xe0` → 2, `0xc0`/`0xd0` → 1, anything else → 0). Continuation
//! bytes contribute their low 6 bits. Nothing is validated: malformed input
//! decodes to arbitrary codepoints instead of failing, and a sequence cut short
//! by the end of input uses whatever bytes remain.

/// Iterator over the codepoints of a byte string.
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    bytes: &'a [u8],
    pos: usize,
}

/// Decodes `bytes` codepoint by codepoint.
pub fn codepoints(bytes: &[u8]) -> Codepoints<'_> {
    Codepoints { bytes, pos: 0 }
}

impl Iterator for Codepoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let lead = *self.bytes.get(self.pos)?;
        self.pos += 1;

        let (mut codepoint, continuation) = match lead & 0xf0 {
            0xf0 => ((lead & 0x07) as u32, 3),
            0xe0 => ((lead & 0x0f) as u32, 2),
            0xc0 | 0xd0 => ((lead & 0x1f) as u32, 1),
            _ => (lead as u32, 0),
        };

        for _ in 0..continuation {
            let Some(&byte) = self.bytes.get(self.pos) else {
                break;
            };
            self.pos += 1;
            codepoint = (codepoint << 6) | (byte & 0x3f) as u32;
        }

        Some(codepoint)
    }
}
