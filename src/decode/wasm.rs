//! Minimal WASM section walker.
//!
//! Only the module preamble and section framing are parsed; section bodies
//! other than custom sections are skipped by length.

use thiserror::Error;

/// Custom section holding a contract's `ScSpecEntry` records.
pub const CONTRACT_SPEC_SECTION: &str = "contractspecv0";

const WASM_MAGIC: &[u8; 4] = b"\0asm";
const WASM_VERSION: u32 = 1;
const CUSTOM_SECTION_ID: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WasmError {
    #[error("not a WASM module")]
    BadMagic,

    #[error("unsupported WASM version {0}")]
    UnsupportedVersion(u32),

    #[error("truncated module at offset {0}")]
    Truncated(usize),

    #[error("malformed LEB128 at offset {0}")]
    InvalidLeb128(usize),

    #[error("custom section name is not UTF-8")]
    InvalidName,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], WasmError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(WasmError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, WasmError> {
        Ok(self.take(1)?[0])
    }

    fn leb128_u32(&mut self) -> Result<u32, WasmError> {
        let start = self.pos;
        let mut result: u32 = 0;
        for i in 0..5 {
            let b = self.byte()?;
            let bits = u32::from(b & 0x7f);
            if i == 4 && bits > 0x0f {
                return Err(WasmError::InvalidLeb128(start));
            }
            result |= bits << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(WasmError::InvalidLeb128(start))
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// All custom sections in module order as `(name, payload)`.
pub fn custom_sections(module: &[u8]) -> Result<Vec<(String, &[u8])>, WasmError> {
    let mut cursor = Cursor { bytes: module, pos: 0 };
    if cursor.take(4).map_err(|_| WasmError::BadMagic)? != WASM_MAGIC {
        return Err(WasmError::BadMagic);
    }
    let version = cursor.take(4)?;
    let version = u32::from_le_bytes([version[0], version[1], version[2], version[3]]);
    if version != WASM_VERSION {
        return Err(WasmError::UnsupportedVersion(version));
    }

    let mut sections = Vec::new();
    while !cursor.is_empty() {
        let id = cursor.byte()?;
        let size = cursor.leb128_u32()? as usize;
        let body = cursor.take(size)?;
        if id != CUSTOM_SECTION_ID {
            continue;
        }

        let mut inner = Cursor { bytes: body, pos: 0 };
        let name_len = inner.leb128_u32()? as usize;
        let name = std::str::from_utf8(inner.take(name_len)?).map_err(|_| WasmError::InvalidName)?;
        sections.push((name.to_string(), &body[inner.pos..]));
    }
    Ok(sections)
}

/// Payload of the first custom section called `name`, if any.
pub fn custom_section<'a>(module: &'a [u8], name: &str) -> Result<Option<&'a [u8]>, WasmError> {
    Ok(custom_sections(module)?
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, payload)| payload))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn leb(mut v: u32) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let b = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                out.push(b);
                return out;
            }
            out.push(b | 0x80);
        }
    }

    /// Module with a type section followed by the given custom sections.
    pub(crate) fn module_with(custom: &[(&str, &[u8])]) -> Vec<u8> {
        let mut m = Vec::new();
        m.extend_from_slice(WASM_MAGIC);
        m.extend_from_slice(&WASM_VERSION.to_le_bytes());
        m.extend_from_slice(&[1, 1, 0]);
        for (name, payload) in custom {
            let mut body = leb(name.len() as u32);
            body.extend_from_slice(name.as_bytes());
            body.extend_from_slice(payload);
            m.push(CUSTOM_SECTION_ID);
            m.extend(leb(body.len() as u32));
            m.extend(body);
        }
        m
    }

    #[test]
    fn test_finds_named_section() {
        let payload = vec![7u8; 200];
        let module = module_with(&[("name", b"x"), (CONTRACT_SPEC_SECTION, &payload)]);
        assert_eq!(
            custom_section(&module, CONTRACT_SPEC_SECTION).unwrap(),
            Some(payload.as_slice())
        );
        assert_eq!(custom_section(&module, "missing").unwrap(), None);
        assert_eq!(custom_sections(&module).unwrap().len(), 2);
    }

    #[test]
    fn test_rejects_non_wasm() {
        assert_eq!(custom_sections(b"\x7fELF\x01\x00\x00\x00"), Err(WasmError::BadMagic));
        assert_eq!(custom_sections(b"\0a"), Err(WasmError::BadMagic));
    }

    #[test]
    fn test_truncated_section() {
        let mut module = module_with(&[(CONTRACT_SPEC_SECTION, &[1, 2, 3])]);
        module.truncate(module.len() - 1);
        assert!(matches!(custom_sections(&module), Err(WasmError::Truncated(_))));
    }
}
