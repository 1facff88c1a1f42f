//! Packed encodings of version numbers and translations used by the version info fields.
//!
//! Version quads and translations are formatted into hexadecimal strings and parsed back with
//! [`hex_to_u32`] to obtain the DWORD values stored in the binary record.

use log::warn;

/// High DWORD of a version quad as 8 hexadecimal digits.
pub fn version_high(major: u16, minor: u16) -> String { format!("{major:04x}{minor:04x}") }

/// Low DWORD of a version quad as 8 hexadecimal digits.
pub fn version_low(patch: u16, build: u16) -> String { format!("{patch:04x}{build:04x}") }

/// Format the two DWORD halves of a version quad as `major.minor.patch.build`.
pub fn version_string(high: u32, low: u32) -> String {
    format!("{}.{}.{}.{}", high >> 16, high & 0xffff, low >> 16, low & 0xffff)
}

/// String table key: language then codepage, uppercase.
pub fn translation_string(lang_id: u16, charset_id: u16) -> String {
    format!("{lang_id:04X}{charset_id:04X}")
}

/// Translation value: codepage then language, so the parsed DWORD has the language in its low word.
pub fn translation(lang_id: u16, charset_id: u16) -> String {
    format!("{charset_id:04x}{lang_id:04x}")
}

/// Parse a hexadecimal DWORD.
///
/// Empty strings are zero. Malformed strings are logged and treated as zero.
pub fn hex_to_u32(value: &str) -> u32 {
    if value.is_empty() {
        return 0;
    }
    match u32::from_str_radix(value, 16) {
        Ok(value) => value,
        Err(error) => {
            warn!("invalid hexadecimal value {:?}, using 0: {}", value, error);
            0
        }
    }
}
