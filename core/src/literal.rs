//! String- and rune-literal text handling shared by the parser (import
//! path text) and the rewrite engine (byte-slice string lowering). Kept
//! as one small module rather than duplicated in both places, a small
//! focused leaf module alongside `position.rs`/`source_file.rs` rather
//! than one grab-bag `util`.

/// Strips the surrounding quotes from an interpreted string literal's raw
/// source text and decodes its escape sequences to a Rust `String`. Used
/// for import paths, where the path is consumed as text rather than
/// lowered to a byte-slice composite literal.
#[must_use]
pub fn unquote_interpreted(raw: &str) -> String {
    let bytes = decode_escaped_bytes(raw);
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Decodes an interpreted (`"..."`) or raw (`` `...` ``) string literal's
/// raw source text (quotes included) into the byte sequence it denotes.
/// `\n \t \r \\ \" \'` decode to their canonical bytes; unknown escapes
/// are preserved literally (the backslash and following character both
/// kept, verbatim).
#[must_use]
pub fn decode_escaped_bytes(raw: &str) -> Vec<u8> {
    if raw.starts_with('`') {
        return raw
            .trim_start_matches('`')
            .trim_end_matches('`')
            .as_bytes()
            .to_vec();
    }
    let inner = raw
        .strip_prefix('"')
        .unwrap_or(raw)
        .strip_suffix('"')
        .unwrap_or(raw.strip_prefix('"').unwrap_or(raw));
    decode_escapes(inner)
}

/// Decodes a rune literal's raw source text (`'...'`, quotes included)
/// into the single codepoint it denotes.
#[must_use]
pub fn decode_rune(raw: &str) -> char {
    let inner = raw
        .strip_prefix('\'')
        .unwrap_or(raw)
        .strip_suffix('\'')
        .unwrap_or(raw);
    let decoded = decode_escapes(inner);
    String::from_utf8_lossy(&decoded).chars().next().unwrap_or('\0')
}

fn decode_escapes(s: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next() {
            Some('n') => out.push(b'\n'),
            Some('t') => out.push(b'\t'),
            Some('r') => out.push(b'\r'),
            Some('\\') => out.push(b'\\'),
            Some('"') => out.push(b'"'),
            Some('\'') => out.push(b'\''),
            Some('0') => out.push(0),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    if let Ok(byte) = u8::from_str_radix(&format!("{hi}{lo}"), 16) {
                        out.push(byte);
                        continue;
                    }
                    out.push(b'\\');
                    out.push(b'x');
                    out.push(hi as u8);
                    out.push(lo as u8);
                } else {
                    out.push(b'\\');
                    out.push(b'x');
                }
            }
            Some(other) => {
                // Unknown escape: preserve literally, backslash included.
                out.push(b'\\');
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
            None => out.push(b'\\'),
        }
    }
    out
}

/// Renders a byte as a Go rune-literal element for a byte-slice composite
/// literal: printable ASCII as `'c'`, otherwise `'\xHH'`.
#[must_use]
pub fn byte_to_rune_literal(b: u8) -> String {
    match b {
        b'\n' => "'\\n'".to_string(),
        b'\t' => "'\\t'".to_string(),
        b'\r' => "'\\r'".to_string(),
        b'\\' => "'\\\\'".to_string(),
        b'\'' => "'\\''".to_string(),
        0x20..=0x7e => format!("'{}'", b as char),
        _ => format!("'\\x{b:02x}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_simple_escapes() {
        assert_eq!(decode_escaped_bytes(r#""a\nb""#), b"a\nb".to_vec());
    }

    #[test]
    fn preserves_unknown_escape() {
        assert_eq!(decode_escaped_bytes(r#""\q""#), b"\\q".to_vec());
    }

    #[test]
    fn raw_string_is_verbatim() {
        assert_eq!(decode_escaped_bytes("`a\\nb`"), b"a\\nb".to_vec());
    }

    #[test]
    fn non_printable_byte_is_hex_rune() {
        assert_eq!(byte_to_rune_literal(0x01), "'\\x01'");
        assert_eq!(byte_to_rune_literal(b'a'), "'a'");
    }
}
