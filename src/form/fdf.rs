//! FDF serialization of a field mapping for external form fillers

use super::fields::FieldMap;

const HEADER: &[u8] = b"%FDF-1.2\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<\n/FDF\n<<\n/Fields [\n";
const FOOTER: &[u8] = b"]\n>>\n>>\nendobj\ntrailer\n\n<</Root 1 0 R>>\n%%EOF\n\n";

/// Serializes fields into an FDF 1.2 document, in mapping order
pub fn to_fdf(fields: &FieldMap) -> Vec<u8> {
    let mut out = HEADER.to_vec();
    for (name, value) in fields.iter() {
        out.extend_from_slice(b"<</T");
        write_string(&mut out, name);
        out.extend_from_slice(b"/V");
        write_string(&mut out, value);
        out.extend_from_slice(b">>\n");
    }
    out.extend_from_slice(FOOTER);
    out
}

/// Writes a PDF literal string; non-ASCII text goes out as UTF-16BE with a BOM
fn write_string(out: &mut Vec<u8>, value: &str) {
    out.push(b'(');
    if value.is_ascii() {
        escape_into(out, value.as_bytes());
    } else {
        let mut encoded = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            encoded.extend_from_slice(&unit.to_be_bytes());
        }
        escape_into(out, &encoded);
    }
    out.push(b')');
}

fn escape_into(out: &mut Vec<u8>, bytes: &[u8]) {
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields::{EMAIL, NAME, SIGNATURE};

    fn render(fields: &FieldMap) -> String {
        String::from_utf8_lossy(&to_fdf(fields)).into_owned()
    }

    #[test]
    fn test_fields_keep_mapping_order() {
        let mut fields = FieldMap::new();
        fields.insert(SIGNATURE, "Anonymous");
        fields.insert(EMAIL, "example@example.com");
        let text = render(&fields);

        assert!(
            !text.contains("/T(Signature (Print or Type))"),
            "parentheses in names must be escaped"
        );

        let signature = text.find("/T(Signature \\(Print or Type\\))").unwrap();
        let email = text.find("/T(Email Address)/V(example@example.com)").unwrap();
        assert!(signature < email);
        assert!(text.starts_with("%FDF-1.2"));
        assert!(text.contains("<</Root 1 0 R>>"));
    }

    #[test]
    fn test_escapes_backslashes_and_newlines() {
        let mut fields = FieldMap::new();
        fields.insert(NAME, "a\\b\nc");
        assert!(render(&fields).contains("/V(a\\\\b\\nc)"));
    }

    #[test]
    fn test_non_ascii_values_are_utf16() {
        let mut fields = FieldMap::new();
        fields.insert(NAME, "José");
        let fdf = to_fdf(&fields);
        let expected: &[u8] = b"/V(\xfe\xff\x00J\x00o\x00s\x00\xe9)";
        assert!(fdf.windows(expected.len()).any(|w| w == expected));
    }
}
