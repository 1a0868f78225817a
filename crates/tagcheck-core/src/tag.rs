//! # Struct Tags
//!
//! The per-field annotation string of an API type. By convention a tag is a
//! space-separated list of `key:"value"` pairs:
//!
//! ```text
//! json:"buildConfig,omitempty" description:"the owning build config"
//! ```
//!
//! [`StructTag::lookup`] is lenient: scanning stops at the first malformed
//! pair and whatever preceded it is still searchable. [`StructTag::pairs`] is
//! strict and reports exactly what is wrong, which is what the descriptor
//! loader uses to reject bad input up front.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// A field's metadata annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructTag(String);

impl StructTag {
    /// Wrap a raw tag string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the tag has no content at all.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value associated with `key`, or the empty string if absent.
    pub fn get(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_default()
    }

    /// Value associated with `key`, distinguishing absent (`None`) from
    /// present-but-empty (`Some("")`).
    pub fn lookup(&self, key: &str) -> Option<String> {
        let mut tag = self.0.as_str();
        while !tag.is_empty() {
            let skip = tag.bytes().take_while(|b| *b == b' ').count();
            tag = &tag[skip..];
            if tag.is_empty() {
                break;
            }

            let bytes = tag.as_bytes();
            let i = key_len(bytes);
            if i == 0 || i + 1 >= bytes.len() || bytes[i] != b':' || bytes[i + 1] != b'"' {
                break;
            }
            let name = &tag[..i];
            tag = &tag[i + 1..];

            let Some(end) = closing_quote(tag.as_bytes()) else {
                break;
            };
            let quoted = &tag[..=end];
            tag = &tag[end + 1..];

            if name == key {
                return unquote(quoted).ok();
            }
        }
        None
    }

    /// Parse every pair strictly, in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`TagError`] encountered.
    pub fn pairs(&self) -> Result<Vec<(String, String)>, TagError> {
        let s = self.0.as_str();
        let bytes = s.as_bytes();
        let mut pairs = Vec::new();
        let mut pos = 0;

        loop {
            while pos < bytes.len() && bytes[pos] == b' ' {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }

            let start = pos;
            pos += key_len(&bytes[pos..]);
            let key = &s[start..pos];
            if key.is_empty()
                || pos + 1 >= bytes.len()
                || bytes[pos] != b':'
                || bytes[pos + 1] != b'"'
            {
                return Err(TagError::MissingValue {
                    key: key.to_string(),
                    offset: start,
                });
            }

            pos += 1;
            let end = closing_quote(&bytes[pos..]).ok_or_else(|| TagError::Unterminated {
                key: key.to_string(),
            })?;
            let value = unquote(&s[pos..=pos + end]).map_err(|reason| TagError::BadEscape {
                key: key.to_string(),
                reason,
            })?;
            pos += end + 1;

            if pos < bytes.len() && bytes[pos] != b' ' {
                return Err(TagError::MissingSeparator {
                    key: key.to_string(),
                });
            }
            pairs.push((key.to_string(), value));
        }

        Ok(pairs)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StructTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Length of the key at the start of `bytes`: everything up to a control
/// character, space, colon, or quote.
fn key_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|&&b| b > b' ' && b != b':' && b != b'"' && b != 0x7f)
        .count()
}

/// Index of the quote closing the value that opens at `bytes[0]`.
fn closing_quote(bytes: &[u8]) -> Option<usize> {
    let mut i = 1;
    while i < bytes.len() && bytes[i] != b'"' {
        if bytes[i] == b'\\' {
            i += 1;
        }
        i += 1;
    }
    (i < bytes.len()).then_some(i)
}

/// Decode a double-quoted value, including its surrounding quotes.
fn unquote(quoted: &str) -> Result<String, String> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|q| q.strip_suffix('"'))
        .ok_or_else(|| "value is not double-quoted".to_string())?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {}
            '"' => return Err("unescaped quote".to_string()),
            '\n' => return Err("newline in value".to_string()),
            _ => {
                out.push(c);
                continue;
            }
        }

        let escaped = match chars.next() {
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('f') => '\u{c}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('v') => '\u{b}',
            Some(c @ ('\\' | '"')) => c,
            Some('x') => code_point(&mut chars, 2, 16)?,
            Some('u') => code_point(&mut chars, 4, 16)?,
            Some('U') => code_point(&mut chars, 8, 16)?,
            Some(d @ '0'..='7') => {
                let rest = code_point(&mut chars, 2, 8)?;
                let value = d.to_digit(8).unwrap_or(0) * 64 + rest as u32;
                if value > 0o377 {
                    return Err(format!("octal escape \\{value:o} is out of range"));
                }
                char::from_u32(value).ok_or_else(|| format!("invalid octal escape {value:o}"))?
            }
            Some(other) => return Err(format!("unknown escape \\{other}")),
            None => return Err("trailing backslash".to_string()),
        };
        out.push(escaped);
    }
    Ok(out)
}

fn code_point(
    chars: &mut std::str::Chars<'_>,
    digits: usize,
    radix: u32,
) -> Result<char, String> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let d = chars
            .next()
            .and_then(|c| c.to_digit(radix))
            .ok_or_else(|| format!("expected {digits} base-{radix} digits"))?;
        value = value * radix + d;
    }
    char::from_u32(value).ok_or_else(|| format!("invalid code point {value:#x}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_json_and_description() {
        let tag = StructTag::new(r#"json:"name,omitempty" description:"the name""#);
        assert_eq!(tag.get("json"), "name,omitempty");
        assert_eq!(tag.get("description"), "the name");
        assert_eq!(tag.get("protobuf"), "");
    }

    #[test]
    fn lookup_distinguishes_empty_from_absent() {
        let tag = StructTag::new(r#"json:"""#);
        assert_eq!(tag.lookup("json"), Some(String::new()));
        assert_eq!(tag.lookup("description"), None);
    }

    #[test]
    fn empty_tag_yields_nothing() {
        let tag = StructTag::default();
        assert!(tag.is_empty());
        assert_eq!(tag.get("json"), "");
        assert_eq!(tag.pairs().unwrap(), Vec::new());
    }

    #[test]
    fn json_dash_is_a_present_value() {
        let tag = StructTag::new(r#"json:"-""#);
        assert_eq!(tag.get("json"), "-");
    }

    #[test]
    fn escapes_are_decoded() {
        let tag = StructTag::new(r#"description:"say \"hi\"\tnow é""#);
        assert_eq!(tag.get("description"), "say \"hi\"\tnow \u{e9}");
    }

    #[test]
    fn octal_and_hex_escapes() {
        let tag = StructTag::new(r#"a:"\101\x42""#);
        assert_eq!(tag.get("a"), "AB");
    }

    #[test]
    fn single_quote_escape_is_rejected() {
        let tag = StructTag::new(r#"json:"a\'b""#);
        assert_eq!(tag.lookup("json"), None);
        assert_eq!(tag.get("json"), "");
        assert!(matches!(tag.pairs(), Err(TagError::BadEscape { .. })));

        let plain = StructTag::new(r#"json:"a'b""#);
        assert_eq!(plain.get("json"), "a'b");
    }

    #[test]
    fn octal_escapes_above_a_byte_are_rejected() {
        assert_eq!(StructTag::new(r#"a:"\377""#).get("a"), "\u{ff}");
        assert_eq!(StructTag::new(r#"a:"\400""#).lookup("a"), None);
        assert_eq!(StructTag::new(r#"a:"\777""#).lookup("a"), None);
    }

    #[test]
    fn lenient_lookup_stops_at_malformed_pair() {
        let tag = StructTag::new(r#"json:"ok" broken description:"never seen""#);
        assert_eq!(tag.get("json"), "ok");
        assert_eq!(tag.get("description"), "");
    }

    #[test]
    fn lenient_lookup_tolerates_extra_spaces() {
        let tag = StructTag::new(r#"   json:"a"    protobuf:"bytes,1,opt,name=a"  "#);
        assert_eq!(tag.get("json"), "a");
        assert_eq!(tag.get("protobuf"), "bytes,1,opt,name=a");
    }

    #[test]
    fn first_occurrence_wins() {
        let tag = StructTag::new(r#"json:"first" json:"second""#);
        assert_eq!(tag.get("json"), "first");
    }

    #[test]
    fn strict_pairs_in_order() {
        let tag = StructTag::new(r#"json:"a,omitempty" protobuf:"bytes,1,opt""#);
        assert_eq!(
            tag.pairs().unwrap(),
            vec![
                ("json".to_string(), "a,omitempty".to_string()),
                ("protobuf".to_string(), "bytes,1,opt".to_string()),
            ]
        );
    }

    #[test]
    fn strict_rejects_bare_key() {
        let err = StructTag::new(r#"json:"a" broken"#).pairs().unwrap_err();
        assert_eq!(
            err,
            TagError::MissingValue {
                key: "broken".to_string(),
                offset: 9
            }
        );
    }

    #[test]
    fn strict_rejects_unterminated_value() {
        let err = StructTag::new(r#"json:"abc"#).pairs().unwrap_err();
        assert_eq!(err, TagError::Unterminated { key: "json".to_string() });
    }

    #[test]
    fn strict_rejects_missing_separator() {
        let err = StructTag::new(r#"json:"a"yaml:"b""#).pairs().unwrap_err();
        assert_eq!(err, TagError::MissingSeparator { key: "json".to_string() });
    }

    #[test]
    fn strict_rejects_bad_escape() {
        let err = StructTag::new(r#"json:"\q""#).pairs().unwrap_err();
        assert!(matches!(err, TagError::BadEscape { ref key, .. } if key == "json"));
    }

    #[test]
    fn serde_is_transparent() {
        let tag: StructTag = serde_json::from_str(r#""json:\"a\"""#).unwrap();
        assert_eq!(tag.get("json"), "a");
        assert_eq!(serde_json::to_string(&tag).unwrap(), r#""json:\"a\"""#);
    }
}
