#![forbid(unsafe_code)]

//! Byte rendering for canonical output: character escaping and the
//! sorted namespace/attribute forms both C14N flavors share.

/// Escape character data. C14N escapes `&`, `<`, `>` and carriage
/// returns in text content.
pub(super) fn escape_text(value: &str, out: &mut Vec<u8>) {
    for ch in value.chars() {
        match ch {
            '&' => out.extend_from_slice(b"&amp;"),
            '<' => out.extend_from_slice(b"&lt;"),
            '>' => out.extend_from_slice(b"&gt;"),
            '\r' => out.extend_from_slice(b"&#xD;"),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Escape an attribute value. C14N escapes `&`, `<`, `"` and the
/// whitespace characters that attribute-value normalization would
/// otherwise fold.
pub(super) fn escape_attr(value: &str, out: &mut Vec<u8>) {
    for ch in value.chars() {
        match ch {
            '&' => out.extend_from_slice(b"&amp;"),
            '<' => out.extend_from_slice(b"&lt;"),
            '"' => out.extend_from_slice(b"&quot;"),
            '\t' => out.extend_from_slice(b"&#x9;"),
            '\n' => out.extend_from_slice(b"&#xA;"),
            '\r' => out.extend_from_slice(b"&#xD;"),
            _ => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// A namespace declaration pending output. Sorts by prefix, which puts
/// the default declaration (empty prefix) first as C14N requires.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(super) struct NsDecl {
    pub prefix: String,
    pub uri: String,
}

impl NsDecl {
    pub fn render(&self, out: &mut Vec<u8>) {
        if self.prefix.is_empty() {
            out.extend_from_slice(b" xmlns=\"");
        } else {
            out.extend_from_slice(b" xmlns:");
            out.extend_from_slice(self.prefix.as_bytes());
            out.extend_from_slice(b"=\"");
        }
        escape_attr(&self.uri, out);
        out.push(b'"');
    }
}

/// An attribute pending output. C14N orders attributes by namespace
/// URI (unnamespaced first), then by local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Attr {
    pub namespace: Option<String>,
    pub local: String,
    pub qname: String,
    pub value: String,
}

impl Attr {
    pub fn render(&self, out: &mut Vec<u8>) {
        out.push(b' ');
        out.extend_from_slice(self.qname.as_bytes());
        out.extend_from_slice(b"=\"");
        escape_attr(&self.value, out);
        out.push(b'"');
    }

    fn sort_key(&self) -> (&Option<String>, &str) {
        (&self.namespace, &self.local)
    }
}

impl PartialOrd for Attr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Attr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Render a comment node.
pub(super) fn render_comment(text: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<!--");
    out.extend_from_slice(text.as_bytes());
    out.extend_from_slice(b"-->");
}

/// Render a processing instruction.
pub(super) fn render_pi(target: &str, value: Option<&str>, out: &mut Vec<u8>) {
    out.extend_from_slice(b"<?");
    out.extend_from_slice(target.as_bytes());
    if let Some(value) = value {
        if !value.is_empty() {
            out.push(b' ');
            out.extend_from_slice(value.as_bytes());
        }
    }
    out.extend_from_slice(b"?>");
}
