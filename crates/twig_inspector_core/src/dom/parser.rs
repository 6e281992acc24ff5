//! Tolerant HTML to `Document` builder.
//!
//! Covers what rendered pages need for provenance scanning: elements,
//! attributes, text, comments, void elements and raw-text `script`/`style`.
//! Malformed markup never fails; unmatched end tags are dropped and open
//! elements are closed at end of input.

use crate::dom::document::{Document, NodeId};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    Comment(String),
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Parses `html` into a new document.
pub fn parse_html(html: &str) -> Document {
    let mut document = Document::new();
    let root = document.root();
    let mut open: Vec<(String, NodeId)> = Vec::new();

    for token in tokenize(html) {
        let parent = open.last().map(|(_, id)| *id).unwrap_or(root);
        match token {
            Token::Text(text) => {
                let node = document.create_text(text);
                document.append_child(parent, node);
            }
            Token::Comment(text) => {
                let node = document.create_comment(text);
                document.append_child(parent, node);
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let node = document.create_element(&name);
                for (key, value) in attributes {
                    document.set_attribute(node, &key, value);
                }
                document.append_child(parent, node);
                if !self_closing {
                    open.push((name, node));
                }
            }
            Token::EndTag(name) => {
                if let Some(position) = open.iter().rposition(|(open_name, _)| *open_name == name) {
                    open.truncate(position);
                }
            }
        }
    }

    log::trace!(
        "event=html_parse module=dom nodes={} bytes={}",
        document.len(),
        html.len()
    );
    document
}

fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            out.push(Token::Text(decode_entities(&input[start..i])));
            continue;
        }

        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            let body_start = i + COMMENT_START.len();
            match input[body_start..].find(COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + COMMENT_END.len();
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    i = bytes.len();
                }
            }
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            // doctype and processing instructions carry nothing we scan
            i += rest.find('>').map(|end| end + 1).unwrap_or(rest.len());
            continue;
        }

        if rest.starts_with("</") {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < bytes.len() && bytes[j] != b'>' {
                j += 1;
            }
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            i = (j + 1).min(bytes.len());
            continue;
        }

        let start = i + 1;
        let mut j = start;
        while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if j == start {
            // a lone `<` is text
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let (attributes, self_closing, after) = read_attributes(input, j);
        let self_closing = self_closing || is_void_element(&name);
        i = after;

        let raw_text = !self_closing && (name == "script" || name == "style");
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if raw_text {
            let close = format!("</{name}");
            let haystack = &input[i..];
            let end = find_ignore_ascii_case(haystack, &close).unwrap_or(haystack.len());
            if end > 0 {
                out.push(Token::Text(haystack[..end].to_string()));
            }
            out.push(Token::EndTag(name));
            i += end;
            if i < bytes.len() {
                i += input[i..].find('>').map(|k| k + 1).unwrap_or(input.len() - i);
            }
        }
    }
    out
}

/// Reads attributes from `input[k..]` up to and including the closing `>`.
fn read_attributes(input: &str, mut k: usize) -> (Vec<(String, String)>, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes = Vec::new();
    let mut self_closing = false;
    let is_name_char = |c: u8| c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.');

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }

        let name_start = k;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            k += 1;
            continue;
        }
        let name = input[name_start..k].to_ascii_lowercase();

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let mut value = String::new();
        if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let value_start = k;
                while k < len && bytes[k] != quote {
                    k += 1;
                }
                value = decode_entities(&input[value_start..k]);
                if k < len {
                    k += 1;
                }
            } else {
                let value_start = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                value = decode_entities(&input[value_start..k]);
            }
        }
        attributes.push((name, value));
    }
    (attributes, self_closing, k)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&at| hay[at..at + needle.len()].eq_ignore_ascii_case(needle))
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(&rest[..at]);
        rest = &rest[at..];
        let decoded = rest.find(';').and_then(|end| {
            let entity = &rest[1..end];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
