//! A small element-tree reader for the XML subset feature model files use:
//! elements, attributes, character data, comments, processing instructions,
//! CDATA sections and the predefined entities. Namespaces and DTDs are not
//! interpreted.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<\?.*?\?>|<!DOCTYPE[^>]*>|<!\[CDATA\[(?P<cdata>.*?)\]\]>|<(?P<close>/)?(?P<name>[A-Za-z_][\w.\-:]*)(?P<attrs>(?:\s+[\w.\-:]+\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*(?P<empty>/)?>"#,
    )
    .expect("valid xml token regex")
});
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[\w.\-:]+)\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
        .expect("valid xml attribute regex")
});
static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?P<ref>#x[0-9a-fA-F]+|#[0-9]+|[A-Za-z]+);").expect("valid xml entity regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data directly inside the element.
    pub text: String,
    /// 1-based line of the start tag.
    pub line: usize,
}

impl XmlElement {
    fn new(name: &str, attrs: Vec<(String, String)>, line: usize) -> Self {
        Self {
            name: name.to_string(),
            attrs,
            children: Vec::new(),
            text: String::new(),
            line,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Where and why a document was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlError {
    pub line: usize,
    pub message: String,
}

impl XmlError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parse a document and return its root element.
pub(crate) fn parse_document(content: &str) -> Result<XmlElement, XmlError> {
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut position = 0;
    let mut line = 1;

    for token in TOKEN.captures_iter(content) {
        let whole = token.get(0).map_or(0..0, |m| m.range());
        let between = &content[position..whole.start];
        line += between.matches('\n').count();
        append_text(&mut stack, between, line)?;
        let start_line = line;
        line += content[whole.clone()].matches('\n').count();
        position = whole.end;

        if let Some(cdata) = token.name("cdata") {
            if let Some(open) = stack.last_mut() {
                open.text.push_str(cdata.as_str());
            }
            continue;
        }
        let Some(name) = token.name("name").map(|m| m.as_str()) else {
            // comment, processing instruction or doctype
            continue;
        };

        if token.name("close").is_some() {
            let element = stack
                .pop()
                .ok_or_else(|| XmlError::new(start_line, format!("unexpected </{name}>")))?;
            if element.name != name {
                return Err(XmlError::new(
                    start_line,
                    format!("expected </{}>, found </{name}>", element.name),
                ));
            }
            attach(&mut stack, &mut root, element)?;
            continue;
        }

        let attrs = token
            .name("attrs")
            .map(|m| parse_attributes(m.as_str()))
            .unwrap_or_default();
        let element = XmlElement::new(name, attrs, start_line);
        if token.name("empty").is_some() {
            attach(&mut stack, &mut root, element)?;
        } else {
            stack.push(element);
        }
    }

    let rest = &content[position..];
    line += rest.matches('\n').count();
    append_text(&mut stack, rest, line)?;

    if let Some(open) = stack.last() {
        return Err(XmlError::new(open.line, format!("<{}> is never closed", open.name)));
    }
    root.ok_or_else(|| XmlError::new(1, "document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(XmlError::new(
                element.line,
                "document has more than one root element",
            ))
        }
    }
    Ok(())
}

fn append_text(stack: &mut [XmlElement], raw: &str, line: usize) -> Result<(), XmlError> {
    if raw.contains('<') {
        return Err(XmlError::new(line, "malformed markup"));
    }
    match stack.last_mut() {
        Some(open) => open.text.push_str(&unescape(raw)),
        None if raw.trim().is_empty() => {}
        None => return Err(XmlError::new(line, "text outside the root element")),
    }
    Ok(())
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .map_or("", |m| m.as_str());
            (caps["key"].to_string(), unescape(value))
        })
        .collect()
}

fn unescape(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let reference = &caps["ref"];
            let decoded = match reference {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => reference
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| reference.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn builds_element_tree() {
        let root = parse_document(indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <!-- generated -->
            <model name='bike'>
                <item id="1"/>
                <item id="2">R&amp;D &#x41;</item>
            </model>
        "#})
        .unwrap();

        assert_eq!(root.name, "model");
        assert_eq!(root.attr("name"), Some("bike"));
        assert_eq!(root.line, 3);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].text, "R&D A");
        assert_eq!(root.children[1].line, 5);
        assert_eq!(root.child("item").and_then(|c| c.attr("id")), Some("1"));
    }

    #[test]
    fn cdata_is_kept_verbatim() {
        let root = parse_document("<a><![CDATA[x < y]]></a>").unwrap();
        assert_eq!(root.text, "x < y");
    }

    #[test]
    fn mismatched_close_tag_is_reported_with_line() {
        let err = parse_document("<a>\n<b>\n</a>").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("expected </b>"), "{}", err.message);
    }

    #[test]
    fn unclosed_and_empty_documents_are_rejected() {
        assert!(parse_document("<a><b/>").is_err());
        assert!(parse_document("   ").is_err());
        assert!(parse_document("<a/><b/>").is_err());
    }
}
