///! Some utility functions to walk, read and write XML feeds

use minidom::Element;

use crate::error::{Error, Result};
use crate::schema::ns;

/// Walks an XML tree and returns every element that has the given name
pub fn find_elems<S: AsRef<str>>(root: &Element, searched_name: S) -> Vec<&Element> {
    let searched_name = searched_name.as_ref();
    let mut elems: Vec<&Element> = Vec::new();

    for el in root.children() {
        if el.name() == searched_name {
            elems.push(el);
        } else {
            let ret = find_elems(el, searched_name);
            elems.extend(ret);
        }
    }
    elems
}

/// Walks an XML tree until it finds an elements with the given name
pub fn find_elem<S: AsRef<str>>(root: &Element, searched_name: S) -> Option<&Element> {
    let searched_name = searched_name.as_ref();
    if root.name() == searched_name {
        return Some(root);
    }

    for el in root.children() {
        if el.name() == searched_name {
            return Some(el);
        } else {
            let ret = find_elem(el, searched_name);
            if ret.is_some() {
                return ret;
            }
        }
    }
    None
}

/// Returns the value of an attribute, whatever namespace prefix it has been written with (e.g. `gd:etag` or `etag`)
pub fn attr_any_prefix<'a>(element: &'a Element, local_name: &str) -> Option<&'a str> {
    if let Some(value) = element.attr(local_name) {
        return Some(value);
    }
    element.attrs()
        .find(|(name, _)| name.rsplit(':').next() == Some(local_name))
        .map(|(_, value)| value)
}

/// Returns the `href` of the first `<link>` child with the given relation
pub fn link_href<'a>(entry: &'a Element, rel: &str) -> Option<&'a str> {
    entry.children()
        .filter(|el| el.name() == "link")
        .find(|el| el.attr("rel") == Some(rel))
        .and_then(|el| el.attr("href"))
}

/// Serialize an element (and its subtree) into a document
pub fn xml_to_string(element: &Element) -> Result<String> {
    let mut buffer = Vec::new();
    element.write_to(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|err| Error::MalformedResponse(format!("invalid UTF-8 in XML: {}", err)))
}

/// Namespace declarations every entry must carry before it can be interpreted
const ENTRY_NAMESPACES: [(&str, &str); 3] = [
    ("xmlns", ns::ATOM),
    ("xmlns:gd", ns::GD),
    ("xmlns:gCal", ns::GCAL),
];

/// Feeds may also hold access rules
const FEED_NAMESPACES: [(&str, &str); 4] = [
    ("xmlns", ns::ATOM),
    ("xmlns:gd", ns::GD),
    ("xmlns:gCal", ns::GCAL),
    ("xmlns:gAcl", ns::GACL),
];

/// Adds the Atom, `gd` and `gCal` namespace declarations to the root element of `text`, unless it already declares them.
///
/// Entries cut out of a feed (or returned alone by some servers) often rely on declarations that lived on the enclosing `<feed>`
pub fn inject_namespaces(text: &str) -> String {
    declare_namespaces(text, &ENTRY_NAMESPACES)
}

fn declare_namespaces(text: &str, namespaces: &[(&str, &str)]) -> String {
    let (start, end) = match root_start_tag(text) {
        None => return text.to_string(),
        Some(bounds) => bounds,
    };
    let start_tag = &text[start..end];

    let mut missing = String::new();
    for (attr, uri) in namespaces {
        if start_tag.contains(&format!("{}=", attr)) == false {
            missing.push_str(&format!(" {}=\"{}\"", attr, uri));
        }
    }
    if missing.is_empty() {
        return text.to_string();
    }

    // Declarations go right after the tag name
    let name_end = start_tag[1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .map(|i| start + 1 + i)
        .unwrap_or(end);
    format!("{}{}{}", &text[..name_end], missing, &text[name_end..])
}

/// Byte bounds of the start tag of the root element (from `<` up to, excluding, the closing `>`)
fn root_start_tag(text: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    loop {
        let open = pos + text[pos..].find('<')?;
        let rest = &text[open..];
        if rest.starts_with("<?") {
            pos = open + rest.find("?>")? + 2;
        } else if rest.starts_with("<!--") {
            pos = open + rest.find("-->")? + 3;
        } else if rest.starts_with("<!") {
            pos = open + rest.find('>')? + 1;
        } else {
            let mut quote: Option<char> = None;
            for (i, c) in rest.char_indices() {
                match (quote, c) {
                    (Some(q), c) if c == q => quote = None,
                    (Some(_), _) => {},
                    (None, '"') | (None, '\'') => quote = Some(c),
                    (None, '>') => {
                        let end = if rest[..i].ends_with('/') { open + i - 1 } else { open + i };
                        return Some((open, end));
                    },
                    _ => {},
                }
            }
            return None;
        }
    }
}

/// Parse a single entry, as returned when creating or fetching one entity
pub fn parse_entry(text: &str) -> Result<Element> {
    if text.trim().is_empty() {
        return Err(Error::MalformedResponse(String::from("empty document")));
    }
    let root: Element = inject_namespaces(text).parse()?;
    if root.name() != "entry" {
        return Err(Error::MalformedResponse(format!("expected an <entry>, got a <{}>", root.name())));
    }
    Ok(root)
}

/// Parse a feed document. Its entries can be found with [`feed_entries`].
///
/// Namespace declarations the feed lacks are added to its root, where its entries inherit them
pub fn parse_feed(text: &str) -> Result<Element> {
    if text.trim().is_empty() {
        return Err(Error::MalformedResponse(String::from("empty document")));
    }
    let root: Element = declare_namespaces(text, &FEED_NAMESPACES).parse()?;
    Ok(root)
}

/// The `<entry>` children of a feed
pub fn feed_entries(feed: &Element) -> Vec<&Element> {
    feed.children()
        .filter(|el| el.name() == "entry")
        .collect()
}
