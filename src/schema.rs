//! Declarative mapping between record attributes and Atom/GData elements
//!
//! Each entity type describes its wire form as an ordered list of [`Field`]s. [`build`] and [`apply`] walk such a list,
//! so that supporting a new attribute is a matter of adding a line to a table.

use minidom::{Element, ElementBuilder};

use crate::error::{Error, Result};

/// XML namespaces of the feeds
pub mod ns {
    pub const ATOM: &str = "http://www.w3.org/2005/Atom";
    pub const GD: &str = "http://schemas.google.com/g/2005";
    pub const GCAL: &str = "http://schemas.google.com/gCal/2005";
    pub const GACL: &str = "http://schemas.google.com/acl/2007";
}

/// Where a value lives inside its element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// The text content of the element
    Text,
    /// The given attribute of the element
    Attr(&'static str),
}

/// One attribute of a record, and the element it is written to
pub struct Field<R: 'static> {
    pub element: &'static str,
    pub ns: &'static str,
    pub slot: Slot,
    /// Constant attributes written alongside the value (e.g. `type="text"`)
    pub fixed_attrs: &'static [(&'static str, &'static str)],
    /// `None` means the element is not written at all
    pub get: fn(&R) -> Option<String>,
    pub set: fn(&mut R, &str) -> Result<()>,
}

/// Append one element per field to `entry`, in table order
pub fn build<R>(fields: &[Field<R>], record: &R, mut entry: ElementBuilder) -> ElementBuilder {
    for field in fields {
        let value = match (field.get)(record) {
            None => continue,
            Some(value) => value,
        };
        let mut child = Element::builder(field.element, field.ns);
        for (name, fixed) in field.fixed_attrs {
            child = child.attr(*name, *fixed);
        }
        child = match field.slot {
            Slot::Text => child.append(value),
            Slot::Attr(attr) => child.attr(attr, value),
        };
        entry = entry.append(child.build());
    }
    entry
}

/// Set the record attributes from the matching children of `entry`.
///
/// Elements that are absent leave the attribute untouched. A value rejected by its setter makes the whole entry malformed
pub fn apply<R>(fields: &[Field<R>], entry: &Element, record: &mut R) -> Result<()> {
    for child in entry.children() {
        let field = match fields.iter().find(|f| f.element == child.name()) {
            None => continue,
            Some(f) => f,
        };
        let value = match field.slot {
            Slot::Text => child.text(),
            Slot::Attr(attr) => match child.attr(attr) {
                None => continue,
                Some(v) => v.to_string(),
            },
        };
        (field.set)(record, &value)
            .map_err(|err| Error::MalformedResponse(format!("invalid <{}>: {}", field.element, err)))?;
    }
    Ok(())
}

/// An empty `<entry>`, ready to be filled by [`build`]
pub fn entry_builder() -> ElementBuilder {
    Element::builder("entry", ns::ATOM)
}

/// The `<category>` that tells which kind of entity an entry describes
pub fn kind_category(term: &str) -> Element {
    Element::builder("category", ns::ATOM)
        .attr("scheme", "http://schemas.google.com/g/2005#kind")
        .attr("term", term)
        .build()
}

pub const EVENT_KIND: &str = "http://schemas.google.com/g/2005#event";
pub const ACL_RULE_KIND: &str = "http://schemas.google.com/acl/2007#accessRule";

/// Role granting anonymous read access to a calendar
pub const ROLE_PUBLIC_READ: &str = "http://schemas.google.com/gCal/2005#read";
/// Role denying anonymous access
pub const ROLE_NONE: &str = "none";

/// The access rule applying to everyone (the "default" scope), with the given role
pub fn default_acl_rule(role: &str) -> Element {
    entry_builder()
        .append(kind_category(ACL_RULE_KIND))
        .append(Element::builder("scope", ns::GACL).attr("type", "default").build())
        .append(Element::builder("role", ns::GACL).attr("value", role).build())
        .build()
}

/// Look for the rule of the default scope in an access-control feed, and tell whether its role grants read access.
///
/// Returns `None` when the feed has no such rule
pub fn default_scope_is_public(acl_feed: &Element) -> Option<bool> {
    for entry in acl_feed.children().filter(|el| el.name() == "entry") {
        let is_default = entry.children()
            .any(|el| el.name() == "scope" && el.attr("type") == Some("default"));
        if is_default == false {
            continue;
        }
        if let Some(role) = entry.children().find(|el| el.name() == "role") {
            let value = role.attr("value").unwrap_or("");
            return Some(value.contains("#read"));
        }
    }
    None
}

/// Parse the `"true"`/`"false"` value attributes
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::Validation(format!("expected true or false, got {:?}", other))),
    }
}
