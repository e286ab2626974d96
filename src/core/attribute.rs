//! Attribute value model
//!
//! This module provides:
//! - `Value`: tagged union over integer, float and string payloads
//! - `Attribute`: a named value
//! - `AttributeSet`: ordered, duplicate-tolerant sequence of attributes
//! - `CombinedView`: read-only chain of several sets, used by filters
//!
//! A `Value<'a>` whose string is `Cow::Borrowed` is a view into caller memory and
//! is only valid for the caller's frame. [`OwnedValue`] (`Value<'static>` produced by
//! [`Value::into_owned`]) never borrows, so it may be retained by scoped context
//! and by queued frontends.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Well-known attribute names populated by the logger itself.
pub mod names {
    /// Microseconds since the Unix epoch
    pub const TIMESTAMP: &str = "timestamp";
    pub const PID: &str = "pid";
    pub const TID: &str = "tid";
    pub const LWP: &str = "lwp";
    pub const SEVERITY: &str = "severity";
    pub const MESSAGE: &str = "message";
}

/// Capacity hint for the logger-generated set.
pub const INTERNAL_SET_RESERVED_SIZE: usize = 6;

/// Capacity hint for the caller-supplied set, applied before scoped attributes are merged.
pub const EXTERNAL_SET_RESERVED_SIZE: usize = 16;

/// Value of a single attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
}

/// A value that holds no reference into caller memory.
pub type OwnedValue = Value<'static>;

impl<'a> Value<'a> {
    /// Convert into an owned value, deep-copying a borrowed string.
    #[must_use]
    pub fn into_owned(self) -> OwnedValue {
        match self {
            Value::Int(i) => Value::Int(i),
            Value::Float(f) => Value::Float(f),
            Value::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
        }
    }

    /// Owned copy of this value, leaving `self` untouched.
    #[must_use]
    pub fn to_owned_value(&self) -> OwnedValue {
        match self {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(Cow::Owned(s.as_ref().to_owned())),
        }
    }

    /// Borrowing view of this value.
    #[must_use]
    pub fn view(&self) -> Value<'_> {
        match self {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(Cow::Borrowed(s.as_ref())),
        }
    }

    /// Whether the payload points into memory owned by someone else.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Value::Str(Cow::Borrowed(_)))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Short name of the active variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value<'_> {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value<'_> {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value<'_> {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<f32> for Value<'_> {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::Str(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::Str(s)
    }
}

/// A named attribute. The name is always owned.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    pub name: String,
    pub value: Value<'a>,
}

impl<'a> Attribute<'a> {
    pub fn new(name: impl Into<String>, value: impl Into<Value<'a>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: self.name,
            value: self.value.into_owned(),
        }
    }
}

impl fmt::Display for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Ordered sequence of attributes
///
/// Insertion order is preserved and names are not deduplicated: this is an
/// append log, so two attributes with the same name are both kept and both
/// emitted by frontends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet<'a> {
    attributes: Vec<Attribute<'a>>,
}

impl<'a> AttributeSet<'a> {
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: Vec::with_capacity(capacity),
        }
    }

    /// Capacity hint; has no observable effect on contents.
    pub fn reserve(&mut self, additional: usize) {
        self.attributes.reserve(additional);
    }

    /// Append an attribute at the end of the set
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value<'a>>) {
        self.attributes.push(Attribute::new(name, value));
    }

    /// Builder-style `push`
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value<'a>>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push_attribute(&mut self, attribute: Attribute<'a>) {
        self.attributes.push(attribute);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute<'a>> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// First attribute with the given name
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// Deep copy that no longer borrows caller memory
    #[must_use]
    pub fn into_owned(self) -> AttributeSet<'static> {
        AttributeSet {
            attributes: self
                .attributes
                .into_iter()
                .map(Attribute::into_owned)
                .collect(),
        }
    }

    /// Owned copy, leaving `self` untouched
    #[must_use]
    pub fn to_owned_set(&self) -> AttributeSet<'static> {
        AttributeSet {
            attributes: self
                .attributes
                .iter()
                .map(|attr| Attribute {
                    name: attr.name.clone(),
                    value: attr.value.to_owned_value(),
                })
                .collect(),
        }
    }

    /// Format as space-separated `name=value` pairs
    pub fn format_fields(&self) -> String {
        self.attributes
            .iter()
            .map(|attr| attr.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> Extend<Attribute<'a>> for AttributeSet<'a> {
    fn extend<I: IntoIterator<Item = Attribute<'a>>>(&mut self, iter: I) {
        self.attributes.extend(iter);
    }
}

impl<'a> FromIterator<Attribute<'a>> for AttributeSet<'a> {
    fn from_iter<I: IntoIterator<Item = Attribute<'a>>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for AttributeSet<'a> {
    type Item = Attribute<'a>;
    type IntoIter = std::vec::IntoIter<Attribute<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s AttributeSet<'a> {
    type Item = &'s Attribute<'a>;
    type IntoIter = std::slice::Iter<'s, Attribute<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl<'a> From<Attribute<'a>> for AttributeSet<'a> {
    fn from(attribute: Attribute<'a>) -> Self {
        Self {
            attributes: vec![attribute],
        }
    }
}

impl fmt::Display for AttributeSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl Serialize for AttributeSet<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for attr in &self.attributes {
            map.serialize_entry(&attr.name, &attr.value)?;
        }
        map.end()
    }
}

/// Read-only chain of attribute sets
///
/// Iterates the scoped frames bottom to top, then the trailing sets in order.
/// Nothing is copied or merged.
#[derive(Debug, Clone, Copy)]
pub struct CombinedView<'v, 'a> {
    scoped: &'v [AttributeSet<'a>],
    trailing: [Option<&'v AttributeSet<'a>>; 2],
}

impl<'v, 'a> CombinedView<'v, 'a> {
    pub fn new(scoped: &'v [AttributeSet<'a>], external: &'v AttributeSet<'a>) -> Self {
        Self {
            scoped,
            trailing: [Some(external), None],
        }
    }

    pub fn of_pair(first: &'v AttributeSet<'a>, second: &'v AttributeSet<'a>) -> Self {
        Self {
            scoped: &[],
            trailing: [Some(first), Some(second)],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'v Attribute<'a>> + 'v {
        let trailing = self.trailing;
        self.scoped
            .iter()
            .chain(trailing.into_iter().flatten())
            .flat_map(|set| set.iter())
    }

    /// Last attribute with the given name, so inner scopes and caller-supplied
    /// values shadow outer ones.
    pub fn get(&self, name: &str) -> Option<&'v Value<'a>> {
        self.iter()
            .filter(|attr| attr.name == name)
            .last()
            .map(|attr| &attr.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|attr| attr.name == name)
    }

    pub fn len(&self) -> usize {
        self.scoped.iter().map(AttributeSet::len).sum::<usize>()
            + self.trailing.iter().flatten().map(|set| set.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
