//! Field correspondence between two struct shapes.
//!
//! A [`Profile`] is computed once when a pair is registered and replayed on
//! every conversion. For each source field the first matching rule wins:
//!
//! 1. the camel-cased source name equals a destination field name
//! 2. the source name equals a destination field name
//! 3. the source tag equals a destination field name
//! 4. the source tag equals a destination tag
//!
//! Exposed source methods named like a destination field are appended last,
//! so a computed value overrides a same-named field on replay.

use crate::shape::{FieldMeta, StructInfo};

/// Where a destination field takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSource {
    /// Read the named source field
    Field(&'static str),
    /// Invoke the named zero-argument source method
    Method(&'static str),
}

impl FieldSource {
    pub fn name(&self) -> &'static str {
        match self {
            FieldSource::Field(name) | FieldSource::Method(name) => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Correspondence {
    pub source: FieldSource,
    pub dest: &'static str,
}

/// The ordered correspondence list of one struct pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    correspondences: Vec<Correspondence>,
}

impl Profile {
    /// Builds the profile of `source` into `dest`.
    pub fn build(name: impl Into<String>, source: &StructInfo, dest: &StructInfo) -> Self {
        let name = name.into();
        let mut correspondences = Vec::new();

        for field in source.fields {
            match match_field(field, dest) {
                Some(target) => push_unique(
                    &mut correspondences,
                    Correspondence {
                        source: FieldSource::Field(field.name),
                        dest: target,
                    },
                ),
                None => log::debug!("{name}: source field `{}` has no counterpart", field.name),
            }
        }

        for &method in source.methods {
            if let Some(target) = dest.field(method) {
                push_unique(
                    &mut correspondences,
                    Correspondence {
                        source: FieldSource::Method(method),
                        dest: target.name,
                    },
                );
            }
        }

        Self {
            name,
            correspondences,
        }
    }

    /// `"{Src}_{Dst}"`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn correspondences(&self) -> &[Correspondence] {
        &self.correspondences
    }

    /// The subset whose values come from method calls.
    pub fn method_sourced(&self) -> impl Iterator<Item = &Correspondence> {
        self.correspondences
            .iter()
            .filter(|entry| matches!(entry.source, FieldSource::Method(_)))
    }

    /// Every source feeding the given destination field, in replay order.
    pub fn sources_for(&self, dest: &str) -> Vec<FieldSource> {
        self.correspondences
            .iter()
            .filter(|entry| entry.dest == dest)
            .map(|entry| entry.source)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.correspondences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.correspondences.is_empty()
    }
}

fn match_field(field: &FieldMeta, dest: &StructInfo) -> Option<&'static str> {
    let camel = to_camel_case(field.name);
    if let Some(target) = dest.field(&camel) {
        return Some(target.name);
    }
    if let Some(target) = dest.field(field.name) {
        return Some(target.name);
    }

    let tag = field.tag?;
    if let Some(target) = dest.field(tag) {
        return Some(target.name);
    }
    dest.fields
        .iter()
        .find(|target| target.tag == Some(tag))
        .map(|target| target.name)
}

fn push_unique(list: &mut Vec<Correspondence>, entry: Correspondence) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}

/// Converts an identifier to lower camel case.
///
/// Words are split on separators, lower-to-upper transitions and the end of
/// an acronym: `product_name` and `ProductName` both become `productName`,
/// `HTTPServer` becomes `httpServer`.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, word) in split_words(name).iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
