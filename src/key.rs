use std::fmt;
use std::hash::{Hash, Hasher};

use crate::shape::{Shape, TypeInfo};

/// Identity of an ordered (source, destination) type pair.
///
/// Equality and hashing only look at the two `TypeId`s, so `Option<A>`,
/// `Box<A>` and `A` produce distinct keys.
#[derive(Debug, Clone, Copy)]
pub struct TypePairKey {
    pub source: TypeInfo,
    pub dest: TypeInfo,
}

impl TypePairKey {
    pub fn new(source: TypeInfo, dest: TypeInfo) -> Self {
        Self { source, dest }
    }

    /// `"{Src}_{Dst}"`, using struct names where the sides are structs.
    pub fn profile_name(&self) -> String {
        format!("{}_{}", short_name(&self.source), short_name(&self.dest))
    }
}

pub(crate) fn short_name(info: &TypeInfo) -> &'static str {
    match info.shape {
        Shape::Struct(structure) => structure.name,
        _ => info.type_name,
    }
}

impl PartialEq for TypePairKey {
    fn eq(&self, other: &Self) -> bool {
        self.source.type_id == other.source.type_id && self.dest.type_id == other.dest.type_id
    }
}

impl Eq for TypePairKey {}

impl Hash for TypePairKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.type_id.hash(state);
        self.dest.type_id.hash(state);
    }
}

impl fmt::Display for TypePairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.dest)
    }
}
