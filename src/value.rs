//! Dynamic access to mappable values.
//!
//! [`Mappable`] is object safe: the converter only ever sees `&dyn Mappable`
//! and `&mut dyn Mappable` and decides what to do from [`ValueRef`] and
//! [`ValueMut`]. Structs get their implementation from
//! `#[derive(Mappable)]`; std types are covered in `impls`.

use std::any::Any;

use crate::error::Result;
use crate::shape::TypeInfo;

/// A value the mapper can read from and write into.
pub trait Mappable: Any + Send + Sync {
    fn type_info(&self) -> TypeInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn value_ref(&self) -> ValueRef<'_>;

    fn value_mut(&mut self) -> ValueMut<'_>;

    /// The zero/empty test used for null propagation.
    fn is_zero(&self) -> bool;

    /// Copies `src` into `self` when both are the same leaf type.
    ///
    /// Returns `false` (leaving `self` untouched) for any other combination.
    fn try_assign(&mut self, src: &dyn Mappable) -> bool;

    /// Replaces `self` with a value of the same concrete type.
    ///
    /// The box is handed back unchanged when its type does not match.
    fn apply_any(
        &mut self,
        value: Box<dyn Any + Send>,
    ) -> std::result::Result<(), Box<dyn Any + Send>>;

    /// A boxed default value of the same concrete type.
    fn new_empty(&self) -> Box<dyn Mappable>;
}

/// A mappable type with a static descriptor and a default instance.
pub trait Typed: Mappable + Default {
    fn describe() -> TypeInfo;
}

/// Read view of a value.
pub enum ValueRef<'a> {
    /// Scalars and opaque leaves
    Leaf(&'a dyn Mappable),
    Struct(&'a dyn StructAccess),
    Seq(&'a dyn SeqAccess),
    Map(&'a dyn MapAccess),
    /// Pointee of an `Option`/`Box`, `None` when null
    Pointer(Option<&'a dyn Mappable>),
    /// Concrete value behind a `Box<dyn Mappable>`
    Interface(&'a dyn Mappable),
}

/// Write view of a value.
pub enum ValueMut<'a> {
    Leaf(&'a mut dyn Mappable),
    Struct(&'a mut dyn StructAccess),
    Seq(&'a mut dyn SeqAccess),
    Map(&'a mut dyn MapAccess),
    Pointer(&'a mut dyn PointerAccess),
    /// The interface slot itself, so its content can be replaced
    Interface(&'a mut Box<dyn Mappable>),
}

/// Field and method access for structs.
pub trait StructAccess {
    fn field(&self, name: &str) -> Option<&dyn Mappable>;

    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Mappable>;

    /// Invokes an exposed zero-argument method by name.
    fn call_method(&self, name: &str) -> Option<Box<dyn Mappable>>;
}

/// Callback filling a freshly allocated slot.
pub type Fill<'f> = &'f mut dyn FnMut(&mut dyn Mappable) -> Result<()>;

/// Callback filling a freshly allocated key/value pair.
pub type FillEntry<'f> = &'f mut dyn FnMut(&mut dyn Mappable, &mut dyn Mappable) -> Result<()>;

pub trait SeqAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Mappable>;

    fn clear(&mut self);

    /// Appends a default element after `fill` has written into it.
    fn push_with(&mut self, fill: Fill<'_>) -> Result<()>;
}

pub trait MapAccess {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Vec<(&dyn Mappable, &dyn Mappable)>;

    fn clear(&mut self);

    /// Inserts a default key/value pair after `fill` has written into both.
    fn insert_with(&mut self, fill: FillEntry<'_>) -> Result<()>;
}

pub trait PointerAccess {
    /// Nulls the pointer; a `Box` resets its pointee to the default.
    fn set_null(&mut self);

    /// Allocates a default pointee, lets `fill` write into it, then stores it.
    fn alloc_with(&mut self, fill: Fill<'_>) -> Result<()>;
}
