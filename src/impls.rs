use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::error::Result;
use crate::shape::{ScalarKind, Shape, TypeInfo};
use crate::value::{
    Fill, FillEntry, MapAccess, Mappable, PointerAccess, SeqAccess, Typed, ValueMut, ValueRef,
};

#[doc(hidden)]
pub fn assign_same<T: Mappable + Clone>(dst: &mut T, src: &dyn Mappable) -> bool {
    match src.as_any().downcast_ref::<T>() {
        Some(value) => {
            dst.clone_from(value);
            true
        }
        None => false,
    }
}

#[doc(hidden)]
pub fn apply_same<T: Any>(
    dst: &mut T,
    value: Box<dyn Any + Send>,
) -> std::result::Result<(), Box<dyn Any + Send>> {
    *dst = *value.downcast::<T>()?;
    Ok(())
}

/// Zero test for fields hidden with `#[mapper(skip)]`.
#[doc(hidden)]
pub fn skipped_is_zero<T: PartialEq + Default>(value: &T) -> bool {
    *value == T::default()
}

#[doc(hidden)]
#[macro_export]
macro_rules! __mappable_leaf {
    ($ty:ty, $shape:expr) => {
        impl $crate::Mappable for $ty {
            fn type_info(&self) -> $crate::TypeInfo {
                <Self as $crate::Typed>::describe()
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn value_ref(&self) -> $crate::ValueRef<'_> {
                $crate::ValueRef::Leaf(self)
            }

            fn value_mut(&mut self) -> $crate::ValueMut<'_> {
                $crate::ValueMut::Leaf(self)
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::core::default::Default>::default()
            }

            fn try_assign(&mut self, src: &dyn $crate::Mappable) -> bool {
                $crate::__private::assign_same(self, src)
            }

            fn apply_any(
                &mut self,
                value: ::std::boxed::Box<dyn ::core::any::Any + Send>,
            ) -> ::core::result::Result<(), ::std::boxed::Box<dyn ::core::any::Any + Send>> {
                $crate::__private::apply_same(self, value)
            }

            fn new_empty(&self) -> ::std::boxed::Box<dyn $crate::Mappable> {
                ::std::boxed::Box::new(<$ty as ::core::default::Default>::default())
            }
        }

        impl $crate::Typed for $ty {
            fn describe() -> $crate::TypeInfo {
                $crate::TypeInfo::of::<$ty>($shape)
            }
        }
    };
}

/// Makes leaf types mappable.
///
/// An opaque value is copied as a whole when source and destination have the
/// same type; any other pairing needs a custom map. The type must implement
/// `Clone`, `Default`, `PartialEq`, `Send` and `Sync`.
///
/// ```
/// use sovran_mapper::{mappable_opaque, Mapper, Mappable};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Sku(String);
///
/// mappable_opaque!(Sku);
///
/// #[derive(Debug, Default, Mappable)]
/// struct Line {
///     pub sku: Sku,
/// }
///
/// #[derive(Debug, Default, Mappable)]
/// struct LineDto {
///     pub sku: Sku,
/// }
///
/// let mapper = Mapper::new();
/// mapper.create_map::<Line, LineDto>()?;
/// let dto: LineDto = mapper.map(&Line { sku: Sku("A-1".into()) })?;
/// assert_eq!(dto.sku, Sku("A-1".into()));
/// # Ok::<(), sovran_mapper::MapperError>(())
/// ```
#[macro_export]
macro_rules! mappable_opaque {
    ($($ty:ty),* $(,)?) => {
        $( $crate::__mappable_leaf!($ty, $crate::Shape::Opaque); )*
    };
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $( crate::__mappable_leaf!($ty, Shape::Scalar(ScalarKind::$kind)); )*
    };
}

impl_scalar! {
    () => Unit,
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
}

#[cfg(feature = "chrono")]
crate::mappable_opaque!(
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
);

impl<T: Typed> Mappable for Vec<T> {
    fn type_info(&self) -> TypeInfo {
        <Self as Typed>::describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Seq(self)
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Seq(self)
    }

    fn is_zero(&self) -> bool {
        Vec::is_empty(self)
    }

    fn try_assign(&mut self, _src: &dyn Mappable) -> bool {
        false
    }

    fn apply_any(
        &mut self,
        value: Box<dyn Any + Send>,
    ) -> std::result::Result<(), Box<dyn Any + Send>> {
        apply_same(self, value)
    }

    fn new_empty(&self) -> Box<dyn Mappable> {
        Box::new(Self::default())
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn describe() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Seq {
            element: T::describe,
        })
    }
}

impl<T: Typed> SeqAccess for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Mappable> {
        <[T]>::get(self, index).map(|item| item as &dyn Mappable)
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn push_with(&mut self, fill: Fill<'_>) -> Result<()> {
        let mut item = T::default();
        fill(&mut item)?;
        self.push(item);
        Ok(())
    }
}

macro_rules! impl_map {
    ($map:ident, $($bound:path),+) => {
        impl<K, V> Mappable for $map<K, V>
        where
            K: Typed $(+ $bound)+,
            V: Typed,
        {
            fn type_info(&self) -> TypeInfo {
                <Self as Typed>::describe()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn value_ref(&self) -> ValueRef<'_> {
                ValueRef::Map(self)
            }

            fn value_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Map(self)
            }

            fn is_zero(&self) -> bool {
                $map::is_empty(self)
            }

            fn try_assign(&mut self, _src: &dyn Mappable) -> bool {
                false
            }

            fn apply_any(
                &mut self,
                value: Box<dyn Any + Send>,
            ) -> std::result::Result<(), Box<dyn Any + Send>> {
                apply_same(self, value)
            }

            fn new_empty(&self) -> Box<dyn Mappable> {
                Box::new(Self::default())
            }
        }

        impl<K, V> Typed for $map<K, V>
        where
            K: Typed $(+ $bound)+,
            V: Typed,
        {
            fn describe() -> TypeInfo {
                TypeInfo::of::<Self>(Shape::Map {
                    key: K::describe,
                    value: V::describe,
                })
            }
        }

        impl<K, V> MapAccess for $map<K, V>
        where
            K: Typed $(+ $bound)+,
            V: Typed,
        {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn entries(&self) -> Vec<(&dyn Mappable, &dyn Mappable)> {
                self.iter()
                    .map(|(key, value)| (key as &dyn Mappable, value as &dyn Mappable))
                    .collect()
            }

            fn clear(&mut self) {
                $map::clear(self)
            }

            fn insert_with(&mut self, fill: FillEntry<'_>) -> Result<()> {
                let mut key = K::default();
                let mut value = V::default();
                fill(&mut key, &mut value)?;
                self.insert(key, value);
                Ok(())
            }
        }
    };
}

impl_map!(HashMap, Eq, Hash);
impl_map!(BTreeMap, Ord);

impl<T: Typed> Mappable for Option<T> {
    fn type_info(&self) -> TypeInfo {
        <Self as Typed>::describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Pointer(self.as_ref().map(|inner| inner as &dyn Mappable))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Pointer(self)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn try_assign(&mut self, _src: &dyn Mappable) -> bool {
        false
    }

    fn apply_any(
        &mut self,
        value: Box<dyn Any + Send>,
    ) -> std::result::Result<(), Box<dyn Any + Send>> {
        apply_same(self, value)
    }

    fn new_empty(&self) -> Box<dyn Mappable> {
        Box::new(Self::default())
    }
}

impl<T: Typed> Typed for Option<T> {
    fn describe() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Pointer {
            pointee: T::describe,
            nullable: true,
        })
    }
}

impl<T: Typed> PointerAccess for Option<T> {
    fn set_null(&mut self) {
        *self = None;
    }

    fn alloc_with(&mut self, fill: Fill<'_>) -> Result<()> {
        let mut inner = T::default();
        fill(&mut inner)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<T: Typed> Mappable for Box<T> {
    fn type_info(&self) -> TypeInfo {
        <Self as Typed>::describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Pointer(Some(&**self))
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Pointer(self)
    }

    // A box always points somewhere, so it is never the zero value.
    fn is_zero(&self) -> bool {
        false
    }

    fn try_assign(&mut self, _src: &dyn Mappable) -> bool {
        false
    }

    fn apply_any(
        &mut self,
        value: Box<dyn Any + Send>,
    ) -> std::result::Result<(), Box<dyn Any + Send>> {
        apply_same(self, value)
    }

    fn new_empty(&self) -> Box<dyn Mappable> {
        Box::new(Self::default())
    }
}

impl<T: Typed> Typed for Box<T> {
    fn describe() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Pointer {
            pointee: T::describe,
            nullable: false,
        })
    }
}

impl<T: Typed> PointerAccess for Box<T> {
    fn set_null(&mut self) {
        **self = T::default();
    }

    fn alloc_with(&mut self, fill: Fill<'_>) -> Result<()> {
        let mut inner = T::default();
        fill(&mut inner)?;
        *self = Box::new(inner);
        Ok(())
    }
}

/// An empty interface holds `()` until something is stored in it.
impl Default for Box<dyn Mappable> {
    fn default() -> Self {
        Box::new(())
    }
}

impl Typed for Box<dyn Mappable> {
    fn describe() -> TypeInfo {
        TypeInfo::of::<Self>(Shape::Interface)
    }
}

impl Mappable for Box<dyn Mappable> {
    fn type_info(&self) -> TypeInfo {
        <Self as Typed>::describe()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn value_ref(&self) -> ValueRef<'_> {
        ValueRef::Interface(&**self)
    }

    fn value_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Interface(self)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn try_assign(&mut self, _src: &dyn Mappable) -> bool {
        false
    }

    fn apply_any(
        &mut self,
        value: Box<dyn Any + Send>,
    ) -> std::result::Result<(), Box<dyn Any + Send>> {
        apply_same(self, value)
    }

    fn new_empty(&self) -> Box<dyn Mappable> {
        Box::new(Self::default())
    }
}
