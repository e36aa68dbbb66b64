use std::any::{type_name, Any, TypeId};

use crate::error::MapperError;

/// A type-erased conversion result that remembers what it holds
#[derive(Debug)]
pub(crate) struct AnyValue {
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) value: Box<dyn Any + Send>,
}

impl AnyValue {
    /// Erase a value of any type that implements Any and Send
    pub(crate) fn new<T: 'static + Any + Send>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Check if the contained value is of type T
    pub(crate) fn is_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Recover the concrete value
    ///
    /// A mismatch is reported as a type assertion failure naming both types.
    pub(crate) fn downcast<T: 'static>(self) -> Result<T, MapperError> {
        let actual = self.type_name;
        if !self.is_type::<T>() {
            return Err(MapperError::TypeAssertion {
                expected: type_name::<T>(),
                actual,
            });
        }
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| MapperError::TypeAssertion {
                expected: type_name::<T>(),
                actual,
            })
    }

    /// Hand the boxed value over, keeping its name for diagnostics
    pub(crate) fn into_parts(self) -> (&'static str, Box<dyn Any + Send>) {
        (self.type_name, self.value)
    }
}
