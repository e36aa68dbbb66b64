use std::fmt;
use std::sync::Arc;

use crate::any_value::AnyValue;
use crate::error::{BoxError, MapperError, Result};
use crate::shape::TypeInfo;
use crate::value::{Mappable, Typed};

type ErasedFn = dyn Fn(&dyn Mappable) -> Result<AnyValue> + Send + Sync;

/// A registered conversion function with its input and output types erased.
#[derive(Clone)]
pub(crate) struct CustomFn {
    source: TypeInfo,
    dest: TypeInfo,
    func: Arc<ErasedFn>,
}

impl CustomFn {
    pub(crate) fn new<TSrc, TDst, F, E>(func: F) -> Self
    where
        TSrc: Typed,
        TDst: Typed,
        F: Fn(&TSrc) -> std::result::Result<TDst, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let erased = move |src: &dyn Mappable| -> Result<AnyValue> {
            let input = src.as_any().downcast_ref::<TSrc>().ok_or_else(|| {
                MapperError::TypeAssertion {
                    expected: std::any::type_name::<TSrc>(),
                    actual: src.type_info().type_name,
                }
            })?;
            func(input).map(AnyValue::new).map_err(MapperError::custom)
        };

        Self {
            source: TSrc::describe(),
            dest: TDst::describe(),
            func: Arc::new(erased),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_erased(source: TypeInfo, dest: TypeInfo, func: Arc<ErasedFn>) -> Self {
        Self { source, dest, func }
    }

    pub(crate) fn call(&self, src: &dyn Mappable) -> Result<AnyValue> {
        (self.func)(src)
    }

    /// Runs the function and writes its output into `dst`.
    pub(crate) fn call_into(&self, src: &dyn Mappable, dst: &mut dyn Mappable) -> Result<()> {
        let (actual, value) = self.call(src)?.into_parts();
        dst.apply_any(value).map_err(|_| MapperError::TypeAssertion {
            expected: dst.type_info().type_name,
            actual,
        })
    }
}

impl fmt::Debug for CustomFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFn")
            .field("source", &self.source.type_name)
            .field("dest", &self.dest.type_name)
            .finish()
    }
}

/// What a registered type pair maps with.
#[derive(Debug, Clone)]
pub(crate) enum MappingEntry {
    /// Field-by-field copy driven by the cached profile
    Structural,
    Custom(CustomFn),
}
