//! The process-wide mapper behind the crate-level functions.

use std::sync::OnceLock;

use crate::config::MapperConfig;
use crate::error::{BoxError, Result};
use crate::mapper::Mapper;
use crate::value::Typed;

static GLOBAL: OnceLock<Mapper> = OnceLock::new();

/// The shared mapper used by [`create_map`], [`map`] and friends.
pub fn global() -> &'static Mapper {
    GLOBAL.get_or_init(Mapper::new)
}

/// See [`Mapper::create_map`].
pub fn create_map<TSrc: Typed, TDst: Typed>() -> Result<()> {
    global().create_map::<TSrc, TDst>()
}

/// See [`Mapper::create_custom_map`].
pub fn create_custom_map<TSrc, TDst, F, E>(func: F) -> Result<()>
where
    TSrc: Typed,
    TDst: Typed,
    F: Fn(&TSrc) -> std::result::Result<TDst, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    global().create_custom_map(func)
}

/// See [`Mapper::create_optional_custom_map`].
pub fn create_optional_custom_map<TSrc, TDst, F, E>(func: Option<F>) -> Result<()>
where
    TSrc: Typed,
    TDst: Typed,
    F: Fn(&TSrc) -> std::result::Result<TDst, E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    global().create_optional_custom_map(func)
}

/// See [`Mapper::map`].
pub fn map<TDst: Typed, TSrc: Typed>(src: &TSrc) -> Result<TDst> {
    global().map(src)
}

pub fn configure(config: MapperConfig) -> Result<()> {
    global().configure(config)
}

pub fn freeze() -> Result<()> {
    global().freeze()
}

/// Resets the shared mapper. Intended for tests.
pub fn clear_mappings() -> Result<()> {
    global().clear_mappings()
}
