use std::sync::{Arc, RwLock};

use crate::config::MapperConfig;
use crate::converter::{Converter, Path};
use crate::custom::{CustomFn, MappingEntry};
use crate::error::{BoxError, MapperError, Result};
use crate::key::{short_name, TypePairKey};
use crate::profile::Profile;
use crate::registry::Registry;
use crate::shape::{Shape, TypeInfo};
use crate::value::{Typed, ValueMut, ValueRef};

/// Lifecycle of a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Registrations and configuration are accepted
    Configuring,
    /// Read-only; only `map` and `clear_mappings` are allowed
    Frozen,
}

/// A registry of type-pair mappings and the engine that runs them.
///
/// Mappings are registered during start-up, the mapper is optionally frozen,
/// and `map` is then called from any number of threads.
///
/// # Examples
///
/// ```
/// use sovran_mapper::{Mappable, Mapper, MapperError};
///
/// #[derive(Debug, Default, Mappable)]
/// struct ProductRow {
///     pub id: String,
///     pub name: String,
///     pub price: f64,
/// }
///
/// #[derive(Debug, Default, Mappable)]
/// struct Product {
///     pub id: String,
///     pub name: String,
///     pub price: f64,
/// }
///
/// let mapper = Mapper::new();
/// mapper.create_map::<Option<ProductRow>, Option<Product>>()?;
/// mapper.freeze()?;
///
/// let row = ProductRow { id: "p1".into(), name: "Widget".into(), price: 9.99 };
/// let product: Product = mapper.map(&row)?;
/// assert_eq!(product.name, "Widget");
///
/// let missing: Option<Product> = mapper.map(&None::<ProductRow>)?;
/// assert!(missing.is_none());
/// # Ok::<(), MapperError>(())
/// ```
#[derive(Debug)]
pub struct Mapper {
    phase: RwLock<Phase>,
    config: RwLock<MapperConfig>,
    entries: Registry<TypePairKey, MappingEntry>,
    profiles: Registry<TypePairKey, Arc<Profile>>,
}

impl Mapper {
    /// Creates an empty mapper with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            phase: RwLock::new(Phase::Configuring),
            config: RwLock::new(config),
            entries: Registry::new(),
            profiles: Registry::new(),
        }
    }

    /// Registers a structural mapping from `TSrc` to `TDst`.
    ///
    /// Both sides must be structs or pointers (`Option`, `Box`) to structs.
    /// When either side is a pointer the dereferenced struct pair is
    /// registered as well, so `create_map::<Option<A>, Option<B>>()` also
    /// enables `A -> B`. The field profile is built immediately.
    ///
    /// # Errors
    ///
    /// - `MapperError::UnsupportedMap` if a side is not struct-shaped
    /// - `MapperError::MapAlreadyExists` if any of the keys is registered
    /// - `MapperError::Frozen` after `freeze`
    pub fn create_map<TSrc: Typed, TDst: Typed>(&self) -> Result<()> {
        let source = TSrc::describe();
        let dest = TDst::describe();
        let unsupported = || MapperError::UnsupportedMap {
            source_type: source.type_name,
            dest_type: dest.type_name,
        };
        let (src_struct, src_fields) = source.deref_struct().ok_or_else(unsupported)?;
        let (dst_struct, dst_fields) = dest.deref_struct().ok_or_else(unsupported)?;

        let mut keys = vec![TypePairKey::new(source, dest)];
        if source.is_pointer() || dest.is_pointer() {
            keys.push(TypePairKey::new(src_struct, dst_struct));
        }

        let phase = self.phase.write().map_err(|_| MapperError::LockError)?;
        ensure_configuring(*phase)?;
        for key in &keys {
            if self.entries.contains_key(key)? {
                return Err(already_exists(key));
            }
        }
        for key in keys {
            self.entries.insert(key, MappingEntry::Structural)?;
            log::debug!("registered mapping {key}");
        }

        let profile_key = TypePairKey::new(src_struct, dst_struct);
        let profile = Profile::build(profile_key.profile_name(), &src_fields, &dst_fields);
        if profile.is_empty() {
            log::warn!("profile {} has no field correspondences", profile.name());
        }
        self.profiles.insert(profile_key, Arc::new(profile))?;
        Ok(())
    }

    /// Registers a conversion function for the exact pair `TSrc -> TDst`.
    ///
    /// Unlike `create_map` no pointer/value twin is registered. Sides may be
    /// structs, opaque leaves such as timestamps, or pointers to either.
    ///
    /// # Errors
    ///
    /// - `MapperError::UnsupportedMap` if a side is a scalar, collection or interface
    /// - `MapperError::MapAlreadyExists` on duplicates
    /// - `MapperError::Frozen` after `freeze`
    pub fn create_custom_map<TSrc, TDst, F, E>(&self, func: F) -> Result<()>
    where
        TSrc: Typed,
        TDst: Typed,
        F: Fn(&TSrc) -> std::result::Result<TDst, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.create_optional_custom_map::<TSrc, TDst, F, E>(Some(func))
    }

    /// Same as `create_custom_map`, for functions that may be absent.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::NilFunction` when `func` is `None`, otherwise as
    /// `create_custom_map`.
    pub fn create_optional_custom_map<TSrc, TDst, F, E>(&self, func: Option<F>) -> Result<()>
    where
        TSrc: Typed,
        TDst: Typed,
        F: Fn(&TSrc) -> std::result::Result<TDst, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let source = TSrc::describe();
        let dest = TDst::describe();

        let func = func.ok_or(MapperError::NilFunction {
            source_type: source.type_name,
            dest_type: dest.type_name,
        })?;
        if !accepts_custom(&source) || !accepts_custom(&dest) {
            return Err(MapperError::UnsupportedMap {
                source_type: source.type_name,
                dest_type: dest.type_name,
            });
        }

        let key = TypePairKey::new(source, dest);
        let phase = self.phase.write().map_err(|_| MapperError::LockError)?;
        ensure_configuring(*phase)?;
        if self.entries.contains_key(&key)? {
            return Err(already_exists(&key));
        }
        let entry = MappingEntry::Custom(CustomFn::new::<TSrc, TDst, F, E>(func));
        self.entries.insert(key, entry)?;
        log::debug!("registered custom mapping {key}");
        Ok(())
    }

    /// Maps `src` into a new `TDst`.
    ///
    /// A zero source yields `TDst::default()`. For `Vec` on both sides the
    /// registration of the element types is used.
    ///
    /// # Errors
    ///
    /// - `MapperError::MapNotExist` if the (element) pair is not registered
    /// - `MapperError::Custom` / `MapperError::TypeAssertion` from custom functions
    /// - `MapperError::ProfileNotFound` / `MapperError::StructuralMismatch` in strict mode
    pub fn map<TDst: Typed, TSrc: Typed>(&self, src: &TSrc) -> Result<TDst> {
        if src.is_zero() {
            return Ok(TDst::default());
        }

        let config = *self.config.read().map_err(|_| MapperError::LockError)?;
        let source = TSrc::describe();
        let dest = TDst::describe();
        let (src_element, src_many) = resolve_element(source);
        let (dst_element, dst_many) = resolve_element(dest);
        let root = Path::Root(short_name(&source));

        if src_many != dst_many {
            if config.strict {
                return Err(MapperError::StructuralMismatch {
                    path: root.to_string(),
                    source_kind: format!("{} ({})", source.type_name, source.kind()),
                    dest_kind: format!("{} ({})", dest.type_name, dest.kind()),
                });
            }
            log::warn!(
                "cannot map {} into {}: only one side is a collection",
                source.type_name,
                dest.type_name
            );
            return Ok(TDst::default());
        }

        let key = TypePairKey::new(src_element, dst_element);
        let entry = self
            .entries
            .get(&key)?
            .ok_or(MapperError::MapNotExist {
                source_type: source.type_name,
                dest_type: dest.type_name,
            })?;

        match entry {
            MappingEntry::Custom(func) if src_many => {
                let mut out = TDst::default();
                if let (ValueRef::Seq(items), ValueMut::Seq(target)) =
                    (src.value_ref(), out.value_mut())
                {
                    for index in 0..items.len() {
                        if let Some(item) = items.get(index) {
                            target.push_with(&mut |slot| func.call_into(item, slot))?;
                        }
                    }
                }
                Ok(out)
            }
            MappingEntry::Custom(func) => func.call(src)?.downcast::<TDst>(),
            MappingEntry::Structural => {
                let mut out = TDst::default();
                Converter::new(&self.entries, &self.profiles, config).convert(
                    src,
                    &mut out,
                    &root,
                )?;
                Ok(out)
            }
        }
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    ///
    /// Returns `MapperError::Frozen` after `freeze`.
    pub fn configure(&self, config: MapperConfig) -> Result<()> {
        let phase = self.phase.read().map_err(|_| MapperError::LockError)?;
        ensure_configuring(*phase)?;
        *self.config.write().map_err(|_| MapperError::LockError)? = config;
        Ok(())
    }

    pub fn config(&self) -> Result<MapperConfig> {
        Ok(*self.config.read().map_err(|_| MapperError::LockError)?)
    }

    /// Ends the configuration phase; later registrations fail with `Frozen`.
    pub fn freeze(&self) -> Result<()> {
        let mut phase = self.phase.write().map_err(|_| MapperError::LockError)?;
        if *phase == Phase::Configuring {
            log::debug!("mapper frozen with {} registrations", self.entries.len()?);
        }
        *phase = Phase::Frozen;
        Ok(())
    }

    pub fn phase(&self) -> Result<Phase> {
        Ok(*self.phase.read().map_err(|_| MapperError::LockError)?)
    }

    pub fn is_frozen(&self) -> Result<bool> {
        Ok(self.phase()? == Phase::Frozen)
    }

    /// Drops every registration and profile and reopens configuration.
    ///
    /// Meant for isolating tests; not to be called while `map` is in flight.
    pub fn clear_mappings(&self) -> Result<()> {
        let mut phase = self.phase.write().map_err(|_| MapperError::LockError)?;
        self.entries.clear()?;
        self.profiles.clear()?;
        *phase = Phase::Configuring;
        Ok(())
    }

    /// Whether a mapping (structural or custom) exists for the exact pair.
    pub fn has_mapping<TSrc: Typed, TDst: Typed>(&self) -> Result<bool> {
        self.entries
            .contains_key(&TypePairKey::new(TSrc::describe(), TDst::describe()))
    }

    /// The cached profile of the struct pair behind `TSrc -> TDst`.
    pub fn profile<TSrc: Typed, TDst: Typed>(&self) -> Result<Option<Arc<Profile>>> {
        let (Some((source, _)), Some((dest, _))) =
            (TSrc::describe().deref_struct(), TDst::describe().deref_struct())
        else {
            return Ok(None);
        };
        self.profiles.get(&TypePairKey::new(source, dest))
    }

    /// Number of registered type pairs, derived twins included.
    pub fn len(&self) -> Result<usize> {
        self.entries.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_configuring(phase: Phase) -> Result<()> {
    match phase {
        Phase::Configuring => Ok(()),
        Phase::Frozen => Err(MapperError::Frozen),
    }
}

fn already_exists(key: &TypePairKey) -> MapperError {
    MapperError::MapAlreadyExists {
        source_type: key.source.type_name,
        dest_type: key.dest.type_name,
    }
}

fn accepts_custom(info: &TypeInfo) -> bool {
    matches!(info.pointer_root().shape, Shape::Struct(_) | Shape::Opaque)
}

fn resolve_element(info: TypeInfo) -> (TypeInfo, bool) {
    match info.element() {
        Some(element) => (element, true),
        None => (info, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mappable;

    #[derive(Debug, Default, PartialEq, Mappable)]
    struct Source {
        pub id: String,
        pub count: u32,
    }

    #[derive(Debug, Default, PartialEq, Mappable)]
    struct Target {
        pub id: String,
        pub count: u32,
    }

    #[test]
    fn test_pointer_registration_adds_value_twin() -> Result<()> {
        let mapper = Mapper::new();
        mapper.create_map::<Option<Source>, Option<Target>>()?;

        assert!(mapper.has_mapping::<Option<Source>, Option<Target>>()?);
        assert!(mapper.has_mapping::<Source, Target>()?);
        assert!(!mapper.has_mapping::<Target, Source>()?);
        assert_eq!(mapper.len()?, 2);
        Ok(())
    }

    #[test]
    fn test_value_registration_has_no_twin() -> Result<()> {
        let mapper = Mapper::new();
        mapper.create_map::<Source, Target>()?;
        assert_eq!(mapper.len()?, 1);
        assert!(!mapper.has_mapping::<Option<Source>, Option<Target>>()?);
        Ok(())
    }

    #[test]
    fn test_failed_registration_inserts_nothing() -> Result<()> {
        let mapper = Mapper::new();
        mapper.create_map::<Source, Target>()?;

        let err = mapper
            .create_map::<Box<Source>, Box<Target>>()
            .expect_err("twin already registered");
        assert!(matches!(err, MapperError::MapAlreadyExists { .. }));
        assert!(!mapper.has_mapping::<Box<Source>, Box<Target>>()?);
        assert_eq!(mapper.len()?, 1);
        Ok(())
    }

    #[test]
    fn test_profile_is_built_at_registration() -> Result<()> {
        let mapper = Mapper::new();
        assert!(mapper.profile::<Source, Target>()?.is_none());

        mapper.create_map::<Box<Source>, Target>()?;
        let profile = mapper
            .profile::<Source, Target>()?
            .expect("profile cached for the struct pair");
        assert_eq!(profile.name(), "Source_Target");
        assert_eq!(profile.len(), 2);
        Ok(())
    }

    #[test]
    fn test_clear_reopens_configuration() -> Result<()> {
        let mapper = Mapper::new();
        mapper.create_map::<Source, Target>()?;
        mapper.freeze()?;
        assert_eq!(mapper.phase()?, Phase::Frozen);

        mapper.clear_mappings()?;
        assert_eq!(mapper.phase()?, Phase::Configuring);
        assert!(mapper.is_empty()?);
        assert!(mapper.profile::<Source, Target>()?.is_none());
        mapper.create_map::<Source, Target>()?;
        Ok(())
    }

    #[test]
    fn test_custom_precedes_structural_walk() -> Result<()> {
        let mapper = Mapper::new();
        mapper.create_custom_map(|src: &Source| {
            Ok::<_, MapperError>(Target {
                id: format!("custom-{}", src.id),
                count: src.count * 10,
            })
        })?;

        let target: Target = mapper.map(&Source {
            id: "a".into(),
            count: 2,
        })?;
        assert_eq!(
            target,
            Target {
                id: "custom-a".into(),
                count: 20
            }
        );
        Ok(())
    }
}
