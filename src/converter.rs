//! The recursive value walk.
//!
//! Conversion never holds a registry lock while user code runs: entries and
//! profiles are cloned out of their maps before they are applied, so a custom
//! function may call back into the mapper.

use std::fmt;
use std::sync::Arc;

use crate::config::MapperConfig;
use crate::custom::MappingEntry;
use crate::error::{MapperError, Result};
use crate::key::TypePairKey;
use crate::profile::{Correspondence, FieldSource, Profile};
use crate::registry::Registry;
use crate::shape::{Kind, Shape, TypeInfo};
use crate::value::{MapAccess, Mappable, SeqAccess, StructAccess, ValueMut, ValueRef};

/// Location inside the value being converted, for logs and strict errors.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Path<'a> {
    Root(&'static str),
    Field(&'a Path<'a>, &'static str),
    Index(&'a Path<'a>, usize),
    Key(&'a Path<'a>),
    Value(&'a Path<'a>),
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root(name) => f.write_str(name),
            Path::Field(parent, name) => write!(f, "{parent}.{name}"),
            Path::Index(parent, index) => write!(f, "{parent}[{index}]"),
            Path::Key(parent) => write!(f, "{parent}.<key>"),
            Path::Value(parent) => write!(f, "{parent}.<value>"),
        }
    }
}

pub(crate) struct Converter<'a> {
    entries: &'a Registry<TypePairKey, MappingEntry>,
    profiles: &'a Registry<TypePairKey, Arc<Profile>>,
    config: MapperConfig,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(
        entries: &'a Registry<TypePairKey, MappingEntry>,
        profiles: &'a Registry<TypePairKey, Arc<Profile>>,
        config: MapperConfig,
    ) -> Self {
        Self {
            entries,
            profiles,
            config,
        }
    }

    /// Converts `src` into the existing destination value.
    ///
    /// A custom function registered for the exact pair always takes
    /// precedence over the shape-driven walk.
    pub(crate) fn convert(
        &self,
        src: &dyn Mappable,
        dst: &mut dyn Mappable,
        path: &Path<'_>,
    ) -> Result<()> {
        let src_info = src.type_info();
        let dst_info = dst.type_info();

        let key = TypePairKey::new(src_info, dst_info);
        if let Some(MappingEntry::Custom(func)) = self.entries.get(&key)? {
            return func.call_into(src, dst);
        }

        if dst_info.kind() == Kind::Interface {
            if let ValueMut::Interface(slot) = dst.value_mut() {
                return self.into_interface(src, slot, path);
            }
        }

        match src.value_ref() {
            ValueRef::Interface(inner) => self.convert(inner, dst, path),
            ValueRef::Pointer(pointee) => self.from_pointer(pointee, dst, path),
            _ if dst_info.is_pointer() => self.into_pointer(src, dst, path),
            ValueRef::Struct(fields) => self.copy_struct(fields, src_info, dst, dst_info, path),
            ValueRef::Seq(items) => self.copy_seq(items, src_info, dst, dst_info, path),
            ValueRef::Map(entries) => self.copy_map(entries, src_info, dst, dst_info, path),
            ValueRef::Leaf(value) => {
                if dst.try_assign(value) {
                    Ok(())
                } else {
                    self.mismatch(src_info, dst_info, path)
                }
            }
        }
    }

    /// Fills an interface slot from the concrete value behind `src`.
    ///
    /// The slot keeps its content when that already has the source's type or
    /// a registered mapping from it; otherwise it is replaced by an empty
    /// value of the source's type before the copy.
    fn into_interface(
        &self,
        src: &dyn Mappable,
        slot: &mut Box<dyn Mappable>,
        path: &Path<'_>,
    ) -> Result<()> {
        let mut concrete = src;
        while let ValueRef::Interface(inner) = concrete.value_ref() {
            concrete = inner;
        }

        let held = (**slot).type_info();
        let concrete_info = concrete.type_info();
        let keep = held.type_id == concrete_info.type_id
            || self
                .entries
                .contains_key(&TypePairKey::new(concrete_info, held))?;
        if !keep {
            log::trace!(
                "{path}: interface now holds {} instead of {}",
                concrete_info.type_name,
                held.type_name
            );
            *slot = concrete.new_empty();
        }
        self.convert(concrete, &mut **slot, path)
    }

    fn from_pointer(
        &self,
        pointee: Option<&dyn Mappable>,
        dst: &mut dyn Mappable,
        path: &Path<'_>,
    ) -> Result<()> {
        let Some(inner) = pointee else {
            return self.null_into(dst, path);
        };

        if dst.type_info().is_pointer() {
            if let ValueMut::Pointer(target) = dst.value_mut() {
                return target.alloc_with(&mut |slot| self.convert(inner, slot, path));
            }
        }
        self.convert(inner, dst, path)
    }

    /// A null source nulls a nullable destination. A non-nullable pointer gets
    /// a fresh default pointee; any other destination keeps its zero value.
    fn null_into(&self, dst: &mut dyn Mappable, path: &Path<'_>) -> Result<()> {
        let Shape::Pointer { nullable, .. } = dst.type_info().shape else {
            return Ok(());
        };
        let ValueMut::Pointer(target) = dst.value_mut() else {
            return Ok(());
        };
        if nullable {
            target.set_null();
            Ok(())
        } else {
            log::debug!("{path}: null source into a non-nullable pointer, pointee reset");
            target.alloc_with(&mut |_| Ok(()))
        }
    }

    fn into_pointer(&self, src: &dyn Mappable, dst: &mut dyn Mappable, path: &Path<'_>) -> Result<()> {
        match dst.value_mut() {
            ValueMut::Pointer(target) => target.alloc_with(&mut |slot| self.convert(src, slot, path)),
            _ => Ok(()),
        }
    }

    fn copy_struct(
        &self,
        fields: &dyn StructAccess,
        src_info: TypeInfo,
        dst: &mut dyn Mappable,
        dst_info: TypeInfo,
        path: &Path<'_>,
    ) -> Result<()> {
        let (Shape::Struct(src_struct), Shape::Struct(dst_struct)) = (src_info.shape, dst_info.shape)
        else {
            return self.mismatch(src_info, dst_info, path);
        };
        let ValueMut::Struct(target) = dst.value_mut() else {
            return self.mismatch(src_info, dst_info, path);
        };

        let key = TypePairKey::new(src_info, dst_info);
        let profile = match self.profiles.get(&key)? {
            Some(profile) => profile,
            // A struct copied into its own type needs no registration.
            None if src_info.type_id == dst_info.type_id => {
                Arc::new(Profile::build(key.profile_name(), &src_struct, &dst_struct))
            }
            None => return self.missing_profile(&key, path),
        };

        for entry in profile.correspondences() {
            let Some(dest_meta) = dst_struct.field(entry.dest) else {
                continue;
            };
            if !dest_meta.exported && !self.config.map_unexported_fields {
                log::debug!("{path}: skipping private destination field `{}`", entry.dest);
                continue;
            }

            let computed: Box<dyn Mappable>;
            let value: &dyn Mappable = match entry.source {
                FieldSource::Field(name) => {
                    let readable = self.config.map_unexported_fields
                        || src_struct.field(name).is_some_and(|meta| meta.exported);
                    if readable {
                        match fields.field(name) {
                            Some(value) => value,
                            None => {
                                no_value(entry, path);
                                continue;
                            }
                        }
                    } else if src_struct.has_method(name) {
                        match fields.call_method(name) {
                            Some(value) => {
                                computed = value;
                                &*computed
                            }
                            None => {
                                no_value(entry, path);
                                continue;
                            }
                        }
                    } else {
                        log::debug!("{path}: private source field `{name}` has no accessor, skipped");
                        continue;
                    }
                }
                FieldSource::Method(_) => match fields.call_method(entry.source.name()) {
                    Some(value) => {
                        computed = value;
                        &*computed
                    }
                    None => {
                        no_value(entry, path);
                        continue;
                    }
                },
            };

            let Some(slot) = target.field_mut(entry.dest) else {
                continue;
            };
            self.convert(value, slot, &Path::Field(path, entry.dest))?;
        }
        Ok(())
    }

    fn copy_seq(
        &self,
        items: &dyn SeqAccess,
        src_info: TypeInfo,
        dst: &mut dyn Mappable,
        dst_info: TypeInfo,
        path: &Path<'_>,
    ) -> Result<()> {
        let ValueMut::Seq(target) = dst.value_mut() else {
            return self.mismatch(src_info, dst_info, path);
        };

        target.clear();
        for index in 0..items.len() {
            let Some(item) = items.get(index) else {
                continue;
            };
            let item_path = Path::Index(path, index);
            target.push_with(&mut |slot| self.convert(item, slot, &item_path))?;
        }
        Ok(())
    }

    fn copy_map(
        &self,
        entries: &dyn MapAccess,
        src_info: TypeInfo,
        dst: &mut dyn Mappable,
        dst_info: TypeInfo,
        path: &Path<'_>,
    ) -> Result<()> {
        let ValueMut::Map(target) = dst.value_mut() else {
            return self.mismatch(src_info, dst_info, path);
        };

        target.clear();
        let key_path = Path::Key(path);
        let value_path = Path::Value(path);
        for (key, value) in entries.entries() {
            target.insert_with(&mut |dst_key, dst_value| {
                self.convert(key, dst_key, &key_path)?;
                self.convert(value, dst_value, &value_path)
            })?;
        }
        Ok(())
    }

    fn missing_profile(&self, key: &TypePairKey, path: &Path<'_>) -> Result<()> {
        if self.config.strict {
            return Err(MapperError::ProfileNotFound(key.profile_name()));
        }
        log::warn!(
            "{path}: no mapping profile for {}, no fields copied",
            key.profile_name()
        );
        Ok(())
    }

    fn mismatch(&self, src: TypeInfo, dst: TypeInfo, path: &Path<'_>) -> Result<()> {
        if self.config.strict {
            return Err(MapperError::StructuralMismatch {
                path: path.to_string(),
                source_kind: format!("{} ({})", src.type_name, src.kind()),
                dest_kind: format!("{} ({})", dst.type_name, dst.kind()),
            });
        }
        log::debug!(
            "{path}: cannot map {} ({}) into {} ({}), left unset",
            src.type_name,
            src.kind(),
            dst.type_name,
            dst.kind()
        );
        Ok(())
    }
}

fn no_value(entry: &Correspondence, path: &Path<'_>) {
    log::debug!(
        "{path}: source `{}` produced no value for `{}`",
        entry.source.name(),
        entry.dest
    );
}
