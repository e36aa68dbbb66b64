//! Procedural macros for the sovran-mapper crate
//!
//! Rust has no runtime reflection, so the mapper relies on this derive to
//! describe a struct's fields, tags and exposed methods, and to generate the
//! accessors the converter walks at runtime.

use proc_macro::TokenStream;

mod mappable;

/// Derive macro making a named struct mappable.
///
/// The struct must implement `Default`; every non-skipped field type must
/// implement `sovran_mapper::Mappable`. Skipped fields still count towards the
/// struct's zero test, so their types must implement `PartialEq` and
/// `Default`.
///
/// # Attributes
///
/// - `#[mapper(tag = "identifier")]` on a field: alternate lookup key used by
///   the tag-to-name and tag-to-tag matching rules
/// - `#[mapper(skip)]` on a field: never read or written by the mapper
/// - `#[mapper(methods(short_type_name))]` on the struct: zero-argument
///   `&self` methods whose results can feed destination fields
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default, Mappable)]
/// #[mapper(methods(short_type_name))]
/// struct EventRecord {
///     pub id: String,
///     #[mapper(tag = "kind")]
///     pub event_type: String,
///     payload: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Mappable, attributes(mapper))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    mappable::process_derive_mappable(input)
}
