//! # sovran-mapper
//!
//! A thread-safe, convention-based object mapper.
//!
//! `sovran-mapper` copies data between structurally similar types: a database
//! row into a domain model, a domain model into a DTO, and back. Type pairs are
//! registered once at start-up; after that any thread can map values between
//! them, including nested structs, sequences, maps and pointers.
//!
//! ## Key Features
//!
//! - **Convention based**: fields are matched by camel-cased name, exact name or tag
//! - **Nested**: sub-structs, `Vec`, `HashMap`/`BTreeMap`, `Option` and `Box` are walked recursively
//! - **Custom functions**: any registered pair can be converted by user code instead
//! - **Thread-safe**: registrations live behind `RwLock`s, mapping never holds a lock while user code runs
//! - **Null propagation**: a zero source yields a zero destination
//!
//! Types opt in with `#[derive(Mappable)]`. Leaf types such as newtypes or
//! timestamps are declared with [`mappable_opaque!`].
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_mapper::{Mappable, Mapper, MapperError};
//!
//! #[derive(Debug, Default, Mappable)]
//! struct UserRow {
//!     pub user_id: String,
//!     pub display_name: String,
//! }
//!
//! #[allow(non_snake_case)]
//! #[derive(Debug, Default, Mappable)]
//! struct User {
//!     pub userId: String,
//!     pub displayName: String,
//! }
//!
//! fn main() -> Result<(), MapperError> {
//!     let mapper = Mapper::new();
//!     mapper.create_map::<UserRow, User>()?;
//!
//!     let row = UserRow {
//!         user_id: "u-1".to_string(),
//!         display_name: "Ada".to_string(),
//!     };
//!     let user: User = mapper.map(&row)?;
//!     assert_eq!(user.userId, "u-1");
//!     assert_eq!(user.displayName, "Ada");
//!
//!     // Sequences use the element registration
//!     let users: Vec<User> = mapper.map(&vec![row])?;
//!     assert_eq!(users.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Tags and Custom Functions
//!
//! ```rust
//! use sovran_mapper::{Mappable, Mapper, MapperError};
//!
//! #[derive(Debug, Default, Mappable)]
//! struct Stamp {
//!     pub seconds: i64,
//! }
//!
//! #[derive(Debug, Default, Mappable)]
//! struct StampDto {
//!     pub label: String,
//! }
//!
//! #[derive(Debug, Default, Mappable)]
//! struct Event {
//!     #[mapper(tag = "name")]
//!     pub title: String,
//!     pub at: Stamp,
//! }
//!
//! #[derive(Debug, Default, Mappable)]
//! struct EventDto {
//!     pub name: String,
//!     pub at: StampDto,
//! }
//!
//! fn main() -> Result<(), MapperError> {
//!     let mapper = Mapper::new();
//!     mapper.create_map::<Event, EventDto>()?;
//!     mapper.create_custom_map(|stamp: &Stamp| {
//!         Ok::<_, MapperError>(StampDto {
//!             label: format!("t+{}", stamp.seconds),
//!         })
//!     })?;
//!
//!     let event = Event {
//!         title: "launch".into(),
//!         at: Stamp { seconds: 5 },
//!     };
//!     let dto: EventDto = mapper.map(&event)?;
//!     assert_eq!(dto.name, "launch");
//!     assert_eq!(dto.at.label, "t+5");
//!     Ok(())
//! }
//! ```
//!
//! ### Error Handling
//!
//! ```rust
//! use sovran_mapper::{Mappable, Mapper, MapperError};
//!
//! #[derive(Debug, Default, Mappable)]
//! struct A {
//!     pub id: u32,
//! }
//!
//! #[derive(Debug, Default, Mappable)]
//! struct B {
//!     pub id: u32,
//! }
//!
//! let mapper = Mapper::new();
//!
//! match mapper.map::<B, _>(&A { id: 1 }) {
//!     Ok(b) => println!("mapped {}", b.id),
//!     Err(MapperError::MapNotExist { source_type, dest_type }) => {
//!         println!("register {source_type} -> {dest_type} first")
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//!
//! mapper.freeze().expect("freeze");
//! assert!(matches!(mapper.create_map::<A, B>(), Err(MapperError::Frozen)));
//! ```
//!
//! ### Process-wide Mapper
//!
//! The crate-level functions operate on a shared [`Mapper`]:
//!
//! ```rust
//! use sovran_mapper::{Mappable, MapperError};
//!
//! #[derive(Debug, Default, Mappable)]
//! struct Row {
//!     pub id: u64,
//! }
//!
//! #[derive(Debug, Default, Mappable)]
//! struct Model {
//!     pub id: u64,
//! }
//!
//! sovran_mapper::create_map::<Row, Model>()?;
//! let model: Model = sovran_mapper::map(&Row { id: 7 })?;
//! assert_eq!(model.id, 7);
//! # Ok::<(), MapperError>(())
//! ```

extern crate self as sovran_mapper;

mod any_value;
mod config;
mod converter;
mod custom;
mod error;
mod global;
mod impls;
mod key;
mod mapper;
mod profile;
mod registry;
mod shape;
mod value;

pub use config::MapperConfig;
pub use error::{BoxError, MapperError, Result};
pub use global::{
    clear_mappings, configure, create_custom_map, create_map, create_optional_custom_map, freeze,
    global, map,
};
pub use key::TypePairKey;
pub use mapper::{Mapper, Phase};
pub use profile::{to_camel_case, Correspondence, FieldSource, Profile};
pub use shape::{FieldMeta, Kind, ScalarKind, Shape, StructInfo, TypeInfo};
pub use value::{
    Fill, FillEntry, MapAccess, Mappable, PointerAccess, SeqAccess, StructAccess, Typed, ValueMut,
    ValueRef,
};

pub use sovran_mapper_macros::Mappable;

#[doc(hidden)]
pub mod __private {
    pub use crate::impls::{apply_same, assign_same, skipped_is_zero};
}
