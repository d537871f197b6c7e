//! Isomer maps object graphs onto structurally similar but unrelated types.
//!
//! Core concepts:
//! - **Bean**: A composite value with named read (`get_x`/`is_x`) and write (`set_x`) methods
//! - **Value**: The dynamic form of anything the mapper carries (primitives, enums, collections, objects)
//! - **Ty**: A declared destination type, generic arguments included
//! - **Handle**: A typed, shared reference to a bean, used for nested objects
//! - **Mapper**: The configured engine; pairs properties by name and recurses
//! - **MappingContext**: Per-call identity cache and type overrides
//!
//! # Example
//!
//! ```
//! use isomer_core::{Handle, Mappable, Mapper};
//!
//! #[derive(Default, Mappable)]
//! struct AddressBo {
//!     city: String,
//! }
//!
//! #[derive(Default, Mappable)]
//! struct PersonBo {
//!     name: String,
//!     address_bo: Option<Handle<AddressBo>>,
//! }
//!
//! #[derive(Default, Mappable)]
//! struct AddressDto {
//!     city: String,
//! }
//!
//! #[derive(Default, Mappable)]
//! struct PersonDto {
//!     name: String,
//!     address_dto: Option<Handle<AddressDto>>,
//! }
//!
//! let person = Handle::new(PersonBo {
//!     name: "Grace".into(),
//!     address_bo: Some(Handle::new(AddressBo { city: "Arlington".into() })),
//! });
//!
//! let dto: Handle<PersonDto> = Mapper::new().map(&person).unwrap();
//! let dto = dto.borrow();
//! assert_eq!(dto.name, "Grace");
//! assert_eq!(dto.address_dto.as_ref().unwrap().borrow().city, "Arlington");
//! ```

// Lets the derive's `::isomer_core` paths resolve inside this crate.
extern crate self as isomer_core;

mod bean;
mod config;
mod context;
mod convert;
mod error;
mod handle;
mod mapper;
mod registry;
mod resolver;
mod ty;
mod value;

pub use bean::{
    Accessor, Bean, BeanType, EnumType, Enumeration, Mutator, construct_default, enum_from_value,
};
pub use config::{ConfigError, DEFAULT_SUFFIXES, MapperConfig};
pub use context::{MappingContext, OverrideTable};
pub use convert::{FromValue, ToValue, Typed};
pub use error::{BoxError, MapError, PropertyError};
pub use handle::Handle;
pub use mapper::Mapper;
pub use registry::{CustomMappers, Hooks};
pub use resolver::{ACCESSOR_PREFIX, AccessorResolver, BOOLEAN_ACCESSOR_PREFIX, MUTATOR_PREFIX};
pub use ty::{CollectionKind, Primitive, Ty};
pub use value::{EnumValue, ObjectRef, Value, ValueKind};

#[cfg(feature = "derive")]
pub use isomer_derive::Mappable;
