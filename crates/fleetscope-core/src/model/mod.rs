pub mod binding;
pub mod category;
pub mod edge;
pub mod entity;
pub mod project;

pub use binding::{
    BindingMode, BindingOwner, DataDriverConfig, DataDriverStream, EntityState,
    ServiceDomainBinding, StreamDirection,
};
pub use category::{Category, CategoryValue};
pub use edge::{Edge, EdgeLabelSnapshot};
pub use entity::{EntityKind, ScopedEntity};
pub use project::{EdgeSelectorType, Project};
