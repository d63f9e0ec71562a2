//! Domain types stored in the document store.

pub mod configuration;
pub mod layer_design;
pub mod product;
pub mod user;

pub use configuration::Configuration;
pub use layer_design::{CustomizableEntry, LayerDesign};
pub use product::Product;
pub use user::{PublicUser, User};
