pub mod factory;
pub mod id;
pub mod migrate;
pub mod model;
pub mod section;
pub mod templates;
pub mod validate;
pub mod variant;
