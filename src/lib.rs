pub mod analyst;
pub mod config;
pub mod data_store;
pub mod describer;
pub mod semantic_model;
pub mod session;
pub mod sql_parser;

pub use semantic_model::SemanticModel;
pub use session::Session;
