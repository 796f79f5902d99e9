//! CLI command implementations

pub mod cache;
pub mod config;
pub mod lookup;
pub mod probe;
pub mod validate;

pub use cache::execute as cache;
pub use config::execute as config;
pub use lookup::execute as lookup;
pub use probe::execute as probe;
pub use validate::execute as validate;
