//! Export requests and the raw store they fill.

pub mod fetch;
pub mod key;
pub mod store;

pub use key::DataKey;
pub use store::RawDataStore;
