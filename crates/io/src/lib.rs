// File I/O: loading PR control exports, caching loads, writing filtered exports

pub mod cache;
pub mod csv;
pub mod error;
pub mod export;
pub mod load;
pub mod xlsx;

pub use cache::{CacheLookup, DatasetCache};
pub use error::{DecodeAttempt, LoadError};
pub use load::{load, load_bytes, LoadOptions, Loaded, SourceFormat, SourceInfo};
