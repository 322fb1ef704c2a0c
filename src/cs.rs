pub mod compression;
pub mod error;
pub mod hashing;

pub use compression::*;
pub use hashing::*;
