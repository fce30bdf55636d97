pub mod algolia;
pub mod completion;
pub mod error;
mod http;
