pub mod http;
pub mod store;

pub use http::HttpApiAdapter;
pub use store::{FileStore, MemoryStore};
