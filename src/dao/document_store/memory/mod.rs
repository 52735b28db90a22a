mod snapshot;
mod store;

pub use store::MemoryDocumentStore;
