pub mod combiner;
pub mod data_loader;
pub mod error;
pub mod frame_cache;
