// src/ingest/providers/mod.rs
pub mod json_file;
pub mod rss;

pub use json_file::JsonFileProvider;
pub use rss::RssFeedProvider;
