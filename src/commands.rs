pub mod enqueue;
pub mod jobs;
pub mod migrate;
pub mod serve;
pub mod version;
