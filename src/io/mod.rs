pub mod file;

pub use file::{load_feed, save_feed, FeedError};
