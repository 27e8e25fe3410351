//! Live chat sources
//!
//! This module provides:
//! - The `ChatSource` capability the relay loop polls
//! - A YouTube implementation over the innertube live chat endpoints
//! - Video id extraction from bare ids and watch URLs

pub mod parser;
pub mod source;
pub mod types;
pub mod video_id;
pub mod youtube;

// Re-export commonly used types
pub use source::ChatSource;
pub use types::ChatMessage;
pub use video_id::parse_video_id;
pub use youtube::{YouTubeChat, YouTubeConfig};
