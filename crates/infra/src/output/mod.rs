//! Output boundary

pub mod sink;

pub use sink::JsonLinesSink;
