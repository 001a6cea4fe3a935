//! Global log stream instances.
//!
//! One stream per execution context: single producer, single consumer.

use crate::logging::LogStream;

/// Engine log stream (timer ISR only).
///
/// Single producer (engine tick), single consumer (log drain).
pub static RT_LOG_STREAM: LogStream = LogStream::new();

/// Background log stream (controller loop only).
///
/// Single producer (foreground loop), single consumer (log drain).
pub static BG_LOG_STREAM: LogStream = LogStream::new();
