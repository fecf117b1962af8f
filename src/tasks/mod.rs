//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Bucket Cleanup: Removes expired name buckets at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
