//! Testing utilities for EndoStudio
//!
//! Synthetic cameras, an encoder and ready-made hosts backed by temporary
//! directories, so the whole studio can run without hardware.

pub mod providers;
pub mod synthetic_data;

pub use providers::{
    native_test_host, native_test_host_with, web_test_host, web_test_host_with, SyntheticEncoder,
    SyntheticMedia, SyntheticStream, SYNTHETIC_TRAILER,
};
pub use synthetic_data::{synthetic_devices, synthetic_video_frame};
