//! Synthetic frames and devices for offline testing

use crate::types::{DeviceDescriptor, VideoFrame};

/// A gradient frame that changes with `frame_number`, so consecutive frames differ
pub fn synthetic_video_frame(frame_number: u64, width: u32, height: u32) -> VideoFrame {
    let mut data = vec![0u8; (width * height * 3) as usize];

    let base = (frame_number % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    VideoFrame::new(data, width, height, "synthetic".to_string())
}

/// A laptop webcam, a USB endoscope and one microphone
pub fn synthetic_devices() -> Vec<DeviceDescriptor> {
    vec![
        DeviceDescriptor::video("0", "Integrated Camera"),
        DeviceDescriptor::video("1", "USB 2.0 Endoscope"),
        DeviceDescriptor::audio("mic-0", "Built-in Microphone"),
    ]
}
