//! Frame conversion and transformation utilities.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::Frame;

/// Decode a nokhwa buffer (MJPEG, YUYV, NV12, ...) into an RGB frame.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        timestamp: Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let bpp = Frame::BYTES_PER_PIXEL;
    let stride = width * bpp;
    if stride == 0 {
        return;
    }

    for row in frame.data.chunks_exact_mut(stride) {
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
