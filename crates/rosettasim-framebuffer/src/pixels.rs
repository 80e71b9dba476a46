//! Conversion from the bridge's bottom-up BGRA payload to top-down RGBA.

use crate::error::{FramebufferError, Result};
use crate::layout::BYTES_PER_PIXEL;

/// Swap bytes 0 and 2 of every pixel (BGRA <-> RGBA). Green and alpha are untouched.
///
/// Trailing bytes that do not form a whole pixel are left as-is.
pub fn swap_red_blue_in_place(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

/// Mirror rows vertically into a new buffer: output row `y` is input row `rows - 1 - y`.
///
/// Only whole rows are copied: a trailing partial row (when `src.len()` is not a multiple of
/// `row_bytes`) is dropped. [`to_top_left_rgba`] validates the length before flipping.
pub fn flip_rows(src: &[u8], row_bytes: usize) -> Vec<u8> {
    if row_bytes == 0 {
        return src.to_vec();
    }

    let mut out = Vec::with_capacity(src.len());
    for row in src.chunks_exact(row_bytes).rev() {
        out.extend_from_slice(row);
    }
    out
}

/// Turn a bottom-left-origin BGRA frame into a top-left-origin RGBA frame.
///
/// Rows are assumed to be tightly packed (`width * 4` bytes); the payload length must match the
/// dimensions exactly.
pub fn to_top_left_rgba(bgra_bottom_up: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let row_bytes = (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .ok_or(FramebufferError::DimensionsOverflow { width, height })?;
    let expected = row_bytes
        .checked_mul(height as usize)
        .ok_or(FramebufferError::DimensionsOverflow { width, height })?;
    if bgra_bottom_up.len() != expected {
        return Err(FramebufferError::PayloadLength {
            expected,
            actual: bgra_bottom_up.len(),
        });
    }

    let mut out = flip_rows(bgra_bottom_up, row_bytes);
    swap_red_blue_in_place(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn two_by_two_frame_is_flipped_and_reordered() {
        // Bottom row first, as written by the bridge.
        let bgra: [u8; 16] = [
            0, 0, 255, 255, 0, 255, 0, 255, // bottom row
            255, 0, 0, 255, 128, 128, 128, 255, // top row
        ];

        let rgba = to_top_left_rgba(&bgra, 2, 2).unwrap();
        assert_eq!(
            rgba,
            vec![
                0, 0, 255, 255, 128, 128, 128, 255, // top row
                255, 0, 0, 255, 0, 255, 0, 255, // bottom row
            ]
        );
    }

    #[test]
    fn channel_swap_twice_is_identity() {
        let original: Vec<u8> = (0u8..=255).collect();
        let mut buf = original.clone();
        swap_red_blue_in_place(&mut buf);
        assert_ne!(buf, original);
        assert_eq!(&buf[..4], &[2, 1, 0, 3]);
        swap_red_blue_in_place(&mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn flip_twice_is_identity() {
        let original: Vec<u8> = (0u8..60).collect();
        let once = flip_rows(&original, 12);
        assert_eq!(&once[..12], &original[48..60]);
        assert_eq!(flip_rows(&once, 12), original);
    }

    #[test]
    fn flip_drops_trailing_partial_row() {
        let src: Vec<u8> = (0u8..10).collect();
        assert_eq!(flip_rows(&src, 4), vec![4, 5, 6, 7, 0, 1, 2, 3]);
    }

    #[test]
    fn single_row_frame_only_swaps_channels() {
        let bgra = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(
            to_top_left_rgba(&bgra, 2, 1).unwrap(),
            vec![3, 2, 1, 4, 7, 6, 5, 8]
        );
    }

    #[test]
    fn rejects_payload_that_does_not_match_dimensions() {
        let err = to_top_left_rgba(&[0u8; 15], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            FramebufferError::PayloadLength {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn empty_frame_is_empty() {
        assert!(to_top_left_rgba(&[], 0, 5).unwrap().is_empty());
        assert!(to_top_left_rgba(&[], 5, 0).unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn channel_swap_is_an_involution(original in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let mut buf = original.clone();
            swap_red_blue_in_place(&mut buf);
            for (px, src) in buf.chunks_exact(4).zip(original.chunks_exact(4)) {
                let expected = [src[2], src[1], src[0], src[3]];
                prop_assert_eq!(px, &expected[..]);
            }
            swap_red_blue_in_place(&mut buf);
            prop_assert_eq!(buf, original);
        }

        #[test]
        fn flip_is_an_involution(
            (row_bytes, original) in (1usize..64, 0usize..32).prop_flat_map(|(row_bytes, rows)| {
                (Just(row_bytes), proptest::collection::vec(any::<u8>(), row_bytes * rows))
            })
        ) {
            let once = flip_rows(&original, row_bytes);
            prop_assert_eq!(once.len(), original.len());
            prop_assert_eq!(flip_rows(&once, row_bytes), original);
        }
    }
}
