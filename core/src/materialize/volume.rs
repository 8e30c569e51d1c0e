use crate::error::{CirrusError, Result};
use crate::types::{BScanOrientation, VolumeShape};
use ndarray::{s, Array3};

/// Reshapes a raw `u8` dump into a (z, y, x) volume
///
/// The buffer holds `depth` consecutive B-scans of `height * width` bytes
/// each. With [`BScanOrientation::Flipped`] both in-plane axes of every
/// B-scan are reversed.
///
/// # Errors
///
/// Returns `CorruptInput` if the buffer length differs from the voxel count.
///
/// # Example
///
/// ```
/// use cirrusvol_core::materialize::reshape_volume;
/// use cirrusvol_core::{BScanOrientation, VolumeShape};
///
/// let raw: Vec<u8> = (0..8).collect();
/// let vol = reshape_volume(raw, VolumeShape::new(2, 2, 2), BScanOrientation::Flipped).unwrap();
/// assert_eq!(vol[[0, 0, 0]], 3);
/// assert_eq!(vol[[1, 1, 1]], 4);
/// ```
pub fn reshape_volume(
    bytes: Vec<u8>,
    shape: VolumeShape,
    orientation: BScanOrientation,
) -> Result<Array3<u8>> {
    let expected = shape.voxel_count().unwrap_or(u64::MAX);
    if bytes.len() as u64 != expected {
        return Err(CirrusError::CorruptInput {
            expected: usize::try_from(expected).unwrap_or(usize::MAX),
            actual: bytes.len(),
        });
    }

    let actual = bytes.len();
    let raw = Array3::from_shape_vec(shape.as_tuple(), bytes).map_err(|_| {
        CirrusError::CorruptInput {
            expected: actual,
            actual,
        }
    })?;

    match orientation {
        BScanOrientation::Raw => Ok(raw),
        BScanOrientation::Flipped => {
            let mut volume = Array3::<u8>::zeros(shape.as_tuple());
            for (i, bscan) in raw.outer_iter().enumerate() {
                volume
                    .slice_mut(s![i, .., ..])
                    .assign(&bscan.slice(s![..;-1, ..;-1]));
            }
            Ok(volume)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_raw_keeps_file_order() {
        let shape = VolumeShape::new(3, 4, 5);
        let bytes = ramp(60);
        let vol = reshape_volume(bytes.clone(), shape, BScanOrientation::Raw).unwrap();

        assert_eq!(vol.dim(), (3, 4, 5));
        assert_eq!(vol.iter().copied().collect::<Vec<_>>(), bytes);
    }

    #[test]
    fn test_flipped_reverses_each_bscan() {
        let shape = VolumeShape::new(3, 4, 5);
        let bytes = ramp(60);
        let vol = reshape_volume(bytes.clone(), shape, BScanOrientation::Flipped).unwrap();

        for z in 0..3 {
            for y in 0..4 {
                for x in 0..5 {
                    let src = z * 20 + (3 - y) * 5 + (4 - x);
                    assert_eq!(vol[[z, y, x]], bytes[src]);
                }
            }
        }
    }

    #[test]
    fn test_length_mismatch_is_corrupt_input() {
        let err = reshape_volume(ramp(59), VolumeShape::new(3, 4, 5), BScanOrientation::Raw)
            .unwrap_err();
        match err {
            CirrusError::CorruptInput { expected, actual } => {
                assert_eq!(expected, 60);
                assert_eq!(actual, 59);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
