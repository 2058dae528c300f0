//! Test data generators for creating synthetic index-like rasters.
//!
//! These generators create predictable, verifiable sample patterns that
//! can be used across the test suite. They return raw row-major sample
//! vectors; callers wrap them in their own layer types.

/// Creates a grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that data survives cropping and
/// reassembly by checking that grid[row][col] == col * 1000 + row.
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid filled with one value.
pub fn uniform_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates an NDVI-like gradient from sparse vegetation in the north to
/// dense vegetation in the south.
///
/// Values run linearly from 0.1 on row 0 to 0.8 on the last row, which
/// keeps everything below the 0.92 saturation bound.
pub fn gradient_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let t = if height > 1 {
            row as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let value = 0.1 + 0.7 * t;
        for _ in 0..width {
            data.push(value);
        }
    }
    data
}

/// Replaces every n-th cell of a grid with NaN.
///
/// With `stride = 2` on a 3x3 grid this yields 5 valid and 4 no-data
/// samples, the sparsity pattern used by the aggregation tests.
pub fn with_nodata_stride(mut data: Vec<f32>, stride: usize) -> Vec<f32> {
    for (i, v) in data.iter_mut().enumerate() {
        if stride > 0 && i % stride == 1 {
            *v = f32::NAN;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
    }

    #[test]
    fn test_gradient_grid_bounds() {
        let grid = gradient_grid(4, 8);
        assert!((grid[0] - 0.1).abs() < 1e-6);
        assert!((grid[31] - 0.8).abs() < 1e-6);
        assert!(grid.iter().all(|&v| v < 0.92));
    }

    #[test]
    fn test_with_nodata_stride() {
        let grid = with_nodata_stride(uniform_grid(3, 3, 0.5), 2);
        let valid = grid.iter().filter(|v| !v.is_nan()).count();
        assert_eq!(valid, 5);
    }
}
