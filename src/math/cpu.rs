use super::backend::Backend;

/// Plain in-process backend.
///
/// Every kernel is written in terms of [`with_each`], which rebuilds an output
/// buffer from an index -> value rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cpu;

/// Overwrites every element of `out` with `function(index)`.
#[inline]
pub fn with_each<F>(out: &mut [f32], function: F)
where
    F: Fn(usize) -> f32,
{
    for (i, x) in out.iter_mut().enumerate() {
        *x = function(i);
    }
}

impl Backend for Cpu {
    const NAME: &'static str = "cpu";

    fn negate(a: &[f32], out: &mut [f32]) {
        with_each(out, |i| -a[i]);
    }

    fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
        with_each(out, |i| a[i] + b[i]);
    }

    fn sub(a: &[f32], b: &[f32], out: &mut [f32]) {
        with_each(out, |i| a[i] - b[i]);
    }

    fn mult(a: &[f32], b: &[f32], out: &mut [f32]) {
        with_each(out, |i| a[i] * b[i]);
    }

    fn scale(a: &[f32], factor: f32, out: &mut [f32]) {
        with_each(out, |i| a[i] * factor);
    }

    fn div(a: &[f32], divisor: f32, out: &mut [f32]) {
        with_each(out, |i| a[i] / divisor);
    }

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
    }

    fn copy(src: &[f32], dst: &mut [f32]) {
        with_each(dst, |i| src[i]);
    }

    fn gemv(m: &[f32], cols: usize, _rows: usize, v: &[f32], out: &mut [f32]) {
        with_each(out, |j| Cpu::dot(&m[j * cols..(j + 1) * cols], v));
    }

    fn gemm(a: &[f32], b: &[f32], _rows: usize, inner: usize, cols: usize, out: &mut [f32]) {
        // Columns of `b` become contiguous rows, so every entry is one dot product.
        let mut bt = vec![0.0; b.len()];
        Cpu::transpose(b, cols, inner, &mut bt);
        with_each(out, |idx| {
            let (j, i) = (idx / cols, idx % cols);
            Cpu::dot(&a[j * inner..(j + 1) * inner], &bt[i * inner..(i + 1) * inner])
        });
    }

    fn outer(col: &[f32], row: &[f32], out: &mut [f32]) {
        let n = row.len();
        with_each(out, |idx| col[idx / n] * row[idx % n]);
    }

    fn transpose(a: &[f32], cols: usize, rows: usize, out: &mut [f32]) {
        // `out` has `cols` rows of length `rows`.
        with_each(out, |idx| {
            let (i, j) = (idx / rows, idx % rows);
            a[j * cols + i]
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_each_visits_every_index() {
        let mut out = [0.0; 4];
        with_each(&mut out, |i| i as f32 * 2.0);
        assert_eq!(out, [0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn transpose_of_rectangular_buffer() {
        // 2 rows x 3 cols
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mut out = [0.0; 6];
        Cpu::transpose(&a, 3, 2, &mut out);
        assert_eq!(out, [1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn gemm_matches_naive_loop() {
        // a: 2 x 3, b: 3 x 2
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let mut out = [0.0; 4];
        Cpu::gemm(&a, &b, 2, 3, 2, &mut out);
        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
    }
}
