use std::fmt::Debug;

/// The numeric kernels a [`Vector`](super::vector::Vector) or
/// [`Matrix`](super::matrix::Matrix) delegates to.
///
/// Callers validate every shape before dispatching, so kernels may assume
/// their slices are consistent: binary element-wise kernels receive `a`, `b`
/// and `out` of equal length, and matrix kernels receive row-major buffers
/// whose lengths match the dimensions they are given.
///
/// A backend is chosen once, as the type parameter of the network, and never
/// branched on afterwards.
pub trait Backend: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Short human-readable name, used in logs.
    const NAME: &'static str;

    fn negate(a: &[f32], out: &mut [f32]);

    fn add(a: &[f32], b: &[f32], out: &mut [f32]);

    fn sub(a: &[f32], b: &[f32], out: &mut [f32]);

    /// Element-wise (Hadamard) product.
    fn mult(a: &[f32], b: &[f32], out: &mut [f32]);

    fn scale(a: &[f32], factor: f32, out: &mut [f32]);

    fn div(a: &[f32], divisor: f32, out: &mut [f32]);

    fn dot(a: &[f32], b: &[f32]) -> f32;

    fn copy(src: &[f32], dst: &mut [f32]);

    /// `out[j] = sum_i m[j * cols + i] * v[i]` for `j in 0..rows`.
    fn gemv(m: &[f32], cols: usize, rows: usize, v: &[f32], out: &mut [f32]);

    /// Row-major product of `a` (`rows` x `inner`) and `b` (`inner` x `cols`).
    fn gemm(a: &[f32], b: &[f32], rows: usize, inner: usize, cols: usize, out: &mut [f32]);

    /// `out[j * row.len() + i] = col[j] * row[i]`.
    fn outer(col: &[f32], row: &[f32], out: &mut [f32]);

    /// Transposes a row-major `rows` x `cols` buffer into `cols` x `rows`.
    fn transpose(a: &[f32], cols: usize, rows: usize, out: &mut [f32]);
}
