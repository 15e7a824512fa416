//! Backend that forwards every kernel to the C library in `native/kernels.c`.
//!
//! Calls are synchronous and block for their whole duration. The library
//! keeps no state of its own, so the only aliasing concern is the one the
//! borrow checker already enforces on the buffers passed in.

use super::backend::Backend;

mod ffi {
    extern "C" {
        pub fn bnn_negate(a: *const f32, out: *mut f32, n: usize);
        pub fn bnn_add(a: *const f32, b: *const f32, out: *mut f32, n: usize);
        pub fn bnn_sub(a: *const f32, b: *const f32, out: *mut f32, n: usize);
        pub fn bnn_mult(a: *const f32, b: *const f32, out: *mut f32, n: usize);
        pub fn bnn_scale(a: *const f32, factor: f32, out: *mut f32, n: usize);
        pub fn bnn_div(a: *const f32, divisor: f32, out: *mut f32, n: usize);
        pub fn bnn_dot(a: *const f32, b: *const f32, n: usize) -> f32;
        pub fn bnn_copy(src: *const f32, dst: *mut f32, n: usize);
        pub fn bnn_gemv(m: *const f32, cols: usize, rows: usize, v: *const f32, out: *mut f32);
        pub fn bnn_transpose(a: *const f32, cols: usize, rows: usize, out: *mut f32);
        pub fn bnn_gemm_bt(
            a: *const f32,
            bt: *const f32,
            rows: usize,
            inner: usize,
            cols: usize,
            out: *mut f32,
        );
        pub fn bnn_outer(col: *const f32, rows: usize, row: *const f32, cols: usize, out: *mut f32);
    }
}

/// Native C kernels behind an `extern "C"` boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Native;

impl Backend for Native {
    const NAME: &'static str = "native";

    fn negate(a: &[f32], out: &mut [f32]) {
        assert_eq!(a.len(), out.len());
        // SAFETY: both buffers hold `out.len()` elements.
        unsafe { ffi::bnn_negate(a.as_ptr(), out.as_mut_ptr(), out.len()) }
    }

    fn add(a: &[f32], b: &[f32], out: &mut [f32]) {
        assert!(a.len() == out.len() && b.len() == out.len());
        // SAFETY: all three buffers hold `out.len()` elements.
        unsafe { ffi::bnn_add(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), out.len()) }
    }

    fn sub(a: &[f32], b: &[f32], out: &mut [f32]) {
        assert!(a.len() == out.len() && b.len() == out.len());
        // SAFETY: all three buffers hold `out.len()` elements.
        unsafe { ffi::bnn_sub(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), out.len()) }
    }

    fn mult(a: &[f32], b: &[f32], out: &mut [f32]) {
        assert!(a.len() == out.len() && b.len() == out.len());
        // SAFETY: all three buffers hold `out.len()` elements.
        unsafe { ffi::bnn_mult(a.as_ptr(), b.as_ptr(), out.as_mut_ptr(), out.len()) }
    }

    fn scale(a: &[f32], factor: f32, out: &mut [f32]) {
        assert_eq!(a.len(), out.len());
        // SAFETY: both buffers hold `out.len()` elements.
        unsafe { ffi::bnn_scale(a.as_ptr(), factor, out.as_mut_ptr(), out.len()) }
    }

    fn div(a: &[f32], divisor: f32, out: &mut [f32]) {
        assert_eq!(a.len(), out.len());
        // SAFETY: both buffers hold `out.len()` elements.
        unsafe { ffi::bnn_div(a.as_ptr(), divisor, out.as_mut_ptr(), out.len()) }
    }

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len());
        // SAFETY: both buffers hold `a.len()` elements.
        unsafe { ffi::bnn_dot(a.as_ptr(), b.as_ptr(), a.len()) }
    }

    fn copy(src: &[f32], dst: &mut [f32]) {
        assert_eq!(src.len(), dst.len());
        // SAFETY: both buffers hold `dst.len()` elements and cannot overlap.
        unsafe { ffi::bnn_copy(src.as_ptr(), dst.as_mut_ptr(), dst.len()) }
    }

    fn gemv(m: &[f32], cols: usize, rows: usize, v: &[f32], out: &mut [f32]) {
        assert!(m.len() == cols * rows && v.len() == cols && out.len() == rows);
        // SAFETY: lengths checked against the dimensions above.
        unsafe { ffi::bnn_gemv(m.as_ptr(), cols, rows, v.as_ptr(), out.as_mut_ptr()) }
    }

    fn gemm(a: &[f32], b: &[f32], rows: usize, inner: usize, cols: usize, out: &mut [f32]) {
        assert!(a.len() == rows * inner && b.len() == inner * cols && out.len() == rows * cols);
        let mut bt = vec![0.0; b.len()];
        Native::transpose(b, cols, inner, &mut bt);
        // SAFETY: lengths checked against the dimensions above; `bt` has `b.len()` elements.
        unsafe { ffi::bnn_gemm_bt(a.as_ptr(), bt.as_ptr(), rows, inner, cols, out.as_mut_ptr()) }
    }

    fn outer(col: &[f32], row: &[f32], out: &mut [f32]) {
        assert_eq!(out.len(), col.len() * row.len());
        // SAFETY: `out` holds `col.len() * row.len()` elements.
        unsafe { ffi::bnn_outer(col.as_ptr(), col.len(), row.as_ptr(), row.len(), out.as_mut_ptr()) }
    }

    fn transpose(a: &[f32], cols: usize, rows: usize, out: &mut [f32]) {
        assert!(a.len() == cols * rows && out.len() == a.len());
        // SAFETY: both buffers hold `cols * rows` elements.
        unsafe { ffi::bnn_transpose(a.as_ptr(), cols, rows, out.as_mut_ptr()) }
    }
}
