use std::fmt;
use std::marker::PhantomData;

use rand::Rng;

use crate::error::{check_len, Result};
use crate::math::backend::Backend;
use crate::math::vector::Vector;

/// A dense `cols` x `rows` matrix.
///
/// `cols` is the input (contraction) dimension and `rows` the output
/// dimension, so multiplying by a vector maps `cols` values to `rows` values.
/// Storage is row-major: row `j` holds the `cols` entries `(0..cols, j)`.
#[derive(Clone, PartialEq)]
pub struct Matrix<B: Backend> {
    cols: usize,
    rows: usize,
    data: Vec<f32>,
    backend: PhantomData<B>,
}

impl<B: Backend> Matrix<B> {
    pub fn zeros(cols: usize, rows: usize) -> Self {
        Self::from_raw(cols, rows, vec![0.0; cols * rows])
    }

    pub(crate) fn from_raw(cols: usize, rows: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), cols * rows);
        Matrix {
            cols,
            rows,
            data,
            backend: PhantomData,
        }
    }

    /// Stacks `rows` as the rows of a new matrix. All rows must share a length.
    pub fn from_rows(rows: Vec<Vector<B>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vector::len);
        let mut data = Vec::with_capacity(cols * rows.len());
        for row in &rows {
            check_len("Matrix::from_rows", cols, row.len())?;
            data.extend_from_slice(row.as_slice());
        }
        Ok(Self::from_raw(cols, rows.len(), data))
    }

    /// Row-major values, `cols * rows` of them.
    pub fn from_values(cols: usize, rows: usize, values: &[f32]) -> Result<Self> {
        let mut m = Self::zeros(cols, rows);
        m.set_all(values)?;
        Ok(m)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Entry at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> f32 {
        assert!(i < self.cols && j < self.rows, "matrix index ({i}, {j}) out of bounds");
        self.data[j * self.cols + i]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        assert!(i < self.cols && j < self.rows, "matrix index ({i}, {j}) out of bounds");
        self.data[j * self.cols + i] = value;
    }

    pub fn row(&self, j: usize) -> Vector<B> {
        Vector::of(&self.data[j * self.cols..(j + 1) * self.cols])
    }

    pub fn set_row(&mut self, j: usize, values: &Vector<B>) -> Result<()> {
        check_len("Matrix::set_row", self.cols, values.len())?;
        let cols = self.cols;
        B::copy(values.as_slice(), &mut self.data[j * cols..(j + 1) * cols]);
        Ok(())
    }

    pub fn col(&self, i: usize) -> Vector<B> {
        Vector::from_fn(self.rows, |j| self.get(i, j))
    }

    pub fn set_col(&mut self, i: usize, values: &Vector<B>) -> Result<()> {
        check_len("Matrix::set_col", self.rows, values.len())?;
        for j in 0..self.rows {
            self.set(i, j, values.get(j));
        }
        Ok(())
    }

    /// Overwrites every entry from a row-major slice.
    pub fn set_all(&mut self, values: &[f32]) -> Result<()> {
        check_len("Matrix::set_all", self.data.len(), values.len())?;
        B::copy(values, &mut self.data);
        Ok(())
    }

    /// A new matrix of the same shape whose row `j` is `function(j)`.
    pub fn with_each_row<F>(&self, function: F) -> Result<Matrix<B>>
    where
        F: Fn(usize) -> Vector<B>,
    {
        let mut m = Matrix::zeros(self.cols, self.rows);
        for j in 0..self.rows {
            m.set_row(j, &function(j))?;
        }
        Ok(m)
    }

    pub fn map<F>(&self, function: F) -> Matrix<B>
    where
        F: Fn(f32) -> f32,
    {
        Matrix::from_raw(self.cols, self.rows, self.data.iter().map(|&x| function(x)).collect())
    }

    /// Fills every entry with values drawn uniformly from `[min, max_exclusive)`.
    pub fn fill_with_random_values<R>(&mut self, min: f32, max_exclusive: f32, rng: &mut R) -> &mut Self
    where
        R: Rng + ?Sized,
    {
        for x in self.data.iter_mut() {
            *x = rng.gen_range(min..max_exclusive);
        }
        self
    }

    pub fn negate(&self) -> Matrix<B> {
        self.unary(|a, out| B::negate(a, out))
    }

    pub fn add(&self, other: &Matrix<B>) -> Result<Matrix<B>> {
        self.elementwise("Matrix::add", other, |a, b, out| B::add(a, b, out))
    }

    pub fn sub(&self, other: &Matrix<B>) -> Result<Matrix<B>> {
        self.elementwise("Matrix::sub", other, |a, b, out| B::sub(a, b, out))
    }

    pub fn hadamard(&self, other: &Matrix<B>) -> Result<Matrix<B>> {
        self.elementwise("Matrix::hadamard", other, |a, b, out| B::mult(a, b, out))
    }

    pub fn scale(&self, factor: f32) -> Matrix<B> {
        self.unary(|a, out| B::scale(a, factor, out))
    }

    pub fn div(&self, divisor: f32) -> Matrix<B> {
        self.unary(|a, out| B::div(a, divisor, out))
    }

    /// Applies the matrix as a linear map: `out[j] = sum_i self[i, j] * v[i]`.
    pub fn mult_vector(&self, v: &Vector<B>) -> Result<Vector<B>> {
        check_len("Matrix::mult_vector", self.cols, v.len())?;
        let mut out = vec![0.0; self.rows];
        B::gemv(&self.data, self.cols, self.rows, v.as_slice(), &mut out);
        Ok(Vector::from_vec(out))
    }

    /// `self` (cols = k, rows = m) times `other` (cols = n, rows = k) gives
    /// cols = n, rows = m.
    pub fn mult(&self, other: &Matrix<B>) -> Result<Matrix<B>> {
        check_len("Matrix::mult", self.cols, other.rows)?;
        let mut out = vec![0.0; self.rows * other.cols];
        B::gemm(&self.data, &other.data, self.rows, self.cols, other.cols, &mut out);
        Ok(Matrix::from_raw(other.cols, self.rows, out))
    }

    /// Copies into a new `rows` x `cols` matrix with independent storage.
    pub fn transpose(&self) -> Matrix<B> {
        let mut out = vec![0.0; self.data.len()];
        B::transpose(&self.data, self.cols, self.rows, &mut out);
        Matrix::from_raw(self.rows, self.cols, out)
    }

    fn check_shape(&self, operation: &'static str, other: &Matrix<B>) -> Result<()> {
        check_len(operation, self.cols, other.cols)?;
        check_len(operation, self.rows, other.rows)
    }

    fn unary<F>(&self, kernel: F) -> Matrix<B>
    where
        F: FnOnce(&[f32], &mut [f32]),
    {
        let mut out = vec![0.0; self.data.len()];
        kernel(&self.data, &mut out);
        Matrix::from_raw(self.cols, self.rows, out)
    }

    fn elementwise<F>(&self, operation: &'static str, other: &Matrix<B>, kernel: F) -> Result<Matrix<B>>
    where
        F: FnOnce(&[f32], &[f32], &mut [f32]),
    {
        self.check_shape(operation, other)?;
        let mut out = vec![0.0; self.data.len()];
        kernel(&self.data, &other.data, &mut out);
        Ok(Matrix::from_raw(self.cols, self.rows, out))
    }
}

impl<B: Backend> fmt::Debug for Matrix<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix<{}> {} x {} [", B::NAME, self.cols, self.rows)?;
        for j in 0..self.rows {
            writeln!(f, "  {:?}", &self.data[j * self.cols..(j + 1) * self.cols])?;
        }
        write!(f, "]")
    }
}
