use std::fmt;
use std::marker::PhantomData;

use rand::Rng;

use crate::error::{check_len, Result};
use crate::math::backend::Backend;
use crate::math::matrix::Matrix;

/// A fixed-length column of `f32` values whose arithmetic runs on `B`.
///
/// Arithmetic never mutates; it returns a new vector. Only `set`, `set_all`,
/// `set_each` and `fill_with_random_values` write in place.
#[derive(Clone, PartialEq)]
pub struct Vector<B: Backend> {
    values: Vec<f32>,
    backend: PhantomData<B>,
}

impl<B: Backend> Vector<B> {
    pub fn zeros(size: usize) -> Self {
        Self::from_vec(vec![0.0; size])
    }

    pub fn from_vec(values: Vec<f32>) -> Self {
        Vector {
            values,
            backend: PhantomData,
        }
    }

    pub fn of(values: &[f32]) -> Self {
        Self::from_vec(values.to_vec())
    }

    /// Builds a vector of `size` elements from an index -> value rule.
    pub fn from_fn<F>(size: usize, function: F) -> Self
    where
        F: Fn(usize) -> f32,
    {
        Self::from_vec((0..size).map(function).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values.clone()
    }

    /// Panics if `i` is out of bounds, like slice indexing.
    pub fn get(&self, i: usize) -> f32 {
        self.values[i]
    }

    pub fn set(&mut self, i: usize, value: f32) {
        self.values[i] = value;
    }

    /// Copies `other` into this vector without reallocating.
    pub fn set_all(&mut self, other: &Vector<B>) -> Result<()> {
        check_len("Vector::set_all", self.len(), other.len())?;
        B::copy(&other.values, &mut self.values);
        Ok(())
    }

    /// Overwrites every element in place with `function(index)`.
    pub fn set_each<F>(&mut self, function: F)
    where
        F: Fn(usize) -> f32,
    {
        for (i, x) in self.values.iter_mut().enumerate() {
            *x = function(i);
        }
    }

    /// A new vector of the same length rebuilt from an index -> value rule.
    pub fn with_each<F>(&self, function: F) -> Vector<B>
    where
        F: Fn(usize) -> f32,
    {
        Self::from_fn(self.len(), function)
    }

    pub fn map<F>(&self, function: F) -> Vector<B>
    where
        F: Fn(f32) -> f32,
    {
        self.with_each(|i| function(self.values[i]))
    }

    /// Fills the vector with values drawn uniformly from `[min, max_exclusive)`.
    pub fn fill_with_random_values<R>(&mut self, min: f32, max_exclusive: f32, rng: &mut R) -> &mut Self
    where
        R: Rng + ?Sized,
    {
        for x in self.values.iter_mut() {
            *x = rng.gen_range(min..max_exclusive);
        }
        self
    }

    /// Reinterprets this vector as a matrix with one row.
    pub fn to_row_vector(&self) -> Matrix<B> {
        Matrix::from_raw(self.len(), 1, self.values.clone())
    }

    pub fn negate(&self) -> Vector<B> {
        self.unary(|a, out| B::negate(a, out))
    }

    pub fn add(&self, other: &Vector<B>) -> Result<Vector<B>> {
        self.binary("Vector::add", other, |a, b, out| B::add(a, b, out))
    }

    pub fn sub(&self, other: &Vector<B>) -> Result<Vector<B>> {
        self.binary("Vector::sub", other, |a, b, out| B::sub(a, b, out))
    }

    /// Element-wise product.
    pub fn mult(&self, other: &Vector<B>) -> Result<Vector<B>> {
        self.binary("Vector::mult", other, |a, b, out| B::mult(a, b, out))
    }

    pub fn scale(&self, factor: f32) -> Vector<B> {
        self.unary(|a, out| B::scale(a, factor, out))
    }

    pub fn div(&self, divisor: f32) -> Vector<B> {
        self.unary(|a, out| B::div(a, divisor, out))
    }

    pub fn dot(&self, other: &Vector<B>) -> Result<f32> {
        check_len("Vector::dot", self.len(), other.len())?;
        Ok(B::dot(&self.values, &other.values))
    }

    /// Column vector times row vector: entry `[i, j]` is `self[j] * row[i]`.
    pub fn outer(&self, row: &Vector<B>) -> Matrix<B> {
        let mut data = vec![0.0; self.len() * row.len()];
        B::outer(&self.values, &row.values, &mut data);
        Matrix::from_raw(row.len(), self.len(), data)
    }

    /// Column vector times a one-row matrix.
    pub fn mult_matrix(&self, row_vector: &Matrix<B>) -> Result<Matrix<B>> {
        check_len("Vector::mult_matrix (rows)", 1, row_vector.rows())?;
        Ok(self.outer(&row_vector.row(0)))
    }

    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Index of the first maximal element, `None` when empty.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &x) in self.values.iter().enumerate() {
            match best {
                Some((_, max)) if x <= max => {}
                _ => best = Some((i, x)),
            }
        }
        best.map(|(i, _)| i)
    }

    fn unary<F>(&self, kernel: F) -> Vector<B>
    where
        F: FnOnce(&[f32], &mut [f32]),
    {
        let mut out = vec![0.0; self.len()];
        kernel(&self.values, &mut out);
        Vector::from_vec(out)
    }

    fn binary<F>(&self, operation: &'static str, other: &Vector<B>, kernel: F) -> Result<Vector<B>>
    where
        F: FnOnce(&[f32], &[f32], &mut [f32]),
    {
        check_len(operation, self.len(), other.len())?;
        let mut out = vec![0.0; self.len()];
        kernel(&self.values, &other.values, &mut out);
        Ok(Vector::from_vec(out))
    }
}

impl<B: Backend> fmt::Debug for Vector<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}>{:?}", B::NAME, self.values)
    }
}

impl<B: Backend> From<Vec<f32>> for Vector<B> {
    fn from(values: Vec<f32>) -> Self {
        Vector::from_vec(values)
    }
}
