//! Dense LU decomposition
//!
//! Doolittle factorization `PA = LU` with partial pivoting, stored in a
//! single matrix (unit lower triangle below the diagonal, upper triangle
//! on and above it). Meant for the small systems produced by point
//! constraints, where a direct solve is cheaper than any iterative one.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Pivots smaller than this are treated as zero
const PIVOT_TOLERANCE: f64 = 1e-30;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("matrix is singular: pivot {pivot:e} in column {column}")]
    SingularMatrix { column: usize, pivot: f64 },
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("empty system")]
    EmptySystem,
}

/// Factorization `PA = LU`
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Packed L (strictly below diagonal) and U (on and above)
    pub lu: Array2<T>,
    /// `permutation[i]` is the row of `A` that ended up in row `i`
    pub permutation: Vec<usize>,
}

impl<T: ComplexField> LuFactorization<T> {
    /// System dimension
    pub fn dim(&self) -> usize {
        self.permutation.len()
    }

    /// Ratio of the smallest to the largest pivot magnitude
    ///
    /// A cheap conditioning indicator: values near zero flag a system
    /// whose solution is dominated by round-off.
    pub fn pivot_ratio(&self) -> f64 {
        let pivots = self.lu.diag().map(|p| p.modulus());
        let max = pivots.iter().copied().fold(0.0, f64::max);
        let min = pivots.iter().copied().fold(f64::INFINITY, f64::min);
        if max == 0.0 { 0.0 } else { min / max }
    }

    /// Solve `Ax = b` with the stored factors
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        let n = self.dim();
        if b.len() != n {
            return Err(LuError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        // Ly = Pb
        let mut x: Array1<T> = self.permutation.iter().map(|&row| b[row]).collect();
        for i in 1..n {
            let mut sum = x[i];
            for j in 0..i {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum;
        }

        // Ux = y
        for i in (0..n).rev() {
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= self.lu[[i, j]] * x[j];
            }
            x[i] = sum / self.lu[[i, i]];
        }

        Ok(x)
    }
}

/// Factorize a square matrix with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let (n, m) = a.dim();
    if n == 0 {
        return Err(LuError::EmptySystem);
    }
    if n != m {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: m,
        });
    }

    let mut lu = a.to_owned();
    let mut permutation: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (pivot_row, pivot) = (k..n)
            .map(|i| (i, lu[[i, k]].modulus()))
            .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if lu[[pivot_row, k]].is_zero_approx(PIVOT_TOLERANCE) {
            return Err(LuError::SingularMatrix { column: k, pivot });
        }

        if pivot_row != k {
            for j in 0..n {
                lu.swap([k, j], [pivot_row, j]);
            }
            permutation.swap(k, pivot_row);
        }

        let diag = lu[[k, k]];
        for i in (k + 1)..n {
            let factor = lu[[i, k]] / diag;
            lu[[i, k]] = factor;
            for j in (k + 1)..n {
                let update = factor * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, permutation })
}

/// Solve `Ax = b` using LU decomposition
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}

/// Euclidean norm of the residual `Ax − b`
pub fn residual_norm<T: ComplexField>(a: &Array2<T>, x: &Array1<T>, b: &Array1<T>) -> f64 {
    a.rows()
        .into_iter()
        .zip(b.iter())
        .map(|(row, &bi)| {
            let ax = row
                .iter()
                .zip(x.iter())
                .fold(T::zero(), |acc, (&aij, &xj)| acc + aij * xj);
            (ax - bi).modulus_sqr()
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_lu_solve_real() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
        let b = array![1.0_f64, 2.0];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
        assert!(residual_norm(&a, &x, &b) < 1e-12);
    }

    #[test]
    fn test_lu_solve_complex() {
        let a = array![
            [Complex64::new(0.1, 2.0), Complex64::new(1.0, -1.0)],
            [Complex64::new(-0.5, 0.25), Complex64::new(3.0, 0.5)],
        ];
        let b = array![Complex64::new(1.0, 0.0), Complex64::new(-2.0, 1.0)];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");
        assert!(residual_norm(&a, &x, &b) < 1e-12);
    }

    #[test]
    fn test_requires_pivoting() {
        // Zero in the leading position
        let a = array![[0.0_f64, 2.0, 1.0], [1.0, 1.0, 0.0], [3.0, 0.0, 1.0]];
        let b = array![3.0_f64, 2.0, 4.0];

        let factorization = lu_factorize(&a).expect("pivoting handles the zero");
        assert_ne!(factorization.permutation, vec![0, 1, 2]);
        let x = factorization.solve(&b).expect("solve");
        for (xi, expected) in x.iter().zip([1.0, 1.0, 1.0]) {
            assert_relative_eq!(*xi, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_matrix() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0]];
        let b = array![1.0_f64, 2.0];

        match lu_solve(&a, &b) {
            Err(LuError::SingularMatrix { column, .. }) => assert_eq!(column, 1),
            other => panic!("expected singular matrix, got {:?}", other),
        }
    }

    #[test]
    fn test_tiny_complex_pivot_is_singular() {
        let a = array![
            [Complex64::new(1e-31, 1e-31), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ];
        match lu_factorize(&a) {
            Err(LuError::SingularMatrix { column, pivot }) => {
                assert_eq!(column, 0);
                assert!(pivot < 1e-30);
            }
            other => panic!("expected singular matrix, got {:?}", other),
        }

        let scaled = a.mapv(|z| z * 1e10);
        assert!(lu_factorize(&scaled).is_ok());
    }

    #[test]
    fn test_dimension_checks() {
        let rect = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            lu_factorize(&rect),
            Err(LuError::DimensionMismatch { expected: 2, got: 3 })
        ));
        assert_eq!(
            lu_factorize(&Array2::<f64>::zeros((0, 0))).unwrap_err(),
            LuError::EmptySystem
        );

        let f = lu_factorize(&array![[2.0_f64]]).unwrap();
        assert!(f.solve(&array![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_pivot_ratio() {
        let well = lu_factorize(&Array2::<f64>::eye(4)).unwrap();
        assert_relative_eq!(well.pivot_ratio(), 1.0);

        let poor = lu_factorize(&array![[1.0_f64, 0.0], [0.0, 1e-9]]).unwrap();
        assert!(poor.pivot_ratio() < 1e-8);
    }

    #[test]
    fn test_multiple_right_hand_sides() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let factorization = lu_factorize(&a).unwrap();

        for b in [array![1.0_f64, 2.0, 3.0], array![4.0_f64, 5.0, 6.0]] {
            let x = factorization.solve(&b).unwrap();
            assert!(residual_norm(&a, &x, &b) < 1e-12);
        }
    }
}
