//! Small dense symmetric solves.
//!
//! The optimizer's Hessian approximations are at most a few dozen rows, so
//! plain loops over `Array2` are used throughout.

use ndarray::{Array1, Array2};

/// Lower-triangular Cholesky factor `L` with `A = L·Lᵀ`.
///
/// Returns `None` when `A` is not square or not numerically positive definite.
pub fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let (n, m) = a.dim();
    if n != m {
        return None;
    }
    let mut l = Array2::zeros((n, n));
    for j in 0..n {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if !diag.is_finite() || diag <= 1e-300 {
            return None;
        }
        let ljj = diag.sqrt();
        l[[j, j]] = ljj;
        for i in (j + 1)..n {
            let mut s = a[[i, j]];
            for k in 0..j {
                s -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = s / ljj;
        }
    }
    Some(l)
}

/// Solve `A·x = b` for symmetric positive definite `A`.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    if a.nrows() != n {
        return None;
    }
    let l = cholesky(a)?;

    // Forward: L·y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut s = b[i];
        for k in 0..i {
            s -= l[[i, k]] * y[k];
        }
        y[i] = s / l[[i, i]];
    }
    // Backward: Lᵀ·x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut s = y[i];
        for k in (i + 1)..n {
            s -= l[[k, i]] * x[k];
        }
        x[i] = s / l[[i, i]];
    }
    Some(x)
}

/// Damped BFGS update of a Hessian approximation in place.
///
/// Powell's damping keeps `B` positive definite when the curvature
/// `sᵀy` is small or negative. Steps with `sᵀBs` ≈ 0 leave `B` unchanged.
/// Returns `true` if `B` was modified.
pub fn bfgs_update(b: &mut Array2<f64>, s: &Array1<f64>, y: &Array1<f64>) -> bool {
    let bs = b.dot(s);
    let sbs = s.dot(&bs);
    if !sbs.is_finite() || sbs <= 1e-16 {
        return false;
    }
    let sy = s.dot(y);
    let theta = if sy >= 0.2 * sbs {
        1.0
    } else {
        0.8 * sbs / (sbs - sy)
    };
    let r = y * theta + &bs * (1.0 - theta);
    let sr = s.dot(&r);
    if !sr.is_finite() || sr <= 0.0 {
        return false;
    }
    let n = s.len();
    for i in 0..n {
        for j in 0..n {
            b[[i, j]] += r[i] * r[j] / sr - bs[i] * bs[j] / sbs;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_cholesky_reconstructs() {
        let a = array![[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]];
        let l = cholesky(&a).unwrap();
        let back = l.dot(&l.t());
        for i in 0..3 {
            for j in 0..3 {
                assert!((back[[i, j]] - a[[i, j]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_solve_residual() {
        let a = array![[4.0, 2.0, 0.4], [2.0, 5.0, 1.0], [0.4, 1.0, 3.0]];
        let b = array![1.0, -2.0, 0.5];
        let x = cholesky_solve(&a, &b).unwrap();
        let r = a.dot(&x) - &b;
        assert!(r.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(cholesky(&a).is_none());
        assert!(cholesky_solve(&a, &array![1.0, 1.0]).is_none());
    }

    #[test]
    fn test_bfgs_secant_condition() {
        let mut b = Array2::eye(2);
        let s = array![0.5, -0.25];
        let y = array![1.0, 0.1];
        assert!(bfgs_update(&mut b, &s, &y));
        // sᵀy > 0.2·sᵀBs, so the update is undamped and B·s = y.
        let bs = b.dot(&s);
        assert!((bs[0] - y[0]).abs() < 1e-12);
        assert!((bs[1] - y[1]).abs() < 1e-12);
    }

    #[test]
    fn test_bfgs_damping_keeps_positive_definite() {
        let mut b = Array2::eye(2);
        let s = array![1.0, 0.0];
        let y = array![-3.0, 0.5];
        assert!(bfgs_update(&mut b, &s, &y));
        assert!(cholesky(&b).is_some());
    }

    #[test]
    fn test_bfgs_skips_zero_step() {
        let mut b = Array2::eye(2);
        assert!(!bfgs_update(&mut b, &array![0.0, 0.0], &array![1.0, 1.0]));
        assert_eq!(b, Array2::<f64>::eye(2));
    }
}
