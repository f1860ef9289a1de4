//! Noise models for numeric factor types.
//!
//! A noise model normalizes ("whitens") an error vector by the square-root
//! information of its covariance, and undoes that scaling ("unwhitens").
//! Numeric factors layered on top of the junction-tree core pair each
//! measurement with one of these models; the core itself never consults
//! them.

use crate::inference::errors::InferenceError;

/// A noise model over error vectors of a fixed dimension.
///
/// Variants cover the covariance shapes that occur in practice, from a
/// single scalar sigma up to a full covariance matrix stored as its
/// lower-triangular Cholesky factor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoiseModel {
    /// Scaled identity covariance: every component shares one sigma.
    Isotropic {
        /// Vector dimension.
        dim: usize,
        /// Standard deviation.
        sigma: f64,
        /// Cached 1/sigma.
        inv_sigma: f64,
    },
    /// Diagonal covariance with per-component sigmas.
    Diagonal {
        /// Per-component standard deviations.
        sigmas: Vec<f64>,
        /// Cached per-component 1/sigma.
        inv_sigmas: Vec<f64>,
    },
    /// Full covariance, stored as the lower-triangular Cholesky factor
    /// `L` with `L * L^T = covariance`.
    FullCovariance {
        /// Row-major lower-triangular square-root covariance.
        sqrt_covariance: Vec<Vec<f64>>,
    },
}

impl NoiseModel {
    /// Creates an isotropic model from a standard deviation.
    pub fn isotropic_sigma(dim: usize, sigma: f64) -> Result<Self, InferenceError> {
        if dim == 0 {
            return Err(InferenceError::PreconditionViolation(
                "noise model dimension must be > 0".into(),
            ));
        }
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(InferenceError::PreconditionViolation(format!(
                "sigma must be finite and > 0, got {sigma}"
            )));
        }
        Ok(Self::Isotropic {
            dim,
            sigma,
            inv_sigma: 1.0 / sigma,
        })
    }

    /// Creates an isotropic model from a variance (sigma squared).
    pub fn isotropic_variance(dim: usize, variance: f64) -> Result<Self, InferenceError> {
        if !(variance > 0.0 && variance.is_finite()) {
            return Err(InferenceError::PreconditionViolation(format!(
                "variance must be finite and > 0, got {variance}"
            )));
        }
        Self::isotropic_sigma(dim, variance.sqrt())
    }

    /// Creates a diagonal model from per-component standard deviations.
    pub fn diagonal_sigmas(sigmas: Vec<f64>) -> Result<Self, InferenceError> {
        if sigmas.is_empty() {
            return Err(InferenceError::PreconditionViolation(
                "noise model dimension must be > 0".into(),
            ));
        }
        for &sigma in &sigmas {
            if !(sigma > 0.0 && sigma.is_finite()) {
                return Err(InferenceError::PreconditionViolation(format!(
                    "sigmas must be finite and > 0, got {sigma}"
                )));
            }
        }
        let inv_sigmas = sigmas.iter().map(|s| 1.0 / s).collect();
        Ok(Self::Diagonal { sigmas, inv_sigmas })
    }

    /// Creates a diagonal model from per-component variances.
    pub fn diagonal_variances(variances: Vec<f64>) -> Result<Self, InferenceError> {
        for &variance in &variances {
            if !(variance > 0.0 && variance.is_finite()) {
                return Err(InferenceError::PreconditionViolation(format!(
                    "variances must be finite and > 0, got {variance}"
                )));
            }
        }
        Self::diagonal_sigmas(variances.into_iter().map(f64::sqrt).collect())
    }

    /// Creates a full-covariance model by Cholesky-factoring the given
    /// covariance matrix.
    pub fn full_covariance(covariance: Vec<Vec<f64>>) -> Result<Self, InferenceError> {
        let n = covariance.len();
        if n == 0 {
            return Err(InferenceError::PreconditionViolation(
                "noise model dimension must be > 0".into(),
            ));
        }
        if covariance.iter().any(|row| row.len() != n) {
            return Err(InferenceError::PreconditionViolation(format!(
                "covariance must be square, got {n} rows of unequal width"
            )));
        }
        let sqrt_covariance = cholesky(&covariance)?;
        Ok(Self::FullCovariance { sqrt_covariance })
    }

    /// Returns the dimension of error vectors this model applies to.
    pub fn dim(&self) -> usize {
        match self {
            Self::Isotropic { dim, .. } => *dim,
            Self::Diagonal { sigmas, .. } => sigmas.len(),
            Self::FullCovariance { sqrt_covariance } => sqrt_covariance.len(),
        }
    }

    /// Whitens an error vector: scales it into unit-covariance space.
    ///
    /// For the full-covariance model this solves `L * w = v` by forward
    /// substitution against the stored Cholesky factor.
    pub fn whiten(&self, v: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.check_dim(v)?;
        match self {
            Self::Isotropic { inv_sigma, .. } => Ok(v.iter().map(|x| x * inv_sigma).collect()),
            Self::Diagonal { inv_sigmas, .. } => Ok(v
                .iter()
                .zip(inv_sigmas)
                .map(|(x, inv)| x * inv)
                .collect()),
            Self::FullCovariance { sqrt_covariance } => {
                let mut w = vec![0.0; v.len()];
                for i in 0..v.len() {
                    let mut sum = v[i];
                    for j in 0..i {
                        sum -= sqrt_covariance[i][j] * w[j];
                    }
                    w[i] = sum / sqrt_covariance[i][i];
                }
                Ok(w)
            }
        }
    }

    /// Unwhitens an error vector: scales it back from unit-covariance
    /// space.
    pub fn unwhiten(&self, v: &[f64]) -> Result<Vec<f64>, InferenceError> {
        self.check_dim(v)?;
        match self {
            Self::Isotropic { sigma, .. } => Ok(v.iter().map(|x| x * sigma).collect()),
            Self::Diagonal { sigmas, .. } => {
                Ok(v.iter().zip(sigmas).map(|(x, s)| x * s).collect())
            }
            Self::FullCovariance { sqrt_covariance } => {
                let mut w = vec![0.0; v.len()];
                for i in 0..v.len() {
                    for j in 0..=i {
                        w[i] += sqrt_covariance[i][j] * v[j];
                    }
                }
                Ok(w)
            }
        }
    }

    fn check_dim(&self, v: &[f64]) -> Result<(), InferenceError> {
        if v.len() != self.dim() {
            return Err(InferenceError::PreconditionViolation(format!(
                "error vector has dimension {}, noise model expects {}",
                v.len(),
                self.dim(),
            )));
        }
        Ok(())
    }
}

/// Cholesky-Banachiewicz factorization of a symmetric positive-definite
/// matrix. Returns the lower-triangular factor `L` with `L * L^T = m`.
fn cholesky(m: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, InferenceError> {
    let n = m.len();
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i][k] * l[j][k];
            }
            if i == j {
                let d = m[i][i] - sum;
                if !(d > 0.0 && d.is_finite()) {
                    return Err(InferenceError::PreconditionViolation(
                        "covariance is not positive definite".into(),
                    ));
                }
                l[i][j] = d.sqrt();
            } else {
                l[i][j] = (m[i][j] - sum) / l[j][j];
            }
        }
    }
    Ok(l)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{x} != {y}");
        }
    }

    #[test]
    fn isotropic_whiten_divides_by_sigma() {
        let model = NoiseModel::isotropic_sigma(3, 2.0).unwrap();
        let w = model.whiten(&[2.0, 4.0, -6.0]).unwrap();
        assert_close(&w, &[1.0, 2.0, -3.0]);
    }

    #[test]
    fn isotropic_variance_matches_sigma_construction() {
        let by_sigma = NoiseModel::isotropic_sigma(2, 3.0).unwrap();
        let by_variance = NoiseModel::isotropic_variance(2, 9.0).unwrap();
        assert_eq!(by_sigma, by_variance);
    }

    #[test]
    fn diagonal_whiten_scales_per_component() {
        let model = NoiseModel::diagonal_sigmas(vec![1.0, 2.0, 4.0]).unwrap();
        let w = model.whiten(&[1.0, 2.0, 4.0]).unwrap();
        assert_close(&w, &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn diagonal_variances_take_square_roots() {
        let by_sigmas = NoiseModel::diagonal_sigmas(vec![2.0, 3.0]).unwrap();
        let by_variances = NoiseModel::diagonal_variances(vec![4.0, 9.0]).unwrap();
        assert_eq!(by_sigmas.whiten(&[1.0, 1.0]).unwrap(), by_variances.whiten(&[1.0, 1.0]).unwrap());
    }

    #[test]
    fn whiten_then_unwhiten_round_trips() {
        let models = [
            NoiseModel::isotropic_sigma(3, 0.5).unwrap(),
            NoiseModel::diagonal_sigmas(vec![0.1, 1.0, 10.0]).unwrap(),
            NoiseModel::full_covariance(vec![
                vec![4.0, 2.0, 0.0],
                vec![2.0, 5.0, 1.0],
                vec![0.0, 1.0, 3.0],
            ])
            .unwrap(),
        ];
        let v = [1.0, -2.0, 0.5];

        for model in &models {
            let w = model.whiten(&v).unwrap();
            let back = model.unwhiten(&w).unwrap();
            assert_close(&back, &v);
        }
    }

    #[test]
    fn full_covariance_identity_is_a_no_op() {
        let model = NoiseModel::full_covariance(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
        ])
        .unwrap();
        let w = model.whiten(&[3.0, -4.0]).unwrap();
        assert_close(&w, &[3.0, -4.0]);
    }

    #[test]
    fn constructors_reject_invalid_parameters() {
        assert!(NoiseModel::isotropic_sigma(0, 1.0).is_err());
        assert!(NoiseModel::isotropic_sigma(2, 0.0).is_err());
        assert!(NoiseModel::isotropic_sigma(2, -1.0).is_err());
        assert!(NoiseModel::isotropic_variance(2, f64::NAN).is_err());
        assert!(NoiseModel::diagonal_sigmas(vec![]).is_err());
        assert!(NoiseModel::diagonal_sigmas(vec![1.0, 0.0]).is_err());
        assert!(NoiseModel::full_covariance(vec![vec![1.0, 0.0]]).is_err());
        // Not positive definite.
        assert!(NoiseModel::full_covariance(vec![
            vec![1.0, 2.0],
            vec![2.0, 1.0],
        ])
        .is_err());
    }

    #[test]
    fn whiten_rejects_dimension_mismatch() {
        let model = NoiseModel::isotropic_sigma(3, 1.0).unwrap();
        let err = model.whiten(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, InferenceError::PreconditionViolation(_)));
    }
}
