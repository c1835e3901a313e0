//! Constant-velocity Kalman filter over bounding boxes, using ndarray for
//! the 8-dim state and nalgebra for the small fixed-size factorizations.

use nalgebra::{Cholesky, Matrix4, SMatrix, Vector4};
use ndarray::{Array1, Array2};

/// Chi-square 0.95 quantile for 4 degrees of freedom. Squared Mahalanobis
/// gating distances above this make a (track, detection) pair infeasible.
pub const GATING_THRESHOLD: f64 = 9.4877;

type Matrix4x8 = SMatrix<f64, 4, 8>;

/// Linear-Gaussian state estimator for one track.
///
/// State is `(cx, cy, a, h, vcx, vcy, va, vh)`: box center, aspect ratio
/// (w/h), height, and their velocities. The measurement model observes
/// `(cx, cy, a, h)` directly. Process and measurement noise are scaled by
/// the current box height, so small distant objects get proportionally
/// tighter uncertainty than large near ones.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let ndim = 4;
        let mut motion_mat = Array2::eye(2 * ndim);
        for i in 0..ndim {
            motion_mat[[i, ndim + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((ndim, 2 * ndim));
        for i in 0..ndim {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Create the initial state distribution from a first measurement in
    /// XYAH format. Velocities start at zero with large uncertainty.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(8);
        for i in 0..4 {
            mean[i] = measurement[i];
        }

        let h = measurement[3];
        let std = [
            2.0 * self.std_weight_position * h,
            2.0 * self.std_weight_position * h,
            1e-2,
            2.0 * self.std_weight_position * h,
            10.0 * self.std_weight_velocity * h,
            10.0 * self.std_weight_velocity * h,
            1e-5,
            10.0 * self.std_weight_velocity * h,
        ];

        let mut cov = Array2::zeros((8, 8));
        for i in 0..8 {
            cov[[i, i]] = std[i] * std[i];
        }

        (mean, cov)
    }

    /// Run the prediction step: position advances by velocity, covariance
    /// grows by height-scaled process noise. Returns the new distribution;
    /// the caller replaces the track's state with it.
    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-2,
            self.std_weight_position * h,
            self.std_weight_velocity * h,
            self.std_weight_velocity * h,
            1e-5,
            self.std_weight_velocity * h,
        ];

        let mut motion_cov = Array2::zeros((8, 8));
        for i in 0..8 {
            motion_cov[[i, i]] = std[i] * std[i];
        }

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space, adding
    /// height-scaled measurement noise. Used by the update step and by
    /// gating.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-1,
            self.std_weight_position * h,
        ];

        let mut innovation_cov = Array2::zeros((4, 4));
        for i in 0..4 {
            innovation_cov[[i, i]] = std[i] * std[i];
        }

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Run the correction step for an observed XYAH measurement.
    ///
    /// The Kalman gain is solved through a Cholesky factorization of the
    /// projected covariance rather than an explicit inverse; a near-singular
    /// innovation covariance is regularized, not propagated as an error.
    /// The returned covariance is symmetrized to keep it positive
    /// semi-definite under floating-point drift.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> (Array1<f64>, Array2<f64>) {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - &projected_mean;

        // K = P H^T S^-1. With H = [I 0], P H^T is the left 8x4 block of P.
        let pht = covariance.dot(&self.update_mat.t());

        let chol = cholesky_regularized(&to_matrix4(&projected_cov));

        // K^T = S^-1 (P H^T)^T, since S is symmetric.
        let mut pht_t = Matrix4x8::zeros();
        for i in 0..4 {
            for j in 0..8 {
                pht_t[(i, j)] = pht[[j, i]];
            }
        }
        let gain_t = chol.solve(&pht_t);

        let mut kalman_gain = Array2::zeros((8, 4));
        for i in 0..8 {
            for j in 0..4 {
                kalman_gain[[i, j]] = gain_t[(j, i)];
            }
        }

        let new_mean = mean + kalman_gain.dot(&innovation);
        let new_covariance =
            covariance - kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        (new_mean, symmetrize(new_covariance))
    }

    /// Squared Mahalanobis distance from the projected state to each
    /// candidate XYAH measurement, computed through the Cholesky factor of
    /// the projected covariance. Distances above [`GATING_THRESHOLD`] mean
    /// the pair is statistically infeasible.
    pub fn gating_distance(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurements: &[[f64; 4]],
    ) -> Vec<f64> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let chol = cholesky_regularized(&to_matrix4(&projected_cov));

        measurements
            .iter()
            .map(|m| {
                let d = Vector4::new(
                    m[0] - projected_mean[0],
                    m[1] - projected_mean[1],
                    m[2] - projected_mean[2],
                    m[3] - projected_mean[3],
                );
                d.dot(&chol.solve(&d))
            })
            .collect()
    }
}

fn to_matrix4(m: &Array2<f64>) -> Matrix4<f64> {
    let mut nm = Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    nm
}

/// Cholesky factorization with diagonal-epsilon regularization retry, so a
/// near-singular projected covariance degrades gracefully instead of
/// failing the frame.
fn cholesky_regularized(m: &Matrix4<f64>) -> Cholesky<f64, nalgebra::U4> {
    let m = if m.iter().all(|v| v.is_finite()) {
        *m
    } else {
        Matrix4::identity()
    };

    let mut reg = 0.0;
    loop {
        let mut attempt = m;
        if reg > 0.0 {
            for i in 0..4 {
                attempt[(i, i)] += reg;
            }
        }
        if let Some(chol) = Cholesky::new(attempt) {
            return chol;
        }
        reg = if reg == 0.0 { 1e-9 } else { reg * 10.0 };
    }
}

fn symmetrize(cov: Array2<f64>) -> Array2<f64> {
    let t = cov.t().to_owned();
    (cov + t) * 0.5
}
