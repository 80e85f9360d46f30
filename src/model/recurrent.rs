use ndarray::{Array, Array1, Array2, ArrayView1, ArrayView2, Dimension, Zip};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrentParams {
    pub hidden: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for RecurrentParams {
    fn default() -> Self {
        Self {
            hidden: 16,
            epochs: 200,
            learning_rate: 0.01,
            seed: 42,
        }
    }
}

/// Recurrent sequence regressor: an Elman-style tanh cell stepped across the
/// input sequence, followed by a linear head. Training consumes the feature
/// matrix as length-1 sequences, one per row; `predict` accepts sequences of
/// any length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurrentNet {
    w_input: Array2<f64>,
    w_state: Array2<f64>,
    b_state: Array1<f64>,
    w_output: Array1<f64>,
    b_output: f64,
}

impl RecurrentNet {
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        params: &RecurrentParams,
    ) -> Result<Self, Error> {
        if x.nrows() == 0 {
            return Err(Error::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(Error::ShapeMismatch {
                rows: x.nrows(),
                targets: y.len(),
            });
        }
        if params.hidden == 0 || params.epochs == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "recurrent net",
                reason: "hidden width and epochs must be at least 1".into(),
            });
        }
        if params.learning_rate <= 0.0 {
            return Err(Error::InvalidHyperparameter {
                name: "recurrent net",
                reason: format!("learning rate {} is not positive", params.learning_rate),
            });
        }

        let n = x.nrows();
        let features = x.ncols();
        let hidden = params.hidden;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let bound_in = (1.0 / features as f64).sqrt();
        let bound_h = (1.0 / hidden as f64).sqrt();

        let mut w_input =
            Array2::from_shape_fn((hidden, features), |_| rng.gen_range(-bound_in..bound_in));
        // The hidden state starts at zero, so length-1 training never moves
        // w_state; it only matters when predicting longer sequences.
        let w_state = Array2::from_shape_fn((hidden, hidden), |_| rng.gen_range(-bound_h..bound_h));
        let mut b_state = Array1::<f64>::zeros(hidden);
        let mut w_output = Array1::from_shape_fn(hidden, |_| rng.gen_range(-bound_h..bound_h));
        let mut b_output = 0.0_f64;

        let mut m_w_input = Array2::<f64>::zeros((hidden, features));
        let mut v_w_input = Array2::<f64>::zeros((hidden, features));
        let mut m_b_state = Array1::<f64>::zeros(hidden);
        let mut v_b_state = Array1::<f64>::zeros(hidden);
        let mut m_w_output = Array1::<f64>::zeros(hidden);
        let mut v_w_output = Array1::<f64>::zeros(hidden);
        let mut m_b_output = 0.0_f64;
        let mut v_b_output = 0.0_f64;

        let mut mse = f64::INFINITY;
        for epoch in 0..params.epochs {
            let mut g_w_input = Array2::<f64>::zeros((hidden, features));
            let mut g_b_state = Array1::<f64>::zeros(hidden);
            let mut g_w_output = Array1::<f64>::zeros(hidden);
            let mut g_b_output = 0.0_f64;
            let mut loss = 0.0_f64;

            for row in 0..n {
                let x_i = x.row(row);
                let z = w_input.dot(&x_i) + &b_state;
                let h = z.mapv(f64::tanh);
                let pred = w_output.dot(&h) + b_output;
                let err = pred - y[row];
                loss += err * err;

                let g = 2.0 * err / n as f64;
                g_w_output.scaled_add(g, &h);
                g_b_output += g;
                let dz = Zip::from(&w_output)
                    .and(&h)
                    .map_collect(|&weight, &state| g * weight * (1.0 - state * state));
                for (unit, dz_unit) in dz.iter().enumerate() {
                    g_w_input.row_mut(unit).scaled_add(*dz_unit, &x_i);
                }
                g_b_state += &dz;
            }

            let t = (epoch + 1) as f64;
            adam_step(
                &mut w_input,
                &g_w_input,
                &mut m_w_input,
                &mut v_w_input,
                params.learning_rate,
                t,
            );
            adam_step(
                &mut b_state,
                &g_b_state,
                &mut m_b_state,
                &mut v_b_state,
                params.learning_rate,
                t,
            );
            adam_step(
                &mut w_output,
                &g_w_output,
                &mut m_w_output,
                &mut v_w_output,
                params.learning_rate,
                t,
            );
            adam_step_scalar(
                &mut b_output,
                g_b_output,
                &mut m_b_output,
                &mut v_b_output,
                params.learning_rate,
                t,
            );
            mse = loss / n as f64;
        }
        debug!(mse, epochs = params.epochs, "Recurrent net fitted");

        Ok(Self {
            w_input,
            w_state,
            b_state,
            w_output,
            b_output,
        })
    }

    /// Steps the cell across a (timesteps, features) sequence and reads the
    /// head off the final hidden state.
    pub fn predict(&self, steps: ArrayView2<f64>) -> f64 {
        let mut h = Array1::<f64>::zeros(self.b_state.len());
        for step in steps.rows() {
            let z = self.w_input.dot(&step) + self.w_state.dot(&h) + &self.b_state;
            h = z.mapv(f64::tanh);
        }
        self.w_output.dot(&h) + self.b_output
    }
}

fn adam_step<D: Dimension>(
    param: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    m: &mut Array<f64, D>,
    v: &mut Array<f64, D>,
    learning_rate: f64,
    t: f64,
) {
    const BETA1: f64 = 0.9;
    const BETA2: f64 = 0.999;
    const EPS: f64 = 1e-8;
    Zip::from(param)
        .and(grad)
        .and(m)
        .and(v)
        .for_each(|p, &g, m, v| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let m_hat = *m / (1.0 - BETA1.powf(t));
            let v_hat = *v / (1.0 - BETA2.powf(t));
            *p -= learning_rate * m_hat / (v_hat.sqrt() + EPS);
        });
}

fn adam_step_scalar(
    param: &mut f64,
    grad: f64,
    m: &mut f64,
    v: &mut f64,
    learning_rate: f64,
    t: f64,
) {
    const BETA1: f64 = 0.9;
    const BETA2: f64 = 0.999;
    const EPS: f64 = 1e-8;
    *m = BETA1 * *m + (1.0 - BETA1) * grad;
    *v = BETA2 * *v + (1.0 - BETA2) * grad * grad;
    let m_hat = *m / (1.0 - BETA1.powf(t));
    let v_hat = *v / (1.0 - BETA2.powf(t));
    *param -= learning_rate * m_hat / (v_hat.sqrt() + EPS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn learns_the_target_mean_scale() {
        // Constant target: the net should converge close to it.
        let x = Array2::from_shape_fn((32, 2), |(i, j)| ((i + j) % 7) as f64 / 7.0 - 0.5);
        let y = Array1::from_elem(32, 5.0);
        let params = RecurrentParams {
            epochs: 800,
            learning_rate: 0.02,
            ..Default::default()
        };
        let net = RecurrentNet::fit(x.view(), y.view(), &params).unwrap();
        let pred = net.predict(x.slice(ndarray::s![0..1, ..]));
        assert!((pred - 5.0).abs() < 1.0, "prediction {pred} too far from 5");
    }

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let x = Array2::from_shape_fn((16, 3), |(i, j)| (i * 3 + j) as f64 / 10.0);
        let y = Array1::from_shape_fn(16, |i| i as f64);
        let params = RecurrentParams::default();
        let a = RecurrentNet::fit(x.view(), y.view(), &params).unwrap();
        let b = RecurrentNet::fit(x.view(), y.view(), &params).unwrap();
        assert_eq!(a, b);
    }
}
