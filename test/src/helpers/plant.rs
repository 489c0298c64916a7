use ncs_shared::{Plant, Vector};

/// Discrete-time linear plant x' = A x + B u with an optional box of
/// admissible states
pub struct LinearPlant {
    system_matrix: Vec<Vector>,
    input_matrix: Vec<Vector>,
    input: Vector,
    state_bound: Option<f64>,
}

impl LinearPlant {
    pub fn new(system_matrix: Vec<Vector>, input_matrix: Vec<Vector>) -> Self {
        let input_dimension = input_matrix.first().map_or(0, Vec::len);
        Self {
            system_matrix,
            input_matrix,
            input: vec![0.0; input_dimension],
            state_bound: None,
        }
    }

    pub fn scalar(a: f64, b: f64) -> Self {
        Self::new(vec![vec![a]], vec![vec![b]])
    }

    /// States with any component beyond `bound` in magnitude are inadmissible
    pub fn with_state_bound(mut self, bound: f64) -> Self {
        self.state_bound = Some(bound);
        self
    }

    pub fn input(&self) -> &Vector {
        &self.input
    }
}

fn multiply(matrix: &[Vector], vector: &[f64]) -> Vector {
    matrix
        .iter()
        .map(|row| row.iter().zip(vector).map(|(a, x)| a * x).sum())
        .collect()
}

impl Plant for LinearPlant {
    fn set_input(&mut self, input: &[f64]) {
        self.input = input.to_vec();
    }

    fn simulate(&mut self, state: &[f64]) -> Vector {
        multiply(&self.system_matrix, state)
            .into_iter()
            .zip(multiply(&self.input_matrix, &self.input))
            .map(|(drift, actuation)| drift + actuation)
            .collect()
    }

    fn is_valid_state(&self, state: &[f64]) -> bool {
        state.iter().all(|value| {
            value.is_finite() && self.state_bound.map_or(true, |bound| value.abs() <= bound)
        })
    }
}
