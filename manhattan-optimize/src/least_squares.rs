use log::*;
use nalgebra_sparse::{coo::CooMatrix, csc::CscMatrix, factorization::CscCholesky, na::DMatrix};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("the system has no variables")]
    Empty,
    #[error("equation references variable {variable} but the system only has {variables}")]
    VariableOutOfRange { variable: usize, variables: usize },
    #[error("the normal equations are not positive definite")]
    NotPositiveDefinite,
    #[error("the solution is not finite")]
    NotFinite,
}

#[derive(Debug, Clone)]
struct Equation {
    terms: Vec<(usize, f64)>,
    rhs: f64,
    weight: f64,
}

/// A sparse linear system `A x = b` with one weight per equation, solved in the least squares sense.
///
/// Each weight multiplies its whole equation, so the minimized objective is `||W (A x - b)||²`.
/// The system is solved through its normal equations using a sparse Cholesky factorization,
/// which requires every variable to be constrained by at least one equation.
///
/// ```
/// use manhattan_optimize::WeightedLeastSquares;
///
/// let mut system = WeightedLeastSquares::new(2);
/// // x0 = 1
/// system.add_equation([(0, 1.0)], 1.0, 1.0);
/// // 2 x0 - x1 = 0
/// system.add_equation([(0, 2.0), (1, -1.0)], 0.0, 1.0);
/// let x = system.solve().unwrap();
/// assert!((x[1] - 2.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightedLeastSquares {
    variables: usize,
    equations: Vec<Equation>,
}

impl WeightedLeastSquares {
    /// Creates an empty system over `variables` unknowns.
    pub fn new(variables: usize) -> Self {
        Self {
            variables,
            equations: vec![],
        }
    }

    pub fn variables(&self) -> usize {
        self.variables
    }

    pub fn equations(&self) -> usize {
        self.equations.len()
    }

    /// Adds the equation `Σ coefficient · x[variable] = rhs` with the given weight.
    pub fn add_equation(
        &mut self,
        terms: impl IntoIterator<Item = (usize, f64)>,
        rhs: f64,
        weight: f64,
    ) {
        self.equations.push(Equation {
            terms: terms.into_iter().collect(),
            rhs,
            weight,
        });
    }

    /// Solves the system, returning one value per variable.
    pub fn solve(&self) -> Result<Vec<f64>, SolveError> {
        if self.variables == 0 {
            return Err(SolveError::Empty);
        }

        // Accumulate AᵀWᵀWA and AᵀWᵀWb. Duplicate entries are summed by the COO to CSC conversion.
        let mut normal = CooMatrix::new(self.variables, self.variables);
        let mut rhs = DMatrix::<f64>::zeros(self.variables, 1);
        let mut diagonal = vec![0.0; self.variables];
        for equation in &self.equations {
            let w2 = equation.weight * equation.weight;
            for &(i, ai) in &equation.terms {
                if i >= self.variables {
                    return Err(SolveError::VariableOutOfRange {
                        variable: i,
                        variables: self.variables,
                    });
                }
                rhs[(i, 0)] += w2 * ai * equation.rhs;
                diagonal[i] += w2 * ai * ai;
                for &(j, aj) in &equation.terms {
                    normal.push(i, j, w2 * ai * aj);
                }
            }
        }

        if diagonal.iter().any(|d| !d.is_finite()) {
            return Err(SolveError::NotFinite);
        }
        // A variable which no equation constrains makes the normal matrix singular.
        if diagonal.iter().any(|&d| d <= 0.0) {
            return Err(SolveError::NotPositiveDefinite);
        }

        let normal = CscMatrix::from(&normal);
        debug!(
            "solving {} equations over {} variables with {} normal entries",
            self.equations.len(),
            self.variables,
            normal.nnz()
        );
        let cholesky =
            CscCholesky::factor(&normal).map_err(|_| SolveError::NotPositiveDefinite)?;
        let solution = cholesky.solve(&rhs);
        let solution: Vec<f64> = solution.iter().copied().collect();
        if solution.iter().all(|n| n.is_finite()) {
            Ok(solution)
        } else {
            Err(SolveError::NotFinite)
        }
    }
}
