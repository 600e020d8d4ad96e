// External crates
use ndarray::{Array1, Array2, Axis};

// Internal modules
use crate::error::{ForecastError, Result};

/// Per-column min-max scaler mapping each fitted column onto [0, 1]
///
/// A column whose minimum equals its maximum keeps a unit scale, so it maps
/// to 0.0 and inverts back to its constant value without dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Array1<f64>,
    max: Array1<f64>,
}

impl MinMaxScaler {
    /// Fits column-wise minima and maxima over every row of `data`
    pub fn fit(data: &Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(ForecastError::data("Cannot fit a scaler on an empty table"));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::compute("Cannot fit a scaler on non-finite values"));
        }

        let min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));

        Ok(Self { min, max })
    }

    pub fn n_columns(&self) -> usize {
        self.min.len()
    }

    /// Whether column `j` had zero range in the fitting sample
    pub fn is_constant(&self, j: usize) -> bool {
        (self.max[j] - self.min[j]).abs() < f64::EPSILON
    }

    fn scale(&self, j: usize) -> f64 {
        if self.is_constant(j) {
            1.0
        } else {
            self.max[j] - self.min[j]
        }
    }

    fn check_width(&self, data: &Array2<f64>) -> Result<()> {
        if data.ncols() != self.n_columns() {
            return Err(ForecastError::compute(format!(
                "Scaler fitted on {} columns was given {}",
                self.n_columns(),
                data.ncols()
            )));
        }
        Ok(())
    }

    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut scaled = data.to_owned();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let (min, scale) = (self.min[j], self.scale(j));
            column.mapv_inplace(|v| (v - min) / scale);
        }
        Ok(scaled)
    }

    pub fn inverse_transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_width(data)?;
        let mut restored = data.to_owned();
        for (j, mut column) in restored.axis_iter_mut(Axis(1)).enumerate() {
            let (min, scale) = (self.min[j], self.scale(j));
            column.mapv_inplace(|v| v * scale + min);
        }
        Ok(restored)
    }
}

/// Scalers for the predictor block and the target column, fitted once on the
/// full feature table. No rows are held out.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParameters {
    predictors: MinMaxScaler,
    target: MinMaxScaler,
}

impl ScalingParameters {
    /// Fits both scalers
    ///
    /// # Arguments
    ///
    /// * `predictors` - Predictor matrix, one column per feature
    /// * `target` - Target column aligned with `predictors`
    ///
    /// # Returns
    ///
    /// Returns the fitted parameters, or a compute error when the target has
    /// zero range (its predictions could not be mapped back meaningfully).
    pub fn fit(predictors: &Array2<f64>, target: &Array1<f64>) -> Result<Self> {
        if predictors.nrows() != target.len() {
            return Err(ForecastError::compute(format!(
                "Predictor rows ({}) and target rows ({}) differ",
                predictors.nrows(),
                target.len()
            )));
        }

        let predictor_scaler = MinMaxScaler::fit(predictors)?;
        let target_scaler = MinMaxScaler::fit(&target_column(target))?;
        if target_scaler.is_constant(0) {
            return Err(ForecastError::compute(
                "Target price column is constant; min-max scaling is degenerate",
            ));
        }

        Ok(Self {
            predictors: predictor_scaler,
            target: target_scaler,
        })
    }

    pub fn predictors(&self) -> &MinMaxScaler {
        &self.predictors
    }

    pub fn transform_predictors(&self, predictors: &Array2<f64>) -> Result<Array2<f64>> {
        self.predictors.transform(predictors)
    }

    pub fn transform_target(&self, target: &Array1<f64>) -> Result<Array1<f64>> {
        let scaled = self.target.transform(&target_column(target))?;
        Ok(scaled.column(0).to_owned())
    }

    /// Maps one normalized target value back to price units
    pub fn inverse_target(&self, value: f64) -> f64 {
        value * self.target.scale(0) + self.target.min[0]
    }

    pub fn inverse_target_all(&self, values: &Array1<f64>) -> Result<Array1<f64>> {
        let restored = self.target.inverse_transform(&target_column(values))?;
        Ok(restored.column(0).to_owned())
    }
}

fn target_column(target: &Array1<f64>) -> Array2<f64> {
    target.view().insert_axis(Axis(1)).to_owned()
}
