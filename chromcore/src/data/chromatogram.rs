use serde::{Deserialize, Serialize};

use crate::error::{ChromError, Result};

/// A TIC-like intensity trace and its acquisition times.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Chromatogram {
    pub intensities: Vec<f64>,
    pub times: Vec<f64>,
}

impl Chromatogram {
    /// Creates a new `Chromatogram` instance.
    ///
    /// # Arguments
    ///
    /// * `intensities` - one intensity per acquisition index
    /// * `times` - monotonic acquisition times, same length as `intensities`
    ///
    /// # Examples
    ///
    /// ```
    /// use chromcore::data::chromatogram::Chromatogram;
    ///
    /// let tic = Chromatogram::new(vec![1.0, 5.0, 2.0], vec![0.0, 0.5, 1.0]).unwrap();
    /// assert_eq!(tic.len(), 3);
    /// assert!(Chromatogram::new(vec![1.0], vec![]).is_err());
    /// ```
    pub fn new(intensities: Vec<f64>, times: Vec<f64>) -> Result<Self> {
        if intensities.len() != times.len() {
            return Err(ChromError::LengthMismatch {
                signal: intensities.len(),
                time: times.len(),
            });
        }
        Ok(Chromatogram { intensities, times })
    }

    /// Uses the acquisition index as time axis.
    pub fn from_intensities(intensities: Vec<f64>) -> Self {
        let times = (0..intensities.len()).map(|i| i as f64).collect();
        Chromatogram { intensities, times }
    }

    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    /// Indices as `f64`, the alternative baseline abscissa.
    pub fn index_axis(&self) -> Vec<f64> {
        (0..self.len()).map(|i| i as f64).collect()
    }
}
