use ndarray::{Array2, Array4, Axis};
use serde::{Serialize, Serializer};

use crate::error::{RecognizerError, Result};

/// Model input of shape `[batch=1, height, width, channels=1]` with every
/// value in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Array4<f32>,
}

impl ImageTensor {
    /// Wraps a normalized `height x width` plane, adding the leading batch
    /// axis and the trailing channel axis.
    pub fn from_plane(plane: Array2<f32>) -> Result<Self> {
        let (height, width) = plane.dim();
        if height == 0 || width == 0 {
            return Err(RecognizerError::InvalidInput(format!(
                "tensor plane must be non-empty, got {width}x{height}"
            )));
        }

        if let Some(value) = plane.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(RecognizerError::InvalidInput(format!(
                "tensor value {value} outside [0, 1]"
            )));
        }

        Ok(Self {
            data: plane.insert_axis(Axis(0)).insert_axis(Axis(3)),
        })
    }

    pub fn shape(&self) -> [usize; 4] {
        let (batch, height, width, channels) = self.data.dim();
        [batch, height, width, channels]
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Row-major nested form, as expected in a TensorFlow Serving `inputs` field.
    pub fn to_nested(&self) -> Vec<Vec<Vec<Vec<f32>>>> {
        self.data
            .outer_iter()
            .map(|image| {
                image
                    .outer_iter()
                    .map(|row| row.outer_iter().map(|pixel| pixel.to_vec()).collect())
                    .collect()
            })
            .collect()
    }
}

impl Serialize for ImageTensor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_nested().serialize(serializer)
    }
}
