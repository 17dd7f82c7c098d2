//! # Enhance Module
//!
//! Tensor plumbing around the super-night model.
//!
//! The model itself and its raw preprocessing are external collaborators
//! behind [`RawPreprocessor`] and [`EnhancementModel`]. This module only
//! owns the shape bookkeeping on either side of inference.

use crate::error::EnhanceError;
use image::RgbImage;
use std::path::Path;

/// Fixed input width the model was trained on
pub const DEFAULT_CROP_WIDTH: usize = 2016;

/// Planar (channels, height, width) f32 tensor
#[derive(Debug, Clone, PartialEq)]
pub struct RawTensor {
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl RawTensor {
    pub fn new(
        channels: usize,
        height: usize,
        width: usize,
        data: Vec<f32>,
    ) -> Result<Self, EnhanceError> {
        if data.len() != channels * height * width {
            return Err(EnhanceError::ShapeMismatch {
                channels,
                height,
                width,
                actual: data.len(),
            });
        }
        Ok(Self {
            channels,
            height,
            width,
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Keep the first `max` columns of every row. Narrower tensors are returned as-is.
    pub fn crop_width(self, max: usize) -> Self {
        if self.width <= max {
            return self;
        }

        let mut data = Vec::with_capacity(self.channels * self.height * max);
        for row in self.data.chunks_exact(self.width) {
            data.extend_from_slice(&row[..max]);
        }

        Self {
            width: max,
            data,
            ..self
        }
    }

    /// Clip to [0, 1], scale to 8 bits and interleave into an RGB image
    pub fn to_rgb_image(&self) -> Result<RgbImage, EnhanceError> {
        if self.channels != 3 {
            return Err(EnhanceError::UnexpectedChannels {
                expected: 3,
                actual: self.channels,
            });
        }

        let plane = self.height * self.width;
        let mut pixels = Vec::with_capacity(plane * 3);
        for i in 0..plane {
            for c in 0..3 {
                let v = self.data[c * plane + i].clamp(0.0, 1.0);
                pixels.push((v * 255.0) as u8);
            }
        }

        RgbImage::from_raw(self.width as u32, self.height as u32, pixels).ok_or(
            EnhanceError::ShapeMismatch {
                channels: 3,
                height: self.height,
                width: self.width,
                actual: self.data.len(),
            },
        )
    }
}

/// Turns a DNG into the model's input tensor
pub trait RawPreprocessor: Send {
    fn preprocess(&self, dng: &Path) -> Result<RawTensor, EnhanceError>;
}

/// Low-light enhancement network
pub trait EnhancementModel: Send {
    fn infer(&self, input: &RawTensor) -> Result<RawTensor, EnhanceError>;
}

/// Run the whole enhancement path for one DNG
pub fn enhance(
    dng: &Path,
    preprocessor: &dyn RawPreprocessor,
    model: &dyn EnhancementModel,
    crop_width: usize,
) -> Result<RgbImage, EnhanceError> {
    let input = preprocessor.preprocess(dng)?.crop_width(crop_width);
    tracing::debug!(
        "Running enhancement on {} ({}x{}x{})",
        dng.display(),
        input.channels(),
        input.height(),
        input.width()
    );
    model.infer(&input)?.to_rgb_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(channels: usize, height: usize, width: usize) -> RawTensor {
        let data = (0..channels * height * width).map(|v| v as f32).collect();
        RawTensor::new(channels, height, width, data).unwrap()
    }

    #[test]
    fn new_rejects_wrong_length() {
        let result = RawTensor::new(3, 2, 2, vec![0.0; 11]);
        assert!(matches!(
            result,
            Err(EnhanceError::ShapeMismatch { actual: 11, .. })
        ));
    }

    #[test]
    fn crop_keeps_leading_columns_of_each_row() {
        let cropped = ramp(2, 2, 4).crop_width(2);

        assert_eq!(cropped.width(), 2);
        assert_eq!(cropped.data(), &[0.0, 1.0, 4.0, 5.0, 8.0, 9.0, 12.0, 13.0]);
    }

    #[test]
    fn crop_is_noop_for_narrow_tensor() {
        let tensor = ramp(1, 2, 3);
        assert_eq!(tensor.clone().crop_width(DEFAULT_CROP_WIDTH), tensor);
    }

    #[test]
    fn postprocess_clips_and_interleaves() {
        // one pixel per plane: r = 2.0, g = 0.5, b = -1.0
        let tensor = RawTensor::new(3, 1, 1, vec![2.0, 0.5, -1.0]).unwrap();

        let image = tensor.to_rgb_image().unwrap();

        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(image.get_pixel(0, 0).0, [255, 127, 0]);
    }

    #[test]
    fn postprocess_requires_three_channels() {
        let tensor = ramp(4, 1, 1);
        assert!(matches!(
            tensor.to_rgb_image(),
            Err(EnhanceError::UnexpectedChannels {
                expected: 3,
                actual: 4
            })
        ));
    }

    struct FlatPreprocessor;

    impl RawPreprocessor for FlatPreprocessor {
        fn preprocess(&self, _dng: &Path) -> Result<RawTensor, EnhanceError> {
            RawTensor::new(3, 2, 4, vec![0.25; 24])
        }
    }

    struct Doubler;

    impl EnhancementModel for Doubler {
        fn infer(&self, input: &RawTensor) -> Result<RawTensor, EnhanceError> {
            let data = input.data().iter().map(|v| v * 2.0).collect();
            RawTensor::new(input.channels(), input.height(), input.width(), data)
        }
    }

    #[test]
    fn enhance_crops_before_inference() {
        let image = enhance(Path::new("0.dng"), &FlatPreprocessor, &Doubler, 3).unwrap();

        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [127, 127, 127]);
    }
}
