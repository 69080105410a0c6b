//! Tensor type aliases used throughout the pipeline.

/// 2D tensor of f32 values (batch_size x num_classes).
pub type Tensor2D = ndarray::Array2<f32>;

/// 4D tensor of f32 values in NCHW layout (batch, channels, height, width).
pub type Tensor4D = ndarray::Array4<f32>;
