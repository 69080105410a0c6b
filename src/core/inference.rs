//! ONNX Runtime inference engine for classifier and segmenter models.
//!
//! One [`OnnxModel`] wraps one loaded session together with its discovered
//! input/output tensor names and declared input shape. Sessions are built
//! once at startup and never mutated afterwards; the per-call `Mutex` exists
//! only because `ort` requires `&mut Session` to run.

use crate::core::config::{Device, GraphOptLevel, OrtSessionConfig};
use crate::core::errors::{DetectError, DetectResult, SimpleError};
use crate::core::tensor::Tensor4D;
use ndarray::Array2;
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A loaded ONNX model handle: session, tensor names, and declared shape.
pub struct OnnxModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    input_shape: Vec<i64>,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("input_shape", &self.input_shape)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

/// Builds the execution provider list for the configured device.
///
/// The CPU provider is always appended last as a fallback, mirroring how
/// ONNX Runtime resolves providers in preference order.
pub fn execution_providers(device: Device) -> DetectResult<Vec<ExecutionProviderDispatch>> {
    let mut providers: Vec<ExecutionProviderDispatch> = Vec::new();

    match device {
        Device::Cpu => {}
        Device::Cuda => {
            #[cfg(feature = "cuda")]
            providers.push(ort::execution_providers::CUDAExecutionProvider::default().build());
            #[cfg(not(feature = "cuda"))]
            return Err(DetectError::config(
                "device 'cuda' requested but the cuda feature is not enabled",
            ));
        }
        Device::CoreMl => {
            #[cfg(feature = "coreml")]
            providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
            #[cfg(not(feature = "coreml"))]
            return Err(DetectError::config(
                "device 'coreml' requested but the coreml feature is not enabled",
            ));
        }
        Device::Auto => {
            #[cfg(feature = "cuda")]
            providers.push(ort::execution_providers::CUDAExecutionProvider::default().build());
            #[cfg(feature = "coreml")]
            providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
        }
    }

    providers.push(CPUExecutionProvider::default().build());
    Ok(providers)
}

impl OnnxModel {
    /// Loads a model file into a session configured for the given device.
    ///
    /// Input and output tensor names and the declared input shape are
    /// discovered from the session metadata.
    pub fn load(
        model_name: &str,
        model_path: &Path,
        device: Device,
        session_config: &OrtSessionConfig,
    ) -> DetectResult<Self> {
        let mut builder = Session::builder()?;
        if let Some(intra) = session_config.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = session_config.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(level) = session_config.optimization_level {
            let mapped = match level {
                GraphOptLevel::DisableAll => GraphOptimizationLevel::Disable,
                GraphOptLevel::Level1 => GraphOptimizationLevel::Level1,
                GraphOptLevel::Level2 => GraphOptimizationLevel::Level2,
                GraphOptLevel::Level3 => GraphOptimizationLevel::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        let providers = execution_providers(device)?;
        builder = builder.with_execution_providers(providers)?;

        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| DetectError::model_load(model_name, model_path, e))?;

        let input = session.inputs.first().ok_or_else(|| {
            DetectError::invalid_input(format!(
                "model '{}' declares no inputs - file may be invalid or corrupted",
                model_name
            ))
        })?;
        let input_name = input.name.clone();
        let input_shape = match &input.input_type {
            ValueType::Tensor { shape, .. } => shape.iter().copied().collect(),
            _ => Vec::new(),
        };
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                DetectError::invalid_input(format!(
                    "model '{}' declares no outputs - file may be invalid or corrupted",
                    model_name
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            input_shape,
            model_name: model_name.to_string(),
            model_path: model_path.to_path_buf(),
        })
    }

    /// Returns the model name associated with this handle.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model path associated with this handle.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the declared input shape; dynamic dimensions are negative.
    pub fn input_shape(&self) -> &[i64] {
        &self.input_shape
    }

    /// Checks a concrete tensor shape against the declared input shape.
    ///
    /// Dynamic dimensions (negative in the model metadata) match anything.
    /// Called at preprocessing time so a mismatch never reaches the
    /// forward pass.
    pub fn check_input(&self, shape: &[usize]) -> DetectResult<()> {
        if self.input_shape.is_empty() {
            return Ok(());
        }
        let compatible = self.input_shape.len() == shape.len()
            && self
                .input_shape
                .iter()
                .zip(shape)
                .all(|(&declared, &actual)| declared < 0 || declared as usize == actual);
        if !compatible {
            return Err(DetectError::shape_mismatch(
                &self.model_name,
                &self.input_shape,
                shape,
            ));
        }
        Ok(())
    }

    fn run_with<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> DetectResult<T>,
    ) -> DetectResult<T> {
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            DetectError::inference(
                &self.model_name,
                format!("failed to convert input tensor with shape {:?}", input_shape),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            DetectError::inference(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("session lock poisoned"),
            )
        })?;

        let outputs = session.run(inputs).map_err(|e| {
            DetectError::inference(
                &self.model_name,
                format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DetectError::inference(
                    &self.model_name,
                    format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs inference and returns the per-class scores for a batch of one.
    ///
    /// Accepts `[N]` and `[1, N]` output heads.
    pub fn infer_scores(&self, x: &Tensor4D) -> DetectResult<Vec<f32>> {
        self.run_with(x, |output_shape, output_data| {
            let num_classes = match output_shape.len() {
                1 => output_shape[0] as usize,
                2 => {
                    if output_shape[0] != 1 {
                        return Err(DetectError::invalid_input(format!(
                            "model '{}' returned batch size {}, expected 1",
                            self.model_name, output_shape[0]
                        )));
                    }
                    output_shape[1] as usize
                }
                n => {
                    return Err(DetectError::invalid_input(format!(
                        "model '{}' score inference: expected 1D or 2D output, got {}D with shape {:?}",
                        self.model_name, n, output_shape
                    )));
                }
            };
            if output_data.len() != num_classes {
                return Err(DetectError::invalid_input(format!(
                    "model '{}' output data size mismatch: expected {}, got {}",
                    self.model_name,
                    num_classes,
                    output_data.len()
                )));
            }
            Ok(output_data.to_vec())
        })
    }

    /// Runs inference and returns a single-channel spatial map for a batch
    /// of one.
    ///
    /// Accepts `[1, C, H, W]` (channel 0 is taken) and `[1, H, W]` output
    /// heads.
    pub fn infer_map(&self, x: &Tensor4D) -> DetectResult<Array2<f32>> {
        self.run_with(x, |output_shape, output_data| {
            let (height, width) = match output_shape.len() {
                3 => (output_shape[1] as usize, output_shape[2] as usize),
                4 => (output_shape[2] as usize, output_shape[3] as usize),
                n => {
                    return Err(DetectError::invalid_input(format!(
                        "model '{}' map inference: expected 3D or 4D output, got {}D with shape {:?}",
                        self.model_name, n, output_shape
                    )));
                }
            };
            if output_shape[0] != 1 {
                return Err(DetectError::invalid_input(format!(
                    "model '{}' returned batch size {}, expected 1",
                    self.model_name, output_shape[0]
                )));
            }
            let plane = height * width;
            if output_data.len() < plane {
                return Err(DetectError::invalid_input(format!(
                    "model '{}' output data size mismatch: expected at least {}, got {}",
                    self.model_name,
                    plane,
                    output_data.len()
                )));
            }
            let mask = Array2::from_shape_vec((height, width), output_data[..plane].to_vec())
                .map_err(DetectError::Tensor)?;
            Ok(mask)
        })
    }
}
