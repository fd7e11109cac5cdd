use anyhow::{anyhow, bail, Context, Result};
use ndarray::{ArrayD, IxDyn};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use std::path::Path;

pub struct OnnxSession {
    pub(crate) session: Session,
}

#[derive(Copy, Clone, Debug)]
pub enum ExecutionProvider {
    CPU,
}

impl OnnxSession {
    pub fn new(url: impl AsRef<Path>, executor: ExecutionProvider) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(6)?
            .with_execution_providers([match executor {
                ExecutionProvider::CPU => ort::execution_providers::CPUExecutionProvider::default()
                    .build()
                    .error_on_failure(),
            }])?
            .commit_from_file(url.as_ref())
            .with_context(|| format!("failed to load model from {}", url.as_ref().display()))?;

        Ok(OnnxSession { session })
    }

    /// Runs the model on a packed NCHW float buffer and hands back every
    /// head tensor, owned, in the model's own output order.
    pub fn run_raw(&mut self, shape: [usize; 4], data: Vec<f32>) -> Result<Vec<ArrayD<f32>>> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(anyhow!(
                "input buffer holds {} values, shape {:?} needs {}",
                data.len(),
                shape,
                expected
            ));
        }

        let input_value =
            ort::value::Value::from_array((shape.as_slice(), data.into_boxed_slice()))?;
        let outputs = self.session.run([input_value.into()])?;

        let mut heads = Vec::new();
        for value in outputs.values() {
            let (shape, data) = value.try_extract_tensor::<f32>()?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            heads.push(ArrayD::from_shape_vec(IxDyn(&dims), data.to_vec())?);
        }
        if heads.is_empty() {
            bail!("model produced no outputs");
        }
        Ok(heads)
    }
}
