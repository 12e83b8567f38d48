//! ONNX Runtime backend.

use ort::session::Session;
use ort::value::Tensor;

use senti_core::Result;

const TOKEN_TYPE_IDS: &str = "token_type_ids";

pub struct OnnxBackend {
    session: Session,
    /// BERT-style exports take a third input; DistilBERT exports do not.
    wants_token_type_ids: bool,
}

impl OnnxBackend {
    /// # Errors
    ///
    /// Returns an error if the ONNX session cannot be loaded.
    pub fn load(model_path: &str) -> Result<Self> {
        let builder = Session::builder()?;

        #[cfg(feature = "onnx-coreml")]
        let builder = builder.with_execution_providers([
            ort::execution_providers::CoreMLExecutionProvider::default().build(),
        ])?;

        let session = builder.commit_from_file(model_path)?;
        let wants_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == TOKEN_TYPE_IDS);
        Ok(Self {
            session,
            wants_token_type_ids,
        })
    }
}

impl super::backend::MlBackend for OnnxBackend {
    fn logits(&mut self, input_ids: &[u32], attention_mask: &[u32]) -> Result<Vec<f32>> {
        let ids: Vec<i64> = input_ids.iter().map(|&id| i64::from(id)).collect();
        let mask: Vec<i64> = attention_mask.iter().map(|&m| i64::from(m)).collect();
        let len = i64::try_from(ids.len())?;
        let shape = vec![1i64, len];
        let input_ids_tensor = Tensor::from_array((shape.clone(), ids))?;
        let attention_mask_tensor = Tensor::from_array((shape.clone(), mask))?;

        let outputs = if self.wants_token_type_ids {
            let token_types = Tensor::from_array((shape, vec![0i64; input_ids.len()]))?;
            self.session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                TOKEN_TYPE_IDS => token_types,
            ])?
        } else {
            self.session.run(ort::inputs![
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
            ])?
        };

        let logits = outputs[0].try_extract_array::<f32>()?;
        Ok(logits.iter().copied().collect())
    }
}
