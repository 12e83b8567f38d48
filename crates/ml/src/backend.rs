use senti_core::Result;

/// Raw forward pass: token ids in, one row of class logits out.
pub trait MlBackend: Send {
    fn logits(&mut self, input_ids: &[u32], attention_mask: &[u32]) -> Result<Vec<f32>>;
}
