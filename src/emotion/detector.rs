//! Emotion classification over a pretrained ONNX model
//!
//! Loads a local sequence-classification model once and reuses the session
//! for every call. Loading is expensive and a missing model is fatal at
//! startup; classification itself is cheap and side-effect free.

use super::tokenizer::WordPieceTokenizer;
use crate::error::{AppError, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;

#[derive(Debug)]
pub struct EmotionDetector {
    session: Session,
    tokenizer: WordPieceTokenizer,
    /// Class labels indexed by model output id
    labels: Vec<String>,
}

impl EmotionDetector {
    /// Load tokenizer, label map and model weights from a local directory
    /// containing `model.onnx`, `vocab.txt` and `config.json`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        if !model_dir.exists() {
            return Err(AppError::ClassifierLoad(format!(
                "model directory not found: {:?}",
                model_dir
            )));
        }

        tracing::info!("Loading emotion classifier from {:?}", model_dir);

        let model_path = model_dir.join("model.onnx");
        if !model_path.exists() {
            return Err(AppError::ClassifierLoad(format!(
                "model file not found: {:?}",
                model_path
            )));
        }

        let session = Session::builder()
            .and_then(|b| Ok(b.with_optimization_level(GraphOptimizationLevel::Level3)?))
            .and_then(|mut b| b.commit_from_file(&model_path))
            .map_err(|e| AppError::ClassifierLoad(e.to_string()))?;

        let tokenizer = WordPieceTokenizer::load(model_dir)?;
        let labels = load_labels(model_dir)?;

        tracing::info!("Emotion classifier ready ({} labels)", labels.len());

        Ok(Self {
            session,
            tokenizer,
            labels,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Classify one text into a label from the model's fixed vocabulary
    pub fn classify(&mut self, text: &str) -> Result<String> {
        let (ids, mask) = self.tokenizer.encode(text);
        let len = ids.len();
        let token_types = vec![0i64; len];

        let ids_tensor = Tensor::from_array(([1usize, len], ids))
            .map_err(|e| AppError::Classifier(e.to_string()))?;
        let mask_tensor = Tensor::from_array(([1usize, len], mask))
            .map_err(|e| AppError::Classifier(e.to_string()))?;
        let types_tensor = Tensor::from_array(([1usize, len], token_types))
            .map_err(|e| AppError::Classifier(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => types_tensor
            ])
            .map_err(|e| AppError::Classifier(e.to_string()))?;

        // Single logits output; the name differs between exports
        let logits_value = outputs
            .iter()
            .next()
            .ok_or_else(|| AppError::Classifier("classifier produced no output".to_string()))?
            .1;
        let (_, logits) = logits_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Classifier(e.to_string()))?;

        if logits.len() != self.labels.len() {
            return Err(AppError::Classifier(format!(
                "expected {} logits, got {}",
                self.labels.len(),
                logits.len()
            )));
        }

        let probs = softmax(logits);
        for (label, prob) in self.labels.iter().zip(&probs) {
            tracing::debug!("{}: {:.4}", label, prob);
        }

        let best = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .ok_or_else(|| AppError::Classifier("empty probability vector".to_string()))?;

        Ok(self.labels[best].clone())
    }
}

fn load_labels(model_dir: &Path) -> Result<Vec<String>> {
    let config_path = model_dir.join("config.json");
    let content = std::fs::read_to_string(&config_path)
        .map_err(|e| AppError::ClassifierLoad(format!("cannot read {:?}: {}", config_path, e)))?;
    parse_id2label(&content)
}

/// Extract the id → label map from a model `config.json`
fn parse_id2label(config_json: &str) -> Result<Vec<String>> {
    let config: serde_json::Value = serde_json::from_str(config_json)
        .map_err(|e| AppError::ClassifierLoad(format!("invalid config.json: {}", e)))?;

    let map = config
        .get("id2label")
        .and_then(|v| v.as_object())
        .ok_or_else(|| AppError::ClassifierLoad("config.json has no id2label map".to_string()))?;

    let mut entries: Vec<(usize, String)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        let id: usize = key.parse().map_err(|_| {
            AppError::ClassifierLoad(format!("non-numeric class id in id2label: {}", key))
        })?;
        let label = value
            .as_str()
            .ok_or_else(|| AppError::ClassifierLoad("non-string label in id2label".to_string()))?;
        entries.push((id, label.to_string()));
    }

    entries.sort_by_key(|(id, _)| *id);

    if entries.is_empty() {
        return Err(AppError::ClassifierLoad("id2label map is empty".to_string()));
    }

    Ok(entries.into_iter().map(|(_, label)| label).collect())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
