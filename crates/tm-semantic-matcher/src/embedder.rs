//! Sentence embedding using Candle and all-MiniLM-L6-v2
//!
//! MiniLM is a paraphrase-similarity model, which suits comparing a risk
//! phrase lifted from a regulatory document against the short keywords a TM
//! model is tagged with. Unlike retrieval models it uses mean pooling over
//! the attention mask and no query prefix.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::matcher::SimilarityScorer;
use crate::types::{SemanticError, DEFAULT_MODEL};
use crate::vector::cosine_similarity;

/// Embedding dimension for all-MiniLM-L6-v2
pub const EMBEDDING_DIM: usize = 384;

/// Sentence embedder
pub struct Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
}

impl Embedder {
    /// Create a new embedder, downloading the model if needed
    ///
    /// The model is cached in the HuggingFace cache directory (~/.cache/huggingface).
    pub fn new() -> Result<Self> {
        Self::with_model(DEFAULT_MODEL)
    }

    /// Create an embedder with a specific model name
    pub fn with_model(model_name: &str) -> Result<Self> {
        info!("Loading embedding model: {}", model_name);

        let device = Device::Cpu;

        let api = Api::new().context("Failed to create HuggingFace API client")?;
        let repo = api.repo(Repo::new(model_name.to_string(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .context("Failed to download config.json")?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer.json")?;
        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model.safetensors")?;

        debug!("Model files downloaded to cache");

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(&config_path).context("Failed to read config.json")?,
        )
        .context("Failed to parse config.json")?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .context("Failed to load model weights")?
        };

        let model = BertModel::load(vb, &config).context("Failed to build BERT model")?;

        info!("Embedding model loaded successfully ({})", model_name);

        Ok(Self {
            model,
            tokenizer,
            device,
            model_name: model_name.to_string(),
        })
    }

    /// Embed a single text
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("Embedding batch returned no rows")
    }

    /// Batch embed texts; each output row is L2 normalized
    pub fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut all_input_ids = Vec::new();
        let mut all_attention_mask = Vec::new();
        let mut all_token_type_ids = Vec::new();

        for encoding in &encodings {
            let mut ids = encoding.get_ids().to_vec();
            let mut attention = encoding.get_attention_mask().to_vec();
            let mut type_ids = encoding.get_type_ids().to_vec();

            ids.resize(max_len, 0);
            attention.resize(max_len, 0);
            type_ids.resize(max_len, 0);

            all_input_ids.extend(ids);
            all_attention_mask.extend(attention);
            all_token_type_ids.extend(type_ids);
        }

        let batch_size = texts.len();

        let input_ids = Tensor::from_vec(all_input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask =
            Tensor::from_vec(all_attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids =
            Tensor::from_vec(all_token_type_ids, (batch_size, max_len), &self.device)?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        // Mean pooling over real tokens: (batch, seq, hidden) -> (batch, hidden)
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = output.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
        let pooled = summed.broadcast_div(&counts)?;

        let normalized = Self::l2_normalize(&pooled)?;
        Ok(normalized.to_vec2::<f32>()?)
    }

    fn l2_normalize(tensor: &Tensor) -> Result<Tensor> {
        let norm = tensor
            .sqr()?
            .sum_keepdim(1)?
            .sqrt()?
            .clamp(1e-12, f64::MAX)?;
        Ok(tensor.broadcast_div(&norm)?)
    }

    pub fn embedding_dim(&self) -> usize {
        EMBEDDING_DIM
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// `SimilarityScorer` backed by sentence embeddings
pub struct EmbeddingScorer {
    embedder: Embedder,
}

impl EmbeddingScorer {
    pub fn new(embedder: Embedder) -> Self {
        Self { embedder }
    }

    pub fn with_model(model_name: &str) -> Result<Self, SemanticError> {
        let embedder =
            Embedder::with_model(model_name).map_err(|e| SemanticError::ModelLoad(e.to_string()))?;
        Ok(Self::new(embedder))
    }
}

impl SimilarityScorer for EmbeddingScorer {
    fn max_similarity(&self, phrase: &str, candidates: &[String]) -> Result<f32, SemanticError> {
        if candidates.is_empty() {
            return Err(SemanticError::EmptyCandidates);
        }

        let query = self
            .embedder
            .embed(phrase)
            .map_err(|e| SemanticError::Embedding(e.to_string()))?;
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let targets = self
            .embedder
            .embed_batch(&refs)
            .map_err(|e| SemanticError::Embedding(e.to_string()))?;

        let best = targets
            .iter()
            .map(|t| cosine_similarity(&query, t))
            .fold(f32::MIN, f32::max);

        Ok(best.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        self.embedder.model_name()
    }
}
