use crate::error::{MlError, MlResult};
use crate::frame::{Column, FeatureFrame};
use crate::linalg::Vector;
use crate::pipeline::{Estimator, Transformer};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Lowercases text and splits it on runs of whitespace.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    input_col: String,
    output_col: String,
}

impl Tokenizer {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
        }
    }

    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Transformer for Tokenizer {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let tokens = frame
            .strings(&self.input_col)?
            .iter()
            .map(|text| Self::tokenize(text))
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Tokens(tokens))
    }
}

/// MurmurHash3, x86 32-bit variant.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    const C1: u32 = 0xcc9e_2d51;
    const C2: u32 = 0x1b87_3593;

    fn mix(k: u32) -> u32 {
        k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
    }

    let mut h = seed;
    let chunks = data.chunks_exact(4);
    let tail = chunks.remainder();
    for chunk in chunks {
        let k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        h ^= mix(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    if !tail.is_empty() {
        let k = tail
            .iter()
            .enumerate()
            .fold(0u32, |k, (i, byte)| k | (u32::from(*byte) << (8 * i)));
        h ^= mix(k);
    }

    h ^= data.len() as u32;
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Term frequencies in a fixed number of hashed buckets.
#[derive(Debug, Clone)]
pub struct HashingTF {
    input_col: String,
    output_col: String,
    num_features: usize,
    binary: bool,
}

impl HashingTF {
    const SEED: u32 = 42;

    pub fn new(
        input_col: impl Into<String>,
        output_col: impl Into<String>,
        num_features: usize,
    ) -> MlResult<Self> {
        if num_features == 0 || num_features > i32::MAX as usize {
            return Err(MlError::InvalidParameter(format!(
                "num_features must be in 1..=i32::MAX, got {num_features}"
            )));
        }
        Ok(Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            num_features,
            binary: false,
        })
    }

    /// Record presence (1.0) instead of counts.
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    pub fn index_of(&self, term: &str) -> usize {
        let hash = murmur3_32(term.as_bytes(), Self::SEED) as i32;
        hash.rem_euclid(self.num_features as i32) as usize
    }

    fn vectorize(&self, tokens: &[String]) -> Vector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            let slot = counts.entry(self.index_of(token)).or_default();
            *slot = if self.binary { 1.0 } else { *slot + 1.0 };
        }
        Vector::sparse(self.num_features, counts.into_iter().collect())
    }
}

impl Transformer for HashingTF {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let vectors = frame
            .tokens(&self.input_col)?
            .iter()
            .map(|tokens| self.vectorize(tokens))
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(vectors))
    }
}

/// Learns a vocabulary and encodes token lists as term-count vectors.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    input_col: String,
    output_col: String,
    vocab_size: usize,
    min_df: usize,
}

impl CountVectorizer {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            vocab_size: 1 << 18,
            min_df: 1,
        }
    }

    pub fn with_vocab_size(mut self, vocab_size: usize) -> Self {
        self.vocab_size = vocab_size;
        self
    }

    /// Minimum number of documents a term must appear in.
    pub fn with_min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }
}

impl Estimator for CountVectorizer {
    type Model = CountVectorizerModel;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<CountVectorizerModel> {
        // term -> (corpus frequency, document frequency)
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        for tokens in frame.tokens(&self.input_col)? {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                let entry = stats.entry(token.as_str()).or_default();
                entry.0 += 1;
                if seen.insert(token.as_str()) {
                    entry.1 += 1;
                }
            }
        }
        let mut ranked: Vec<(&str, usize)> = stats
            .into_iter()
            .filter(|(_, (_, df))| *df >= self.min_df)
            .map(|(term, (tf, _))| (term, tf))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.vocab_size);

        let vocabulary: Vec<String> = ranked.into_iter().map(|(term, _)| term.to_string()).collect();
        debug!(column = %self.input_col, size = vocabulary.len(), "fitted count vectorizer");
        Ok(CountVectorizerModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            vocabulary,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CountVectorizerModel {
    input_col: String,
    output_col: String,
    vocabulary: Vec<String>,
}

impl CountVectorizerModel {
    /// Terms in index order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

impl Transformer for CountVectorizerModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let index: HashMap<&str, usize> = self
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();
        let vectors = frame
            .tokens(&self.input_col)?
            .iter()
            .map(|tokens| {
                let mut counts: HashMap<usize, f64> = HashMap::new();
                for token in tokens {
                    if let Some(i) = index.get(token.as_str()) {
                        *counts.entry(*i).or_default() += 1.0;
                    }
                }
                Vector::sparse(self.vocabulary.len(), counts.into_iter().collect())
            })
            .collect();
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(vectors))
    }
}

/// Inverse document frequency weighting: `ln((m + 1) / (df + 1))`.
#[derive(Debug, Clone)]
pub struct Idf {
    input_col: String,
    output_col: String,
    min_doc_freq: usize,
}

impl Idf {
    pub fn new(input_col: impl Into<String>, output_col: impl Into<String>) -> Self {
        Self {
            input_col: input_col.into(),
            output_col: output_col.into(),
            min_doc_freq: 0,
        }
    }

    /// Terms seen in fewer documents get weight 0.
    pub fn with_min_doc_freq(mut self, min_doc_freq: usize) -> Self {
        self.min_doc_freq = min_doc_freq;
        self
    }
}

impl Estimator for Idf {
    type Model = IdfModel;

    fn fit(&self, frame: &FeatureFrame) -> MlResult<IdfModel> {
        let vectors = frame.vectors(&self.input_col)?;
        let width = vectors.first().map(Vector::size).unwrap_or(0);
        let mut doc_freq = vec![0usize; width];
        for vector in vectors {
            if vector.size() != width {
                return Err(MlError::InvalidInput(format!(
                    "column '{}' mixes vector sizes {width} and {}",
                    self.input_col,
                    vector.size()
                )));
            }
            for (i, value) in vector.active() {
                if value != 0.0 {
                    doc_freq[i] += 1;
                }
            }
        }
        let docs = vectors.len() as f64;
        let idf = doc_freq
            .into_iter()
            .map(|df| {
                if df >= self.min_doc_freq {
                    ((docs + 1.0) / (df as f64 + 1.0)).ln()
                } else {
                    0.0
                }
            })
            .collect();
        Ok(IdfModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            idf,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IdfModel {
    input_col: String,
    output_col: String,
    idf: Vec<f64>,
}

impl IdfModel {
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }
}

impl Transformer for IdfModel {
    fn transform(&self, frame: &FeatureFrame) -> MlResult<FeatureFrame> {
        let weighted = frame
            .vectors(&self.input_col)?
            .iter()
            .map(|vector| {
                if vector.size() != self.idf.len() {
                    return Err(MlError::InvalidInput(format!(
                        "expected vectors of size {}, got {}",
                        self.idf.len(),
                        vector.size()
                    )));
                }
                Ok(vector.map_values(|i, v| v * self.idf[i]))
            })
            .collect::<MlResult<Vec<_>>>()?;
        frame
            .clone()
            .with_column(&self.output_col, Column::Vector(weighted))
    }
}
