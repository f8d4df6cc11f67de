use std::collections::{BTreeMap, HashMap};

use soat_core::error::{Error, Result};

use crate::tokenize::Tokenizer;

/// Term id → weight, sorted by term id, L2-normalized (or empty).
type SparseVector = Vec<(usize, f64)>;

/// Position of a fitted text plus its cosine similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk {
    pub index: usize,
    pub score: f64,
}

/// TF-IDF vector space over a fixed corpus.
///
/// The vocabulary, idf weights and per-text vectors are always produced
/// together by [`TfIdfIndex::fit`]. An index fitted over zero texts (or the
/// `Default` one) refuses queries with [`Error::NotIndexed`].
#[derive(Debug, Clone, Default)]
pub struct TfIdfIndex {
    tokenizer: Tokenizer,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl TfIdfIndex {
    /// Fit the vocabulary and weights over `texts`, in order. Term ids are
    /// assigned on first sight, so fitting the same corpus twice is identical.
    pub fn fit<I, S>(tokenizer: Tokenizer, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();
        let mut counts: Vec<BTreeMap<usize, usize>> = Vec::new();

        for text in texts {
            let mut tf: BTreeMap<usize, usize> = BTreeMap::new();
            for token in tokenizer.tokens(text.as_ref()) {
                let next_id = vocabulary.len();
                let id = *vocabulary.entry(token).or_insert(next_id);
                if id == doc_freq.len() {
                    doc_freq.push(0);
                }
                *tf.entry(id).or_insert(0) += 1;
            }
            for &id in tf.keys() {
                doc_freq[id] += 1;
            }
            counts.push(tf);
        }

        if counts.is_empty() {
            return Self { tokenizer, fitted: None };
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n = counts.len() as f64;
        let idf: Vec<f64> = doc_freq.iter().map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0).collect();
        let vectors = counts.iter().map(|tf| weigh(tf, &idf)).collect();
        tracing::debug!(texts = counts.len(), terms = vocabulary.len(), "fitted tf-idf index");
        Self { tokenizer, fitted: Some(Fitted { vocabulary, idf, vectors }) }
    }

    pub fn is_fitted(&self) -> bool { self.fitted.is_some() }

    /// Number of fitted texts.
    pub fn len(&self) -> usize { self.fitted.as_ref().map_or(0, |f| f.vectors.len()) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn vocabulary_size(&self) -> usize { self.fitted.as_ref().map_or(0, |f| f.vocabulary.len()) }

    /// Rank every fitted text against `query` by cosine similarity, best first,
    /// keeping at most `top_k`. Equal scores keep corpus order. Query terms
    /// outside the vocabulary carry no weight.
    pub fn query(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let fitted = self.fitted.as_ref().ok_or(Error::NotIndexed)?;

        let mut tf: BTreeMap<usize, usize> = BTreeMap::new();
        for token in self.tokenizer.tokens(query) {
            if let Some(&id) = fitted.vocabulary.get(&token) {
                *tf.entry(id).or_insert(0) += 1;
            }
        }
        let query_vec = weigh(&tf, &fitted.idf);

        let mut scored: Vec<ScoredChunk> = fitted
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| ScoredChunk { index, score: dot(&query_vec, v) })
            .collect();
        // sort_by is stable: ties stay in corpus order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn weigh(tf: &BTreeMap<usize, usize>, idf: &[f64]) -> SparseVector {
    let mut v: SparseVector = tf.iter().map(|(&id, &count)| (id, count as f64 * idf[id])).collect();
    let norm = v.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut v {
            *w /= norm;
        }
    }
    v
}

/// Dot product of two id-sorted sparse vectors. Both sides are unit length
/// (or empty), so this is their cosine similarity.
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
