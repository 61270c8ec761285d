//! BM25+ scoring.

use serde::{Deserialize, Serialize};

/// BM25+ parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
    /// BM25+ delta parameter (avoids zero scores for high-frequency terms)
    pub delta: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            delta: 1.0,
        }
    }
}

/// Compute the BM25+ score of one term occurrence.
///
/// # Arguments
/// * `tf` - Term frequency in the document
/// * `df` - Number of indexed documents containing the term
/// * `total_docs` - Number of indexed documents
/// * `doc_len` - Length of the document in terms
/// * `avgdl` - Average document length
pub fn bm25_plus(tf: u32, df: u64, total_docs: u64, doc_len: u32, avgdl: f64, params: &Bm25Params) -> f32 {
    if avgdl <= 0.0 || total_docs == 0 || tf == 0 {
        return 0.0;
    }

    // IDF with Robertson-Sparck-Jones formula
    let n = total_docs as f32;
    let df = df as f32;
    let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

    let tf = tf as f32;
    let norm = 1.0 - params.b + params.b * (doc_len as f32 / avgdl as f32);

    let tf_component = (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm);
    idf * (tf_component + params.delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bm25_plus() {
        let params = Bm25Params::default();

        let score = bm25_plus(5, 10, 1000, 100, 100.0, &params);
        assert!(score > 0.0);

        // Higher TF should give higher score
        let score1 = bm25_plus(1, 10, 1000, 100, 100.0, &params);
        let score2 = bm25_plus(5, 10, 1000, 100, 100.0, &params);
        assert!(score2 > score1);

        // Rarer terms score higher
        let score1 = bm25_plus(5, 100, 1000, 100, 100.0, &params);
        let score2 = bm25_plus(5, 10, 1000, 100, 100.0, &params);
        assert!(score2 > score1);

        // Shorter documents score higher
        let score1 = bm25_plus(1, 10, 1000, 20, 10.0, &params);
        let score2 = bm25_plus(1, 10, 1000, 5, 10.0, &params);
        assert!(score2 > score1);
    }

    #[test]
    fn test_degenerate_inputs() {
        let params = Bm25Params::default();
        assert_eq!(bm25_plus(1, 1, 0, 1, 1.0, &params), 0.0);
        assert_eq!(bm25_plus(1, 1, 1, 1, 0.0, &params), 0.0);
        assert_eq!(bm25_plus(0, 1, 1, 1, 1.0, &params), 0.0);
    }
}
