/*
 * Copyright 2024 Vijaykumar Singh
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Similarity scoring for vector search
//!
//! Every metric reports a score where higher means more similar, so search
//! results can be ranked and thresholded uniformly:
//! - Cosine similarity
//! - Dot product
//! - Euclidean distance, negated

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine similarity
    #[default]
    Cosine,
    /// Euclidean distance (L2 norm)
    Euclidean,
    /// Dot product similarity
    DotProduct,
}

/// Similarity computation trait
pub trait DistanceCompute: Send + Sync {
    /// Similarity between two vectors of equal length
    fn score(&self, a: &[f32], b: &[f32]) -> f32;

    /// Scores from one query to many vectors
    fn score_batch(&self, query: &[f32], vectors: &[&[f32]]) -> Vec<f32> {
        vectors.iter().map(|v| self.score(query, v)).collect()
    }

    fn metric(&self) -> DistanceMetric;
}

pub struct CosineDistance;

pub struct EuclideanDistance;

pub struct DotProductDistance;

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl DistanceCompute for CosineDistance {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let norm_a = dot(a, a);
        let norm_b = dot(b, b);
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot(a, b) / (norm_a.sqrt() * norm_b.sqrt())
        }
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Cosine
    }
}

impl DistanceCompute for EuclideanDistance {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let squared: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
        -squared.sqrt()
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::Euclidean
    }
}

impl DistanceCompute for DotProductDistance {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        dot(a, b)
    }

    fn metric(&self) -> DistanceMetric {
        DistanceMetric::DotProduct
    }
}

impl DistanceMetric {
    pub fn calculator(self) -> Box<dyn DistanceCompute> {
        match self {
            Self::Cosine => Box::new(CosineDistance),
            Self::Euclidean => Box::new(EuclideanDistance),
            Self::DotProduct => Box::new(DotProductDistance),
        }
    }

    /// pgvector distance operator for this metric
    pub fn sql_operator(self) -> &'static str {
        match self {
            Self::Cosine => "<=>",
            Self::Euclidean => "<->",
            Self::DotProduct => "<#>",
        }
    }

    /// SQL expression turning the operator's distance into a
    /// higher-is-better score, matching [`DistanceCompute::score`]
    pub fn sql_score(self, distance_expr: &str) -> String {
        match self {
            Self::Cosine => format!("1 - ({})", distance_expr),
            Self::Euclidean => format!("-({})", distance_expr),
            // <#> returns the negative inner product
            Self::DotProduct => format!("-({})", distance_expr),
        }
    }
}
