//! Exact nearest-neighbour index over a dense matrix of embeddings.

use crate::error::{ApiError, Result};
use ndarray::{Array2, ArrayView1, Axis};

/// A single hit: position of the vector in insertion order and its squared
/// Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Brute-force L2 index. Vectors are only ever appended.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimensions: usize,
    vectors: Array2<f32>,
}

impl FlatL2Index {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Array2::zeros((0, dimensions)),
        }
    }

    /// Build an index in one go from a batch of equally sized vectors.
    pub fn from_vectors(dimensions: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dimensions);
        index.add(vectors)?;
        Ok(index)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        for vector in vectors {
            self.check_dimensions(vector)?;
            self.vectors
                .push_row(ArrayView1::from(vector.as_slice()))?;
        }
        Ok(())
    }

    /// Return up to `k` nearest vectors, nearest first. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimensions(query)?;
        let query = ArrayView1::from(query);

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(position, row)| {
                let diff = &row - &query;
                Neighbor {
                    position,
                    distance: diff.dot(&diff),
                }
            })
            .collect();

        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);
        Ok(neighbors)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(ApiError::ModelError(format!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatL2Index {
        FlatL2Index::from_vectors(
            2,
            &[
                vec![0.0, 0.0],
                vec![3.0, 4.0],
                vec![1.0, 1.0],
                vec![-1.0, -1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.9], 3).unwrap();

        let positions: Vec<usize> = hits.iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![2, 0, 3]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!((hits[0].distance - 0.02).abs() < 1e-5);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0], 4).unwrap();
        assert_eq!(hits[0].position, 0);
        // (1,1) and (-1,-1) are equally far from the origin
        assert_eq!(hits[1].position, 2);
        assert_eq!(hits[2].position, 3);
        assert_eq!(hits[3].position, 1);
    }

    #[test]
    fn test_k_larger_than_index_returns_everything() {
        let index = sample_index();
        assert_eq!(index.search(&[0.0, 0.0], 10).unwrap().len(), 4);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatL2Index::new(3);
        assert!(index.add(&[vec![1.0, 2.0]]).is_err());
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 1).is_err());
    }

    #[test]
    fn test_empty_index_search() {
        let index = FlatL2Index::new(2);
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }
}
