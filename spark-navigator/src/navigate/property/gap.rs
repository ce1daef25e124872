use ndarray::Array2;
use spark_detect::Point;
use std::cell::OnceCell;

/// Pair of obstacles with the smallest centroid gap in a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestPair {
    pub first: usize,
    pub second: usize,
    pub gap: f32,
}

impl ClosestPair {
    /// The gap with its fractional part dropped, as the congestion rule compares it.
    pub fn truncated_gap(&self) -> u32 {
        self.gap as u32
    }
}

/// N×N Euclidean distances between centroids. The diagonal is +inf.
#[derive(Clone, Debug)]
pub struct GapMatrix(Array2<f32>);

impl GapMatrix {
    pub fn from_centroids(centroids: &[Point]) -> Self {
        let n = centroids.len();
        let mut gaps = Array2::from_elem((n, n), f32::INFINITY);
        for (i, a) in centroids.iter().enumerate() {
            for (j, b) in centroids.iter().enumerate() {
                if i != j {
                    gaps[[i, j]] = a.euclidean_distance(b);
                }
            }
        }
        GapMatrix(gaps)
    }

    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn gap(&self, i: usize, j: usize) -> f32 {
        self.0[[i, j]]
    }

    /// Row-major argmin over the off-diagonal entries; the first minimum wins.
    /// Gaps that are not finite are never a closest pair.
    pub fn closest_pair(&self) -> Option<ClosestPair> {
        let mut best: Option<ClosestPair> = None;
        for ((i, j), &gap) in self.0.indexed_iter() {
            if i == j || !gap.is_finite() {
                continue;
            }
            if best.map_or(true, |b| gap < b.gap) {
                best = Some(ClosestPair {
                    first: i,
                    second: j,
                    gap,
                });
            }
        }
        best
    }
}

/// Centroids of every tracked obstacle in the current frame. The closest pair is
/// computed at most once per frame, and only if some rule asks for it.
#[derive(Debug, Default)]
pub struct FrameObstacleSet {
    centroids: Vec<Point>,
    closest: OnceCell<Option<ClosestPair>>,
}

impl FrameObstacleSet {
    pub fn new(centroids: Vec<Point>) -> Self {
        Self {
            centroids,
            closest: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn centroids(&self) -> &[Point] {
        &self.centroids
    }

    pub fn closest_pair(&self) -> Option<ClosestPair> {
        *self.closest.get_or_init(|| {
            if self.centroids.len() < 2 {
                return None;
            }
            GapMatrix::from_centroids(&self.centroids).closest_pair()
        })
    }
}
