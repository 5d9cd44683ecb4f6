use std::collections::{BTreeMap, VecDeque};

use glam::{DMat3, DVec3};

use crate::{ExtrinsicsError, RelativePose};

/// Store of the measured relative poses of a rig, keyed by ordered camera pair.
///
/// The edges `(i, j)` and `(j, i)` are independent measurements; the store never
/// inverts or normalizes them.
#[derive(Debug, Clone, Default)]
pub struct EdgeStore {
    num_cameras: usize,
    edges: BTreeMap<(usize, usize), RelativePose>,
}

impl EdgeStore {
    /// Create an empty store for a rig of `num_cameras` cameras.
    pub fn new(num_cameras: usize) -> Self {
        Self {
            num_cameras,
            edges: BTreeMap::new(),
        }
    }

    /// Number of cameras in the rig.
    pub fn num_cameras(&self) -> usize {
        self.num_cameras
    }

    /// Number of stored edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge is stored.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Store the edge from `source` to `target`.
    pub fn put_edge(
        &mut self,
        source: usize,
        target: usize,
        rotation: DMat3,
        translation: DVec3,
        num_observations: usize,
    ) -> Result<(), ExtrinsicsError> {
        self.insert(
            source,
            target,
            RelativePose::new(rotation, translation, num_observations),
        )?;
        Ok(())
    }

    /// Store a relative pose, returning the edge it replaced if any.
    pub fn insert(
        &mut self,
        source: usize,
        target: usize,
        edge: RelativePose,
    ) -> Result<Option<RelativePose>, ExtrinsicsError> {
        self.check_pair(source, target)?;
        Ok(self.edges.insert((source, target), edge))
    }

    /// The edge from `source` to `target`, if measured.
    pub fn get_edge(&self, source: usize, target: usize) -> Option<&RelativePose> {
        self.edges.get(&(source, target))
    }

    /// Whether the edge from `source` to `target` was measured.
    pub fn has_edge(&self, source: usize, target: usize) -> bool {
        self.edges.contains_key(&(source, target))
    }

    /// Iterate over all edges in ascending `(source, target)` order.
    pub fn edges(&self) -> impl Iterator<Item = ((usize, usize), &RelativePose)> {
        self.edges.iter().map(|(key, edge)| (*key, edge))
    }

    /// Cameras sharing an edge with `camera` in either direction, ascending.
    pub fn neighbors(&self, camera: usize) -> Vec<usize> {
        (0..self.num_cameras)
            .filter(|&other| {
                other != camera && (self.has_edge(camera, other) || self.has_edge(other, camera))
            })
            .collect()
    }

    /// Cameras that no undirected edge chain connects to any of `anchors`, ascending.
    pub fn unreachable_from(&self, anchors: &[usize]) -> Vec<usize> {
        let mut visited = vec![false; self.num_cameras];
        let mut queue = VecDeque::new();
        for &anchor in anchors.iter().filter(|&&a| a < self.num_cameras) {
            if !visited[anchor] {
                visited[anchor] = true;
                queue.push_back(anchor);
            }
        }

        while let Some(camera) = queue.pop_front() {
            for other in self.neighbors(camera) {
                if !visited[other] {
                    visited[other] = true;
                    queue.push_back(other);
                }
            }
        }

        visited
            .iter()
            .enumerate()
            .filter_map(|(camera, &seen)| (!seen).then_some(camera))
            .collect()
    }

    fn check_pair(&self, source: usize, target: usize) -> Result<(), ExtrinsicsError> {
        if source == target || source >= self.num_cameras || target >= self.num_cameras {
            return Err(ExtrinsicsError::InvalidCameraPair {
                source_camera: source,
                target_camera: target,
                num_cameras: self.num_cameras,
            });
        }
        Ok(())
    }
}

/// Check that a camera pair shares enough observations to produce an edge.
///
/// The returned error is not fatal: callers log it and leave the edge absent.
pub fn check_observations(
    source: usize,
    target: usize,
    found: usize,
    required: usize,
) -> Result<(), ExtrinsicsError> {
    if found < required {
        return Err(ExtrinsicsError::InsufficientObservations {
            source_camera: source,
            target_camera: target,
            found,
            required,
        });
    }
    Ok(())
}
