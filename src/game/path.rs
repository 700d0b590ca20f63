//! Closed node paths and the token that walks them.

use serde::{Deserialize, Serialize};

use crate::error::{Activity, CoreError, CoreResult};

/// Logical world position of a node or entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate (height).
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: Position) -> f64 {
        let (dx, dy, dz) = (other.x - self.x, other.y - self.y, other.z - self.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Move toward `target` by at most `max_delta`, never overshooting.
    #[must_use]
    pub fn move_towards(self, target: Position, max_delta: f64) -> Position {
        let distance = self.distance(target);
        if distance <= max_delta || distance <= f64::EPSILON {
            return target;
        }
        let t = max_delta / distance;
        Position::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t,
        )
    }
}

/// One stop on the path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    /// Sequence index, assigned when the path is built.
    #[serde(default)]
    pub index: usize,
    /// Where the node sits.
    pub position: Position,
    /// Gold granted on arrival, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<u32>,
}

impl PathNode {
    /// A node with no effect.
    #[must_use]
    pub const fn plain(position: Position) -> Self {
        Self {
            index: 0,
            position,
            gold: None,
        }
    }

    /// A node that grants `amount` gold on arrival.
    #[must_use]
    pub const fn with_gold(position: Position, amount: u32) -> Self {
        Self {
            index: 0,
            position,
            gold: Some(amount),
        }
    }
}

/// Ordered, cyclic, non-empty node sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<PathNode>,
}

impl Path {
    /// Build a path; node indices are reassigned to their sequence position.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when `nodes` is empty.
    pub fn new(mut nodes: Vec<PathNode>) -> CoreResult<Self> {
        if nodes.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "path needs at least one node".to_string(),
            ));
        }
        for (i, node) in nodes.iter_mut().enumerate() {
            node.index = i;
        }
        Ok(Self { nodes })
    }

    /// A circular board of `count` nodes; every `gold_every`-th node (after
    /// the start) grants `gold_amount`. A `gold_every` of zero disables gold.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] when `count` is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn ring(
        count: usize,
        radius: f64,
        gold_every: usize,
        gold_amount: u32,
    ) -> CoreResult<Self> {
        let nodes = (0..count)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / count as f64;
                let position = Position::new(radius * angle.cos(), 0.0, radius * angle.sin());
                if gold_every > 0 && i > 0 && i % gold_every == 0 {
                    PathNode::with_gold(position, gold_amount)
                } else {
                    PathNode::plain(position)
                }
            })
            .collect();
        Self::new(nodes)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; a path has at least one node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PathNode> {
        self.nodes.get(index)
    }

    /// All nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Index that follows `index`, wrapping after the last node.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.nodes.len()
    }
}

/// Report of a single step onto a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeArrival {
    /// Index of the node reached.
    pub index: usize,
    /// Where the node sits.
    pub position: Position,
    /// Gold the node grants.
    pub gold: Option<u32>,
    /// Steps left in the walk after this one.
    pub remaining: u32,
}

/// The token walking a path: position index plus walk state.
#[derive(Debug, Clone, PartialEq)]
pub struct PathWalker {
    path: Path,
    current: usize,
    remaining: u32,
}

impl PathWalker {
    /// Place a token on the first node.
    #[must_use]
    pub fn new(path: Path) -> Self {
        Self {
            path,
            current: 0,
            remaining: 0,
        }
    }

    /// Place a token on node `start`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] if `start` is off the path.
    pub fn starting_at(path: Path, start: usize) -> CoreResult<Self> {
        if start >= path.len() {
            return Err(CoreError::InvalidConfiguration(format!(
                "start node {start} outside path of {} nodes",
                path.len()
            )));
        }
        Ok(Self {
            path,
            current: start,
            remaining: 0,
        })
    }

    /// The path being walked.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Index of the node the token stands on.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Node the token stands on.
    #[must_use]
    pub fn current_node(&self) -> &PathNode {
        &self.path.nodes[self.current]
    }

    /// Node the next step leads to.
    #[must_use]
    pub fn next_node(&self) -> &PathNode {
        &self.path.nodes[self.path.next_index(self.current)]
    }

    /// Whether a walk is in flight.
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.remaining > 0
    }

    /// Steps left in the current walk.
    #[must_use]
    pub const fn remaining_steps(&self) -> u32 {
        self.remaining
    }

    /// Arm a walk of `steps` nodes. Zero steps leaves the token idle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyInProgress`] if a walk is in flight; the
    /// walker is left untouched.
    pub fn begin(&mut self, steps: u32) -> CoreResult<()> {
        if self.is_moving() {
            return Err(CoreError::AlreadyInProgress(Activity::Walk));
        }
        self.remaining = steps;
        Ok(())
    }

    /// Take exactly one step of the armed walk.
    ///
    /// Returns `None` when no walk is in flight.
    pub fn step(&mut self) -> Option<NodeArrival> {
        if !self.is_moving() {
            return None;
        }
        let next = self.path.next_index(self.current);
        let node = self.path.nodes[next];
        self.remaining -= 1;
        self.current = next;
        Some(NodeArrival {
            index: next,
            position: node.position,
            gold: node.gold,
            remaining: self.remaining,
        })
    }

    /// Walk `steps` nodes at once, reporting each arrival before the token
    /// is moved onto it.
    ///
    /// Returns the number of nodes visited.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyInProgress`] if a walk is in flight.
    pub fn advance(
        &mut self,
        steps: u32,
        mut on_arrival: impl FnMut(&NodeArrival),
    ) -> CoreResult<u32> {
        self.begin(steps)?;
        let mut visited = 0;
        while self.is_moving() {
            let next = self.path.next_index(self.current);
            let node = self.path.nodes[next];
            let arrival = NodeArrival {
                index: next,
                position: node.position,
                gold: node.gold,
                remaining: self.remaining - 1,
            };
            on_arrival(&arrival);
            self.remaining -= 1;
            self.current = next;
            visited += 1;
        }
        Ok(visited)
    }

    /// Cancel the walk in flight. Returns the steps that were dropped.
    pub fn halt(&mut self) -> u32 {
        std::mem::take(&mut self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Path {
        Path::new(vec![
            PathNode::plain(Position::new(0.0, 0.0, 0.0)),
            PathNode::with_gold(Position::new(1.0, 0.0, 0.0), 10),
            PathNode::plain(Position::new(1.0, 0.0, 1.0)),
            PathNode::plain(Position::new(0.0, 0.0, 1.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            Path::new(Vec::new()),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_indices_reassigned() {
        let path = square();
        for (i, node) in path.nodes().iter().enumerate() {
            assert_eq!(node.index, i);
        }
    }

    #[test]
    fn test_advance_wraps_cyclically() {
        let mut walker = PathWalker::new(square());
        let mut visited = Vec::new();
        let count = walker.advance(6, |a| visited.push(a.index)).unwrap();

        assert_eq!(count, 6);
        assert_eq!(visited, vec![1, 2, 3, 0, 1, 2]);
        assert_eq!(walker.current_index(), 2);
        assert!(!walker.is_moving());
    }

    #[test]
    fn test_advance_zero_visits_nothing() {
        let mut walker = PathWalker::new(square());
        let count = walker.advance(0, |_| panic!("no arrival expected")).unwrap();
        assert_eq!(count, 0);
        assert_eq!(walker.current_index(), 0);
    }

    #[test]
    fn test_arrival_reports_gold_and_remaining() {
        let mut walker = PathWalker::new(square());
        let mut arrivals = Vec::new();
        walker.advance(2, |a| arrivals.push(*a)).unwrap();

        assert_eq!(arrivals[0].gold, Some(10));
        assert_eq!(arrivals[0].remaining, 1);
        assert_eq!(arrivals[1].gold, None);
        assert_eq!(arrivals[1].remaining, 0);
    }

    #[test]
    fn test_begin_while_moving_rejected() {
        let mut walker = PathWalker::new(square());
        walker.begin(3).unwrap();
        walker.step();

        let before = walker.clone();
        assert_eq!(
            walker.begin(5),
            Err(CoreError::AlreadyInProgress(Activity::Walk))
        );
        assert_eq!(
            walker.advance(1, |_| {}),
            Err(CoreError::AlreadyInProgress(Activity::Walk))
        );
        assert_eq!(walker, before);
    }

    #[test]
    fn test_step_by_step_matches_advance() {
        let mut stepped = PathWalker::new(square());
        stepped.begin(5).unwrap();
        let mut visited = Vec::new();
        while let Some(arrival) = stepped.step() {
            visited.push(arrival.index);
        }

        let mut advanced = PathWalker::new(square());
        let mut expected = Vec::new();
        advanced.advance(5, |a| expected.push(a.index)).unwrap();

        assert_eq!(visited, expected);
        assert_eq!(stepped.current_index(), advanced.current_index());
    }

    #[test]
    fn test_halt_drops_remaining_steps() {
        let mut walker = PathWalker::new(square());
        walker.begin(4).unwrap();
        walker.step();
        assert_eq!(walker.halt(), 3);
        assert!(walker.step().is_none());
        assert_eq!(walker.current_index(), 1);
    }

    #[test]
    fn test_starting_at_out_of_range() {
        assert!(PathWalker::starting_at(square(), 4).is_err());
        let walker = PathWalker::starting_at(square(), 3).unwrap();
        assert_eq!(walker.next_node().index, 0);
    }

    #[test]
    fn test_single_node_path_loops_on_itself() {
        let path = Path::new(vec![PathNode::with_gold(Position::default(), 1)]).unwrap();
        let mut walker = PathWalker::new(path);
        let mut gold = 0;
        walker
            .advance(3, |a| gold += a.gold.unwrap_or(0))
            .unwrap();
        assert_eq!(gold, 3);
        assert_eq!(walker.current_index(), 0);
    }

    #[test]
    fn test_ring_gold_placement() {
        let path = Path::ring(12, 5.0, 3, 10).unwrap();
        let gold_nodes: Vec<usize> = path
            .nodes()
            .iter()
            .filter(|n| n.gold.is_some())
            .map(|n| n.index)
            .collect();
        assert_eq!(gold_nodes, vec![3, 6, 9]);
    }

    #[test]
    fn test_move_towards_does_not_overshoot() {
        let start = Position::new(0.0, 0.0, 0.0);
        let target = Position::new(3.0, 0.0, 4.0);
        let halfway = start.move_towards(target, 2.5);
        assert!((halfway.distance(target) - 2.5).abs() < 1e-9);
        assert_eq!(start.move_towards(target, 10.0), target);
    }
}
