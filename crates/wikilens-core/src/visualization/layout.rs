//! Force-directed graph layout
//!
//! `GraphLayout` is the seam between the graph view and the algorithm that
//! places its nodes. `ForceLayout` is a velocity-Verlet simulation with the
//! usual d3-force model:
//! - Link springs between connected nodes
//! - Many-body charge between every pair
//! - Centering on the viewport middle
//! - Collision avoidance
//! - Weak x/y positioning toward the middle
//!
//! The simulation cools as `alpha` decays toward `alpha_target` and stops on
//! its own once `alpha` drops below `alpha_min`. Designed for the handful of
//! nodes a search returns, so charge is computed pairwise.

use std::collections::HashMap;

use crate::config::GraphConfig;

/// Reference canvas the layout works in
pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

const ALPHA_MIN: f64 = 0.001;
const VELOCITY_DECAY: f64 = 0.4;
const INITIAL_RADIUS: f64 = 10.0;

/// A position in layout space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An undirected link between two node indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub const fn new(source: usize, target: usize) -> Self {
        Self { source, target }
    }

    pub fn touches(&self, index: usize) -> bool {
        self.source == index || self.target == index
    }
}

/// Iterative node placement
///
/// Positions are indexed like the node list passed to `set_graph`.
pub trait GraphLayout {
    /// Replace the graph; nodes keep their position when their id is retained
    fn set_graph(&mut self, nodes: &[String], edges: &[Edge]);

    /// Advance one tick, returning whether the layout is still active
    fn step(&mut self) -> bool;

    fn positions(&self) -> &[Point];

    /// Hold a node at `point` until unpinned
    fn pin(&mut self, id: &str, point: Point) -> bool;

    fn unpin(&mut self, id: &str) -> bool;

    /// Move the cooling target and restart the layout
    fn reheat(&mut self, alpha_target: f64);

    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Tunable force strengths
#[derive(Debug, Clone, PartialEq)]
pub struct ForceParams {
    pub link_distance: f64,
    pub charge_strength: f64,
    pub collision_radius: f64,
    pub position_strength: f64,
    pub alpha_decay: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self::from(&GraphConfig::default())
    }
}

impl From<&GraphConfig> for ForceParams {
    fn from(config: &GraphConfig) -> Self {
        Self {
            link_distance: config.link_distance,
            charge_strength: config.charge_strength,
            collision_radius: config.collision_radius,
            position_strength: config.position_strength,
            // Reaches alpha_min from 1 in ~300 ticks
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
        }
    }
}

/// d3-style force simulation
#[derive(Debug, Clone)]
pub struct ForceLayout {
    params: ForceParams,
    center: Point,
    ids: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    positions: Vec<Point>,
    velocities: Vec<Point>,
    fixed: Vec<Option<Point>>,
    alpha: f64,
    alpha_target: f64,
    running: bool,
    jiggle_seq: u64,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self::new(ForceParams::default(), DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl ForceLayout {
    /// Create an empty layout centred in a `width` x `height` canvas
    pub fn new(params: ForceParams, width: f64, height: f64) -> Self {
        Self {
            params,
            center: Point::new(width / 2.0, height / 2.0),
            ids: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            positions: Vec::new(),
            velocities: Vec::new(),
            fixed: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            jiggle_seq: 0,
        }
    }

    pub fn from_config(config: &GraphConfig, width: f64, height: f64) -> Self {
        Self::new(ForceParams::from(config), width, height)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|&i| self.fixed[i].is_some())
    }

    /// One simulation tick, regardless of whether the layout is running
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

        self.apply_links();
        self.apply_charge();
        self.apply_centering();
        self.apply_collision();
        self.apply_positioning();

        let retain = 1.0 - VELOCITY_DECAY;
        for i in 0..self.positions.len() {
            if let Some(pin) = self.fixed[i] {
                self.positions[i] = pin;
                self.velocities[i] = Point::default();
            } else {
                self.velocities[i].x *= retain;
                self.velocities[i].y *= retain;
                self.positions[i].x += self.velocities[i].x;
                self.positions[i].y += self.velocities[i].y;
            }
        }
    }

    /// Phyllotaxis placement around the centre
    fn initial_position(&self, i: usize) -> Point {
        let angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
        let theta = i as f64 * angle;
        Point::new(
            self.center.x + radius * theta.cos(),
            self.center.y + radius * theta.sin(),
        )
    }

    /// Tiny deterministic offset to separate coincident nodes
    fn jiggle(&mut self) -> f64 {
        self.jiggle_seq = self.jiggle_seq.wrapping_add(1);
        let golden = (self.jiggle_seq as f64 * 0.618_033_988_75).fract();
        (golden - 0.5) * 1e-6
    }

    fn apply_links(&mut self) {
        if self.edges.is_empty() {
            return;
        }

        let mut degree = vec![0usize; self.positions.len()];
        for edge in &self.edges {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        for k in 0..self.edges.len() {
            let Edge { source, target } = self.edges[k];
            let (s, t) = (self.positions[source], self.positions[target]);
            let (sv, tv) = (self.velocities[source], self.velocities[target]);

            let mut x = t.x + tv.x - s.x - sv.x;
            let mut y = t.y + tv.y - s.y - sv.y;
            if x == 0.0 {
                x = self.jiggle();
            }
            if y == 0.0 {
                y = self.jiggle();
            }

            let strength = 1.0 / degree[source].min(degree[target]) as f64;
            let bias = degree[source] as f64 / (degree[source] + degree[target]) as f64;

            let l = (x * x + y * y).sqrt();
            let l = (l - self.params.link_distance) / l * self.alpha * strength;
            x *= l;
            y *= l;

            self.velocities[target].x -= x * bias;
            self.velocities[target].y -= y * bias;
            self.velocities[source].x += x * (1.0 - bias);
            self.velocities[source].y += y * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self) {
        let n = self.positions.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = self.positions[j].x - self.positions[i].x;
                let mut y = self.positions[j].y - self.positions[i].y;
                if x == 0.0 {
                    x = self.jiggle();
                }
                if y == 0.0 {
                    y = self.jiggle();
                }
                let mut l = x * x + y * y;
                if l < 1.0 {
                    l = l.sqrt();
                }
                let w = self.params.charge_strength * self.alpha / l;
                self.velocities[i].x += x * w;
                self.velocities[i].y += y * w;
            }
        }
    }

    fn apply_centering(&mut self) {
        let n = self.positions.len();
        if n == 0 {
            return;
        }
        let (sx, sy) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let dx = sx / n as f64 - self.center.x;
        let dy = sy / n as f64 - self.center.y;
        for p in &mut self.positions {
            p.x -= dx;
            p.y -= dy;
        }
    }

    fn apply_collision(&mut self) {
        let n = self.positions.len();
        let r = self.params.collision_radius * 2.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let xi = self.positions[i].x + self.velocities[i].x;
                let yi = self.positions[i].y + self.velocities[i].y;
                let mut x = xi - self.positions[j].x - self.velocities[j].x;
                let mut y = yi - self.positions[j].y - self.velocities[j].y;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.jiggle();
                    l += y * y;
                }
                let l_root = l.sqrt();
                let push = (r - l_root) / l_root;
                x *= push;
                y *= push;

                // Equal radii share the correction evenly
                self.velocities[i].x += x * 0.5;
                self.velocities[i].y += y * 0.5;
                self.velocities[j].x -= x * 0.5;
                self.velocities[j].y -= y * 0.5;
            }
        }
    }

    fn apply_positioning(&mut self) {
        let k = self.params.position_strength * self.alpha;
        for (p, v) in self.positions.iter().zip(self.velocities.iter_mut()) {
            v.x += (self.center.x - p.x) * k;
            v.y += (self.center.y - p.y) * k;
        }
    }
}

impl GraphLayout for ForceLayout {
    fn set_graph(&mut self, nodes: &[String], edges: &[Edge]) {
        let previous: HashMap<&str, Point> = self
            .ids
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
            .collect();

        let positions: Vec<Point> = nodes
            .iter()
            .enumerate()
            .map(|(i, id)| {
                previous
                    .get(id.as_str())
                    .copied()
                    .unwrap_or_else(|| self.initial_position(i))
            })
            .collect();

        self.positions = positions;
        self.velocities = vec![Point::default(); nodes.len()];
        self.fixed = vec![None; nodes.len()];
        self.ids = nodes.to_vec();
        self.index = nodes
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        self.edges = edges
            .iter()
            .copied()
            .filter(|e| e.source != e.target && e.source < nodes.len() && e.target < nodes.len())
            .collect();

        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.running = true;
    }

    fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < ALPHA_MIN {
            self.running = false;
        }
        self.running
    }

    fn positions(&self) -> &[Point] {
        &self.positions
    }

    fn pin(&mut self, id: &str, point: Point) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.fixed[i] = Some(point);
                self.positions[i] = point;
                true
            }
            None => false,
        }
    }

    fn unpin(&mut self, id: &str) -> bool {
        match self.index.get(id) {
            Some(&i) => self.fixed[i].take().is_some(),
            None => false,
        }
    }

    fn reheat(&mut self, alpha_target: f64) {
        self.alpha_target = alpha_target.clamp(0.0, 1.0);
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Q{}", i)).collect()
    }

    fn settle(layout: &mut ForceLayout, max_steps: usize) -> usize {
        let mut steps = 0;
        while layout.step() {
            steps += 1;
            if steps >= max_steps {
                break;
            }
        }
        steps
    }

    #[test]
    fn test_empty_layout_is_idle() {
        let layout = ForceLayout::default();
        assert!(!layout.is_running());
        assert!(layout.positions().is_empty());
        assert_eq!(layout.center(), Point::new(400.0, 300.0));
    }

    #[test]
    fn test_phyllotaxis_initial_placement() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(3), &[]);

        let positions = layout.positions();
        assert_eq!(positions.len(), 3);
        assert!((positions[0].distance(layout.center()) - 10.0 * 0.5f64.sqrt()).abs() < 1e-9);
        assert_ne!(positions[1], positions[2]);
        assert!(layout.is_running());
        assert_eq!(layout.alpha(), 1.0);
    }

    #[test]
    fn test_cools_and_stops() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(4), &[Edge::new(0, 1), Edge::new(1, 2)]);

        let steps = settle(&mut layout, 1000);
        assert!(!layout.is_running());
        assert!((290..=310).contains(&steps), "stopped after {} steps", steps);
        assert!(layout.alpha() < ALPHA_MIN);
        assert!(!layout.step());
    }

    #[test]
    fn test_nodes_spread_apart_and_stay_centred() {
        let mut layout = ForceLayout::default();
        let edges = [Edge::new(0, 1), Edge::new(0, 2), Edge::new(1, 2)];
        layout.set_graph(&ids(3), &edges);
        settle(&mut layout, 1000);

        let p = layout.positions();
        for (a, b) in [(0, 1), (0, 2), (1, 2)] {
            assert!(p[a].distance(p[b]) > 50.0);
        }
        let cx = p.iter().map(|p| p.x).sum::<f64>() / 3.0;
        let cy = p.iter().map(|p| p.y).sum::<f64>() / 3.0;
        assert!((cx - 400.0).abs() < 10.0);
        assert!((cy - 300.0).abs() < 10.0);
    }

    #[test]
    fn test_pinned_node_holds_position() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(3), &[Edge::new(0, 1)]);

        let pin = Point::new(100.0, 50.0);
        assert!(layout.pin("Q0", pin));
        assert!(layout.is_pinned("Q0"));
        for _ in 0..50 {
            layout.step();
        }
        assert_eq!(layout.positions()[0], pin);

        assert!(layout.unpin("Q0"));
        assert!(!layout.is_pinned("Q0"));
        assert!(!layout.pin("missing", pin));
        assert!(!layout.unpin("missing"));
    }

    #[test]
    fn test_reheat_keeps_running_until_target_drops() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(2), &[Edge::new(0, 1)]);
        settle(&mut layout, 1000);
        assert!(!layout.is_running());

        layout.reheat(0.3);
        assert!(layout.is_running());
        for _ in 0..1000 {
            assert!(layout.step());
        }
        assert!((layout.alpha() - 0.3).abs() < 0.01);

        layout.reheat(0.0);
        settle(&mut layout, 2000);
        assert!(!layout.is_running());
    }

    #[test]
    fn test_stop_freezes_positions() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(3), &[]);
        layout.stop();

        let before = layout.positions().to_vec();
        assert!(!layout.step());
        assert_eq!(layout.positions(), before.as_slice());
    }

    #[test]
    fn test_set_graph_keeps_retained_positions() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(3), &[]);
        settle(&mut layout, 50);
        let kept = layout.positions()[2];

        let nodes = vec!["Q2".to_string(), "Q9".to_string()];
        layout.set_graph(&nodes, &[Edge::new(0, 1)]);
        assert_eq!(layout.positions()[0], kept);
        assert_eq!(layout.alpha(), 1.0);
    }

    #[test]
    fn test_invalid_edges_are_dropped() {
        let mut layout = ForceLayout::default();
        layout.set_graph(&ids(2), &[Edge::new(0, 0), Edge::new(0, 5), Edge::new(0, 1)]);
        assert_eq!(layout.edges(), &[Edge::new(0, 1)]);
    }

    #[test]
    fn test_default_params_follow_config() {
        let params = ForceParams::default();
        assert_eq!(params.link_distance, 150.0);
        assert_eq!(params.charge_strength, -400.0);
        assert_eq!(params.collision_radius, 70.0);
        assert_eq!(params.position_strength, 0.05);
        assert!((params.alpha_decay - 0.0228).abs() < 1e-3);
    }
}
