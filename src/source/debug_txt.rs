//! Parser for the optimizer's per-frame `debug.txt`.
//!
//! ```text
//! T_init_w_b = t(xyz) = 0 0 0, q(wxyz) = 1 0 0 0
//! T_opt_w_b = t(xyz) = 0.00084 0.00071 -0.00026, q(wxyz) = 1 -2.1e-05 -0.00011 -4.9e-05
//! 0iteration:
//! axis cost before 3.85690 1.70589 4.69210
//! axis cost after 3.83553 1.67809 4.67178
//! ```

use glam::DVec3;

use crate::geometry::{Quaternion, RigidTransform, TransformDelta, TransformName};

/// Per-axis optimizer cost.
pub type AxisCost = [f64; 3];

/// Costs recorded for one optimizer iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationCost {
    /// Iteration number as written.
    pub index: u32,
    /// Cost before the iteration, if logged.
    pub before: Option<AxisCost>,
    /// Cost after the iteration, if logged.
    pub after: Option<AxisCost>,
}

/// Contents of a `debug.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    /// Pose before optimization.
    pub init: RigidTransform,
    /// Pose after optimization.
    pub opt: RigidTransform,
    /// Iterations in file order.
    pub iterations: Vec<IterationCost>,
}

impl DebugInfo {
    /// The named transform.
    #[must_use]
    pub fn transform(&self, name: TransformName) -> RigidTransform {
        match name {
            TransformName::Init => self.init,
            TransformName::Opt => self.opt,
        }
    }

    /// How far optimization moved the pose.
    #[must_use]
    pub fn delta(&self) -> TransformDelta {
        self.init.delta_to(&self.opt)
    }

    /// Summed cost before the first and after the last logged iteration.
    #[must_use]
    pub fn cost_summary(&self) -> Option<(f64, f64)> {
        let first = self.iterations.iter().find_map(|it| it.before)?;
        let last = self.iterations.iter().rev().find_map(|it| it.after)?;
        Some((first.iter().sum(), last.iter().sum()))
    }

    /// Parse file contents. Both transforms must be present.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut init = None;
        let mut opt = None;
        let mut iterations: Vec<IterationCost> = Vec::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = TransformName::ALL
                .into_iter()
                .find(|n| line.starts_with(n.as_str()))
            {
                let Some(tf) = parse_transform_line(line) else {
                    log::warn!("debug.txt line {}: unreadable {name}", lineno + 1);
                    continue;
                };
                match name {
                    TransformName::Init => init = Some(tf),
                    TransformName::Opt => opt = Some(tf),
                }
            } else if let Some(index) = line
                .strip_suffix("iteration:")
                .and_then(|n| n.parse().ok())
            {
                iterations.push(IterationCost {
                    index,
                    before: None,
                    after: None,
                });
            } else if let Some(rest) = line.strip_prefix("axis cost before") {
                if let Some(it) = iterations.last_mut() {
                    it.before = parse_floats(rest);
                }
            } else if let Some(rest) = line.strip_prefix("axis cost after") {
                if let Some(it) = iterations.last_mut() {
                    it.after = parse_floats(rest);
                }
            }
        }

        match (init, opt) {
            (Some(init), Some(opt)) => Ok(Self {
                init,
                opt,
                iterations,
            }),
            (None, _) => Err("missing T_init_w_b".to_owned()),
            (_, None) => Err("missing T_opt_w_b".to_owned()),
        }
    }
}

fn parse_floats<const N: usize>(s: &str) -> Option<[f64; N]> {
    let values: Vec<f64> = s
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    values.try_into().ok()
}

/// `... t(xyz) = x y z, q(wxyz) = w x y z`
fn parse_transform_line(line: &str) -> Option<RigidTransform> {
    let (_, after_t) = line.split_once("t(xyz)")?;
    let (t_part, q_part) = after_t.split_once("q(wxyz)")?;
    let t_part = t_part.trim_start().strip_prefix('=')?.trim().trim_end_matches(',');
    let q_part = q_part.trim_start().strip_prefix('=')?;
    let [x, y, z] = parse_floats(t_part)?;
    let [qw, qx, qy, qz] = parse_floats(q_part)?;
    Some(RigidTransform::new(
        Quaternion::new(qw, qx, qy, qz),
        DVec3::new(x, y, z),
    ))
}
