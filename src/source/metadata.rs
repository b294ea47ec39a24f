use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A `{a, b, c}` triple as written by the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Abc {
    /// First component.
    pub a: f64,
    /// Second component.
    pub b: f64,
    /// Third component.
    pub c: f64,
}

impl From<Abc> for DVec3 {
    fn from(v: Abc) -> Self {
        Self::new(v.a, v.b, v.c)
    }
}

/// Plane coefficients `a·x + b·y + c·z + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaneParam {
    /// x coefficient.
    pub a: f64,
    /// y coefficient.
    pub b: f64,
    /// z coefficient.
    pub c: f64,
    /// Constant term.
    pub d: f64,
}

/// Sidecar JSON of a ground/plane patch. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneMetadata {
    /// Patch centroid.
    pub center: Abc,
    /// Fitted plane.
    pub plane_param: PlaneParam,
    /// Patch radius around the centroid.
    pub radius: f64,
}

impl PlaneMetadata {
    /// Parse a sidecar file's contents.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Patch centroid as a vector.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        self.center.into()
    }

    /// Unit plane normal, `None` for a degenerate plane.
    #[must_use]
    pub fn normal(&self) -> Option<DVec3> {
        let p = self.plane_param;
        DVec3::new(p.a, p.b, p.c).try_normalize()
    }

    /// Signed distance from `point` to the plane.
    #[must_use]
    pub fn signed_distance(&self, point: DVec3) -> Option<f64> {
        let p = self.plane_param;
        let n = DVec3::new(p.a, p.b, p.c);
        let len = n.length();
        (len > f64::EPSILON).then(|| (n.dot(point) + p.d) / len)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn parses_sidecar_and_ignores_extras() {
        let meta = PlaneMetadata::from_json(
            r#"{"center": {"a": 1.0, "b": 2.0, "c": 0.5},
                "plane_param": {"a": 0.0, "b": 0.0, "c": 2.0, "d": -1.0},
                "radius": 3.5, "point_num": 120}"#,
        )
        .unwrap();
        assert_eq!(meta.center(), DVec3::new(1.0, 2.0, 0.5));
        assert_eq!(meta.normal(), Some(DVec3::Z));
        assert_relative_eq!(meta.signed_distance(DVec3::new(0.0, 0.0, 2.0)).unwrap(), 1.5);
        assert_relative_eq!(meta.radius, 3.5);
    }

    #[test]
    fn missing_fields_default_and_degenerate_plane_has_no_normal() {
        let meta = PlaneMetadata::from_json("{}").unwrap();
        assert!(meta.normal().is_none());
        assert!(meta.signed_distance(DVec3::ONE).is_none());
    }
}
