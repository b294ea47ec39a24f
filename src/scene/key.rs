//! Structured geometry identities and their string names.
//!
//! Names are produced and parsed only here. Everything else in the crate
//! passes [`GeometryId`] values around.

use std::fmt;

use crate::geometry::TransformName;
use crate::matching::EntityKind;

const MAP_PREFIX: &str = "map_";
const TRANSFORMED_PREFIX: &str = "transformed_cloud_";
const MATCH_LINES_PREFIX: &str = "dense_pt_match_lines_";
const MATCH_LINES_SUFFIX: &str = "_matched_to_dense";
const AXIS_NAME: &str = "coordinate_axes";

/// Which representation of an entity a geometry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// As observed in the current frame.
    Frame,
    /// In the reference map.
    Map,
    /// A frame entity moved by one of the frame's transforms.
    Transformed {
        /// Frame the transform belongs to.
        frame_id: u32,
        /// Which transform was applied.
        transform: TransformName,
    },
}

/// Identity of one displayed point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    /// Representation.
    pub role: Role,
    /// Classification.
    pub kind: EntityKind,
    /// Local id for ground/plane, `None` for the dense cloud.
    pub local_id: Option<i64>,
}

impl EntityKey {
    /// Frame-role key.
    #[must_use]
    pub fn frame(kind: EntityKind, local_id: Option<i64>) -> Self {
        Self::with_role(Role::Frame, kind, local_id)
    }

    /// Map-role key.
    #[must_use]
    pub fn map(kind: EntityKind, local_id: Option<i64>) -> Self {
        Self::with_role(Role::Map, kind, local_id)
    }

    /// Transformed-role key.
    #[must_use]
    pub fn transformed(
        frame_id: u32,
        transform: TransformName,
        kind: EntityKind,
        local_id: Option<i64>,
    ) -> Self {
        Self::with_role(
            Role::Transformed {
                frame_id,
                transform,
            },
            kind,
            local_id,
        )
    }

    fn with_role(role: Role, kind: EntityKind, local_id: Option<i64>) -> Self {
        // dense is a singleton per role
        let local_id = if kind.is_planar() { local_id } else { None };
        Self {
            role,
            kind,
            local_id,
        }
    }

    /// The same entity under another role.
    #[must_use]
    pub fn with(self, role: Role) -> Self {
        Self { role, ..self }
    }

    /// `{kind}_{id}` or `dense_cloud`, as used for file stems.
    #[must_use]
    pub fn stem(&self) -> String {
        entity_stem(self.kind, self.local_id)
    }

    /// Whether this is a transformed representation of `frame_id`.
    #[must_use]
    pub fn is_derived_from(&self, frame_id: u32) -> bool {
        matches!(self.role, Role::Transformed { frame_id: f, .. } if f == frame_id)
    }
}

/// `{kind}_{id}` or `dense_cloud`.
#[must_use]
pub fn entity_stem(kind: EntityKind, local_id: Option<i64>) -> String {
    match (kind, local_id) {
        (EntityKind::Dense, _) | (_, None) => kind.as_str().to_owned(),
        (_, Some(id)) => format!("{}_{id}", kind.as_str()),
    }
}

/// Parse a file stem into kind and local id.
#[must_use]
pub fn parse_stem(stem: &str) -> Option<(EntityKind, Option<i64>)> {
    if stem == EntityKind::Dense.as_str() {
        return Some((EntityKind::Dense, None));
    }
    let (kind, id) = stem.rsplit_once('_')?;
    let kind = EntityKind::parse(kind).filter(|k| k.is_planar())?;
    Some((kind, Some(id.parse().ok()?)))
}

/// Identity of anything the registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryId {
    /// A point set.
    Entity(EntityKey),
    /// Dense correspondence lines of one frame.
    MatchLines {
        /// Frame the lines belong to.
        frame_id: u32,
    },
    /// Coordinate axis helper. Survives frame changes.
    Axis,
}

impl GeometryId {
    /// Boundary name of this geometry.
    #[must_use]
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Parse a boundary name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if name == AXIS_NAME {
            return Some(Self::Axis);
        }
        if let Some(rest) = name.strip_prefix(MATCH_LINES_PREFIX) {
            let frame_id = rest.strip_suffix(MATCH_LINES_SUFFIX)?.parse().ok()?;
            return Some(Self::MatchLines { frame_id });
        }
        if let Some(rest) = name.strip_prefix(TRANSFORMED_PREFIX) {
            let (frame_id, rest) = rest.split_once('_')?;
            let frame_id = frame_id.parse().ok()?;
            let (transform, stem) = TransformName::ALL.into_iter().find_map(|t| {
                rest.strip_prefix(t.as_str())
                    .and_then(|r| r.strip_prefix('_'))
                    .map(|stem| (t, stem))
            })?;
            let (kind, local_id) = parse_stem(stem)?;
            return Some(Self::Entity(EntityKey::transformed(
                frame_id, transform, kind, local_id,
            )));
        }
        if let Some(stem) = name.strip_prefix(MAP_PREFIX) {
            let (kind, local_id) = parse_stem(stem)?;
            return Some(Self::Entity(EntityKey::map(kind, local_id)));
        }
        let (kind, local_id) = parse_stem(name)?;
        Some(Self::Entity(EntityKey::frame(kind, local_id)))
    }

    /// The entity key, if this is a point set.
    #[must_use]
    pub fn entity(&self) -> Option<&EntityKey> {
        match self {
            Self::Entity(key) => Some(key),
            _ => None,
        }
    }

    /// Whether the geometry survives [`clear_frame`].
    ///
    /// [`clear_frame`]: super::Registry::clear_frame
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Axis)
    }
}

impl From<EntityKey> for GeometryId {
    fn from(key: EntityKey) -> Self {
        Self::Entity(key)
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Axis => f.write_str(AXIS_NAME),
            Self::MatchLines { frame_id } => {
                write!(f, "{MATCH_LINES_PREFIX}{frame_id}{MATCH_LINES_SUFFIX}")
            }
            Self::Entity(key) => match key.role {
                Role::Frame => f.write_str(&key.stem()),
                Role::Map => write!(f, "{MAP_PREFIX}{}", key.stem()),
                Role::Transformed {
                    frame_id,
                    transform,
                } => write!(
                    f,
                    "{TRANSFORMED_PREFIX}{frame_id}_{transform}_{}",
                    key.stem()
                ),
            },
        }
    }
}
