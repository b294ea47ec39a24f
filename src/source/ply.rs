//! Minimal PLY reader for vertex clouds.
//!
//! Reads `ascii` and `binary_little_endian` files whose first element is
//! `vertex`. Positions (`x y z`) are required; normals (`nx ny nz`) and
//! colors (`red green blue`) are picked up when all three components are
//! present. Elements after `vertex` (faces, etc.) are ignored.

use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DVec3;

use crate::color::Rgb;
use crate::error::MatchVizError;
use crate::geometry::PointSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ScalarType {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "char" | "int8" => Self::I8,
            "uchar" | "uint8" => Self::U8,
            "short" | "int16" => Self::I16,
            "ushort" | "uint16" => Self::U16,
            "int" | "int32" => Self::I32,
            "uint" | "uint32" => Self::U32,
            "float" | "float32" => Self::F32,
            "double" | "float64" => Self::F64,
            _ => return None,
        })
    }

    const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Decode one little-endian value. `b` is exactly `size()` bytes.
    fn read_le(self, b: &[u8]) -> f64 {
        match self {
            Self::I8 => f64::from(i8::from_le_bytes([b[0]])),
            Self::U8 => f64::from(b[0]),
            Self::I16 => f64::from(i16::from_le_bytes([b[0], b[1]])),
            Self::U16 => f64::from(u16::from_le_bytes([b[0], b[1]])),
            Self::I32 => f64::from(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            Self::U32 => f64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            Self::F32 => f64::from(f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
            Self::F64 => f64::from_le_bytes([
                b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
            ]),
        }
    }

    /// Scale an integer color channel into `[0, 1]`; floats pass through.
    fn color_scale(self) -> f64 {
        match self {
            Self::U8 | Self::I8 => 255.0,
            Self::U16 | Self::I16 => 65535.0,
            Self::U32 | Self::I32 => f64::from(u32::MAX),
            Self::F32 | Self::F64 => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Ascii,
    BinaryLittleEndian,
}

#[derive(Debug)]
struct Property {
    name: String,
    ty: ScalarType,
}

#[derive(Debug)]
struct Header {
    format: Format,
    vertex_count: usize,
    properties: Vec<Property>,
}

impl Header {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }

    fn triple(&self, names: [&str; 3]) -> Option<[usize; 3]> {
        Some([
            self.index_of(names[0])?,
            self.index_of(names[1])?,
            self.index_of(names[2])?,
        ])
    }
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<Header, String> {
    let mut line = String::new();
    if reader.read_line(&mut line).map_err(|e| e.to_string())? == 0
        || line.trim() != "ply"
    {
        return Err("missing ply magic".to_owned());
    }

    let mut format = None;
    let mut vertex_count = None;
    let mut in_vertex = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).map_err(|e| e.to_string())? == 0 {
            return Err("missing end_header".to_owned());
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["end_header"] => break,
            ["format", "ascii", ..] => format = Some(Format::Ascii),
            ["format", "binary_little_endian", ..] => {
                format = Some(Format::BinaryLittleEndian);
            }
            ["format", other, ..] => {
                return Err(format!("unsupported format {other}"));
            }
            ["element", "vertex", count] => {
                if vertex_count.is_some() {
                    return Err("duplicate vertex element".to_owned());
                }
                let count = count
                    .parse()
                    .map_err(|_| format!("bad vertex count {count}"))?;
                vertex_count = Some(count);
                in_vertex = true;
            }
            ["element", name, ..] => {
                if vertex_count.is_none() {
                    return Err(format!("element {name} precedes vertex"));
                }
                in_vertex = false;
            }
            ["property", "list", ..] if in_vertex => {
                return Err("list property in vertex element".to_owned());
            }
            ["property", ty, name] if in_vertex => {
                let ty = ScalarType::parse(ty)
                    .ok_or_else(|| format!("unsupported property type {ty}"))?;
                properties.push(Property {
                    name: (*name).to_owned(),
                    ty,
                });
            }
            _ => {}
        }
    }

    let format = format.ok_or("missing format line")?;
    let vertex_count = vertex_count.ok_or("missing vertex element")?;
    Ok(Header {
        format,
        vertex_count,
        properties,
    })
}

struct Layout {
    position: [usize; 3],
    normal: Option<[usize; 3]>,
    color: Option<([usize; 3], f64)>,
}

impl Layout {
    fn from_header(header: &Header) -> Result<Self, String> {
        let position = header
            .triple(["x", "y", "z"])
            .ok_or("vertex element lacks x/y/z")?;
        let normal = header.triple(["nx", "ny", "nz"]);
        let color = header.triple(["red", "green", "blue"]).map(|idx| {
            (idx, header.properties[idx[0]].ty.color_scale())
        });
        Ok(Self {
            position,
            normal,
            color,
        })
    }
}

#[derive(Default)]
struct Columns {
    points: Vec<DVec3>,
    normals: Vec<DVec3>,
    colors: Vec<Rgb>,
}

impl Columns {
    fn push(&mut self, layout: &Layout, v: &[f64]) {
        let vec3 = |[a, b, c]: [usize; 3]| DVec3::new(v[a], v[b], v[c]);
        self.points.push(vec3(layout.position));
        if let Some(idx) = layout.normal {
            self.normals.push(vec3(idx));
        }
        if let Some((idx, scale)) = layout.color {
            let c = vec3(idx) / scale;
            self.colors.push([c.x as f32, c.y as f32, c.z as f32]);
        }
    }

    fn into_point_set(self) -> PointSet {
        let mut cloud = PointSet::new(self.points);
        if !self.normals.is_empty() {
            cloud = cloud.with_normals(self.normals);
        }
        if !self.colors.is_empty() {
            cloud = cloud.with_colors(self.colors);
        }
        cloud
    }
}

/// Decode a PLY stream into a point set.
pub(crate) fn parse_ply<R: BufRead>(mut reader: R) -> Result<PointSet, String> {
    let header = parse_header(&mut reader)?;
    let layout = Layout::from_header(&header)?;
    let n_props = header.properties.len();
    let mut columns = Columns::default();
    let mut values = vec![0.0; n_props];

    match header.format {
        Format::Ascii => {
            let mut lines = reader.lines();
            let mut read = 0;
            while read < header.vertex_count {
                let expected = header.vertex_count;
                let line = lines
                    .next()
                    .ok_or_else(|| format!("expected {expected} vertices, got {read}"))?
                    .map_err(|e| e.to_string())?;
                let mut tokens = line.split_whitespace().peekable();
                if tokens.peek().is_none() {
                    continue;
                }
                for (slot, prop) in values.iter_mut().zip(&header.properties) {
                    let tok = tokens
                        .next()
                        .ok_or_else(|| format!("vertex {read}: too few values"))?;
                    *slot = tok.parse().map_err(|_| {
                        format!("vertex {read}: bad {} value {tok}", prop.name)
                    })?;
                }
                columns.push(&layout, &values);
                read += 1;
            }
        }
        Format::BinaryLittleEndian => {
            let stride: usize = header.properties.iter().map(|p| p.ty.size()).sum();
            let mut record = vec![0_u8; stride];
            for i in 0..header.vertex_count {
                reader
                    .read_exact(&mut record)
                    .map_err(|e| format!("vertex {i}: {e}"))?;
                let mut offset = 0;
                for (slot, prop) in values.iter_mut().zip(&header.properties) {
                    let size = prop.ty.size();
                    *slot = prop.ty.read_le(&record[offset..offset + size]);
                    offset += size;
                }
                columns.push(&layout, &values);
            }
        }
    }
    Ok(columns.into_point_set())
}

/// Read a `.ply` file.
pub fn read_ply(path: &Path) -> Result<PointSet, MatchVizError> {
    let file = std::fs::File::open(path)?;
    parse_ply(BufReader::new(file)).map_err(|reason| MatchVizError::Ply {
        path: path.to_path_buf(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use approx::assert_relative_eq;

    use super::*;

    const ASCII: &str = "ply
format ascii 1.0
comment written by the segmenter
element vertex 3
property float x
property float y
property float z
property float nx
property float ny
property float nz
property uchar red
property uchar green
property uchar blue
element face 0
property list uchar int vertex_indices
end_header
0 0 0 0 0 1 255 0 0
1.5 -2 3e-1 0 0 1 0 255 0

2 2 2 0 1 0 0 0 51
";

    #[test]
    fn reads_ascii_with_normals_and_colors() {
        let cloud = parse_ply(ASCII.as_bytes()).unwrap();
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.points()[1], DVec3::new(1.5, -2.0, 0.3));
        assert_eq!(cloud.normals().unwrap()[2], DVec3::Y);
        let colors = cloud.colors().unwrap();
        assert_eq!(colors[0], [1.0, 0.0, 0.0]);
        assert_relative_eq!(colors[2][2], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn reads_binary_little_endian() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
property double x\nproperty double y\nproperty double z\nproperty float intensity\nend_header\n"
            .to_vec();
        for (p, intensity) in [([1.0_f64, 2.0, 3.0], 0.5_f32), ([-4.0, 0.25, 8.0], 1.0)] {
            for c in p {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
            bytes.extend_from_slice(&intensity.to_le_bytes());
        }

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        let cloud = read_ply(file.path()).unwrap();
        assert_eq!(cloud.points(), &[DVec3::new(1.0, 2.0, 3.0), DVec3::new(-4.0, 0.25, 8.0)]);
        assert!(cloud.normals().is_none());
        assert!(cloud.colors().is_none());
    }

    #[test]
    fn truncated_binary_body_is_an_error() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 2\n\
property float x\nproperty float y\nproperty float z\nend_header\n"
            .to_vec();
        bytes.extend_from_slice(&[0_u8; 12]);
        let err = parse_ply(bytes.as_slice()).unwrap_err();
        assert!(err.starts_with("vertex 1"), "{err}");
    }

    #[test]
    fn header_errors() {
        let cases = [
            ("", "missing ply magic"),
            ("ply\nformat ascii 1.0\nelement vertex 1\n", "missing end_header"),
            (
                "ply\nformat binary_big_endian 1.0\nend_header\n",
                "unsupported format binary_big_endian",
            ),
            (
                "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                 end_header\n0\n",
                "vertex element lacks x/y/z",
            ),
            (
                "ply\nformat ascii 1.0\nelement face 1\nelement vertex 1\n\
                 end_header\n",
                "element face precedes vertex",
            ),
            ("ply\nelement vertex 0\nend_header\n", "missing format line"),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_ply(text.as_bytes()).unwrap_err(), expected);
        }
    }

    #[test]
    fn empty_cloud_is_not_an_error() {
        let text = "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\n\
                    property float y\nproperty float z\nend_header\n";
        assert!(parse_ply(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_ply(&dir.path().join("nope.ply")),
            Err(MatchVizError::Io(_))
        ));
    }

    #[test]
    fn bad_ascii_value_names_the_property() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
                    property float y\nproperty float z\nend_header\n1 two 3\n";
        assert_eq!(
            parse_ply(text.as_bytes()).unwrap_err(),
            "vertex 0: bad y value two"
        );
    }
}
