//! PLY interchange format reader/writer
//!
//! Reading is header-driven: the `vertex` element must expose `x`, `y`, `z`
//! and one of the recognized classification properties. Numeric widths may
//! vary per file (f32/f64 positions, u8/f32/f64 labels); every scalar is
//! normalized to f32 through a single tagged-variant decode.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::cloud::point::PointRecord;
use crate::core::error::Error;
use crate::core::types::Result;

/// Recognized classification property names, tried in order
pub const LABEL_PROPERTIES: [&str; 2] = ["scalar_Classification", "semanticGroup"];

/// Parse a PLY file into labeled point records
///
/// Fails with [`Error::Format`] when the `vertex` element or any required
/// property is missing, and with [`Error::Io`] on unreadable files.
pub fn read_ply(path: &Path) -> Result<Vec<PointRecord>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader)?;

    let vertex_def = ply
        .header
        .elements
        .get("vertex")
        .ok_or_else(|| Error::Format("PLY missing 'vertex' element".into()))?;

    for name in ["x", "y", "z"] {
        if !vertex_def.properties.contains_key(name) {
            return Err(Error::Format(format!(
                "PLY vertex element missing '{name}' property"
            )));
        }
    }

    let label_name = LABEL_PROPERTIES
        .iter()
        .copied()
        .find(|name| vertex_def.properties.contains_key(*name))
        .ok_or_else(|| {
            Error::Format(format!(
                "PLY vertex element missing classification property (tried {})",
                LABEL_PROPERTIES.join(", ")
            ))
        })?;

    let vertices = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or(&[]);

    let mut points = Vec::with_capacity(vertices.len());
    for element in vertices {
        let x = scalar_f32(element, "x")?;
        let y = scalar_f32(element, "y")?;
        let z = scalar_f32(element, "z")?;
        let label = scalar_f32(element, label_name)?;

        points.push(PointRecord {
            position: [x, y, z],
            label,
        });
    }

    Ok(points)
}

/// Normalize one scalar property to f32 regardless of its on-disk width
fn scalar_f32(element: &DefaultElement, key: &str) -> Result<f32> {
    match element.get(key) {
        Some(Property::Float(v)) => Ok(*v),
        Some(Property::Double(v)) => Ok(*v as f32),
        Some(Property::UChar(v)) => Ok(*v as f32),
        Some(Property::Char(v)) => Ok(*v as f32),
        Some(Property::UShort(v)) => Ok(*v as f32),
        Some(Property::Short(v)) => Ok(*v as f32),
        Some(Property::UInt(v)) => Ok(*v as f32),
        Some(Property::Int(v)) => Ok(*v as f32),
        Some(_) => Err(Error::Format(format!(
            "PLY property '{key}' is not a scalar"
        ))),
        None => Err(Error::Format(format!("PLY property '{key}' missing"))),
    }
}

/// Write labeled points to a PLY file
///
/// Positions go out as f32, labels as a u8 `class` property. `ascii`
/// selects the text encoding; otherwise the body is binary little-endian.
pub fn write_ply(path: &Path, points: &[PointRecord], ascii: bool) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "ply")?;
    if ascii {
        writeln!(w, "format ascii 1.0")?;
    } else {
        writeln!(w, "format binary_little_endian 1.0")?;
    }
    writeln!(w, "element vertex {}", points.len())?;
    writeln!(w, "property float x")?;
    writeln!(w, "property float y")?;
    writeln!(w, "property float z")?;
    writeln!(w, "property uchar class")?;
    writeln!(w, "end_header")?;

    for point in points {
        let class = point.label.round().clamp(0.0, u8::MAX as f32) as u8;
        if ascii {
            writeln!(
                w,
                "{} {} {} {}",
                point.position[0], point.position[1], point.position[2], class
            )?;
        } else {
            for v in point.position {
                w.write_all(&v.to_le_bytes())?;
            }
            w.write_all(&[class])?;
        }
    }

    w.flush()?;
    Ok(())
}
