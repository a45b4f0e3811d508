//! Binary STL serialization.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use super::mesh::SolidMesh;
use crate::errors::{Result, SurfaceError};
use crate::grid::Surface;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;
const HEADER_TEXT: &[u8] = b"rough-surface binary STL";

/// One facet as stored in a binary STL file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlTriangle {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

/// Size in bytes of a binary STL file holding `triangles` facets.
pub fn expected_file_size(triangles: usize) -> u64 {
    (HEADER_LEN + 4 + TRIANGLE_LEN * triangles) as u64
}

/// Writes `mesh` as binary STL to `writer`.
pub fn write_binary_stl<W: Write>(mesh: &SolidMesh, mut writer: W) -> Result<()> {
    let count = u32::try_from(mesh.triangle_count()).map_err(|_| {
        SurfaceError::InvalidInput(format!(
            "{} triangles exceed the STL limit",
            mesh.triangle_count()
        ))
    })?;

    let mut header = [0u8; HEADER_LEN];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for (index, triangle) in mesh.triangles.iter().enumerate() {
        for component in mesh.normal(index) {
            writer.write_all(&(component as f32).to_le_bytes())?;
        }
        for &vertex in triangle {
            for coordinate in mesh.vertices[vertex] {
                writer.write_all(&(coordinate as f32).to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes `mesh` as a binary STL file at `path`.
pub fn write_stl(mesh: &SolidMesh, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_binary_stl(mesh, BufWriter::new(file))?;
    debug!(path = %path.display(), triangles = mesh.triangle_count(), "wrote STL");
    Ok(())
}

/// Triangulates `surface` on a base of `base_thickness` and writes it to `path`.
pub fn export_surface_stl(surface: &Surface, path: &Path, base_thickness: f64) -> Result<SolidMesh> {
    let mesh = SolidMesh::from_heights(&surface.grid(), &surface.heights, base_thickness)?;
    write_stl(&mesh, path)?;
    Ok(mesh)
}

/// Reads every facet of a binary STL stream.
pub fn read_binary_stl<R: Read>(mut reader: R) -> Result<Vec<StlTriangle>> {
    let mut header = [0u8; HEADER_LEN];
    read_exact(&mut reader, &mut header, "header")?;

    let mut count = [0u8; 4];
    read_exact(&mut reader, &mut count, "triangle count")?;
    let count = u32::from_le_bytes(count) as usize;

    let mut triangles = Vec::with_capacity(count.min(1 << 20));
    let mut record = [0u8; TRIANGLE_LEN];
    for _ in 0..count {
        read_exact(&mut reader, &mut record, "triangle record")?;
        let float = |k: usize| {
            let at = 4 * k;
            f32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
        };
        triangles.push(StlTriangle {
            normal: [float(0), float(1), float(2)],
            vertices: [
                [float(3), float(4), float(5)],
                [float(6), float(7), float(8)],
                [float(9), float(10), float(11)],
            ],
        });
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(SurfaceError::InvalidInput(format!(
            "STL declares {count} triangles but has trailing data"
        )));
    }
    Ok(triangles)
}

/// Reads every facet of the binary STL file at `path`.
pub fn read_stl(path: &Path) -> Result<Vec<StlTriangle>> {
    read_binary_stl(BufReader::new(File::open(path)?))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            SurfaceError::InvalidInput(format!("STL truncated while reading {what}"))
        }
        _ => SurfaceError::Io(e),
    })
}
