//! Export of height fields to solid meshes.
//!
//! A surface is closed into a watertight solid (top surface, flat base and
//! side walls) and written as binary STL.

mod mesh;
mod stl;

pub use mesh::SolidMesh;
pub use stl::{
    expected_file_size, export_surface_stl, read_binary_stl, read_stl, write_binary_stl,
    write_stl, StlTriangle,
};
