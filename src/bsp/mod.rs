// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Quake 3 BSP level geometry.
//!
//! # File Format
//!
//! The file begins with the 4-byte magic number `IBSP` and a 32-bit version (46 for Quake 3).
//! Neither is checked here.
//!
//! This is followed by the lump directory: 17 entries, each consisting of a 32-bit offset (into
//! the file data) and a 32-bit size (in bytes). All integers and floats are little-endian. Only
//! five lumps are needed to rebuild the level's visible geometry; planes, nodes, leaves, brushes,
//! effects, lightmaps, the light grid and visibility data are ignored.
//!
//! ## Entities
//!
//! Lump 0 holds the entity text, one block per entity:
//!
//! ```text
//! {
//! "classname" "worldspawn"
//! "message" "Temple of Retribution"
//! }
//! {
//! "classname" "light"
//! "origin" "1024 -96 80"
//! "light" "300"
//! }
//! ```
//!
//! The text ends at the first zero byte or at the end of the lump.
//!
//! ## Textures
//!
//! Lump 1 is an array of 72-byte records: a 64-byte zero-padded name, a 32-bit surface flags
//! field and a 32-bit content flags field.
//!
//! ## Vertices
//!
//! Lump 10 is an array of 44-byte records. Only the leading position (3 floats) is kept; the
//! surface and lightmap texture coordinates, the normal and the RGBA color are skipped.
//!
//! ## Meshverts
//!
//! Lump 11 is an array of 32-bit indices. Each index is relative to the first vertex of the face
//! that uses it.
//!
//! ## Faces
//!
//! Lump 13 is an array of 104-byte records. Besides the texture and effect indices, each face
//! has a type and the ranges of vertices and meshverts it uses:
//!
//! - Polygons and meshes list their triangles as consecutive triples of meshverts.
//! - Patches store a `width` × `height` grid of bezier control points in their vertex range.
//! - Billboards have no stored geometry.

mod error;
mod face;
mod load;
pub mod lump;

use crate::entity::Entity;

use cgmath::Vector3;

pub use self::{
    error::{BspError, FaceProblem, LumpProblem},
    face::Triangle,
    load::{load, load_bytes, load_with_limits, LoadLimits},
    lump::{BspTexture, LumpKind},
};

/// The decoded contents of a BSP file.
///
/// A `BspModel` only exists once every lump it depends on has been decoded, and it is never
/// modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct BspModel {
    vertices: Box<[Vector3<f64>]>,
    textures: Box<[BspTexture]>,
    triangles: Box<[Triangle]>,
    entities: Box<[Entity]>,
}

impl BspModel {
    /// Returns every vertex position in the vertex lump.
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn textures(&self) -> &[BspTexture] {
        &self.textures
    }

    /// Returns the level geometry as triangles, in face order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Iterate over the entities with the given classname.
    pub fn entities_by_class<'a>(&'a self, classname: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .iter()
            .filter(move |e| e.classname() == Some(classname))
    }

    /// Returns the minimum and maximum corners of the box around all vertices, or `None` if
    /// there are no vertices.
    pub fn bounds(&self) -> Option<(Vector3<f64>, Vector3<f64>)> {
        let first = *self.vertices.first()?;

        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (
                Vector3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z)),
                Vector3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z)),
            )
        }))
    }
}
