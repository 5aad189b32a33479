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

//! Rebuilding triangle geometry from face records.
//!
//! Polygons and meshes carry explicit triangle lists in the meshvert lump. Patches carry a grid
//! of bezier control points, which is split into flat triangles without any curve evaluation.
//! Billboards (flares) have no geometry and produce nothing.

use std::ops::Range;

use crate::bsp::{
    error::{BspError, FaceProblem, LumpProblem},
    lump::{BspFace, FaceKind, LumpKind},
};

use cgmath::Vector3;

/// A single triangle of level geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    vertices: [Vector3<f64>; 3],
    face_id: usize,
}

impl Triangle {
    pub fn new(vertices: [Vector3<f64>; 3], face_id: usize) -> Triangle {
        Triangle { vertices, face_id }
    }

    /// Returns the three corners of the triangle in winding order.
    pub fn vertices(&self) -> &[Vector3<f64>; 3] {
        &self.vertices
    }

    /// Returns the index of the face this triangle was generated from.
    pub fn face_id(&self) -> usize {
        self.face_id
    }
}

fn checked_range(
    face_id: usize,
    offset: u32,
    count: u32,
    bound: usize,
) -> Result<Range<usize>, BspError> {
    let start = offset as u64;
    let end = start + count as u64;
    if end > bound as u64 {
        return Err(BspError::corrupt(
            LumpKind::Faces,
            LumpProblem::IndexOutOfRange {
                record: face_id,
                index: start + (count as u64).saturating_sub(1),
                bound,
            },
        ));
    }

    Ok(start as usize..end as usize)
}

fn triangulate_mesh(
    face_id: usize,
    face: &BspFace,
    vertices: &[Vector3<f64>],
    meshverts: &[u32],
    triangles: &mut Vec<Triangle>,
) -> Result<(), BspError> {
    if face.meshvert_count % 3 != 0 {
        return Err(BspError::malformed(face_id, FaceProblem::MeshVertCount));
    }

    let mv_range = checked_range(
        face_id,
        face.meshvert_offset,
        face.meshvert_count,
        meshverts.len(),
    )?;
    let vert_range = checked_range(
        face_id,
        face.vertex_offset,
        face.vertex_count,
        vertices.len(),
    )?;
    let face_verts = &vertices[vert_range];

    // meshverts are relative to the face's first vertex
    let lookup = |mv_id: usize| -> Result<Vector3<f64>, BspError> {
        let index = meshverts[mv_id];
        match face_verts.get(index as usize) {
            Some(v) => Ok(*v),
            None => Err(BspError::corrupt(
                LumpKind::MeshVerts,
                LumpProblem::IndexOutOfRange {
                    record: mv_id,
                    index: index as u64,
                    bound: face_verts.len(),
                },
            )),
        }
    };

    for first in mv_range.step_by(3) {
        triangles.push(Triangle::new(
            [lookup(first)?, lookup(first + 1)?, lookup(first + 2)?],
            face_id,
        ));
    }

    Ok(())
}

fn triangulate_patch(
    face_id: usize,
    face: &BspFace,
    vertices: &[Vector3<f64>],
    triangles: &mut Vec<Triangle>,
) -> Result<(), BspError> {
    let [width, height] = face.patch_size;
    if width as u64 * height as u64 != face.vertex_count as u64 {
        return Err(BspError::malformed(face_id, FaceProblem::PatchGridSize));
    }

    let vert_range = checked_range(
        face_id,
        face.vertex_offset,
        face.vertex_count,
        vertices.len(),
    )?;
    let grid = &vertices[vert_range];

    let (w, h) = (width as usize, height as usize);
    let p = |i: usize, j: usize| grid[i + j * w];

    // each cell of control points becomes two flat triangles
    for j in 1..h {
        for i in 1..w {
            let (i, j) = (i - 1, j - 1);
            triangles.push(Triangle::new(
                [p(i, j), p(i + 1, j), p(i + 1, j + 1)],
                face_id,
            ));
            triangles.push(Triangle::new(
                [p(i, j), p(i + 1, j + 1), p(i, j + 1)],
                face_id,
            ));
        }
    }

    Ok(())
}

/// Converts every face into triangles, in face order.
pub fn reconstruct(
    faces: &[BspFace],
    vertices: &[Vector3<f64>],
    meshverts: &[u32],
) -> Result<Vec<Triangle>, BspError> {
    let mut triangles = Vec::new();

    for (face_id, face) in faces.iter().enumerate() {
        let before = triangles.len();

        match face.kind {
            FaceKind::Polygon | FaceKind::Mesh => {
                triangulate_mesh(face_id, face, vertices, meshverts, &mut triangles)?
            }
            FaceKind::Patch => triangulate_patch(face_id, face, vertices, &mut triangles)?,
            FaceKind::Billboard => (),
        }

        trace!(
            "face {}: {:?} -> {} triangles",
            face_id,
            face.kind,
            triangles.len() - before
        );
    }

    Ok(triangles)
}
