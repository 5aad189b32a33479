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

use std::io::{Cursor, Read, Seek};

use crate::{
    bsp::{
        error::{BspError, LumpProblem},
        face,
        lump::{self, LumpDirectory, LumpKind},
        BspModel,
    },
    entity, util,
};

// see MAX_MAP_* in the Quake 3 map compiler's qfiles.h
const MAX_MAP_DRAW_VERTS: usize = 0x80000;
const MAX_MAP_DRAW_INDEXES: usize = 0x80000;
const MAX_MAP_DRAW_SURFS: usize = 0x20000;
const MAX_MAP_SHADERS: usize = 0x400;
const MAX_MAP_ENTSTRING: usize = 0x40000;

/// Upper bounds on the size of each decoded lump.
///
/// These are checked against the lump directory before any lump data is read. The default is
/// unlimited, since lump lengths are already checked against the end of the source before
/// anything is allocated. `LoadLimits::q3map()` gives the caps built into the original map
/// compiler, for callers that want to reject maps an unmodified engine could not load.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadLimits {
    pub max_vertices: usize,
    pub max_meshverts: usize,
    pub max_faces: usize,
    pub max_textures: usize,

    /// Maximum size of the entity lump in bytes.
    pub max_entity_bytes: usize,
}

impl LoadLimits {
    pub fn unlimited() -> LoadLimits {
        LoadLimits {
            max_vertices: usize::max_value(),
            max_meshverts: usize::max_value(),
            max_faces: usize::max_value(),
            max_textures: usize::max_value(),
            max_entity_bytes: usize::max_value(),
        }
    }

    pub fn q3map() -> LoadLimits {
        LoadLimits {
            max_vertices: MAX_MAP_DRAW_VERTS,
            max_meshverts: MAX_MAP_DRAW_INDEXES,
            max_faces: MAX_MAP_DRAW_SURFS,
            max_textures: MAX_MAP_SHADERS,
            max_entity_bytes: MAX_MAP_ENTSTRING,
        }
    }
}

impl Default for LoadLimits {
    fn default() -> LoadLimits {
        LoadLimits::unlimited()
    }
}

/// Load a BSP file from a seekable source using the default limits.
pub fn load<R>(reader: &mut R) -> Result<BspModel, BspError>
where
    R: Read + Seek,
{
    load_with_limits(reader, &LoadLimits::default())
}

/// Load a BSP file that is already in memory.
pub fn load_bytes(data: &[u8]) -> Result<BspModel, BspError> {
    load(&mut Cursor::new(data))
}

/// Load a BSP file, returning its geometry and entities.
///
/// Textures and entities are decoded first, then vertices and meshverts, and finally the faces,
/// which are turned into triangles. The first error stops the load.
pub fn load_with_limits<R>(reader: &mut R, limits: &LoadLimits) -> Result<BspModel, BspError>
where
    R: Read + Seek,
{
    let dir = LumpDirectory::read(reader)?;

    let tex_data = dir.read_lump(reader, LumpKind::Textures, limits.max_textures)?;
    let textures = lump::decode_records(LumpKind::Textures, &tex_data, lump::load_texture)?;
    for (t, texture) in textures.iter().enumerate() {
        debug!("Texture {:>4}: {}", t, texture.name());
    }

    let ent_data = dir.read_lump(reader, LumpKind::Entities, limits.max_entity_bytes)?;
    let ent_string = match std::str::from_utf8(util::until_nul(&ent_data)) {
        Ok(s) => s,
        Err(_) => return Err(BspError::corrupt(LumpKind::Entities, LumpProblem::NotText)),
    };
    let entities = entity::parse_entities(ent_string)?;

    let vert_data = dir.read_lump(reader, LumpKind::Vertices, limits.max_vertices)?;
    let vertices = lump::decode_records(LumpKind::Vertices, &vert_data, lump::load_vertex)?;

    let meshvert_data = dir.read_lump(reader, LumpKind::MeshVerts, limits.max_meshverts)?;
    let meshverts =
        lump::decode_records(LumpKind::MeshVerts, &meshvert_data, lump::load_meshvert)?;

    let face_data = dir.read_lump(reader, LumpKind::Faces, limits.max_faces)?;
    let faces = lump::decode_records(LumpKind::Faces, &face_data, lump::load_face)?;

    let triangles = face::reconstruct(&faces, &vertices, &meshverts)?;

    debug!(
        "Loaded {} vertices, {} textures, {} triangles from {} faces, {} entities",
        vertices.len(),
        textures.len(),
        triangles.len(),
        faces.len(),
        entities.len()
    );

    Ok(BspModel {
        vertices: vertices.into_boxed_slice(),
        textures: textures.into_boxed_slice(),
        triangles: triangles.into_boxed_slice(),
        entities: entities.into_boxed_slice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        assert_eq!(LoadLimits::default(), LoadLimits::unlimited());

        let limits = LoadLimits::q3map();
        assert_eq!(limits.max_textures, 1024);
        assert_eq!(limits.max_entity_bytes, 262144);
    }

    #[test]
    fn test_empty_input() {
        match load_bytes(&[]) {
            Err(BspError::Format(_)) => (),
            other => panic!("expected format error, got {:?}", other),
        }
    }
}
