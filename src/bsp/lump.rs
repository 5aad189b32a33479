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

//! Lump directory and fixed-stride record decoding.

use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::{
    bsp::error::{BspError, LumpProblem},
    util,
};

use byteorder::{LittleEndian, ReadBytesExt};
use cgmath::Vector3;
use num_traits::FromPrimitive;

pub const LUMP_COUNT: usize = 17;

/// Size in bytes of the magic number, version and lump directory.
pub const HEADER_SIZE: usize = 8 + LUMP_COUNT * LUMP_ENTRY_SIZE;

const LUMP_ENTRY_SIZE: usize = 8;

pub const VERTEX_SIZE: usize = 44;
pub const MESHVERT_SIZE: usize = 4;
pub const TEXTURE_SIZE: usize = 72;
pub const FACE_SIZE: usize = 104;
pub const TEX_NAME_MAX: usize = 64;

/// The lump slots defined by the format, in directory order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum LumpKind {
    Entities = 0,
    Textures = 1,
    Planes = 2,
    Nodes = 3,
    Leafs = 4,
    LeafFaces = 5,
    LeafBrushes = 6,
    Models = 7,
    Brushes = 8,
    BrushSides = 9,
    Vertices = 10,
    MeshVerts = 11,
    Effects = 12,
    Faces = 13,
    Lightmaps = 14,
    LightVols = 15,
    VisData = 16,
}

impl LumpKind {
    pub fn name(self) -> &'static str {
        match self {
            LumpKind::Entities => "entities",
            LumpKind::Textures => "textures",
            LumpKind::Planes => "planes",
            LumpKind::Nodes => "nodes",
            LumpKind::Leafs => "leafs",
            LumpKind::LeafFaces => "leaf faces",
            LumpKind::LeafBrushes => "leaf brushes",
            LumpKind::Models => "models",
            LumpKind::Brushes => "brushes",
            LumpKind::BrushSides => "brush sides",
            LumpKind::Vertices => "vertices",
            LumpKind::MeshVerts => "meshverts",
            LumpKind::Effects => "effects",
            LumpKind::Faces => "faces",
            LumpKind::Lightmaps => "lightmaps",
            LumpKind::LightVols => "lightvols",
            LumpKind::VisData => "visdata",
        }
    }

    /// Returns the on-disk record size of the lumps this crate decodes record by record.
    ///
    /// The entity lump is free-form text and the remaining lumps are never decoded, so these
    /// return `None`.
    pub fn record_size(self) -> Option<usize> {
        match self {
            LumpKind::Vertices => Some(VERTEX_SIZE),
            LumpKind::MeshVerts => Some(MESHVERT_SIZE),
            LumpKind::Textures => Some(TEXTURE_SIZE),
            LumpKind::Faces => Some(FACE_SIZE),
            _ => None,
        }
    }
}

impl std::fmt::Display for LumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BspLump {
    pub offset: u32,
    pub length: u32,
}

/// The file header: magic number, format version and one lump entry per slot.
#[derive(Clone, Debug)]
pub struct LumpDirectory {
    magic: [u8; 4],
    version: u32,
    lumps: [BspLump; LUMP_COUNT],
}

impl LumpDirectory {
    /// Reads the header and lump directory from the start of `reader`.
    ///
    /// The magic number and version are recorded but not checked.
    pub fn read<R>(reader: &mut R) -> Result<LumpDirectory, BspError>
    where
        R: Read + Seek,
    {
        reader.seek(SeekFrom::Start(0))?;

        let mut header = Vec::with_capacity(HEADER_SIZE);
        reader.by_ref().take(HEADER_SIZE as u64).read_to_end(&mut header)?;
        if header.len() < HEADER_SIZE {
            return Err(BspError::Format(format!(
                "file is {} bytes long, header and lump directory need {}",
                header.len(),
                HEADER_SIZE
            )));
        }

        let mut reader = Cursor::new(&header[..]);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        let version = reader.read_u32::<LittleEndian>()?;
        debug!(
            "BSP magic = {:?}, version = {}",
            String::from_utf8_lossy(&magic),
            version
        );

        let mut lumps = [BspLump::default(); LUMP_COUNT];
        for (l, lump) in lumps.iter_mut().enumerate() {
            lump.offset = reader.read_u32::<LittleEndian>()?;
            lump.length = reader.read_u32::<LittleEndian>()?;

            if let Some(kind) = LumpKind::from_usize(l) {
                debug!(
                    "{: <14} Offset = 0x{:>08x} | Size = 0x{:>08x}",
                    format!("{}:", kind),
                    lump.offset,
                    lump.length
                );
            }
        }

        Ok(LumpDirectory {
            magic,
            version,
            lumps,
        })
    }

    pub fn magic(&self) -> [u8; 4] {
        self.magic
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn lump(&self, kind: LumpKind) -> BspLump {
        self.lumps[kind as usize]
    }

    /// Reads the raw bytes of a lump.
    ///
    /// Fixed-stride lumps have their length checked against the record size before anything is
    /// read. `max_records` (records for fixed-stride lumps, bytes otherwise) and the end of the
    /// stream are both checked before the buffer is allocated.
    pub fn read_lump<R>(
        &self,
        reader: &mut R,
        kind: LumpKind,
        max_records: usize,
    ) -> Result<Vec<u8>, BspError>
    where
        R: Read + Seek,
    {
        let lump = self.lump(kind);
        let length = lump.length as usize;

        let count = match kind.record_size() {
            Some(record_size) => {
                if length % record_size != 0 {
                    return Err(BspError::corrupt(
                        kind,
                        LumpProblem::BadLength {
                            length,
                            record_size,
                        },
                    ));
                }

                length / record_size
            }

            None => length,
        };

        if count > max_records {
            return Err(BspError::corrupt(
                kind,
                LumpProblem::TooManyRecords {
                    count,
                    max: max_records,
                },
            ));
        }

        let truncated = BspError::corrupt(
            kind,
            LumpProblem::Truncated {
                offset: lump.offset,
                length: lump.length,
            },
        );

        let end = reader.seek(SeekFrom::End(0))?;
        if lump.offset as u64 + lump.length as u64 > end {
            return Err(truncated);
        }

        reader.seek(SeekFrom::Start(lump.offset as u64))?;
        let mut data = Vec::with_capacity(length);
        reader.by_ref().take(length as u64).read_to_end(&mut data)?;
        if data.len() != length {
            return Err(truncated);
        }

        Ok(data)
    }
}

/// Decodes every record of a fixed-stride lump with the record reader for that lump kind.
///
/// `data` must come from `LumpDirectory::read_lump`, which has already checked that its length is
/// a whole number of records.
pub(crate) fn decode_records<'a, T, F>(
    kind: LumpKind,
    data: &'a [u8],
    mut load: F,
) -> Result<Vec<T>, BspError>
where
    F: FnMut(&mut Cursor<&'a [u8]>, usize) -> Result<T, BspError>,
{
    let record_size = match kind.record_size() {
        Some(s) => s,
        None => {
            return Err(BspError::Format(format!(
                "{} lump has no fixed record size",
                kind
            )))
        }
    };

    let count = data.len() / record_size;
    let mut reader = Cursor::new(data);
    let mut records = Vec::with_capacity(count);
    for id in 0..count {
        records.push(load(&mut reader, id)?);
    }

    debug!("{} {} decoded", count, kind);

    Ok(records)
}

pub fn load_vertex<R>(reader: &mut R, _id: usize) -> Result<Vector3<f64>, BspError>
where
    R: ReadBytesExt,
{
    let position = Vector3::new(
        reader.read_f32::<LittleEndian>()? as f64,
        reader.read_f32::<LittleEndian>()? as f64,
        reader.read_f32::<LittleEndian>()? as f64,
    );

    // texture coordinates (surface and lightmap), normal
    for _ in 0..7 {
        reader.read_f32::<LittleEndian>()?;
    }

    // RGBA color
    let mut _color = [0u8; 4];
    reader.read_exact(&mut _color)?;

    Ok(position)
}

pub fn load_meshvert<R>(reader: &mut R, _id: usize) -> Result<u32, BspError>
where
    R: ReadBytesExt,
{
    Ok(reader.read_u32::<LittleEndian>()?)
}

/// A texture (shader) reference. `flags` and `contents` are passed through untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BspTexture {
    name: String,
    flags: u32,
    contents: u32,
}

impl BspTexture {
    pub fn new<S>(name: S, flags: u32, contents: u32) -> BspTexture
    where
        S: AsRef<str>,
    {
        BspTexture {
            name: name.as_ref().to_owned(),
            flags,
            contents,
        }
    }

    /// Returns the name of the texture.
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn contents(&self) -> u32 {
        self.contents
    }
}

pub fn load_texture<R>(reader: &mut R, _id: usize) -> Result<BspTexture, BspError>
where
    R: ReadBytesExt,
{
    let mut tex_name_bytes = [0u8; TEX_NAME_MAX];
    reader.read_exact(&mut tex_name_bytes)?;
    let name = util::fixed_cstring(&tex_name_bytes);

    let flags = reader.read_u32::<LittleEndian>()?;
    let contents = reader.read_u32::<LittleEndian>()?;

    Ok(BspTexture {
        name,
        flags,
        contents,
    })
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum FaceKind {
    Polygon = 1,
    Patch = 2,
    Mesh = 3,
    Billboard = 4,
}

/// A face record as stored in the faces lump.
///
/// Only the fields needed to rebuild geometry are kept; lightmap placement and the surface
/// normal are skipped over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BspFace {
    pub texture_id: u32,
    pub effect_id: u32,
    pub kind: FaceKind,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub meshvert_offset: u32,
    pub meshvert_count: u32,
    pub patch_size: [u32; 2],
}

pub fn load_face<R>(reader: &mut R, id: usize) -> Result<BspFace, BspError>
where
    R: ReadBytesExt,
{
    let texture_id = reader.read_u32::<LittleEndian>()?;
    let effect_id = reader.read_u32::<LittleEndian>()?;

    let kind_id = reader.read_u32::<LittleEndian>()?;
    let kind = match FaceKind::from_u32(kind_id) {
        Some(k) => k,
        None => {
            return Err(BspError::corrupt(
                LumpKind::Faces,
                LumpProblem::InvalidFaceKind {
                    record: id,
                    kind: kind_id,
                },
            ))
        }
    };

    let vertex_offset = reader.read_u32::<LittleEndian>()?;
    let vertex_count = reader.read_u32::<LittleEndian>()?;
    let meshvert_offset = reader.read_u32::<LittleEndian>()?;
    let meshvert_count = reader.read_u32::<LittleEndian>()?;

    // lightmap index, start and size
    for _ in 0..5 {
        reader.read_u32::<LittleEndian>()?;
    }

    // lightmap origin, lightmap s and t vectors, surface normal
    for _ in 0..12 {
        reader.read_f32::<LittleEndian>()?;
    }

    let patch_size = [
        reader.read_u32::<LittleEndian>()?,
        reader.read_u32::<LittleEndian>()?,
    ];

    Ok(BspFace {
        texture_id,
        effect_id,
        kind,
        vertex_offset,
        vertex_count,
        meshvert_offset,
        meshvert_count,
        patch_size,
    })
}
