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

use std::io::Cursor;

use q3bsp::{
    bsp::{self, BspError, FaceProblem, LumpKind, LumpProblem},
    EntityValue, LoadLimits,
};

use byteorder::{LittleEndian, WriteBytesExt};
use cgmath::Vector3;

const LUMP_COUNT: usize = 17;
const HEADER_SIZE: usize = 8 + LUMP_COUNT * 8;

const POLYGON: u32 = 1;
const PATCH: u32 = 2;
const MESH: u32 = 3;
const BILLBOARD: u32 = 4;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct TestFace {
    kind: u32,
    vertex_offset: u32,
    vertex_count: u32,
    meshvert_offset: u32,
    meshvert_count: u32,
    patch_size: [u32; 2],
}

impl TestFace {
    fn mesh(
        kind: u32,
        vertex_offset: u32,
        vertex_count: u32,
        meshvert_offset: u32,
        meshvert_count: u32,
    ) -> TestFace {
        TestFace {
            kind,
            vertex_offset,
            vertex_count,
            meshvert_offset,
            meshvert_count,
            patch_size: [0, 0],
        }
    }

    fn patch(vertex_offset: u32, width: u32, height: u32) -> TestFace {
        TestFace {
            kind: PATCH,
            vertex_offset,
            vertex_count: width * height,
            meshvert_offset: 0,
            meshvert_count: 0,
            patch_size: [width, height],
        }
    }
}

/// Builds BSP images in memory.
#[derive(Default)]
struct MapBuilder {
    entities: String,
    textures: Vec<(String, u32, u32)>,
    vertices: Vec<[f32; 3]>,
    meshverts: Vec<u32>,
    faces: Vec<TestFace>,
}

impl MapBuilder {
    fn lumps(&self) -> Vec<Vec<u8>> {
        let mut lumps = vec![Vec::new(); LUMP_COUNT];

        let mut ents = self.entities.clone().into_bytes();
        ents.push(0);
        lumps[LumpKind::Entities as usize] = ents;

        let tex = &mut lumps[LumpKind::Textures as usize];
        for (name, flags, contents) in &self.textures {
            let mut name_bytes = name.clone().into_bytes();
            name_bytes.resize(64, 0);
            tex.extend_from_slice(&name_bytes);
            tex.write_u32::<LittleEndian>(*flags).unwrap();
            tex.write_u32::<LittleEndian>(*contents).unwrap();
        }

        let verts = &mut lumps[LumpKind::Vertices as usize];
        for v in &self.vertices {
            for c in v {
                verts.write_f32::<LittleEndian>(*c).unwrap();
            }
            for _ in 0..7 {
                verts.write_f32::<LittleEndian>(0.25).unwrap();
            }
            verts.extend_from_slice(&[0xff, 0xff, 0xff, 0xff]);
        }

        let meshverts = &mut lumps[LumpKind::MeshVerts as usize];
        for mv in &self.meshverts {
            meshverts.write_u32::<LittleEndian>(*mv).unwrap();
        }

        let faces = &mut lumps[LumpKind::Faces as usize];
        for f in &self.faces {
            for v in &[
                0,
                0,
                f.kind,
                f.vertex_offset,
                f.vertex_count,
                f.meshvert_offset,
                f.meshvert_count,
                0,
                0,
                0,
                0,
                0,
            ] {
                faces.write_u32::<LittleEndian>(*v).unwrap();
            }
            for _ in 0..12 {
                faces.write_f32::<LittleEndian>(0.0).unwrap();
            }
            faces.write_u32::<LittleEndian>(f.patch_size[0]).unwrap();
            faces.write_u32::<LittleEndian>(f.patch_size[1]).unwrap();
        }

        // a lump this crate never decodes
        lumps[LumpKind::Planes as usize] = vec![0xaa; 20];

        lumps
    }

    fn build(&self) -> Vec<u8> {
        assemble(&self.lumps())
    }
}

fn assemble(lumps: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"IBSP");
    data.write_u32::<LittleEndian>(46).unwrap();

    let mut offset = HEADER_SIZE;
    for lump in lumps {
        data.write_u32::<LittleEndian>(offset as u32).unwrap();
        data.write_u32::<LittleEndian>(lump.len() as u32).unwrap();
        offset += lump.len();
    }

    for lump in lumps {
        data.extend_from_slice(lump);
    }

    data
}

fn square() -> Vec<[f32; 3]> {
    vec![
        [0.0, 0.0, 0.0],
        [64.0, 0.0, 0.0],
        [64.0, 64.0, 0.0],
        [0.0, 64.0, 0.0],
    ]
}

fn v(p: [f32; 3]) -> Vector3<f64> {
    Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

#[test]
fn test_mesh_face() {
    init();

    let map = MapBuilder {
        vertices: square(),
        meshverts: vec![0, 1, 2],
        faces: vec![TestFace::mesh(MESH, 0, 4, 0, 3)],
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();
    assert_eq!(model.vertices().len(), 4);
    assert_eq!(model.triangles().len(), 1);

    let tri = &model.triangles()[0];
    assert_eq!(tri.vertices(), &[v(square()[0]), v(square()[1]), v(square()[2])]);
    assert_eq!(tri.face_id(), 0);
}

#[test]
fn test_patch_face() {
    init();

    let grid: Vec<[f32; 3]> = (0..6)
        .map(|n| [(n % 3) as f32 * 32.0, (n / 3) as f32 * 32.0, 8.0])
        .collect();
    let map = MapBuilder {
        vertices: grid.clone(),
        faces: vec![TestFace::patch(0, 3, 2)],
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();
    let p = |i: usize, j: usize| v(grid[i + j * 3]);
    let tris: Vec<_> = model.triangles().iter().map(|t| *t.vertices()).collect();
    assert_eq!(
        tris,
        vec![
            [p(0, 0), p(1, 0), p(1, 1)],
            [p(0, 0), p(1, 1), p(0, 1)],
            [p(1, 0), p(2, 0), p(2, 1)],
            [p(1, 0), p(2, 1), p(1, 1)],
        ]
    );
}

#[test]
fn test_face_order() {
    init();

    let mut vertices = square();
    vertices.extend(square());
    let map = MapBuilder {
        vertices,
        meshverts: vec![0, 1, 2, 0, 2, 3],
        faces: vec![
            TestFace::mesh(POLYGON, 0, 4, 0, 6),
            TestFace::mesh(BILLBOARD, 0, 0, 0, 0),
            TestFace::patch(4, 2, 2),
        ],
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();
    let face_ids: Vec<_> = model.triangles().iter().map(|t| t.face_id()).collect();
    assert_eq!(face_ids, vec![0, 0, 2, 2]);
}

#[test]
fn test_billboard_only() {
    init();

    let map = MapBuilder {
        vertices: square(),
        faces: vec![TestFace::mesh(BILLBOARD, 0, 4, 0, 0)],
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();
    assert!(model.triangles().is_empty());
}

#[test]
fn test_textures_and_entities() {
    init();

    let map = MapBuilder {
        entities: concat!(
            "{\n",
            "\"classname\" \"worldspawn\"\n",
            "}\n",
            "\n",
            "{\n",
            "\"classname\" \"light\"\n",
            "\"origin\" \"1 2 3\"\n",
            "\"light\" \"200\"\n",
            "}\n",
        )
        .to_owned(),
        textures: vec![
            ("textures/foo".to_owned(), 0, 1),
            ("textures/base_wall/concrete".to_owned(), 0x10, 0x2000_0001),
        ],
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();

    let names: Vec<_> = model.textures().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["textures/foo", "textures/base_wall/concrete"]);
    assert_eq!(model.textures()[1].flags(), 0x10);
    assert_eq!(model.textures()[1].contents(), 0x2000_0001);

    assert_eq!(model.entities().len(), 2);
    let light = &model.entities()[1];
    assert_eq!(light.classname(), Some("light"));
    assert_eq!(
        light.get("origin"),
        Some(&EntityValue::Vector(Vector3::new(1.0, 2.0, 3.0)))
    );
    assert_eq!(light.get("light"), Some(&EntityValue::Float(200.0)));

    let lights: Vec<_> = model.lights().collect();
    assert_eq!(lights.len(), 1);
    assert_eq!(lights[0].intensity, 200.0);
}

#[test]
fn test_camera() {
    init();

    let map = MapBuilder {
        entities: concat!(
            "{\n\"classname\" \"info_player_intermission\"\n\"origin\" \"0 0 128\"\n\"target\" \"t1\"\n}\n",
            "{\n\"classname\" \"target_position\"\n\"targetname\" \"t1\"\n\"origin\" \"256 0 0\"\n}\n",
        )
        .to_owned(),
        ..Default::default()
    };

    let model = bsp::load_bytes(&map.build()).unwrap();
    let camera = model.camera().unwrap();
    assert_eq!(camera.location, Vector3::new(0.0, 0.0, 128.0));
    assert_eq!(camera.look_at, Vector3::new(256.0, 0.0, 0.0));
}

#[test]
fn test_no_camera() {
    let model = bsp::load_bytes(&MapBuilder::default().build()).unwrap();
    assert_eq!(model.camera(), None);
}

#[test]
fn test_bad_lump_lengths() {
    init();

    let map = MapBuilder {
        textures: vec![("textures/foo".to_owned(), 0, 0)],
        vertices: square(),
        meshverts: vec![0, 1, 2],
        faces: vec![TestFace::mesh(MESH, 0, 4, 0, 3)],
        ..Default::default()
    };

    for &(kind, record_size) in &[
        (LumpKind::Textures, 72),
        (LumpKind::Vertices, 44),
        (LumpKind::MeshVerts, 4),
        (LumpKind::Faces, 104),
    ] {
        let mut lumps = map.lumps();
        lumps[kind as usize].push(0);
        let expected_len = lumps[kind as usize].len();

        match bsp::load_bytes(&assemble(&lumps)) {
            Err(BspError::CorruptLump {
                lump,
                problem: LumpProblem::BadLength { length, record_size: r },
            }) => {
                assert_eq!(lump, kind);
                assert_eq!(length, expected_len);
                assert_eq!(r, record_size);
            }
            other => panic!("{}: expected bad length, got {:?}", kind, other),
        }
    }
}

#[test]
fn test_malformed_mesh() {
    let map = MapBuilder {
        vertices: square(),
        meshverts: vec![0, 1, 2, 3],
        faces: vec![TestFace::mesh(MESH, 0, 4, 0, 4)],
        ..Default::default()
    };

    match bsp::load_bytes(&map.build()) {
        Err(BspError::MalformedFace {
            face: 0,
            problem: FaceProblem::MeshVertCount,
        }) => (),
        other => panic!("expected malformed face, got {:?}", other),
    }
}

#[test]
fn test_patch_size_mismatch() {
    let mut face = TestFace::patch(0, 2, 2);
    face.vertex_count = 3;
    let map = MapBuilder {
        vertices: square(),
        faces: vec![face],
        ..Default::default()
    };

    match bsp::load_bytes(&map.build()) {
        Err(BspError::MalformedFace {
            face: 0,
            problem: FaceProblem::PatchGridSize,
        }) => (),
        other => panic!("expected patch size mismatch, got {:?}", other),
    }
}

#[test]
fn test_meshvert_out_of_range() {
    let map = MapBuilder {
        vertices: square(),
        meshverts: vec![0, 1, 7],
        faces: vec![TestFace::mesh(MESH, 0, 4, 0, 3)],
        ..Default::default()
    };

    match bsp::load_bytes(&map.build()) {
        Err(BspError::CorruptLump {
            lump: LumpKind::MeshVerts,
            problem: LumpProblem::IndexOutOfRange { index: 7, .. },
        }) => (),
        other => panic!("expected out of range meshvert, got {:?}", other),
    }
}

#[test]
fn test_unterminated_entity() {
    let map = MapBuilder {
        entities: "{\n\"classname\" \"worldspawn\"\n".to_owned(),
        ..Default::default()
    };

    match bsp::load_bytes(&map.build()) {
        Err(BspError::EntitySyntax { .. }) => (),
        other => panic!("expected entity syntax error, got {:?}", other),
    }
}

#[test]
fn test_truncated_header() {
    let data = MapBuilder::default().build();
    match bsp::load_bytes(&data[..HEADER_SIZE - 4]) {
        Err(BspError::Format(_)) => (),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn test_lump_past_end() {
    let map = MapBuilder {
        vertices: square(),
        ..Default::default()
    };
    let data = map.build();

    // chop off the end of the file, which holds the vertex lump among others
    match bsp::load_bytes(&data[..data.len() - 50]) {
        Err(BspError::CorruptLump {
            problem: LumpProblem::Truncated { .. },
            ..
        }) => (),
        other => panic!("expected truncated lump, got {:?}", other),
    }
}

#[test]
fn test_limits() {
    let map = MapBuilder {
        vertices: square(),
        ..Default::default()
    };
    let limits = LoadLimits {
        max_vertices: 3,
        ..LoadLimits::default()
    };

    match bsp::load_with_limits(&mut Cursor::new(map.build()), &limits) {
        Err(BspError::CorruptLump {
            lump: LumpKind::Vertices,
            problem: LumpProblem::TooManyRecords { count: 4, max: 3 },
        }) => (),
        other => panic!("expected record limit error, got {:?}", other),
    }

    let unlimited = LoadLimits::unlimited();
    assert!(bsp::load_with_limits(&mut Cursor::new(map.build()), &unlimited).is_ok());
}

#[test]
fn test_more_textures_than_q3map_allows() {
    init();

    let map = MapBuilder {
        textures: (0..1100)
            .map(|t| (format!("textures/gen/{}", t), 0, 0))
            .collect(),
        ..Default::default()
    };
    let data = map.build();

    let model = bsp::load_bytes(&data).unwrap();
    assert_eq!(model.textures().len(), 1100);
    assert_eq!(model.textures()[1099].name(), "textures/gen/1099");

    match bsp::load_with_limits(&mut Cursor::new(&data[..]), &LoadLimits::q3map()) {
        Err(BspError::CorruptLump {
            lump: LumpKind::Textures,
            problem: LumpProblem::TooManyRecords { count: 1100, max: 1024 },
        }) => (),
        other => panic!("expected record limit error, got {:?}", other),
    }
}

#[test]
fn test_lump_length_far_past_end() {
    init();

    let mut data = MapBuilder::default().build();
    // claim about 1.2 GB of textures in a file of a few hundred bytes
    let entry = 8 + LumpKind::Textures as usize * 8 + 4;
    (&mut data[entry..entry + 4])
        .write_u32::<LittleEndian>(72 << 24)
        .unwrap();

    match bsp::load_bytes(&data) {
        Err(BspError::CorruptLump {
            lump: LumpKind::Textures,
            problem: LumpProblem::Truncated { .. },
        }) => (),
        other => panic!("expected truncated lump, got {:?}", other),
    }
}

#[test]
fn test_load_is_repeatable() {
    let map = MapBuilder {
        entities: "{\n\"classname\" \"light\"\n\"origin\" \"1 2 3\"\n}\n".to_owned(),
        textures: vec![("textures/foo".to_owned(), 0, 0)],
        vertices: square(),
        meshverts: vec![0, 1, 2, 0, 2, 3],
        faces: vec![TestFace::mesh(POLYGON, 0, 4, 0, 6), TestFace::patch(0, 2, 2)],
    };
    let data = map.build();

    let first = bsp::load(&mut Cursor::new(&data[..])).unwrap();
    let second = bsp::load(&mut Cursor::new(&data[..])).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.triangles().len(), 4);
}
