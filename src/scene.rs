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

//! Lights and camera placement described by a map's entities.

use crate::{bsp::BspModel, entity::Entity};

use cgmath::Vector3;

// used by the map compiler when a light has no "light" key
const DEFAULT_LIGHT_INTENSITY: f64 = 300.0;

const LIGHT_CLASS: &str = "light";
const VIEW_CLASS: &str = "info_player_intermission";

/// A point light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub origin: Vector3<f64>,
    pub color: Vector3<f64>,
    pub intensity: f64,
}

impl Light {
    /// Build a light from a `light` entity. Returns `None` if the entity has no origin.
    pub fn from_entity(entity: &Entity) -> Option<Light> {
        let origin = entity.get_vector("origin")?;

        Some(Light {
            origin,
            color: entity
                .get_vector("_color")
                .unwrap_or_else(|| Vector3::new(1.0, 1.0, 1.0)),
            intensity: entity
                .get_float("light")
                .unwrap_or(DEFAULT_LIGHT_INTENSITY),
        })
    }
}

/// The intermission view: where the camera sits and what it looks at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub location: Vector3<f64>,
    pub look_at: Vector3<f64>,
}

impl BspModel {
    /// Iterate over the lights placed in the map.
    pub fn lights(&self) -> impl Iterator<Item = Light> + '_ {
        self.entities_by_class(LIGHT_CLASS)
            .filter_map(|ent| match Light::from_entity(ent) {
                Some(light) => Some(light),
                None => {
                    warn!("Skipping light entity without an origin: {:?}", ent);
                    None
                }
            })
    }

    /// Returns the intermission camera, if the map defines one.
    ///
    /// The first `info_player_intermission` entity gives the camera location, and the entity
    /// named by its `target` gives the point it looks at.
    pub fn camera(&self) -> Option<Camera> {
        let view = self.entities_by_class(VIEW_CLASS).next()?;
        let target_name = view.get_str("target")?;
        let target = self
            .entities()
            .iter()
            .find(|e| e.get_str("targetname") == Some(target_name))?;

        Some(Camera {
            location: view.get_vector("origin")?,
            look_at: target.get_vector("origin")?,
        })
    }
}
