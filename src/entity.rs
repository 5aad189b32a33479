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

//! Typed map entities.
//!
//! Entity attributes are stored as text. A handful of well-known keys are converted to numbers
//! or vectors when the entity lump is loaded; everything else stays a string.

use std::slice::Iter;

use crate::{bsp::BspError, parse};

use cgmath::Vector3;

#[derive(Clone, Debug, PartialEq)]
pub enum EntityValue {
    String(String),
    Float(f64),
    Int(i32),
    Vector(Vector3<f64>),
}

impl EntityValue {
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            EntityValue::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            EntityValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            EntityValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3<f64>> {
        match *self {
            EntityValue::Vector(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FieldType {
    String,
    Float,
    Int,
    Vector,
}

fn field_type(key: &str) -> FieldType {
    match key {
        "origin" | "_color" => FieldType::Vector,
        "angle" | "radius" | "light" => FieldType::Float,
        "spawnflags" => FieldType::Int,
        _ => FieldType::String,
    }
}

/// Convert a raw attribute value according to the type expected for its key.
pub fn coerce(key: &str, value: &str) -> Result<EntityValue, BspError> {
    let converted = match field_type(key) {
        FieldType::String => Some(EntityValue::String(value.to_owned())),
        FieldType::Float => value.parse().ok().map(EntityValue::Float),
        FieldType::Int => value.parse().ok().map(EntityValue::Int),
        FieldType::Vector => parse::vector3(value).map(EntityValue::Vector),
    };

    converted.ok_or_else(|| BspError::EntityValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

/// A map entity: an ordered list of attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    attributes: Vec<(String, EntityValue)>,
}

impl Entity {
    pub fn new() -> Entity {
        Entity {
            attributes: Vec::new(),
        }
    }

    /// Build an entity from raw attributes, converting values as needed.
    pub fn from_raw<'a, I>(raw: I) -> Result<Entity, BspError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entity = Entity::new();
        for (key, value) in raw {
            entity.insert(key, coerce(key, value)?);
        }

        Ok(entity)
    }

    /// Set an attribute. An existing attribute with the same key keeps its position.
    pub fn insert<S>(&mut self, key: S, value: EntityValue)
    where
        S: AsRef<str>,
    {
        let key = key.as_ref();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(attr) => attr.1 = value,
            None => self.attributes.push((key.to_owned(), value)),
        }
    }

    pub fn get<S>(&self, key: S) -> Option<&EntityValue>
    where
        S: AsRef<str>,
    {
        let key = key.as_ref();
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_str<S>(&self, key: S) -> Option<&str>
    where
        S: AsRef<str>,
    {
        self.get(key).and_then(EntityValue::as_str)
    }

    pub fn get_float<S>(&self, key: S) -> Option<f64>
    where
        S: AsRef<str>,
    {
        self.get(key).and_then(EntityValue::as_float)
    }

    pub fn get_int<S>(&self, key: S) -> Option<i32>
    where
        S: AsRef<str>,
    {
        self.get(key).and_then(EntityValue::as_int)
    }

    pub fn get_vector<S>(&self, key: S) -> Option<Vector3<f64>>
    where
        S: AsRef<str>,
    {
        self.get(key).and_then(EntityValue::as_vector)
    }

    pub fn classname(&self) -> Option<&str> {
        self.get_str("classname")
    }

    /// Iterate over the attributes in the order they appear in the map.
    pub fn iter(&self) -> Iter<(String, EntityValue)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Parse the text of an entity lump into typed entities, in map order.
pub fn parse_entities<S>(src: S) -> Result<Vec<Entity>, BspError>
where
    S: AsRef<str>,
{
    parse::entities(src.as_ref())?
        .into_iter()
        .map(Entity::from_raw)
        .collect()
}
