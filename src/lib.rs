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

//! Decoding of Quake 3 BSP maps into triangle geometry and typed entities.
//!
//! ```no_run
//! # extern crate q3bsp;
//! use std::fs::File;
//!
//! # fn main() {
//! let mut file = File::open("q3dm7.bsp").unwrap();
//! let map = q3bsp::bsp::load(&mut file).unwrap();
//!
//! for light in map.lights() {
//!     println!("{:?} at {:?}", light.color, light.origin);
//! }
//! # }
//! ```

#![deny(unused_must_use)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate num_derive;

pub mod bsp;
pub mod entity;
pub mod parse;
pub mod scene;
pub mod util;

pub use crate::{
    bsp::{load, load_bytes, load_with_limits, BspError, BspModel, LoadLimits, Triangle},
    entity::{Entity, EntityValue},
    scene::{Camera, Light},
};
