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

pub mod map;

use cgmath::Vector3;
use nom::{
    bytes::complete::{tag, take_while},
    character::complete::space1,
    sequence::delimited,
};

pub use self::map::entities;

pub fn non_newline_spaces(input: &str) -> nom::IResult<&str, &str> {
    space1(input)
}

fn string_contents(input: &str) -> nom::IResult<&str, &str> {
    take_while(|c: char| c != '"')(input)
}

/// A double-quoted string. The contents may be empty but may not contain a quote.
pub fn quoted(input: &str) -> nom::IResult<&str, &str> {
    delimited(tag("\""), string_contents, tag("\""))(input)
}

/// Parse three numbers separated by single spaces, e.g. `"128 -64 24.5"`.
pub fn vector3<S>(src: S) -> Option<Vector3<f64>>
where
    S: AsRef<str>,
{
    let src = src.as_ref();

    let components: Vec<_> = src.split(' ').collect();
    if components.len() != 3 {
        return None;
    }

    let x: f64 = components[0].parse().ok()?;
    let y: f64 = components[1].parse().ok()?;
    let z: f64 = components[2].parse().ok()?;

    Some(Vector3::new(x, y, z))
}
