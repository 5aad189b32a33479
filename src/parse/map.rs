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

use crate::{
    bsp::BspError,
    parse::{non_newline_spaces, quoted},
};

use nom::{combinator::all_consuming, sequence::separated_pair};

const EXPECTED_OPEN: &str = "expected opening brace";
const EXPECTED_PAIR: &str = "expected key/value pair";

// "name" "value"
pub fn entity_attribute(input: &str) -> nom::IResult<&str, (&str, &str)> {
    all_consuming(separated_pair(quoted, non_newline_spaces, quoted))(input)
}

fn syntax_error(line: usize, text: &str, expected: &'static str) -> BspError {
    BspError::EntitySyntax {
        line,
        text: text.to_owned(),
        expected,
    }
}

// A repeated key replaces the earlier value but keeps its position.
fn insert<'a>(attrs: &mut Vec<(&'a str, &'a str)>, key: &'a str, value: &'a str) {
    match attrs.iter_mut().find(|(k, _)| *k == key) {
        Some(attr) => attr.1 = value,
        None => attrs.push((key, value)),
    }
}

/// Split entity text into blocks of raw key/value pairs.
///
/// ```text
/// {
/// "name1" "value1"
/// "name2" "value2"
/// }
/// ```
///
/// Lines are trimmed and blank lines are ignored anywhere. Line numbers in errors start at 1; an
/// unterminated block is reported on the line after the last one.
pub fn entities(input: &str) -> Result<Vec<Vec<(&str, &str)>>, BspError> {
    let mut entities = Vec::new();
    let mut current: Option<Vec<(&str, &str)>> = None;
    let mut line_count = 0;

    for (n, line) in input.lines().enumerate() {
        let line_num = n + 1;
        line_count = line_num;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        current = match current.take() {
            None if line == "{" => Some(Vec::new()),
            None => return Err(syntax_error(line_num, line, EXPECTED_OPEN)),

            Some(attrs) if line == "}" => {
                entities.push(attrs);
                None
            }

            Some(mut attrs) => match entity_attribute(line) {
                Ok((_, (key, value))) => {
                    insert(&mut attrs, key, value);
                    Some(attrs)
                }
                Err(_) => return Err(syntax_error(line_num, line, EXPECTED_PAIR)),
            },
        };
    }

    if current.is_some() {
        return Err(syntax_error(line_count + 1, "", EXPECTED_PAIR));
    }

    Ok(entities)
}
