use std::fmt;

use serde::{Deserialize, Serialize};
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::take_while;

use crate::error::Error;

/// An SVG paint value that is safe to drop into an attribute verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        color
            .parse(trimmed)
            .map(|value| Color(value.to_string()))
            .map_err(|_| Error::InvalidColor(input.to_string()))
    }

    pub(crate) fn builtin(value: &str) -> Self {
        Color(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

fn color<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    alt((hex_color, named_color.void())).take().parse_next(input)
}

fn hex_color(input: &mut &str) -> winnow::Result<()> {
    '#'.parse_next(input)?;
    alt((
        take_while(6, |c: char| c.is_ascii_hexdigit()),
        take_while(3, |c: char| c.is_ascii_hexdigit()),
    ))
    .void()
    .parse_next(input)
}

fn named_color<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| c.is_ascii_lowercase()).parse_next(input)
}
