//! Bike colours and the named palette

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::GameError;

/// 24-bit RGB colour shared by a bike and its trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const STEEL_BLUE: Colour = Colour::rgb(0x46, 0x82, 0xb4);
    pub const FIREBRICK: Colour = Colour::rgb(0xb2, 0x22, 0x22);
    pub const DEEP_PINK: Colour = Colour::rgb(0xff, 0x14, 0x93);
    pub const MOCCASIN: Colour = Colour::rgb(0xff, 0xe4, 0xb5);
    pub const PERU: Colour = Colour::rgb(0xcd, 0x85, 0x3f);
    pub const YELLOW: Colour = Colour::rgb(0xff, 0xff, 0x00);
    pub const SEA_GREEN: Colour = Colour::rgb(0x2e, 0x8b, 0x57);
    pub const AQUA: Colour = Colour::rgb(0x00, 0xff, 0xff);
    pub const INDIAN_RED: Colour = Colour::rgb(0xcd, 0x5c, 0x5c);
    pub const NAVAJO_WHITE: Colour = Colour::rgb(0xff, 0xde, 0xad);
}

/// Colours handed out to CPU bikes in demo rounds and to extra seats
pub const PALETTE: [Colour; 8] = [
    Colour::STEEL_BLUE,
    Colour::FIREBRICK,
    Colour::DEEP_PINK,
    Colour::MOCCASIN,
    Colour::PERU,
    Colour::YELLOW,
    Colour::SEA_GREEN,
    Colour::AQUA,
];

const NAMED: [(&str, Colour); 10] = [
    ("steel_blue", Colour::STEEL_BLUE),
    ("firebrick", Colour::FIREBRICK),
    ("deep_pink", Colour::DEEP_PINK),
    ("moccasin", Colour::MOCCASIN),
    ("peru", Colour::PERU),
    ("yellow", Colour::YELLOW),
    ("sea_green", Colour::SEA_GREEN),
    ("aqua", Colour::AQUA),
    ("indian_red", Colour::INDIAN_RED),
    ("navajo_white", Colour::NAVAJO_WHITE),
];

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Colour {
    type Err = GameError;

    /// Accepts a palette name (`steel_blue`, `SteelBlue`) or `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() == 6 && hex.is_ascii() {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                if let (Ok(r), Ok(g), Ok(b)) = (channel(0), channel(2), channel(4)) {
                    return Ok(Colour::rgb(r, g, b));
                }
            }
            return Err(GameError::UnknownColour(trimmed.to_string()));
        }

        let wanted: String = trimmed
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        NAMED
            .iter()
            .find(|(name, _)| name.replace('_', "") == wanted)
            .map(|(_, colour)| *colour)
            .ok_or_else(|| GameError::UnknownColour(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_in_either_case_style() {
        assert_eq!("steel_blue".parse::<Colour>().unwrap(), Colour::STEEL_BLUE);
        assert_eq!("SeaGreen".parse::<Colour>().unwrap(), Colour::SEA_GREEN);
        assert_eq!(" aqua ".parse::<Colour>().unwrap(), Colour::AQUA);
    }

    #[test]
    fn parses_hex() {
        assert_eq!("#4682b4".parse::<Colour>().unwrap(), Colour::STEEL_BLUE);
        assert_eq!(Colour::FIREBRICK.to_string(), "#b22222");
    }

    #[test]
    fn rejects_unknown_colours() {
        assert!("mauve".parse::<Colour>().is_err());
        assert!("#12345".parse::<Colour>().is_err());
        assert!("#zzzzzz".parse::<Colour>().is_err());
    }

    #[test]
    fn palette_is_distinct() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
