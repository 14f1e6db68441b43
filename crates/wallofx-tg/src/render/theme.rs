use crate::prelude::*;
use image::Rgb;
use serde::Deserialize;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(from = "String")]
pub enum ThemeName {
    #[default]
    Dark,
    Dim,
    Light,
    Sepia,
    Midnight,
}

impl ThemeName {
    /// Unknown names fall back to the default theme
    pub fn parse_or_default(name: &str) -> Self {
        name.trim().parse().unwrap_or_else(|_| {
            warn!(name, fallback = %Self::default(), "Unknown theme name");
            Self::default()
        })
    }

    pub fn palette(self) -> &'static Theme {
        match self {
            Self::Dark => &DARK,
            Self::Dim => &DIM,
            Self::Light => &LIGHT,
            Self::Sepia => &SEPIA,
            Self::Midnight => &MIDNIGHT,
        }
    }
}

impl From<String> for ThemeName {
    fn from(name: String) -> Self {
        Self::parse_or_default(&name)
    }
}

#[derive(Debug)]
pub struct Theme {
    pub background: Rgb<u8>,
    pub text: Rgb<u8>,
    pub secondary: Rgb<u8>,

    /// Entities, the verified badge and the avatar placeholder
    pub accent: Rgb<u8>,

    /// Foreground drawn on top of the accent color
    pub on_accent: Rgb<u8>,
    pub divider: Rgb<u8>,
    pub icon: Rgb<u8>,
}

const TWITTER_BLUE: Rgb<u8> = Rgb([29, 155, 240]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

const DARK: Theme = Theme {
    background: Rgb([0, 0, 0]),
    text: Rgb([231, 233, 234]),
    secondary: Rgb([113, 118, 123]),
    accent: TWITTER_BLUE,
    on_accent: WHITE,
    divider: Rgb([56, 68, 77]),
    icon: Rgb([113, 118, 123]),
};

const DIM: Theme = Theme {
    background: Rgb([21, 24, 28]),
    text: Rgb([247, 249, 249]),
    secondary: Rgb([139, 152, 165]),
    accent: TWITTER_BLUE,
    on_accent: WHITE,
    divider: Rgb([56, 68, 77]),
    icon: Rgb([139, 152, 165]),
};

const LIGHT: Theme = Theme {
    background: Rgb([255, 255, 255]),
    text: Rgb([15, 20, 25]),
    secondary: Rgb([83, 100, 113]),
    accent: TWITTER_BLUE,
    on_accent: WHITE,
    divider: Rgb([180, 185, 190]),
    icon: Rgb([83, 100, 113]),
};

const SEPIA: Theme = Theme {
    background: Rgb([244, 236, 216]),
    text: Rgb([67, 52, 34]),
    secondary: Rgb([125, 107, 86]),
    accent: Rgb([178, 94, 44]),
    on_accent: Rgb([252, 248, 238]),
    divider: Rgb([215, 200, 170]),
    icon: Rgb([125, 107, 86]),
};

const MIDNIGHT: Theme = Theme {
    background: Rgb([10, 14, 39]),
    text: Rgb([230, 236, 255]),
    secondary: Rgb([134, 146, 189]),
    accent: Rgb([120, 160, 255]),
    on_accent: Rgb([10, 14, 39]),
    divider: Rgb([42, 50, 90]),
    icon: Rgb([134, 146, 189]),
};
