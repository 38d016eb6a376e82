use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq)]
pub struct FormatError;

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized output format identifier")
    }
}

impl std::error::Error for FormatError {}

/// Still image output formats, named by Blender's `file_format` identifiers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Format {
    Bmp,
    Iris,
    #[default]
    Png,
    Jpeg,
    Jpeg2000,
    Targa,
    TargaRaw,
    OpenExr,
    Hdr,
    Tiff,
    Webp,
}

impl Format {
    pub fn identifier(&self) -> &'static str {
        match self {
            Format::Bmp => "BMP",
            Format::Iris => "IRIS",
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Jpeg2000 => "JPEG2000",
            Format::Targa => "TARGA",
            Format::TargaRaw => "TARGA_RAW",
            Format::OpenExr => "OPEN_EXR",
            Format::Hdr => "HDR",
            Format::Tiff => "TIFF",
            Format::Webp => "WEBP",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BMP" => Ok(Format::Bmp),
            "IRIS" => Ok(Format::Iris),
            "PNG" => Ok(Format::Png),
            "JPEG" => Ok(Format::Jpeg),
            "JPEG2000" => Ok(Format::Jpeg2000),
            "TARGA" => Ok(Format::Targa),
            "TARGA_RAW" => Ok(Format::TargaRaw),
            "OPEN_EXR" => Ok(Format::OpenExr),
            "HDR" => Ok(Format::Hdr),
            "TIFF" => Ok(Format::Tiff),
            "WEBP" => Ok(Format::Webp),
            _ => Err(FormatError),
        }
    }
}

/// Movie output formats. Blender exposes these under different identifiers
/// than the image formats, hence the separate enum.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum MovieFormat {
    #[default]
    AviJpeg,
    AviRaw,
    Ffmpeg,
}

impl MovieFormat {
    pub fn identifier(&self) -> &'static str {
        match self {
            MovieFormat::AviJpeg => "AVI_JPEG",
            MovieFormat::AviRaw => "AVI_RAW",
            MovieFormat::Ffmpeg => "FFMPEG",
        }
    }
}

impl fmt::Display for MovieFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for MovieFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVI_JPEG" => Ok(MovieFormat::AviJpeg),
            "AVI_RAW" => Ok(MovieFormat::AviRaw),
            "FFMPEG" => Ok(MovieFormat::Ffmpeg),
            _ => Err(FormatError),
        }
    }
}

/// Output format tagged by render mode. A queue entry renders either a still
/// image or a movie, never both.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Output {
    Image(Format),
    Movie(MovieFormat),
}

impl Default for Output {
    fn default() -> Self {
        Output::Image(Format::default())
    }
}

impl Output {
    pub fn is_movie(&self) -> bool {
        matches!(self, Output::Movie(_))
    }

    pub fn identifier(&self) -> &'static str {
        match self {
            Output::Image(format) => format.identifier(),
            Output::Movie(format) => format.identifier(),
        }
    }
}

impl Serialize for Output {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.identifier())
    }
}

impl<'de> Deserialize<'de> for Output {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ident = String::deserialize(deserializer)?;
        if let Ok(movie) = MovieFormat::from_str(&ident) {
            return Ok(Output::Movie(movie));
        }
        Format::from_str(&ident)
            .map(Output::Image)
            .map_err(|_| serde::de::Error::custom(format!("unknown output format: {ident}")))
    }
}
