/// Metadata fields the resolver may ask for.
///
/// The variants name fields, not tools: where a value comes from is
/// the source's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaTag {
    LensModel,
    FocalLength,
    FNumber,
    AspectRatio,
    NikonLensId,
    PanasonicLensType,
    SonyLensId,
    MinoltaLensId,
    OlympusLensType,
}

impl MetaTag {
    /// Tag argument understood by the external metadata tool.
    pub fn exiftool_name(self) -> &'static str {
        match self {
            MetaTag::LensModel => "-EXIF:LensModel",
            MetaTag::FocalLength => "-EXIF:FocalLength",
            MetaTag::FNumber => "-EXIF:FNumber",
            MetaTag::AspectRatio => "-Olympus:AspectRatio",
            MetaTag::NikonLensId => "-Nikon:LensIDNumber",
            MetaTag::PanasonicLensType => "-Panasonic:LensType",
            MetaTag::SonyLensId => "-Sony:LensID",
            MetaTag::MinoltaLensId => "-Minolta:LensID",
            MetaTag::OlympusLensType => "-Olympus:LensType",
        }
    }
}

/// A queryable tag/value view over one image's metadata.
///
/// The resolver only ever reads through this trait, so the fallback
/// chain is testable against a plain map.
pub trait TagSource {
    fn tag(&self, tag: MetaTag) -> Option<String>;
}

impl TagSource for std::collections::HashMap<MetaTag, String> {
    fn tag(&self, tag: MetaTag) -> Option<String> {
        self.get(&tag).cloned()
    }
}
