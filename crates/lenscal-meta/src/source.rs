use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use exif::{Exif, In, Tag, Value};
use log::warn;

use crate::exiftool;
use crate::tags::{MetaTag, TagSource};

/// Production tag source for one image file.
///
/// Standard Exif fields come from the in-process reader; manufacturer
/// makernote fields go through the external metadata tool, which is
/// the only thing that can decode them.
pub struct FileTagSource {
    path: PathBuf,
    exif: Option<Exif>,
}

impl FileTagSource {
    /// Open an image's metadata. A file without readable EXIF yields a
    /// source that answers `None` for the standard fields; the
    /// resolver's defaults take it from there.
    pub fn open(path: &Path) -> Self {
        let exif = match read_exif(path) {
            Ok(exif) => Some(exif),
            Err(err) => {
                warn!("{} has no exif available ({err})", path.display());
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            exif,
        }
    }

    fn standard_field(&self, tag: Tag) -> Option<String> {
        let field = self.exif.as_ref()?.get_field(tag, In::PRIMARY)?;
        match &field.value {
            Value::Ascii(chunks) => {
                let raw = chunks.first()?;
                let text = String::from_utf8_lossy(raw);
                let text = text.trim_end_matches('\0').trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Value::Rational(values) => values.first().map(|r| r.to_f64().to_string()),
            _ => Some(field.display_value().to_string()),
        }
    }
}

impl TagSource for FileTagSource {
    fn tag(&self, tag: MetaTag) -> Option<String> {
        match tag {
            MetaTag::LensModel => self.standard_field(Tag::LensModel),
            MetaTag::FocalLength => self.standard_field(Tag::FocalLength),
            MetaTag::FNumber => self.standard_field(Tag::FNumber),
            MetaTag::AspectRatio
            | MetaTag::NikonLensId
            | MetaTag::PanasonicLensType
            | MetaTag::SonyLensId
            | MetaTag::MinoltaLensId
            | MetaTag::OlympusLensType => exiftool::query_tag(&self.path, tag),
        }
    }
}

fn read_exif(path: &Path) -> Result<Exif, exif::Error> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader)
}
