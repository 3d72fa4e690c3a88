//! Binary PGM (`P5`) decoding.
//!
//! The header is a magic token, width, height and maximum sample
//! value, separated by whitespace; `#` comment lines may sit between
//! any two fields. The maximum value selects the sample width: up to
//! 255 is one byte, up to 65535 two bytes, and the sentinel 4294967295
//! marks 32-bit floats. Samples are big-endian.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgmError {
    #[error("not a binary PGM (bad magic)")]
    BadMagic,
    #[error("not a binary PGM (truncated or malformed header)")]
    BadHeader,
    #[error("invalid {field} in PGM header")]
    BadField { field: &'static str },
    #[error("unsupported PGM max value {0}")]
    UnsupportedMaxValue(u64),
    #[error("PGM sample data truncated (expected {expected} bytes, got {got})")]
    Truncated { expected: usize, got: usize },
}

/// Storage width of the decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    F32,
}

impl SampleFormat {
    fn from_max_value(max: u64) -> Option<Self> {
        match max {
            255 => Some(SampleFormat::U8),
            65535 => Some(SampleFormat::U16),
            4294967295 => Some(SampleFormat::F32),
            _ => None,
        }
    }

    /// The header max-value this format round-trips to.
    pub fn max_value(self) -> u64 {
        match self {
            SampleFormat::U8 => 255,
            SampleFormat::U16 => 65535,
            SampleFormat::F32 => 4294967295,
        }
    }

    fn sample_bytes(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
            SampleFormat::F32 => 4,
        }
    }
}

/// A decoded grayscale raster, row-major.
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub format: SampleFormat,
    samples: Vec<f32>,
}

impl Raster {
    /// Build a raster from raw samples; the length must be `width * height`.
    pub fn from_samples(
        width: usize,
        height: usize,
        format: SampleFormat,
        samples: Vec<f32>,
    ) -> Option<Self> {
        if samples.len() != width.checked_mul(height)? {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            samples,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.samples[y * self.width + x]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn skip_space_and_comments(&mut self) {
        loop {
            while self.pos < self.buf.len() && self.buf[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos < self.buf.len() && self.buf[self.pos] == b'#' {
                while self.pos < self.buf.len() && self.buf[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else {
                return;
            }
        }
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        self.skip_space_and_comments();
        let buf = self.buf;
        let start = self.pos;
        while self.pos < buf.len() && !buf[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let end = self.pos;
        (end > start).then(|| &buf[start..end])
    }

    fn number(&mut self, field: &'static str) -> Result<u64, PgmError> {
        let token = self.token().ok_or(PgmError::BadHeader)?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(PgmError::BadField { field })
    }

    /// Consume the single whitespace byte that terminates the header,
    /// tolerating comment lines squeezed in before the sample data.
    fn end_of_header(&mut self) -> Result<(), PgmError> {
        if self.pos >= self.buf.len() || !self.buf[self.pos].is_ascii_whitespace() {
            return Err(PgmError::BadHeader);
        }
        self.pos += 1;
        while self.pos < self.buf.len() && self.buf[self.pos] == b'#' {
            while self.pos < self.buf.len() && self.buf[self.pos] != b'\n' {
                self.pos += 1;
            }
            if self.pos < self.buf.len() {
                self.pos += 1;
            }
        }
        Ok(())
    }
}

/// Decode a binary PGM buffer.
pub fn decode(buf: &[u8]) -> Result<Raster, PgmError> {
    let mut cursor = Cursor { buf, pos: 0 };

    let magic = cursor.token().ok_or(PgmError::BadHeader)?;
    if magic != b"P5" {
        return Err(PgmError::BadMagic);
    }

    let width = cursor.number("width")? as usize;
    let height = cursor.number("height")? as usize;
    let max_value = cursor.number("max value")?;
    let format =
        SampleFormat::from_max_value(max_value).ok_or(PgmError::UnsupportedMaxValue(max_value))?;
    cursor.end_of_header()?;

    let count = width
        .checked_mul(height)
        .ok_or(PgmError::BadField { field: "width" })?;
    let expected = count * format.sample_bytes();
    let data = &buf[cursor.pos..];
    if data.len() < expected {
        return Err(PgmError::Truncated {
            expected,
            got: data.len(),
        });
    }

    let samples = match format {
        SampleFormat::U8 => data[..expected].iter().map(|&b| b as f32).collect(),
        SampleFormat::U16 => data[..expected]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]) as f32)
            .collect(),
        SampleFormat::F32 => data[..expected]
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    };

    Ok(Raster {
        width,
        height,
        format,
        samples,
    })
}

/// Encode a raster back into binary PGM bytes.
pub fn encode(raster: &Raster) -> Vec<u8> {
    let header = format!(
        "P5\n{} {}\n{}\n",
        raster.width,
        raster.height,
        raster.format.max_value()
    );
    let mut out = header.into_bytes();
    match raster.format {
        SampleFormat::U8 => {
            out.extend(raster.samples.iter().map(|&v| v.round() as u8));
        }
        SampleFormat::U16 => {
            for &v in &raster.samples {
                out.extend_from_slice(&(v.round() as u16).to_be_bytes());
            }
        }
        SampleFormat::F32 => {
            for &v in &raster.samples {
                out.extend_from_slice(&v.to_be_bytes());
            }
        }
    }
    out
}
