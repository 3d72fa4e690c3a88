//! Core types and utilities shared across the `lenscal-*` workspace.
//!
//! This crate is intentionally small and free of any I/O. It holds the
//! per-image sample and calibration-entry types, the lens-identity
//! normalization rules, and the numeric-key helpers used everywhere a
//! focal length, aperture or distance appears as a map key.

mod lens_id;
mod logger;
mod num;
mod sample;

pub use lens_id::{
    mount_for_maker, normalize_maker, MakerRule, MountRule, MAKER_RULES, MAKER_UNKNOWN,
    MAKER_UNREADABLE, MOUNT_RULES, STANDARD_LENS,
};
pub use logger::init_logger;
pub use num::{format_float, format_focal, numeric_sorted};
pub use sample::{ExifSample, TcaEntry, VignettingEntry};
