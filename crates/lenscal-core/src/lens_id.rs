//! Lens-identity normalization rules.
//!
//! Lens grouping is keyed by free-text metadata strings, so every
//! manufacturer quirk lives here as table data. Adding support for a
//! new maker means adding rows, not conditionals.

/// Model string used when no lens field resolves (legacy manual lens).
pub const STANDARD_LENS: &str = "Standard";

/// Maker sentinel for a maker field that exists but reads as the
/// literal `None`: the camera recorded the slot, the metadata behind it
/// was unreadable. The closing brace is load-bearing; existing
/// configuration files distinguish it from [`MAKER_UNKNOWN`].
pub const MAKER_UNREADABLE: &str = "[unknown}";

/// Maker sentinel for an image carrying no maker field at all.
pub const MAKER_UNKNOWN: &str = "[unknown]";

/// One maker-normalization rule, applied to raw lens field values.
#[derive(Debug, Clone, Copy)]
pub enum MakerRule {
    /// Any value containing `needle` normalizes to `maker`.
    Contains {
        needle: &'static str,
        maker: &'static str,
    },
}

/// Maker rewrites, applied in order; first match wins.
pub const MAKER_RULES: &[MakerRule] = &[
    MakerRule::Contains {
        needle: "Olympus Zuiko Digital",
        maker: "Olympus Zuiko Digital",
    },
    MakerRule::Contains {
        needle: "Olympus OM System",
        maker: "Olympus Zuiko OM System",
    },
];

/// One maker-to-mount mapping.
#[derive(Debug, Clone, Copy)]
pub struct MountRule {
    pub maker: &'static str,
    pub mount: &'static str,
}

/// Mounts known from the normalized maker alone.
pub const MOUNT_RULES: &[MountRule] = &[
    MountRule {
        maker: "Olympus Zuiko Digital",
        mount: "4/3 System",
    },
    MountRule {
        maker: "Olympus Zuiko OM System",
        mount: "Olympus OM",
    },
];

/// Normalize a raw maker/lens field value into a maker string.
pub fn normalize_maker(raw: &str) -> String {
    if raw == "None" {
        return MAKER_UNREADABLE.to_string();
    }
    for rule in MAKER_RULES {
        match *rule {
            MakerRule::Contains { needle, maker } => {
                if raw.contains(needle) {
                    return maker.to_string();
                }
            }
        }
    }
    raw.to_string()
}

/// Look up the mount for a normalized maker string.
///
/// An unreadable maker maps to the plain unknown sentinel; makers
/// absent from the table resolve to `None` (the operator fills the
/// mount in by hand).
pub fn mount_for_maker(maker: &str) -> Option<&'static str> {
    if maker == MAKER_UNREADABLE {
        return Some(MAKER_UNKNOWN);
    }
    MOUNT_RULES
        .iter()
        .find(|rule| rule.maker == maker)
        .map(|rule| rule.mount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maker_substring_rewrites() {
        assert_eq!(
            normalize_maker("Olympus Zuiko Digital 11-22mm F2.8-3.5"),
            "Olympus Zuiko Digital"
        );
        assert_eq!(
            normalize_maker("Olympus OM System ZUIKO Auto-S 50mm F1:1.8"),
            "Olympus Zuiko OM System"
        );
    }

    #[test]
    fn unlisted_maker_passes_through() {
        assert_eq!(normalize_maker("FE 16-35mm F2.8 GM"), "FE 16-35mm F2.8 GM");
    }

    #[test]
    fn unreadable_field_yields_brace_sentinel() {
        assert_eq!(normalize_maker("None"), MAKER_UNREADABLE);
        assert_ne!(MAKER_UNREADABLE, MAKER_UNKNOWN);
    }

    #[test]
    fn mount_table_has_two_real_entries() {
        assert_eq!(MOUNT_RULES.len(), 2);
        assert_eq!(mount_for_maker("Olympus Zuiko Digital"), Some("4/3 System"));
        assert_eq!(
            mount_for_maker("Olympus Zuiko OM System"),
            Some("Olympus OM")
        );
        assert_eq!(mount_for_maker(MAKER_UNREADABLE), Some(MAKER_UNKNOWN));
        assert_eq!(mount_for_maker("Sony E"), None);
    }
}
