//! Cell technology tags.
//!
//! Equipment databases and vendor exports describe the cell material as free
//! text ("Mono-c-Si", "mtSiPoly", "Thin Film", ...). Normalization maps the
//! known spellings onto seven canonical tags. Anything else becomes `None`:
//! the mapping is best-effort and never fails.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Canonical cell technology tag, serialized in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Monosi,
    Multisi,
    Polysi,
    Cis,
    Cigs,
    Cdte,
    Asi,
}

impl Technology {
    pub const ALL: &'static [Technology] = &[
        Technology::Monosi,
        Technology::Multisi,
        Technology::Polysi,
        Technology::Cis,
        Technology::Cigs,
        Technology::Cdte,
        Technology::Asi,
    ];

    /// Source spellings that normalize to this tag.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Technology::Monosi => &[
                "Mono-c-Si",
                "monoSi",
                "monosi",
                "c-Si",
                "xsi",
                "mtSiMono",
                "mono-Si",
            ],
            Technology::Multisi => &[
                "Multi-c-Si",
                "multiSi",
                "multisi",
                "mc-Si",
                "EFG mc-Si",
                "multi-Si",
            ],
            Technology::Polysi => &["polySi", "polysi", "mtSiPoly", "poly-Si"],
            Technology::Cis => &["CIS"],
            Technology::Cigs => &["CIGS"],
            Technology::Cdte => &["CdTe", "Thin Film", "GaAs"],
            Technology::Asi => &[
                "amorphous",
                "asi",
                "a-Si / mono-Si",
                "2-a-Si",
                "3-a-Si",
                "Si-Film",
                "HIT-Si",
            ],
        }
    }

    /// Canonical tag as written to the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::Monosi => "monosi",
            Technology::Multisi => "multisi",
            Technology::Polysi => "polysi",
            Technology::Cis => "cis",
            Technology::Cigs => "cigs",
            Technology::Cdte => "cdte",
            Technology::Asi => "asi",
        }
    }

    /// Map a free-text technology description onto a canonical tag.
    ///
    /// Matching ignores surrounding whitespace and ASCII case.
    pub fn normalize(raw: &str) -> Option<Technology> {
        SYNONYMS.get(lookup_key(raw).as_str()).copied()
    }
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static SYNONYMS: Lazy<HashMap<String, Technology>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for tech in Technology::ALL {
        for synonym in tech.synonyms() {
            table.insert(lookup_key(synonym), *tech);
        }
    }
    table
});

fn lookup_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_synonym_maps_to_its_tag() {
        for tech in Technology::ALL {
            for synonym in tech.synonyms() {
                assert_eq!(Technology::normalize(synonym), Some(*tech), "{synonym}");
            }
        }
    }

    #[test]
    fn test_case_and_whitespace_variants() {
        assert_eq!(Technology::normalize("  MONO-C-SI "), Some(Technology::Monosi));
        assert_eq!(Technology::normalize("cdte"), Some(Technology::Cdte));
        assert_eq!(Technology::normalize("cigs"), Some(Technology::Cigs));
        assert_eq!(Technology::normalize("Thin film"), Some(Technology::Cdte));
    }

    #[test]
    fn test_unknown_strings_are_none() {
        for raw in ["", "perovskite", "mono", "Si", "unknown", "CIS-x"] {
            assert_eq!(Technology::normalize(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_synonym_table_has_no_conflicts() {
        let mut seen: HashMap<String, Technology> = HashMap::new();
        for tech in Technology::ALL {
            for synonym in tech.synonyms() {
                if let Some(previous) = seen.insert(lookup_key(synonym), *tech) {
                    assert_eq!(previous, *tech, "{synonym} maps to two tags");
                }
            }
        }
    }

    #[test]
    fn test_serializes_lowercase_tag() {
        let json = serde_json::to_string(&Technology::Polysi).unwrap();
        assert_eq!(json, "\"polysi\"");
        assert_eq!(Technology::Asi.to_string(), "asi");
    }
}
