//! The canonical section names and their line-terminator rules.

use std::fmt;

use super::Table;

/// Key/value lines of one section, in file order.
pub type Section = Table<Vec<String>>;

/// Sections of a flat configuration (or of one split sub-configuration).
pub type Sections = Table<Section>;

/// The three section names the external toolchain understands.
///
/// They double as the discriminator between flat and split configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalSection {
    ProjectFiles,
    Groups,
    Others,
}

/// When a key/value line gets a trailing `;` after its last value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// Every line of the section.
    Always,
    /// Only the final line of the section, and only when the caller sets the
    /// append flag for the section.
    WhenFlagged,
    Never,
}

impl CanonicalSection {
    pub const ALL: [CanonicalSection; 3] = [
        CanonicalSection::ProjectFiles,
        CanonicalSection::Groups,
        CanonicalSection::Others,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CanonicalSection::ProjectFiles => "ProjectFiles",
            CanonicalSection::Groups => "Groups",
            CanonicalSection::Others => "Others",
        }
    }

    /// Exact, case-sensitive match on the section name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.name() == name)
    }

    pub fn is_canonical(name: &str) -> bool {
        Self::from_name(name).is_some()
    }

    /// Terminator policy for this section.
    pub fn terminator(self) -> Terminator {
        match self {
            CanonicalSection::ProjectFiles => Terminator::WhenFlagged,
            CanonicalSection::Groups | CanonicalSection::Others => Terminator::Always,
        }
    }
}

/// Terminator policy for an arbitrary section name. Names outside the
/// canonical set never get a trailing `;`.
pub fn terminator_for(name: &str) -> Terminator {
    CanonicalSection::from_name(name)
        .map(CanonicalSection::terminator)
        .unwrap_or(Terminator::Never)
}

impl fmt::Display for CanonicalSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
