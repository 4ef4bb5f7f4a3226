//! World registry.
//!
//! Static category tables plus validation of user supplied world numbers.

mod format;

pub use format::*;

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::config::Config;

/// World lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("{0:?} is not a world number")]
    InvalidFormat(String),
    #[error("world {0} is not in any known category")]
    UnknownTarget(String),
}

/// Canonical world number, as used in ping host names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WorldId(pub u16);

impl WorldId {
    /// The in-game form of this world, e.g. `332`.
    pub fn display_id(self) -> String {
        to_display(self)
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", to_display(*self))
    }
}

/// Which group of worlds a category holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Members,
    FreeToPlay,
    Pvp,
}

/// A named, ordered group of worlds probed and reported together.
#[derive(Debug, Clone)]
pub struct Category {
    pub kind: CategoryKind,
    pub name: String,
    pub worlds: Vec<WorldId>,
}

impl Category {
    pub fn new(kind: CategoryKind, name: &str, worlds: &[u16]) -> Self {
        Self {
            kind,
            name: name.to_string(),
            worlds: worlds.iter().copied().map(WorldId).collect(),
        }
    }

    /// Whether the configuration asks for this category.
    pub fn enabled(&self, cfg: &Config) -> bool {
        match self.kind {
            CategoryKind::Members => cfg.show_members,
            CategoryKind::FreeToPlay => cfg.show_ftp,
            CategoryKind::Pvp => cfg.show_pvp,
        }
    }
}

const MEMBERS_WORLDS: &[u16] = &[
    2, 3, 4, 5, 6, 7, 9, //
    10, 11, 12, 13, 14, 15, 17, 18, 19, //
    20, 21, 22, 23, 24, 27, 28, 29, //
    30, 31, 32, 33, 34, 36, 38, 39, //
    40, 41, 42, 43, 44, 46, 47, 48, 49, //
    50, 51, 52, 53, 54, 55, 56, 57, 58, 59, //
    60, 61, 62, 65, 66, 67, 68, 69, //
    70, 73, 74, 75, 76, 77, 78, //
    86, 87, 88, 89, //
    90, 91, 95, 96, //
    116, 120, 121, 122,
];

const FTP_WORLDS: &[u16] = &[
    1, 8, 16, 26, 35, 81, 82, 83, 84, 85, 93, 94, 117, 118, 119, 124,
];

// Includes the worlds on the PVP / bounty hunter rota.
const PVP_WORLDS: &[u16] = &[18, 19, 24, 25, 37, 62, 71, 92];

/// Immutable set of world categories.
#[derive(Debug, Clone)]
pub struct Registry {
    categories: Vec<Category>,
}

impl Registry {
    /// The built-in world tables.
    pub fn standard() -> Self {
        Self::new(vec![
            Category::new(CategoryKind::Members, "Members' Worlds", MEMBERS_WORLDS),
            Category::new(CategoryKind::FreeToPlay, "FTP Worlds", FTP_WORLDS),
            Category::new(CategoryKind::Pvp, "PVP & BH Worlds", PVP_WORLDS),
        ])
    }

    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Categories in configured order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every world of every category.
    pub fn union(&self) -> BTreeSet<WorldId> {
        self.categories
            .iter()
            .flat_map(|c| c.worlds.iter().copied())
            .collect()
    }

    /// Resolve user input (displayed or bare number) to a known world.
    pub fn resolve(&self, raw: &str) -> Result<WorldId, WorldError> {
        if !is_digits(raw) {
            return Err(WorldError::InvalidFormat(raw.to_string()));
        }

        let world = if looks_displayed(raw) {
            to_canonical(raw)?
        } else {
            raw.parse::<u16>()
                .map(WorldId)
                .map_err(|_| WorldError::InvalidFormat(raw.to_string()))?
        };

        if !self.union().contains(&world) {
            return Err(WorldError::UnknownTarget(raw.to_string()));
        }

        Ok(world)
    }

    pub fn is_valid(&self, raw: &str) -> bool {
        self.resolve(raw).is_ok()
    }
}
