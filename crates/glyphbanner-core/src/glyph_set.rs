//! # Glyph Sets
//!
//! A glyph set is a plain text file holding one 8-row block per printable
//! ASCII character, in code point order starting at the space character:
//!
//! ```text
//! row   0..8     ' '  (32)
//! row   8..16    '!'  (33)
//! ...
//! row 752..760   '~'  (126)
//! ```
//!
//! Sets are read once at startup and never change afterwards.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Number of text rows making up one glyph
pub const GLYPH_HEIGHT: usize = 8;

/// First renderable code point (space)
pub const FIRST_PRINTABLE: u32 = 32;

/// Last renderable code point (tilde)
pub const LAST_PRINTABLE: u32 = 126;

/// Number of characters covered by every glyph set
pub const GLYPH_COUNT: usize = (LAST_PRINTABLE - FIRST_PRINTABLE + 1) as usize;

/// Total number of rows in a well-formed glyph set definition
pub const GLYPH_SET_ROWS: usize = GLYPH_COUNT * GLYPH_HEIGHT;

/// Names of the bundled glyph sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphSetName {
    Standard,
    Shadow,
    Thinkertoy,
}

impl GlyphSetName {
    /// Every known glyph set, in display order
    pub const ALL: [GlyphSetName; 3] = [
        GlyphSetName::Standard,
        GlyphSetName::Shadow,
        GlyphSetName::Thinkertoy,
    ];

    /// Selector value used in forms and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            GlyphSetName::Standard => "standard",
            GlyphSetName::Shadow => "shadow",
            GlyphSetName::Thinkertoy => "thinkertoy",
        }
    }

    /// File name of the definition inside the glyph directory
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.as_str())
    }

    fn index(&self) -> usize {
        match self {
            GlyphSetName::Standard => 0,
            GlyphSetName::Shadow => 1,
            GlyphSetName::Thinkertoy => 2,
        }
    }
}

impl std::fmt::Display for GlyphSetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlyphSetName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        GlyphSetName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::UnknownGlyphSet(s.to_string()))
    }
}

/// One loaded glyph set
#[derive(Debug, Clone)]
pub struct GlyphSet {
    name: GlyphSetName,
    rows: Vec<String>,
}

impl GlyphSet {
    /// Build a glyph set from already-split rows
    pub fn from_rows(name: GlyphSetName, rows: Vec<String>) -> Result<Self> {
        if rows.len() != GLYPH_SET_ROWS {
            return Err(CoreError::GlyphSetSize {
                name: name.to_string(),
                expected: GLYPH_SET_ROWS,
                found: rows.len(),
            });
        }
        Ok(Self { name, rows })
    }

    /// Read a glyph set definition line by line
    pub fn from_reader<R: BufRead>(name: GlyphSetName, reader: R) -> Result<Self> {
        // Blank lines are blank glyph rows and must be kept
        let rows = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Self::from_rows(name, rows)
    }

    /// Read `<dir>/<name>.txt`
    pub fn load<P: AsRef<Path>>(name: GlyphSetName, dir: P) -> Result<Self> {
        let path = dir.as_ref().join(name.file_name());
        let io_error = |source| CoreError::GlyphSetIo {
            name: name.to_string(),
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(io_error)?;
        Self::from_reader(name, BufReader::new(file)).map_err(|e| match e {
            CoreError::Io(source) => io_error(source),
            other => other,
        })
    }

    pub fn name(&self) -> GlyphSetName {
        self.name
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Row `row` of the glyph for `ch`, or `None` if `ch` is not printable ASCII
    pub fn glyph_row(&self, ch: char, row: usize) -> Option<&str> {
        let code = u32::from(ch);
        if !(FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) || row >= GLYPH_HEIGHT {
            return None;
        }
        let index = (code - FIRST_PRINTABLE) as usize * GLYPH_HEIGHT + row;
        self.rows.get(index).map(String::as_str)
    }
}

/// Every known glyph set, loaded and validated
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct GlyphTables {
    // Indexed by `GlyphSetName::index`
    sets: Vec<GlyphSet>,
}

impl GlyphTables {
    /// Load all glyph sets from `dir`, failing on the first missing or malformed one
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let sets = GlyphSetName::ALL
            .into_iter()
            .map(|name| -> Result<GlyphSet> {
                let set = GlyphSet::load(name, dir)?;
                tracing::info!("Loaded glyph set '{}' ({} rows)", name, set.rows().len());
                Ok(set)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_sets(sets)
    }

    /// Assemble tables from loaded sets; every known name must be present
    pub fn from_sets(sets: impl IntoIterator<Item = GlyphSet>) -> Result<Self> {
        let mut slots: [Option<GlyphSet>; GlyphSetName::ALL.len()] = Default::default();
        for set in sets {
            let index = set.name().index();
            slots[index] = Some(set);
        }

        let sets = slots
            .into_iter()
            .zip(GlyphSetName::ALL)
            .map(|(slot, name)| slot.ok_or_else(|| CoreError::MissingGlyphSet(name.to_string())))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { sets })
    }

    /// Get a known glyph set
    pub fn get(&self, name: GlyphSetName) -> &GlyphSet {
        &self.sets[name.index()]
    }

    /// Resolve a selector string to a loaded glyph set
    pub fn lookup(&self, selector: &str) -> Result<&GlyphSet> {
        let name: GlyphSetName = selector.parse()?;
        Ok(self.get(name))
    }
}
