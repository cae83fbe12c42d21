//! Texture entry deduplication.
//!
//! Collapses (diffuse texture, tint) observations from consumer surfaces into
//! an ordered, duplicate-free list of [`CombinedEntry`]. The position of an
//! entry in that list is its atlas cell index; the compositor and the UV
//! remapper both address cells through it, so insertion order is load-bearing.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;

use crate::error::PackWarning;
use crate::source::{ImageData, SourceImage};
use crate::types::{quantize_tint, ColorSpace, FLAT_NORMAL_PIXEL, NEUTRAL_TINT, WHITE_PIXEL};

/// Reserved identity of the canonical white substitute.
pub const CANONICAL_WHITE_ID: u64 = u64::MAX;

/// Reserved identity of the canonical flat-normal substitute.
pub const CANONICAL_NORMAL_ID: u64 = u64::MAX - 1;

/// Canonical 1x1 substitute images, built lazily once per run.
#[derive(Debug, Default)]
pub struct CanonicalImages {
    white: OnceCell<ImageData>,
    flat_normal: OnceCell<ImageData>,
}

impl CanonicalImages {
    /// Create an empty cache; images are built on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// The 1x1 opaque white diffuse substitute.
    pub fn white(&self) -> SourceImage<'_> {
        self.white
            .get_or_init(|| ImageData::solid(1, 1, WHITE_PIXEL, ColorSpace::Perceptual))
            .as_source(CANONICAL_WHITE_ID)
    }

    /// The 1x1 flat "pointing up" normal substitute.
    pub fn flat_normal(&self) -> SourceImage<'_> {
        self.flat_normal
            .get_or_init(|| ImageData::solid(1, 1, FLAT_NORMAL_PIXEL, ColorSpace::Linear))
            .as_source(CANONICAL_NORMAL_ID)
    }
}

/// One observation from a consumer surface, in traversal order.
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    /// Diffuse texture, if the surface has one.
    pub diffuse: Option<SourceImage<'a>>,
    /// Companion normal map, if the surface has one.
    pub normal: Option<SourceImage<'a>>,
    /// Material tint color.
    pub tint: [f32; 4],
    /// Whether the surface wants the tint applied.
    pub tint_enabled: bool,
}

/// A deduplicated texture+tint combination occupying one atlas cell.
#[derive(Debug, Clone, Copy)]
pub struct CombinedEntry<'a> {
    /// Diffuse texture (canonical white if the surface had none).
    pub diffuse: SourceImage<'a>,
    /// Normal map. `Some` for every entry when normal packing is enabled.
    pub normal: Option<SourceImage<'a>>,
    /// Whether the tint is multiplied into the diffuse pixels at composite time.
    pub apply_tint: bool,
    /// Tint color, meaningful only when `apply_tint` is true.
    pub tint: [f32; 4],
}

/// Identity key of an entry: diffuse texture id plus the tint equivalence class.
///
/// `tint: None` is the canonical "no tint" class shared by every observation
/// whose tint is disabled or neutral, whatever its nominal color field says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EntryKey {
    image: u64,
    tint: Option<[u8; 4]>,
}

/// Normalize an observation's identity before hashing.
///
/// Returns the key and whether the tint actually applies. Tints are quantized
/// to 8-bit so float noise cannot split entries.
fn normalize_key(image: u64, tint: [f32; 4], tint_enabled: bool) -> (EntryKey, bool) {
    let quantized = quantize_tint(tint);
    let applies = tint_enabled && quantized != quantize_tint(NEUTRAL_TINT);
    let key = EntryKey {
        image,
        tint: if applies { Some(quantized) } else { None },
    };
    (key, applies)
}

/// Collapses surface observations into the ordered entry list.
pub struct Deduplicator<'a> {
    canonicals: &'a CanonicalImages,
    pack_normals: bool,
    entries: Vec<CombinedEntry<'a>>,
    index: HashMap<EntryKey, usize>,
    observed: usize,
}

impl<'a> Deduplicator<'a> {
    /// Create a deduplicator backed by the run's canonical substitutes.
    pub fn new(canonicals: &'a CanonicalImages, pack_normals: bool) -> Self {
        Self {
            canonicals,
            pack_normals,
            entries: Vec::new(),
            index: HashMap::new(),
            observed: 0,
        }
    }

    /// Record one observation and return the index of its entry.
    ///
    /// First-seen order assigns indices. A repeated key returns the existing
    /// index; if the repeat carries a different normal map, the first-seen
    /// normal wins and a conflict warning is pushed.
    pub fn observe(
        &mut self,
        obs: Observation<'a>,
        warnings: &mut Vec<PackWarning>,
    ) -> usize {
        let surface = self.observed;
        self.observed += 1;

        let diffuse = match obs.diffuse {
            Some(img) => img,
            None => {
                warnings.push(PackWarning::MissingDiffuse { surface });
                self.canonicals.white()
            }
        };

        let normal = if self.pack_normals {
            Some(obs.normal.unwrap_or_else(|| self.canonicals.flat_normal()))
        } else {
            None
        };

        let (key, apply_tint) = normalize_key(diffuse.id(), obs.tint, obs.tint_enabled);

        if let Some(&index) = self.index.get(&key) {
            let existing = &self.entries[index];
            let existing_id = existing.normal.map(|n| n.id());
            if self.pack_normals && existing_id != normal.map(|n| n.id()) {
                warnings.push(PackWarning::NormalConflict { entry: index });
            }
            return index;
        }

        let index = self.entries.len();
        self.entries.push(CombinedEntry {
            diffuse,
            normal,
            apply_tint,
            tint: obs.tint,
        });
        self.index.insert(key, index);
        index
    }

    /// Number of distinct entries seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries have been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the deduplicator, yielding the ordered entry list.
    pub fn finish(self) -> Vec<CombinedEntry<'a>> {
        self.entries
    }
}
