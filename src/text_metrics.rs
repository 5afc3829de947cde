use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Fallback advance when no face (or glyph) is available. Chosen so that
/// truncation decisions stay stable on systems without the requested font.
const FALLBACK_ADVANCE_RATIO: f32 = 0.56;

/// Measures the horizontal extent of `text` at `font_size` in the first
/// resolvable family of `font_family`. Always answers; falls back to an
/// average-advance estimate when the font cannot be loaded.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = TEXT_MEASURER
        .lock()
        .ok()
        .and_then(|mut guard| guard.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| fallback_width(text, font_size))
}

fn fallback_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * FALLBACK_ADVANCE_RATIO
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        Some(face.width_of(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<LoadedFace> {
        let mut names: Vec<String> = Vec::new();
        let mut families: Vec<Family<'_>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => families.push(Family::Serif),
                "sans-serif" | "system-ui" => families.push(Family::SansSerif),
                "monospace" => families.push(Family::Monospace),
                _ => names.push(raw.to_string()),
            }
        }
        let named: Vec<Family<'_>> = names.iter().map(|name| Family::Name(name)).collect();
        let mut query_families = named;
        query_families.extend(families);
        if query_families.is_empty() {
            query_families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let id = self.db.query(&Query {
            families: &query_families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;

        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if let Ok(face) = Face::parse(&bytes, index) {
                let units_per_em = face.units_per_em().max(1);
                loaded = Some(LoadedFace::new(bytes, index, units_per_em));
            }
        });
        loaded
    }
}

struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    advance_cache: HashMap<char, Option<u16>>,
}

impl LoadedFace {
    fn new(data: Vec<u8>, index: u32, units_per_em: u16) -> Self {
        Self {
            data,
            index,
            units_per_em,
            advance_cache: HashMap::new(),
        }
    }

    fn width_of(&mut self, text: &str, font_size: f32) -> f32 {
        let Ok(face) = Face::parse(&self.data, self.index) else {
            return fallback_width(text, font_size);
        };
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * FALLBACK_ADVANCE_RATIO;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = *self.advance_cache.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            match advance {
                Some(units) => width += units as f32 * scale,
                None => width += fallback,
            }
        }
        width.max(0.0)
    }
}

/// Deterministic ellipsis truncation: returns the label unchanged when it
/// fits, otherwise the longest prefix that fits with a trailing ellipsis.
/// The bool reports whether truncation happened.
pub fn truncate_to_width(
    label: &str,
    max_width: f32,
    font_size: f32,
    font_family: &str,
) -> (String, bool) {
    if measure_text_width(label, font_size, font_family) <= max_width {
        return (label.to_string(), false);
    }

    const ELLIPSIS: char = '\u{2026}';
    let mut best = String::new();
    let mut candidate = String::new();
    for ch in label.chars() {
        candidate.push(ch);
        let mut with_ellipsis = candidate.clone();
        with_ellipsis.push(ELLIPSIS);
        if measure_text_width(&with_ellipsis, font_size, font_family) <= max_width {
            best = candidate.clone();
        } else {
            break;
        }
    }
    best.push(ELLIPSIS);
    (best, true)
}
