//! Palette files and their conversion into color schedules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{Color, Property, PropertySchedule};

pub type PaletteResult<T> = Result<T, PaletteError>;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("invalid palette JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("palette has no swatch {0}")]
    MissingSwatch(usize),
    #[error("swatch {0:?} has no colors")]
    EmptySwatch(String),
}

/// A named list of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Swatch {
    /// Color schedule spanning the whole curve once, with the colors evenly
    /// spaced at `round(i / (n - 1) * 100)` percent. A single color sits at 0%.
    pub fn to_schedule(&self) -> PaletteResult<PropertySchedule> {
        if self.colors.is_empty() {
            return Err(PaletteError::EmptySwatch(self.name.clone()));
        }

        let last = self.colors.len() - 1;
        let schedule = self
            .colors
            .iter()
            .enumerate()
            .fold(PropertySchedule::new(Property::Color), |schedule, (i, hex)| {
                let percent = if last == 0 {
                    0.0
                } else {
                    (i as f64 / last as f64 * 100.0).round()
                };
                schedule.with_keyframe(percent, Color::parse(hex))
            });
        Ok(schedule)
    }
}

/// Contents of a palette file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palettes {
    #[serde(rename = "Swatches")]
    pub swatches: Vec<Swatch>,
}

impl Palettes {
    pub fn from_json(json: &str) -> PaletteResult<Self> {
        let palettes: Self = serde_json::from_str(json)?;
        log::debug!("loaded {} swatches", palettes.swatches.len());
        Ok(palettes)
    }

    pub fn swatch(&self, index: usize) -> PaletteResult<&Swatch> {
        self.swatches
            .get(index)
            .ok_or(PaletteError::MissingSwatch(index))
    }

    /// Swatch names in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.swatches.iter().map(|swatch| swatch.name.as_str())
    }

    /// Color schedule of swatch `index`.
    pub fn schedule(&self, index: usize) -> PaletteResult<PropertySchedule> {
        self.swatch(index)?.to_schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::KeyframeValue;

    const FILE: &str = r##"{
        "Swatches": [
            {"name": "Sunset", "colors": ["#ff0000", "#ff8800", "#ffff00", "#00ff00"]},
            {"name": "Mono", "colors": ["#123456"]},
            {"name": "Empty", "colors": []}
        ]
    }"##;

    #[test]
    fn swatch_colors_are_evenly_spaced() {
        let palettes = Palettes::from_json(FILE).unwrap();
        assert_eq!(palettes.names().collect::<Vec<_>>(), ["Sunset", "Mono", "Empty"]);

        let schedule = palettes.schedule(0).unwrap();
        assert_eq!(schedule.property, Property::Color);
        assert_eq!(schedule.repeat_count, 1.0);
        assert_eq!(schedule.offset_percent, 0.0);
        let positions: Vec<f64> = schedule.keyframes.iter().map(|k| k.position_percent).collect();
        assert_eq!(positions, [0.0, 33.0, 67.0, 100.0]);
        assert_eq!(
            schedule.keyframes[1].value,
            KeyframeValue::Color(Color::rgb(255, 136, 0))
        );
    }

    #[test]
    fn single_color_sits_at_start() {
        let palettes = Palettes::from_json(FILE).unwrap();
        let schedule = palettes.schedule(1).unwrap();
        assert_eq!(schedule.keyframes.len(), 1);
        assert_eq!(schedule.keyframes[0].position_percent, 0.0);
    }

    #[test]
    fn missing_and_empty_swatches_fail() {
        let palettes = Palettes::from_json(FILE).unwrap();
        assert!(matches!(palettes.schedule(2), Err(PaletteError::EmptySwatch(_))));
        assert!(matches!(palettes.schedule(7), Err(PaletteError::MissingSwatch(7))));
        assert!(matches!(
            Palettes::from_json(r#"{"swatches": []}"#),
            Err(PaletteError::Json(_))
        ));
    }
}
