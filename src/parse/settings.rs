//! Settings documents: the persisted form of [`Parameters`].
//!
//! Older documents stored every input as a string and keyed keyframe
//! positions as `index`; both are accepted on load. Missing fields fall back
//! to the defaults of a fresh session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::motion::Oscillator;
use crate::pipeline::{DEFAULT_POINT_COUNT, DEFAULT_TIME_END, DEFAULT_TIME_START, Parameters};
use crate::render::RenderMode;
use crate::schedule::{Color, Keyframe, KeyframeValue, Property, PropertySchedule};

/// Version written into new documents.
pub const SETTINGS_VERSION: &str = "1.0";

/// Result type for settings conversion.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("point count must be a non-negative number, got {0}")]
    InvalidPointCount(f64),
    #[error("unknown render mode {0:?}")]
    UnknownRenderMode(String),
    #[error("unknown property {0:?}")]
    UnknownProperty(String),
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// A number stored either as a JSON number or as numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Number(f64),
    Text(String),
}

impl NumberField {
    /// Parsed value; blank text counts as absent.
    fn value(&self, field: &str) -> SettingsResult<Option<f64>> {
        match self {
            Self::Number(value) => Ok(Some(*value)),
            Self::Text(text) if text.trim().is_empty() => Ok(None),
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| SettingsError::InvalidNumber {
                    field: field.to_owned(),
                    value: text.clone(),
                }),
        }
    }
}

impl From<f64> for NumberField {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

fn number_or(field: Option<&NumberField>, name: &str, default: f64) -> SettingsResult<f64> {
    Ok(field.map(|f| f.value(name)).transpose()?.flatten().unwrap_or(default))
}

/// A keyframe value: a number, or text holding a color or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeField {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainControls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_count: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_end: Option<NumberField>,
}

/// One oscillator. `phase` is in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendulumSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dampening: Option<NumberField>,
    #[serde(default = "enabled")]
    pub x_axis: bool,
    #[serde(default = "enabled")]
    pub y_axis: bool,
}

const fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<NumberField>,
    /// Legacy spelling of `percentage`.
    #[serde(default, skip_serializing)]
    pub index: Option<NumberField>,
    pub value: KeyframeField,
}

/// Schedule of one property. `frequency` is the repeat count and `offset`
/// the offset percentage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<NumberField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<NumberField>,
    #[serde(default)]
    pub control_points: Vec<ControlPointSettings>,
}

/// Top-level settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub main_controls: MainControls,
    #[serde(default)]
    pub pendulums: Vec<PendulumSettings>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySettings>,
}

fn default_version() -> String {
    SETTINGS_VERSION.to_owned()
}

impl SettingsDocument {
    /// Parse a document without interpreting it.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describe `parameters`, stamped with `timestamp`.
    pub fn from_parameters(parameters: &Parameters, timestamp: OffsetDateTime) -> SettingsResult<Self> {
        let main_controls = MainControls {
            point_count: Some(NumberField::Number(parameters.point_count as f64)),
            render_mode: Some(parameters.render_mode.name().to_owned()),
            time_start: Some(parameters.time_start.into()),
            time_end: Some(parameters.time_end.into()),
        };

        let pendulums = parameters
            .oscillators
            .iter()
            .map(|osc| PendulumSettings {
                frequency: Some(osc.frequency.into()),
                magnitude: Some(osc.magnitude.into()),
                phase: Some(osc.phase_radians.to_degrees().into()),
                dampening: Some(osc.damping_rate.into()),
                x_axis: osc.affects_x,
                y_axis: osc.affects_y,
            })
            .collect();

        let properties = parameters
            .schedules
            .iter()
            .map(|schedule| (schedule.property.name().to_owned(), property_settings(schedule)))
            .collect();

        Ok(Self {
            version: default_version(),
            timestamp: Some(timestamp.format(&Rfc3339)?),
            main_controls,
            pendulums,
            properties,
        })
    }

    /// Timestamp of the document, if present and well formed.
    #[must_use]
    pub fn saved_at(&self) -> Option<OffsetDateTime> {
        let text = self.timestamp.as_deref()?;
        match OffsetDateTime::parse(text, &Rfc3339) {
            Ok(timestamp) => Some(timestamp),
            Err(err) => {
                log::warn!("ignoring malformed settings timestamp {text:?}: {err}");
                None
            }
        }
    }

    /// Convert into generation parameters. Phases go from degrees to radians
    /// and keyframe values are typed by their property.
    pub fn to_parameters(&self) -> SettingsResult<Parameters> {
        let controls = &self.main_controls;

        let point_count = number_or(
            controls.point_count.as_ref(),
            "mainControls.pointCount",
            DEFAULT_POINT_COUNT as f64,
        )?;
        if !point_count.is_finite() || point_count < 0.0 {
            return Err(SettingsError::InvalidPointCount(point_count));
        }

        let render_mode = match controls.render_mode.as_deref().map(str::trim) {
            None | Some("") => RenderMode::default(),
            Some(name) => RenderMode::from_name(name)
                .ok_or_else(|| SettingsError::UnknownRenderMode(name.to_owned()))?,
        };

        let oscillators = self
            .pendulums
            .iter()
            .enumerate()
            .map(|(i, pendulum)| oscillator(i, pendulum))
            .collect::<SettingsResult<Vec<_>>>()?;

        let mut schedules = Vec::with_capacity(self.properties.len());
        for (name, settings) in &self.properties {
            let property = Property::from_name(name)
                .ok_or_else(|| SettingsError::UnknownProperty(name.clone()))?;
            schedules.push(schedule(property, settings)?);
        }
        schedules.sort_by_key(|s| s.property);

        Ok(Parameters {
            oscillators,
            time_start: number_or(controls.time_start.as_ref(), "mainControls.timeStart", DEFAULT_TIME_START)?,
            time_end: number_or(controls.time_end.as_ref(), "mainControls.timeEnd", DEFAULT_TIME_END)?,
            point_count: point_count.trunc() as usize,
            render_mode,
            schedules,
        })
    }
}

fn oscillator(index: usize, pendulum: &PendulumSettings) -> SettingsResult<Oscillator> {
    let defaults = Oscillator::default();
    let field = |name: &str| format!("pendulums[{index}].{name}");
    let phase_degrees = number_or(pendulum.phase.as_ref(), &field("phase"), 0.0)?;

    Ok(Oscillator {
        frequency: number_or(pendulum.frequency.as_ref(), &field("frequency"), defaults.frequency)?,
        magnitude: number_or(pendulum.magnitude.as_ref(), &field("magnitude"), defaults.magnitude)?,
        phase_radians: phase_degrees.to_radians(),
        damping_rate: number_or(pendulum.dampening.as_ref(), &field("dampening"), 0.0)?,
        affects_x: pendulum.x_axis,
        affects_y: pendulum.y_axis,
    })
}

fn schedule(property: Property, settings: &PropertySettings) -> SettingsResult<PropertySchedule> {
    let field = |name: &str| format!("properties.{property}.{name}");

    let mut schedule = PropertySchedule::new(property)
        .with_repeat_count(number_or(settings.frequency.as_ref(), &field("frequency"), 1.0)?)
        .with_offset_percent(number_or(settings.offset.as_ref(), &field("offset"), 0.0)?);

    for (i, point) in settings.control_points.iter().enumerate() {
        let position = point.percentage.as_ref().or(point.index.as_ref());
        let position_percent = number_or(position, &field(&format!("controlPoints[{i}].percentage")), 0.0)?;
        let value = keyframe_value(property, &point.value, &field(&format!("controlPoints[{i}].value")))?;
        schedule.keyframes.push(Keyframe {
            position_percent,
            value,
        });
    }
    Ok(schedule)
}

fn keyframe_value(property: Property, value: &KeyframeField, field: &str) -> SettingsResult<KeyframeValue> {
    if property.is_color() {
        let text = match value {
            KeyframeField::Text(text) => text.clone(),
            KeyframeField::Number(number) => number.to_string(),
        };
        return Ok(KeyframeValue::Color(Color::parse(&text)));
    }

    match value {
        KeyframeField::Number(number) => Ok(KeyframeValue::Scalar(*number)),
        KeyframeField::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(KeyframeValue::Scalar)
            .map_err(|_| SettingsError::InvalidNumber {
                field: field.to_owned(),
                value: text.clone(),
            }),
    }
}

fn property_settings(schedule: &PropertySchedule) -> PropertySettings {
    let control_points = schedule
        .keyframes
        .iter()
        .map(|keyframe| ControlPointSettings {
            percentage: Some(keyframe.position_percent.into()),
            index: None,
            value: match &keyframe.value {
                KeyframeValue::Scalar(value) => KeyframeField::Number(*value),
                KeyframeValue::Color(color) => KeyframeField::Text(color.to_hex()),
            },
        })
        .collect();

    PropertySettings {
        frequency: Some(schedule.repeat_count.into()),
        offset: Some(schedule.offset_percent.into()),
        control_points,
    }
}

/// Parse a settings document straight into parameters.
pub fn load_settings(json: &str) -> SettingsResult<Parameters> {
    let document = SettingsDocument::from_json(json)?;
    let parameters = document.to_parameters()?;
    log::debug!(
        "loaded settings v{} with {} oscillators and {} schedules",
        document.version,
        parameters.oscillators.len(),
        parameters.schedules.len()
    );
    Ok(parameters)
}

/// Serialize `parameters` as a pretty-printed settings document.
pub fn save_settings(parameters: &Parameters, timestamp: OffsetDateTime) -> SettingsResult<String> {
    SettingsDocument::from_parameters(parameters, timestamp)?.to_json()
}
