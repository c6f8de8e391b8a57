use harmonograph_engine::Engine;
use harmonograph_engine::geom::fit_curve;
use harmonograph_engine::parse::{Palettes, SettingsDocument, load_settings, save_settings};
use harmonograph_engine::pipeline::{Parameters, PipelineOptions, generate};
use harmonograph_engine::render::{
    Geometry, RenderMode, SegmentShape, Viewport, render_svg, write_svg,
};
use harmonograph_engine::schedule::{Color, KeyframeValue, Property, ScheduleOutcome};
use time::macros::datetime;

const DEFAULT_SETTINGS: &str = include_str!("data/default.json");
const SWATCHES: &str = include_str!("data/swatches.json");

#[test]
fn default_settings_load() {
    let parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    assert_eq!(parameters.point_count, 1500);
    assert_eq!(parameters.render_mode, RenderMode::Line);
    assert_eq!(parameters.oscillators.len(), 3);
    assert_eq!(parameters.schedules.len(), 5);

    let width = parameters.schedule(Property::ObjectWidth).expect("objectWidth");
    assert_eq!(width.keyframes[0].value, KeyframeValue::Scalar(6.0));
    assert_eq!(
        parameters.schedule(Property::Color).expect("color").keyframes[1].value,
        KeyframeValue::Color(Color::rgb(0xe6, 0x39, 0x46))
    );
}

#[test]
fn line_mode_pipeline_styles_every_segment() {
    let parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    let generation = generate(&parameters, &PipelineOptions::default()).expect("generate");

    let outcomes: Vec<(Property, ScheduleOutcome)> = generation
        .diagnostics
        .schedules
        .iter()
        .map(|applied| (applied.property, applied.outcome))
        .collect();
    assert_eq!(
        outcomes,
        [
            (Property::Color, ScheduleOutcome::Applied),
            (Property::LineWidth, ScheduleOutcome::Applied),
            (Property::Opacity, ScheduleOutcome::Applied),
        ]
    );

    let Geometry::Line { segments } = &generation.geometry else {
        panic!("expected line geometry");
    };
    assert_eq!(segments.len(), 1499);
    assert_eq!(segments[0].style.width, 4.0);
    assert!((segments[1498].style.width - (4.0 - 3.5 * 1498.0 / 1499.0)).abs() < 1e-9);
    assert!(segments.iter().all(|s| (0.0..=1.0).contains(&s.style.opacity)));
    assert!(segments.iter().any(|s| matches!(s.shape, SegmentShape::Cubic { .. })));

    for pair in segments.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn object_mode_pipeline_uses_object_properties() {
    let mut parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    parameters.render_mode = RenderMode::Object;
    parameters.point_count = 300;

    let generation = generate(&parameters, &PipelineOptions::default()).expect("generate");
    let Geometry::Object { objects } = &generation.geometry else {
        panic!("expected object geometry");
    };
    assert_eq!(objects.len(), 300);
    assert!(objects.iter().all(|o| o.width == 6.0 && o.height == 6.0));
    assert!(generation.points.iter().all(|p| p.line_width.is_none()));

    let height = generation
        .diagnostics
        .schedules
        .iter()
        .find(|applied| applied.property == Property::Height)
        .expect("height schedule considered");
    assert_eq!(height.outcome, ScheduleOutcome::NoKeyframes);
}

#[test]
fn pipeline_is_deterministic() {
    let parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    let first = generate(&parameters, &PipelineOptions::default()).expect("generate");
    let second = generate(&parameters, &PipelineOptions::default()).expect("generate");
    assert_eq!(first, second);
}

#[test]
fn points_fit_the_viewport() {
    let parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    let viewport = Viewport::new(1000.0, 500.0).with_padding(20.0);
    let options = PipelineOptions::default().with_viewport(Some(viewport));
    let generation = generate(&parameters, &options).expect("generate");

    let eps = 1e-9;
    assert!(generation.points.iter().all(|p| {
        p.x >= 20.0 - eps && p.x <= 980.0 + eps && p.y >= 20.0 - eps && p.y <= 480.0 + eps
    }));
    assert!(generation.points.iter().any(|p| (p.x - 20.0).abs() < eps));
    assert!(generation.points.iter().any(|p| (p.y - 480.0).abs() < eps));
}

#[test]
fn settings_round_trip_preserves_parameters() {
    let original = load_settings(DEFAULT_SETTINGS).expect("load settings");
    let saved = save_settings(&original, datetime!(2025-01-02 03:04:05 UTC)).expect("save settings");
    let reloaded = load_settings(&saved).expect("reload settings");

    assert_eq!(reloaded.point_count, original.point_count);
    assert_eq!(reloaded.render_mode, original.render_mode);
    assert_eq!(reloaded.time_start, original.time_start);
    assert_eq!(reloaded.time_end, original.time_end);
    assert_eq!(reloaded.schedules, original.schedules);
    for (a, b) in reloaded.oscillators.iter().zip(&original.oscillators) {
        assert_eq!(a.frequency, b.frequency);
        assert_eq!(a.magnitude, b.magnitude);
        assert_eq!(a.damping_rate, b.damping_rate);
        assert_eq!((a.affects_x, a.affects_y), (b.affects_x, b.affects_y));
        assert!((a.phase_radians - b.phase_radians).abs() < 1e-12);
    }

    let document = SettingsDocument::from_json(&saved).expect("parse saved");
    assert_eq!(document.saved_at(), Some(datetime!(2025-01-02 03:04:05 UTC)));
}

#[test]
fn palette_replaces_color_schedule() {
    let mut parameters = load_settings(DEFAULT_SETTINGS).expect("load settings");
    let palettes = Palettes::from_json(SWATCHES).expect("load palettes");
    parameters.set_schedule(palettes.schedule(0).expect("swatch"));

    let color = parameters.schedule(Property::Color).expect("color");
    assert_eq!(color.repeat_count, 1.0);
    let positions: Vec<f64> = color.keyframes.iter().map(|k| k.position_percent).collect();
    assert_eq!(positions, [0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(
        parameters.schedules.iter().filter(|s| s.property == Property::Color).count(),
        1
    );

    let generation = generate(&parameters, &PipelineOptions::default()).expect("generate");
    assert_eq!(generation.points[0].color, Some(Color::rgb(0x1d, 0x35, 0x57)));
    assert_eq!(
        generation.points.last().and_then(|p| p.color.clone()),
        Some(Color::rgb(0xe6, 0x39, 0x46))
    );
}

#[test]
fn svg_export_writes_file() {
    let parameters = Parameters {
        point_count: 50,
        ..Parameters::default()
    };
    let generation = generate(&parameters, &PipelineOptions::default()).expect("generate");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("curve.svg");
    let file = std::fs::File::create(&path).expect("create svg");
    write_svg(file, &generation.geometry, &Viewport::default()).expect("write svg");

    let written = std::fs::read_to_string(&path).expect("read svg");
    let rendered = render_svg(&generation.geometry, &Viewport::default()).expect("render svg");
    assert_eq!(written, rendered);
    assert_eq!(written.matches("<path ").count(), 49);
    assert!(written.contains("xmlns=\"http://www.w3.org/2000/svg\""));
}

#[test]
fn batch_fit_of_generated_curve() {
    let parameters = Parameters {
        point_count: 100,
        ..Parameters::default()
    };
    let generation = generate(&parameters, &PipelineOptions::default()).expect("generate");
    let positions: Vec<_> = generation.points.iter().map(|p| p.position()).collect();
    let segments = fit_curve(&positions, 0.4);
    assert_eq!(segments.len(), 96);
    assert_eq!(segments[0].start, positions[2]);
    assert_eq!(segments[95].end, positions[98]);
}

#[test]
fn engine_runs_default_settings() {
    let mut engine = Engine::new();
    assert!(engine.load_settings(DEFAULT_SETTINGS).is_ok());
    assert!(engine.generate().is_ok());
    let generation = engine.generation().expect("generation");
    assert_eq!(generation.diagnostics.point_count, 1500);
    let svg = engine.export_svg().ok().expect("svg");
    assert!(svg.contains("stroke=\"#1d3557\""));
}
