#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("harmonograph_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use harmonograph_engine::parse::{Palettes, load_settings, save_settings};
    use harmonograph_engine::pipeline::{Parameters, PipelineOptions, generate};
    use harmonograph_engine::render::{DEFAULT_HEIGHT, DEFAULT_WIDTH, Viewport, render_svg};
    use std::fs;
    use std::path::{Path, PathBuf};
    use time::OffsetDateTime;

    const USAGE: &str = r#"harmonograph_cli (harmonograph-engine)

USAGE:
  harmonograph_cli render <settings.json> [options]
  harmonograph_cli defaults

OPTIONS (render):
  --out <path>         Write the SVG to this file instead of stdout
  --width <px>         Drawing width (default 800)
  --height <px>        Drawing height (default 600)
  --palette <path>     Palette file whose swatch replaces the color schedule
  --swatch <index>     Swatch to apply from --palette (default 0)
  --overwrite          Overwrite an existing output file
  -h, --help           Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "render" => cmd_render(&mut args),
            "defaults" => cmd_defaults(),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_defaults() -> Result<(), String> {
        let json = save_settings(&Parameters::default(), OffsetDateTime::now_utc())
            .map_err(|e| format!("serialize defaults: {e}"))?;
        println!("{json}");
        Ok(())
    }

    fn cmd_render(args: &mut Args) -> Result<(), String> {
        let settings_path = PathBuf::from(args.next().ok_or("missing settings file")?);

        let mut out_path: Option<PathBuf> = None;
        let mut width = DEFAULT_WIDTH;
        let mut height = DEFAULT_HEIGHT;
        let mut palette_path: Option<PathBuf> = None;
        let mut swatch = 0usize;
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => out_path = Some(PathBuf::from(args.value("--out")?)),
                "--width" => width = args.number("--width")?,
                "--height" => height = args.number("--height")?,
                "--palette" => palette_path = Some(PathBuf::from(args.value("--palette")?)),
                "--swatch" => {
                    let raw = args.value("--swatch")?;
                    swatch = raw
                        .parse()
                        .map_err(|_| format!("invalid value for --swatch: `{raw}`"))?;
                }
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let svg = render_file(&settings_path, palette_path.as_deref(), swatch, width, height)?;

        if let Some(path) = out_path.as_deref() {
            write_text_file(path, &svg, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{svg}");
        }
        Ok(())
    }

    fn render_file(
        settings_path: &Path,
        palette_path: Option<&Path>,
        swatch: usize,
        width: f64,
        height: f64,
    ) -> Result<String, String> {
        let json = fs::read_to_string(settings_path)
            .map_err(|e| format!("read {}: {e}", settings_path.display()))?;
        let mut parameters =
            load_settings(&json).map_err(|e| format!("{}: {e}", settings_path.display()))?;

        if let Some(path) = palette_path {
            let text =
                fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
            let palettes = Palettes::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))?;
            let schedule = palettes.schedule(swatch).map_err(|e| e.to_string())?;
            parameters.set_schedule(schedule);
        }

        let options = PipelineOptions::default().with_viewport(Some(Viewport::new(width, height)));
        let generation = generate(&parameters, &options).map_err(|e| e.to_string())?;
        let diagnostics = &generation.diagnostics;
        if diagnostics.clamped {
            eprintln!(
                "point count {} clamped to {}",
                diagnostics.requested_points, diagnostics.point_count
            );
        }
        eprintln!(
            "{}: points={} primitives={}",
            settings_path.display(),
            diagnostics.point_count,
            diagnostics.primitive_count
        );

        let viewport = options.viewport.unwrap_or_default();
        render_svg(&generation.geometry, &viewport).map_err(|e| e.to_string())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }

        fn number(&mut self, flag: &str) -> Result<f64, String> {
            let raw = self.value(flag)?;
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && *value > 0.0)
                .ok_or_else(|| format!("invalid value for {flag}: `{raw}`"))
        }
    }
}
