// src/main.rs

//! Headless demo: renders a few editor-like frames and logs what each repainted.
//!
//! Usage: `deferred-render [--config render.json] [font.ttf]`
//!
//! Without a font file the deterministic box-glyph source is used.

use anyhow::{bail, Context};
use deferred_render::{
    Color, Config, FontHandle, FrameReport, HeadlessGlyphSource, HeadlessSurface, Rect, Renderer,
};
use log::info;
use std::path::PathBuf;

const FONT_SIZE_PX: f32 = 14.0;
const INITIAL_WIDTH_PX: i32 = 800;
const INITIAL_HEIGHT_PX: i32 = 600;

const BACKGROUND: Color = Color::opaque(30, 30, 40);
const GUTTER: Color = Color::opaque(40, 40, 52);
const TEXT: Color = Color::opaque(220, 220, 210);
const KEYWORD: Color = Color::opaque(200, 120, 220);

const SOURCE: &[&str] = &[
    "fn main() {",
    "\tlet frames = 3;",
    "\tfor i in 0..frames {",
    "\t\tprintln!(\"frame {}\", i);",
    "\t}",
    "}",
];

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    font: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
            _ if args.font.is_none() => args.font = Some(PathBuf::from(&arg)),
            _ => bail!("unexpected argument '{}'", arg),
        }
    }
    Ok(args)
}

/// Records one frame of a tiny source view and resolves it.
fn draw_frame(
    renderer: &mut Renderer<HeadlessSurface>,
    font: FontHandle,
    cursor_visible: bool,
) -> anyhow::Result<FrameReport> {
    renderer.begin_frame();
    let (width, height) = renderer.size();
    let line_height = renderer.text_height(font)?;
    let gutter = renderer.text_width(font, "000 ")?;

    renderer.draw_rect(Rect::new(0, 0, width, height), BACKGROUND)?;
    renderer.draw_rect(Rect::new(0, 0, gutter, height), GUTTER)?;

    let mut cursor_x = gutter;
    for (i, line) in SOURCE.iter().enumerate() {
        let y = i as i32 * line_height;
        renderer.draw_text(font, format!("{:>3}", i + 1), 0, y, TEXT)?;

        let (rest_x, rest) = match line.trim_start().split_once(' ') {
            Some((kw, _)) if kw == "fn" || kw == "let" || kw == "for" => {
                let indent = &line[..line.len() - line.trim_start().len()];
                let x = renderer.draw_text(font, indent, gutter, y, TEXT)?;
                let x = renderer.draw_text(font, kw, x, y, KEYWORD)?;
                (x, &line[indent.len() + kw.len()..])
            }
            _ => (gutter, *line),
        };
        cursor_x = renderer.draw_text(font, rest, rest_x, y, TEXT)?;
    }

    if cursor_visible {
        let y = (SOURCE.len() as i32 - 1) * line_height;
        renderer.draw_rect(Rect::new(cursor_x, y, 2, line_height), TEXT)?;
    }

    let report = renderer.end_frame()?;
    info!(
        "Frame: {} commands ({} bytes), {} dirty rect(s) {:?}",
        report.commands,
        report.bytes_used,
        report.dirty_rects.len(),
        report.dirty_rects
    );
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => {
            info!("Configuration loaded (using default).");
            Config::default()
        }
    };

    let surface = HeadlessSurface::new(INITIAL_WIDTH_PX, INITIAL_HEIGHT_PX);
    let mut renderer = Renderer::new(surface, &config).context("Failed to create renderer")?;

    let font = match &args.font {
        Some(path) => renderer
            .load_font(path, FONT_SIZE_PX)
            .with_context(|| format!("Failed to load font '{}'", path.display()))?,
        None => {
            info!("No font given, using box glyphs");
            renderer.add_font(Box::new(HeadlessGlyphSource::default()), FONT_SIZE_PX)
        }
    };
    let tab_width = renderer.text_width(font, "    ")?;
    renderer.set_tab_width(font, tab_width)?;

    info!("Frame 1: initial paint");
    draw_frame(&mut renderer, font, true)?;

    info!("Frame 2: nothing changed");
    draw_frame(&mut renderer, font, true)?;

    info!("Frame 3: cursor blink");
    draw_frame(&mut renderer, font, false)?;

    info!("Frame 4: resize");
    renderer
        .surface_mut()
        .resize(INITIAL_WIDTH_PX / 2, INITIAL_HEIGHT_PX / 2);
    draw_frame(&mut renderer, font, false)?;

    info!("Frame 5: font released");
    renderer.begin_frame();
    renderer.free_font(font)?;
    let report = renderer.end_frame()?;
    info!("Freed {} font(s)", report.fonts_freed);

    Ok(())
}
