use std::ops::Range;

use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::{ChartData, ChartSpec};
use crate::error::{AppError, Result};
use crate::palette::ColorPalette;
use crate::{OutputFormat, RenderOptions};

const CAPTION_FONT: (&str, u32) = ("sans-serif", 20);

/// Render a chart description to image bytes in the requested format.
pub fn render(spec: &ChartSpec, options: &RenderOptions) -> Result<Vec<u8>> {
    match options.format {
        OutputFormat::Png => render_png(spec, options.width, options.height),
        OutputFormat::Svg => render_svg(spec, options.width, options.height),
    }
}

fn render_png(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(root, spec)?;
    }

    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(&buffer, width, height, image::ColorType::Rgb8)
        .map_err(render_err)?;
    Ok(png_bytes)
}

fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut document = String::new();
    {
        let root = SVGBackend::with_string(&mut document, (width, height)).into_drawing_area();
        draw_chart(root, spec)?;
    }
    Ok(document.into_bytes())
}

fn draw_chart<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, spec: &ChartSpec) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let palette = ColorPalette::category10();

    match &spec.data {
        ChartData::Bar(segments) => {
            let labels: Vec<String> = segments.iter().map(|s| s.label.clone()).collect();
            let values: Vec<f64> = segments.iter().map(|s| s.value).collect();

            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .caption(&spec.title, CAPTION_FONT)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(0.0..segments.len() as f64, value_range(&values))
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&|x| {
                    let index = *x as usize;
                    labels.get(index).cloned().unwrap_or_default()
                })
                .draw()
                .map_err(render_err)?;

            // One rectangle per input row; color keyed by category.
            for (index, segment) in segments.iter().enumerate() {
                let color = palette.color(segment.color_index);
                let x_center = index as f64 + 0.5;
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [(x_center - 0.4, 0.0), (x_center + 0.4, segment.value)],
                        color.filled(),
                    )))
                    .map_err(render_err)?;
            }
        }
        ChartData::Line(points) => {
            let labels: Vec<String> = points.iter().map(|(category, _)| category.clone()).collect();
            let totals: Vec<f64> = points.iter().map(|(_, total)| *total).collect();

            let mut chart = ChartBuilder::on(&root)
                .margin(10)
                .caption(&spec.title, CAPTION_FONT)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(0.0..points.len() as f64, padded_range(&totals))
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(labels.len())
                .x_label_formatter(&|x| {
                    let index = *x as usize;
                    labels.get(index).cloned().unwrap_or_default()
                })
                .draw()
                .map_err(render_err)?;

            let series: Vec<(f64, f64)> = totals
                .iter()
                .enumerate()
                .map(|(index, total)| (index as f64 + 0.5, *total))
                .collect();

            chart
                .draw_series(LineSeries::new(series, palette.color(0).stroke_width(2)))
                .map_err(render_err)?;
        }
        ChartData::Pie(slices) => {
            let root = root
                .titled(&spec.title, CAPTION_FONT)
                .map_err(render_err)?;
            let (width, height) = root.dim_in_pixel();
            let center = (width as i32 / 2, height as i32 / 2);
            let radius = f64::from(width.min(height)) * 0.35;

            let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
            let colors: Vec<RGBColor> =
                slices.iter().map(|s| palette.color(s.color_index)).collect();
            let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
            pie.percentages(("sans-serif", 12).into_font().color(&BLACK));
            root.draw(&pie).map_err(render_err)?;
            root.present().map_err(render_err)?;
            return Ok(());
        }
    }

    root.present().map_err(render_err)?;
    Ok(())
}

/// Value range for bars, anchored at zero so bars grow from the axis.
fn value_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().cloned().fold(0.0_f64, f64::min);
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    pad(min, max)
}

/// Data-driven range for lines, following the data rather than zero.
fn padded_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    pad(min, max)
}

fn pad(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

fn render_err<E: std::fmt::Display>(err: E) -> AppError {
    AppError::Render(err.to_string())
}
