use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::prelude::*;

/// General category palette, matplotlib "tab10" order. Stacked series
/// cycle through whichever palette the caller passes.
pub const CATEGORY_PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

/// Fixed colors of the five effort bands, lowest band first.
pub const BAND_PALETTE: [RGBColor; 5] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
];

fn series_color(palette: &[RGBColor], index: usize) -> RGBColor {
    palette[index % palette.len()]
}

/// Pixel buffer length for an RGB8 image, computed in usize so large
/// dimensions cannot overflow the multiplication.
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// One stack segment across all x positions.
#[derive(Debug, Clone)]
pub struct StackedSeries {
    pub label: String,
    pub values: Vec<usize>,
}

/// Render a single-series bar chart of (category, count) entries to PNG
/// bytes. Entries are drawn in the order given.
pub fn render_bar_chart(
    title: &str,
    x_label: &str,
    entries: &[(String, usize)],
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    if entries.is_empty() {
        anyhow::bail!("Cannot create bar chart with no data");
    }

    let categories: Vec<String> = entries.iter().map(|(c, _)| c.clone()).collect();
    let max_count = entries.iter().map(|(_, n)| *n).max().unwrap_or(0);

    let mut buffer = vec![0u8; buffer_len(width, height)];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let y_max = (max_count as f64 * 1.05).max(1.0);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(title, ("sans-serif", 20))
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..categories.len() as f64, 0.0..y_max)
            .context("Failed to build chart")?;

        let label_categories = categories.clone();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&|x| category_label(&label_categories, *x))
            .x_desc(x_label)
            .y_desc("Count")
            .draw()
            .context("Failed to draw mesh")?;

        let color = series_color(&CATEGORY_PALETTE, 0);
        for (idx, (_, count)) in entries.iter().enumerate() {
            let x_center = idx as f64 + 0.5;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(x_center - 0.4, 0.0), (x_center + 0.4, *count as f64)],
                    color.filled(),
                )))
                .context("Failed to draw bar")?;
        }

        root.present().context("Failed to present drawing")?;
    }

    encode_png(&buffer, width, height)
}

/// Render a stacked bar chart: one bar per category, one colored segment
/// per series, with a legend. Segment colors cycle through `palette`.
/// When `annotate` is set, each non-zero segment carries its count at the
/// segment center.
pub fn render_stacked_chart(
    title: &str,
    x_label: &str,
    categories: &[String],
    series: &[StackedSeries],
    palette: &[RGBColor],
    annotate: bool,
    width: u32,
    height: u32,
) -> Result<Vec<u8>> {
    if categories.is_empty() || series.is_empty() {
        anyhow::bail!("Cannot create stacked chart with no data");
    }
    if palette.is_empty() {
        anyhow::bail!("Cannot create stacked chart with an empty palette");
    }
    for s in series {
        if s.values.len() != categories.len() {
            anyhow::bail!(
                "Series '{}' has {} values, expected {}",
                s.label,
                s.values.len(),
                categories.len()
            );
        }
    }

    // Full stack height per category drives the y range.
    let max_stack = (0..categories.len())
        .map(|i| series.iter().map(|s| s.values[i]).sum::<usize>())
        .max()
        .unwrap_or(0);

    let mut buffer = vec![0u8; buffer_len(width, height)];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let y_max = (max_stack as f64 * 1.05).max(1.0);
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(title, ("sans-serif", 20))
            .x_label_area_size(60)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0..categories.len() as f64, 0.0..y_max)
            .context("Failed to build chart")?;

        let label_categories = categories.to_vec();
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&|x| category_label(&label_categories, *x))
            .x_desc(x_label)
            .y_desc("Count")
            .draw()
            .context("Failed to draw mesh")?;

        let mut offsets = vec![0.0f64; categories.len()];
        for (series_idx, s) in series.iter().enumerate() {
            let color = series_color(palette, series_idx);

            let segments: Vec<Rectangle<(f64, f64)>> = s
                .values
                .iter()
                .enumerate()
                .map(|(cat_idx, &v)| {
                    let x_center = cat_idx as f64 + 0.5;
                    let base = offsets[cat_idx];
                    Rectangle::new(
                        [(x_center - 0.4, base), (x_center + 0.4, base + v as f64)],
                        color.filled(),
                    )
                })
                .collect();

            chart
                .draw_series(segments)
                .context("Failed to draw stacked bars")?
                .label(s.label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });

            if annotate {
                for (cat_idx, &v) in s.values.iter().enumerate() {
                    if v == 0 {
                        continue;
                    }
                    let x_center = cat_idx as f64 + 0.5;
                    let y_center = offsets[cat_idx] + v as f64 / 2.0;
                    chart
                        .draw_series(std::iter::once(Text::new(
                            v.to_string(),
                            (x_center, y_center),
                            ("sans-serif", 12).into_font().color(&WHITE),
                        )))
                        .context("Failed to draw annotation")?;
                }
            }

            for (cat_idx, &v) in s.values.iter().enumerate() {
                offsets[cat_idx] += v as f64;
            }
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .context("Failed to draw legend")?;

        root.present().context("Failed to present drawing")?;
    }

    encode_png(&buffer, width, height)
}

fn category_label(categories: &[String], x: f64) -> String {
    let idx = x as usize;
    match categories.get(idx) {
        Some(label) => label.clone(),
        None => String::new(),
    }
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}
