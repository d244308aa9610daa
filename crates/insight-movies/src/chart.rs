//! Bar chart of the top-rated movies, rendered to SVG.

use crate::Movie;
use insight_common::{InsightError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

pub const CHART_SIZE: (u32, u32) = (1200, 800);
pub const CAPTION: &str = "评分最高的10部电影";
const X_DESC: &str = "电影排名";
const Y_DESC: &str = "评分";
const LEGEND_HEADING: &str = "电影名称";
const LEGEND_TITLE_CHARS: usize = 15;
/// Width of the plot; the rest of the canvas holds the legend.
const PLOT_WIDTH: i32 = 920;
const LEGEND_ROW_HEIGHT: i32 = 28;

// Ten evenly spaced stops of the viridis colormap.
const VIRIDIS: [RGBColor; 10] = [
    RGBColor(68, 1, 84),
    RGBColor(72, 40, 120),
    RGBColor(62, 73, 137),
    RGBColor(49, 104, 142),
    RGBColor(38, 130, 142),
    RGBColor(31, 158, 137),
    RGBColor(53, 183, 121),
    RGBColor(110, 206, 88),
    RGBColor(181, 222, 43),
    RGBColor(253, 231, 37),
];

/// Render one bar per movie, in the given order, to an SVG file at `path`.
pub fn render_bar_chart(movies: &[Movie], path: &Path) -> Result<()> {
    if movies.is_empty() {
        return Err(InsightError::Chart("no movies to plot".to_string()));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw(&root, movies).map_err(|e| InsightError::Chart(e.to_string()))?;
    root.present().map_err(|e| InsightError::Chart(e.to_string()))?;

    info!("Chart with {} bars written to {}", movies.len(), path.display());
    Ok(())
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    movies: &[Movie],
) -> std::result::Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;
    let (plot_area, legend_area) = root.split_horizontally(PLOT_WIDTH);

    let n = movies.len();
    let y_max = y_axis_max(movies);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(CAPTION, ("sans-serif", 32).into_font().style(FontStyle::Bold))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&rank_label)
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .draw()?;

    for (i, movie) in movies.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), movie.average),
            ],
            bar_color(i, n).filled(),
        )))?;
    }

    let value_style =
        TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(movies.iter().enumerate().map(|(i, movie)| {
        Text::new(
            format!("{:.1}", movie.average),
            (SegmentValue::CenterOf(i), movie.average + 0.01),
            value_style.clone(),
        )
    }))?;

    draw_legend(&legend_area, movies)
}

/// Colour swatch and (truncated) title per bar, beside the plot rather than over it.
fn draw_legend(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    movies: &[Movie],
) -> std::result::Result<(), DrawingAreaErrorKind<std::io::Error>> {
    let n = movies.len();
    area.draw(&Text::new(
        LEGEND_HEADING,
        (10, 70),
        ("sans-serif", 18).into_font().style(FontStyle::Bold),
    ))?;

    for (i, movie) in movies.iter().enumerate() {
        let y = 100 + i as i32 * LEGEND_ROW_HEIGHT;
        area.draw(&Rectangle::new([(10, y), (26, y + 16)], bar_color(i, n).filled()))?;
        area.draw(&Text::new(
            legend_title(&movie.title),
            (34, y),
            ("sans-serif", 14).into_font(),
        ))?;
    }

    Ok(())
}

fn y_axis_max(movies: &[Movie]) -> f64 {
    let top = movies.iter().map(|m| m.average).fold(0.0, f64::max);
    (top * 1.1).max(10.0)
}

fn bar_color(index: usize, total: usize) -> RGBColor {
    let step = if total > 1 {
        index * (VIRIDIS.len() - 1) / (total - 1)
    } else {
        0
    };
    VIRIDIS[step.min(VIRIDIS.len() - 1)]
}

fn rank_label(value: &SegmentValue<usize>) -> String {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => format!("第{}名", i + 1),
        SegmentValue::Last => String::new(),
    }
}

/// Titles longer than 15 characters are cut and suffixed with `...`.
pub fn legend_title(title: &str) -> String {
    if title.chars().count() > LEGEND_TITLE_CHARS {
        let cut: String = title.chars().take(LEGEND_TITLE_CHARS).collect();
        format!("{}...", cut)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, average: f64) -> Movie {
        Movie {
            title: title.to_string(),
            average,
            country: None,
            genre: None,
            release_date: None,
            votes: None,
        }
    }

    #[test]
    fn test_legend_title_truncation() {
        assert_eq!(legend_title("霸王别姬"), "霸王别姬");
        assert_eq!(
            legend_title("The Lord of the Rings: The Return of the King"),
            "The Lord of the..."
        );
        assert_eq!(legend_title("一二三四五六七八九十一二三四五"), "一二三四五六七八九十一二三四五");
    }

    #[test]
    fn test_bar_colors_span_colormap() {
        assert_eq!(bar_color(0, 10), VIRIDIS[0]);
        assert_eq!(bar_color(9, 10), VIRIDIS[9]);
        assert_eq!(bar_color(0, 1), VIRIDIS[0]);
        assert_eq!(bar_color(2, 3), VIRIDIS[9]);
    }

    #[test]
    fn test_y_axis_headroom() {
        assert!((y_axis_max(&[movie("a", 9.7)]) - 10.67).abs() < 1e-9);
        assert_eq!(y_axis_max(&[movie("a", 5.0)]), 10.0);
    }

    #[test]
    fn test_empty_chart_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = render_bar_chart(&[], &dir.path().join("empty.svg"));
        assert!(matches!(result, Err(InsightError::Chart(_))));
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("top.svg");
        let movies = vec![movie("肖申克的救赎", 9.7), movie("霸王别姬", 9.6)];

        render_bar_chart(&movies, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(CAPTION));
        assert!(svg.contains("第1名"));
        assert!(svg.contains("霸王别姬"));
        assert!(svg.contains("9.7"));
    }

    #[test]
    fn test_legend_sits_beside_plot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legend.svg");
        let movies = vec![
            movie("The Lord of the Rings: The Return of the King", 9.5),
            movie("霸王别姬", 9.6),
        ];

        render_bar_chart(&movies, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(LEGEND_HEADING));
        assert!(svg.contains("The Lord of the..."));
        assert!(PLOT_WIDTH < CHART_SIZE.0 as i32);
    }

    #[test]
    fn test_render_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("nested").join("top.svg");

        render_bar_chart(&[movie("a", 8.0)], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_directory_is_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("top.svg");

        let result = render_bar_chart(&[movie("a", 8.0)], &path);
        assert!(matches!(result, Err(InsightError::Io(_))));
    }
}
