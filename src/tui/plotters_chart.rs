//! Plotters-powered price vs. living-area scatter widget for Ratatui.
//!
//! Plotters gives nicer axes and tick labels than Ratatui's built-in `Chart`.
//! Output is rendered into the Ratatui buffer with `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description; series and bounds are computed by the caller.
pub struct ScatterChart<'a> {
    /// Every sale as `(living_area, sale_price)`.
    pub points: &'a [(f64, f64)],
    /// Sales in the tight comparable set (a subset of `points`).
    pub comparables: &'a [(f64, f64)],
    /// The query at its predicted price; drawn as a crosshair.
    pub highlight: (f64, f64),
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for ScatterChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let sale_color = RGBColor(160, 160, 160);
            let comparable_color = RGBColor(0, 255, 0);
            let query_color = RGBColor(255, 0, 255);

            chart.draw_series(self.points.iter().map(|&(x, y)| Pixel::new((x, y), sale_color)))?;
            chart.draw_series(
                self.comparables
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), comparable_color)),
            )?;

            // `Circle` radii are mis-scaled by the ratatui backend, so the query
            // is marked with two short line segments instead.
            let (hx, hy) = self.highlight;
            let dx = (x1 - x0) * 0.03;
            let dy = (y1 - y0) * 0.05;
            chart.draw_series(LineSeries::new([(hx - dx, hy), (hx + dx, hy)], &query_color))?;
            chart.draw_series(LineSeries::new([(hx, hy - dy), (hx, hy + dy)], &query_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
