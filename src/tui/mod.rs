//! Ratatui-based terminal UI.
//!
//! A form of the twelve query inputs on the left; the estimate, a tabbed view
//! (distribution / scatter / map) and the comparables list on the right.
//! Nothing is recomputed until the user presses `e`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs,
        canvas::{Canvas, Points},
    },
};

use crate::engine::{EngineSettings, EstimationContext, EstimationOutput, Estimator, INPUT_FIELDS, QueryInput};
use crate::error::{AppError, EngineError};
use crate::report::{format_area, format_price};
use crate::views::{DistributionPayload, HighlightMarker, MapMarker, MapPayload};

mod plotters_chart;

use plotters_chart::ScatterChart;

/// Form values used for any field not supplied on the command line.
const DEFAULT_FORM: [&str; 12] = [
    "1500", "2000", "2000", "3", "2", "480", "2", "1", "false", "0", "1000", "9000",
];

/// Start the TUI.
pub fn run(context: Arc<EstimationContext>, settings: EngineSettings, initial: QueryInput) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(Estimator::new(context, settings), &initial);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Distribution,
    Scatter,
    Map,
}

impl View {
    const ALL: [View; 3] = [View::Distribution, View::Scatter, View::Map];

    fn title(self) -> &'static str {
        match self {
            View::Distribution => "Distribution",
            View::Scatter => "Scatter",
            View::Map => "Map",
        }
    }

    fn index(self) -> usize {
        match self {
            View::Distribution => 0,
            View::Scatter => 1,
            View::Map => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct App {
    estimator: Estimator,
    form: [String; 12],
    selected: usize,
    /// Edit buffer for the selected field, while editing.
    edit: Option<String>,
    view: View,
    status: String,
}

impl App {
    fn new(estimator: Estimator, initial: &QueryInput) -> Self {
        let form = std::array::from_fn(|i| {
            initial
                .get(INPUT_FIELDS[i])
                .unwrap_or(DEFAULT_FORM[i])
                .to_string()
        });
        Self {
            estimator,
            form,
            selected: 0,
            edit: None,
            view: View::Distribution,
            status: "Press e to estimate.".to_string(),
        }
    }

    fn query_input(&self) -> QueryInput {
        let mut input = QueryInput::new();
        for (name, value) in INPUT_FIELDS.iter().zip(self.form.iter()) {
            input.set(name, value.clone());
        }
        input
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.edit.is_some() {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(INPUT_FIELDS.len() - 1),
            KeyCode::Enter => {
                self.edit = Some(self.form[self.selected].clone());
                self.status = format!("Editing {}. Enter to apply, Esc to cancel.", INPUT_FIELDS[self.selected]);
            }
            KeyCode::Char(' ') if INPUT_FIELDS[self.selected] == "has_fireplace" => {
                let on = matches!(self.form[self.selected].to_ascii_lowercase().as_str(), "true" | "yes" | "y" | "1");
                self.form[self.selected] = (!on).to_string();
            }
            KeyCode::Char('e') => self.estimate(),
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        let Some(buffer) = self.edit.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => {
                self.edit = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let value = buffer.trim().to_string();
                self.status = format!("{} = {value}", INPUT_FIELDS[self.selected]);
                self.form[self.selected] = value;
                self.edit = None;
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) if c.is_ascii_alphanumeric() || c == '.' || c == '-' => buffer.push(c),
            _ => {}
        }
    }

    fn estimate(&mut self) {
        let input = self.query_input();
        match self.estimator.estimate(&input) {
            Ok(out) => {
                self.status = format!(
                    "Estimated {} | {} comparables | cohort {}",
                    out.formatted_price,
                    out.result.comparables.len(),
                    out.distribution.cohort_size
                );
            }
            Err(err) => {
                if let EngineError::Validation { field, .. } = &err {
                    if let Some(idx) = INPUT_FIELDS.iter().position(|f| *f == field.as_str()) {
                        self.selected = idx;
                    }
                }
                self.status = err.to_string();
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let context = self.estimator.context();
        let stats = context.dataset().stats();
        let quality = &context.model().quality;

        let estimate = match self.estimator.latest() {
            Some(out) => Span::styled(
                out.formatted_price.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled("-", Style::default().fg(Color::Gray)),
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("comps", Style::default().fg(Color::Cyan)),
                Span::raw(" - comparable sales price estimator"),
            ]),
            Line::from(Span::styled(
                format!(
                    "sales: {} | geocoded: {} | model R2={:.3} RMSE={}",
                    stats.n_records,
                    stats.n_geocoded,
                    quality.r_squared,
                    format_price(quality.rmse, &self.estimator.settings().currency_symbol),
                ),
                Style::default().fg(Color::Gray),
            )),
            Line::from(vec![Span::raw("Estimated price: "), estimate]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(36), Constraint::Min(0)])
            .split(area);

        self.draw_form(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(9)])
            .split(columns[1]);

        let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()))
            .select(self.view.index())
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White));
        frame.render_widget(tabs, right[0]);

        self.draw_view(frame, right[1]);
        self.draw_comparables(frame, right[2]);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = INPUT_FIELDS
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = match &self.edit {
                    Some(buffer) if i == self.selected => format!("{buffer}_"),
                    _ => self.form[i].clone(),
                };
                ListItem::new(format!("{name:<15} {value}"))
            })
            .collect();

        let title = if self.edit.is_some() { "Query (editing)" } else { "Query" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_view(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(out) = self.estimator.latest() else {
            let msg = Paragraph::new("No estimate yet. Fill in the form and press e.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        match self.view {
            View::Distribution => self.draw_distribution(frame, inner, &out.distribution),
            View::Scatter => self.draw_scatter(frame, inner, out),
            View::Map => draw_map(frame, inner, &out.map),
        }
    }

    fn draw_distribution(&self, frame: &mut ratatui::Frame<'_>, area: Rect, payload: &DistributionPayload) {
        if payload.buckets.is_empty() {
            let msg = Paragraph::new("No sales within 200 sqft of the query.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, area);
            return;
        }

        let currency = &self.estimator.settings().currency_symbol;
        let bars: Vec<Bar> = histogram_bars(payload, currency)
            .into_iter()
            .map(|b| {
                let color = if b.marked { Color::Magenta } else { Color::Cyan };
                Bar::default()
                    .value(b.count)
                    .label(Line::from(b.label))
                    .style(Style::default().fg(color))
            })
            .collect();

        let n = bars.len() as u16;
        let bar_width = (area.width / n.max(1)).saturating_sub(1).max(1);
        let chart = BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width)
            .bar_gap(1);
        frame.render_widget(chart, area);
    }

    fn draw_scatter(&self, frame: &mut ratatui::Frame<'_>, area: Rect, out: &EstimationOutput) {
        let dataset = self.estimator.context().dataset();
        let points: Vec<(f64, f64)> = out.scatter.points.iter().map(|p| (p.living_area, p.sale_price)).collect();
        let comparables: Vec<(f64, f64)> = out
            .result
            .comparables
            .records(dataset)
            .map(|r| (r.living_area, r.sale_price))
            .collect();

        let (x, y) = out.scatter.bounds();
        let widget = ScatterChart {
            points: &points,
            comparables: &comparables,
            highlight: (out.scatter.highlight.living_area, out.scatter.highlight.sale_price),
            x_bounds: padded(x),
            y_bounds: padded(y),
            x_label: "living area (sqft)",
            y_label: "price",
            fmt_x: fmt_axis_area,
            fmt_y: fmt_axis_price,
        };
        frame.render_widget(widget, area);
    }

    fn draw_comparables(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dataset = self.estimator.context().dataset();
        let currency = &self.estimator.settings().currency_symbol;

        let (title, items): (String, Vec<ListItem>) = match self.estimator.latest() {
            Some(out) => (
                format!("Comparables ({})", out.result.comparables.len()),
                out.result
                    .comparables
                    .records(dataset)
                    .map(|r| {
                        ListItem::new(format!(
                            "{:>10} | {:>6} sqft | {} bd | {} car | built {}",
                            format_price(r.sale_price, currency),
                            format_area(r.living_area),
                            r.bedrooms,
                            r.garage_cars,
                            r.year_built
                        ))
                    })
                    .collect(),
            ),
            None => ("Comparables".to_string(), Vec::new()),
        };

        let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  Enter edit  Space toggle  e estimate  Tab view  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_map(frame: &mut ratatui::Frame<'_>, area: Rect, payload: &MapPayload) {
    match payload {
        MapPayload::NoData { center, message } => {
            let text = Text::from(vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("({:.4}, {:.4})", center.latitude, center.longitude),
                    Style::default().fg(Color::Gray),
                )),
            ]);
            let p = Paragraph::new(text).alignment(Alignment::Center);
            frame.render_widget(p, area);
        }
        MapPayload::Comparables { markers, highlight } => {
            let (x_bounds, y_bounds) = map_bounds(markers, highlight);
            let coords: Vec<(f64, f64)> = markers
                .iter()
                .map(|m| (m.position.longitude, m.position.latitude))
                .collect();
            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .paint(move |ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::Green,
                    });
                    ctx.layer();
                    ctx.print(
                        highlight.position.longitude,
                        highlight.position.latitude,
                        Span::styled(
                            format!("* {}", highlight.label),
                            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                        ),
                    );
                });
            frame.render_widget(canvas, area);
        }
    }
}

struct HistogramBar {
    label: String,
    count: u64,
    marked: bool,
}

fn histogram_bars(payload: &DistributionPayload, currency: &str) -> Vec<HistogramBar> {
    let marker = payload.marker_bucket();
    payload
        .buckets
        .iter()
        .enumerate()
        .map(|(i, b)| HistogramBar {
            label: short_price(b.lower, currency),
            count: b.count as u64,
            marked: marker == Some(i),
        })
        .collect()
}

/// `[lon, lon]` and `[lat, lat]` canvas bounds around all markers.
fn map_bounds(markers: &[MapMarker], highlight: &HighlightMarker) -> ([f64; 2], [f64; 2]) {
    let mut lon = [highlight.position.longitude; 2];
    let mut lat = [highlight.position.latitude; 2];
    for m in markers {
        lon = [lon[0].min(m.position.longitude), lon[1].max(m.position.longitude)];
        lat = [lat[0].min(m.position.latitude), lat[1].max(m.position.latitude)];
    }
    let pad = |[lo, hi]: [f64; 2]| {
        let p = ((hi - lo) * 0.1).max(0.002);
        [lo - p, hi + p]
    };
    (pad(lon), pad(lat))
}

fn padded([lo, hi]: [f64; 2]) -> [f64; 2] {
    if !(lo.is_finite() && hi.is_finite()) {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo).abs() * 0.05).max(1.0);
    [lo - pad, hi + pad]
}

fn short_price(v: f64, currency: &str) -> String {
    let a = v.abs();
    let sign = if v < 0.0 { "-" } else { "" };
    if a >= 1_000_000.0 {
        format!("{sign}{currency}{:.1}M", a / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{sign}{currency}{:.0}k", a / 1_000.0)
    } else {
        format_price(v, currency)
    }
}

fn fmt_axis_area(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_price(v: f64) -> String {
    format!("{:.0}k", v / 1_000.0)
}
