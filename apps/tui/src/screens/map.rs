//! Map pane: a world-map canvas driven through [`MapHandle`].

use std::cell::Cell;
use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use waymark_core::MapHandle;
use waymark_core::geo::Bounds;
use waymark_core::popup::Popup;
use waymark_core::{Marker, RouteLayout};
use waymark_shared::Coordinate;

/// Longitude span visible across the pane at zoom 0.
const LNG_SPAN_AT_ZOOM_0: f64 = 360.0;
const MAX_ZOOM: f64 = 18.0;
/// Nominal pixel width of one terminal column, for padding conversion.
const CELL_PX: f64 = 8.0;
const FLY_DURATION: Duration = Duration::from_millis(600);

/// Center and zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct View {
    pub center: Coordinate,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    View(View),
    /// Resolved against the pane size at draw time.
    Fit { bounds: Bounds, padding_px: u32 },
}

/// Terminal map camera. Flights animate over [`FLY_DURATION`]; fits and
/// direct placements are immediate.
#[derive(Debug)]
pub(crate) struct CanvasCamera {
    from: View,
    target: Target,
    started: Instant,
    duration: Duration,
    /// Inner pane size in cells, updated on every draw.
    size: Cell<(u16, u16)>,
}

impl CanvasCamera {
    pub(crate) fn new() -> Self {
        let world = View {
            center: Coordinate::new(20.0, 0.0),
            zoom: 0.0,
        };
        Self {
            from: world,
            target: Target::View(world),
            started: Instant::now(),
            duration: Duration::ZERO,
            size: Cell::new((80, 24)),
        }
    }

    pub(crate) fn set_size(&self, width: u16, height: u16) {
        if width > 0 && height > 0 {
            self.size.set((width, height));
        }
    }

    /// Latitude degrees per longitude degree on screen. Cells are roughly
    /// twice as tall as they are wide.
    fn aspect(&self) -> f64 {
        let (width, height) = self.size.get();
        f64::from(height) * 2.0 / f64::from(width)
    }

    /// Visible `(lng, lat)` span in degrees at `zoom`.
    pub(crate) fn span_at(&self, zoom: f64) -> (f64, f64) {
        let lng = LNG_SPAN_AT_ZOOM_0 / 2f64.powf(zoom);
        (lng, lng * self.aspect())
    }

    /// Highest zoom at which `bounds` plus padding fits the pane.
    pub(crate) fn fit_zoom(&self, bounds: &Bounds, padding_px: u32) -> f64 {
        let (width, _) = self.size.get();
        let pad = 1.0 + 2.0 * f64::from(padding_px) / (f64::from(width) * CELL_PX);
        let (bounds_lng, bounds_lat) = bounds.span();

        let by_lng = if bounds_lng > 0.0 {
            (LNG_SPAN_AT_ZOOM_0 / (bounds_lng * pad)).log2()
        } else {
            MAX_ZOOM
        };
        let by_lat = if bounds_lat > 0.0 {
            (LNG_SPAN_AT_ZOOM_0 * self.aspect() / (bounds_lat * pad)).log2()
        } else {
            MAX_ZOOM
        };
        by_lng.min(by_lat).clamp(0.0, MAX_ZOOM)
    }

    fn resolve(&self, target: Target) -> View {
        match target {
            Target::View(view) => view,
            Target::Fit { bounds, padding_px } => View {
                center: bounds.center(),
                zoom: self.fit_zoom(&bounds, padding_px),
            },
        }
    }

    /// Camera position at `now`, mid-flight if a flight is running.
    pub(crate) fn view_at(&self, now: Instant) -> View {
        let to = self.resolve(self.target);
        if self.duration.is_zero() {
            return to;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        let e = ease_in_out(t);
        View {
            center: Coordinate {
                lat: lerp(self.from.center.lat, to.center.lat, e),
                lng: lerp(self.from.center.lng, to.center.lng, e),
            },
            zoom: lerp(self.from.zoom, to.zoom, e),
        }
    }

    pub(crate) fn is_animating(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.duration
    }

    fn jump(&mut self, target: Target) {
        let now = Instant::now();
        self.from = self.view_at(now);
        self.target = target;
        self.started = now;
        self.duration = Duration::ZERO;
    }
}

impl MapHandle for CanvasCamera {
    fn fly_to(&mut self, center: Coordinate, zoom: f64) {
        let now = Instant::now();
        self.from = self.view_at(now);
        self.target = Target::View(View {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
        });
        self.started = now;
        self.duration = FLY_DURATION;
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32) {
        self.jump(Target::Fit { bounds, padding_px });
    }

    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        self.jump(Target::View(View {
            center,
            zoom: zoom.clamp(0.0, MAX_ZOOM),
        }));
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Everything the map pane draws for one frame.
pub(crate) struct MapScene<'s, 'a> {
    pub title: &'s str,
    pub markers: &'s [Marker<'a>],
    pub route: &'s RouteLayout,
    pub active: Option<usize>,
    pub popup: Option<&'s Popup>,
}

pub(crate) fn draw(f: &mut Frame, area: Rect, camera: &CanvasCamera, scene: &MapScene<'_, '_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", scene.title));
    let inner = block.inner(area);
    camera.set_size(inner.width, inner.height);

    let view = camera.view_at(Instant::now());
    let (lng_span, lat_span) = camera.span_at(view.zoom);
    let x_bounds = [view.center.lng - lng_span / 2.0, view.center.lng + lng_span / 2.0];
    let y_bounds = [view.center.lat - lat_span / 2.0, view.center.lat + lat_span / 2.0];
    let resolution = if view.zoom >= 3.0 {
        MapResolution::High
    } else {
        MapResolution::Low
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| paint(ctx, scene, resolution, lng_span));
    f.render_widget(canvas, area);

    if let Some(popup) = scene.popup {
        draw_popup(f, inner, popup);
    }
}

fn paint(ctx: &mut Context<'_>, scene: &MapScene<'_, '_>, resolution: MapResolution, lng_span: f64) {
    ctx.draw(&Map {
        color: Color::DarkGray,
        resolution,
    });
    ctx.layer();

    for pair in scene.route.line.windows(2) {
        ctx.draw(&CanvasLine::new(
            pair[0].lng,
            pair[0].lat,
            pair[1].lng,
            pair[1].lat,
            Color::Blue,
        ));
    }

    for connector in &scene.route.connectors {
        let dots = dashed(connector.from, connector.to, lng_span / 60.0);
        ctx.draw(&Points {
            coords: &dots,
            color: Color::LightBlue,
        });
    }
    ctx.layer();

    for segment in &scene.route.segments {
        if let Some(mode) = segment.transport {
            ctx.print(
                segment.midpoint.lng,
                segment.midpoint.lat,
                Span::styled(mode.glyph().to_string(), Style::default().fg(Color::White)),
            );
        }
    }

    for marker in scene.markers {
        let is_active = scene.active == Some(marker.index);
        let (label, style) = if is_active {
            (
                format!("◉ {}", marker.step.name),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )
        } else if marker.step.is_side_trip() {
            ("◦".to_string(), Style::default().fg(Color::LightBlue))
        } else {
            ("●".to_string(), Style::default().fg(Color::Red))
        };
        ctx.print(marker.coord.lng, marker.coord.lat, Span::styled(label, style));
    }
}

/// Upper bound on sample positions along one connector.
const MAX_DASH_SAMPLES: usize = 2048;

/// Alternate dot runs along a straight segment, `step` degrees apart.
pub(crate) fn dashed(from: Coordinate, to: Coordinate, step: f64) -> Vec<(f64, f64)> {
    let dx = to.lng - from.lng;
    let dy = to.lat - from.lat;
    let length = dx.hypot(dy);
    if length == 0.0 || !length.is_finite() || step <= 0.0 {
        return vec![(from.lng, from.lat)];
    }
    // Coarser spacing for segments that would need more samples than the cap.
    let count = ((length / step).ceil().min(MAX_DASH_SAMPLES as f64) as usize).max(1);
    (0..=count)
        .filter(|i| (i / 3) % 2 == 0)
        .map(|i| {
            let t = (i as f64 / count as f64).min(1.0);
            (from.lng + dx * t, from.lat + dy * t)
        })
        .collect()
}

fn draw_popup(f: &mut Frame, inner: Rect, popup: &Popup) {
    let mut lines = vec![Line::from(vec![
        Span::styled(popup.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", popup.badge), Style::default().fg(Color::Cyan)),
    ])];
    let mut meta = Vec::new();
    if let Some(region) = &popup.region {
        meta.push(region.clone());
    }
    if let Some(duration) = &popup.duration {
        meta.push(duration.clone());
    }
    if popup.photo_count > 0 {
        meta.push(format!("{} photos", popup.photo_count));
    }
    if !meta.is_empty() {
        lines.push(Line::from(meta.join(" · ")).style(Style::default().fg(Color::Gray)));
    }
    if let Some(excerpt) = &popup.excerpt {
        lines.push(Line::from(excerpt.clone()));
    }

    let width = inner.width.min(48);
    let height = (lines.len() as u16 + 3).min(inner.height);
    if width < 10 || height < 3 {
        return;
    }
    let area = Rect::new(
        inner.x + inner.width - width,
        inner.y + inner.height - height,
        width,
        height,
    );

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().bg(Color::Black));
    f.render_widget(Clear, area);
    f.render_widget(card, area);
}
