use kurbo::{Affine, Point, Rect, Vec2};

use crate::config::DrawingConfig;
use crate::error::{HandError, HandResult};
use crate::stroke::StrokePoint;

/// Savitzky-Golay smoothing weights, window 7, cubic fit.
const SMOOTHING: [f64; 7] = [-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0];
const SMOOTHING_NORM: f64 = 21.0;

/// Stroke colour and width of one line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
	pub color: String,
	pub width: f32,
}

/// One composed line in document coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedLine {
	/// Pen-down polylines, in drawing order.
	pub segments: Vec<Vec<Point>>,
	/// Box around every point; zero-sized at the row origin for blank rows.
	pub bounds: Rect,
	pub style: LineStyle,
}

impl RenderedLine {
	pub fn is_blank(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn point_count(&self) -> usize {
		self.segments.iter().map(Vec::len).sum()
	}
}

/// All lines of one call, laid out on a single canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawing {
	lines: Vec<RenderedLine>,
	width: f64,
	height: f64,
}

impl Drawing {
	pub fn lines(&self) -> &[RenderedLine] {
		&self.lines
	}

	/// Canvas `(width, height)`.
	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	/// Union of the bounding boxes of every non-blank line.
	pub fn bounds(&self) -> Option<Rect> {
		self.lines
			.iter()
			.filter(|l| !l.is_blank())
			.map(|l| l.bounds)
			.reduce(|a, b| a.union(b))
	}
}

/// Lays out generated lines one row below the other.
///
/// `lines[i]` is `None` for a blank row. Every line goes through:
/// offset scaling, cumulative sum, smoothing, de-slanting, y flip,
/// height normalization, then placement at the left margin of its row.
///
/// # Errors
/// `EmptyLine` if a non-blank line has no points, `LengthMismatch` if
/// `styles` and `lines` disagree.
pub fn compose(
	lines: &[Option<Vec<StrokePoint>>],
	styles: &[LineStyle],
	config: &DrawingConfig,
) -> HandResult<Drawing> {
	if styles.len() != lines.len() {
		return Err(HandError::LengthMismatch { field: "styles", expected: lines.len(), found: styles.len() });
	}

	let mut rendered = Vec::with_capacity(lines.len());
	for (row, (offsets, style)) in lines.iter().zip(styles).enumerate() {
		let row_top = config.margin + row as f64 * config.line_height;
		let line = match offsets {
			None => RenderedLine {
				segments: Vec::new(),
				bounds: Rect::new(config.margin, row_top, config.margin, row_top),
				style: style.clone(),
			},
			Some(offsets) if offsets.is_empty() => return Err(HandError::EmptyLine { line: row }),
			Some(offsets) => {
				let segments = layout_line(offsets, row_top, config);
				let bounds = bounding_box(&segments);
				RenderedLine { segments, bounds, style: style.clone() }
			}
		};
		rendered.push(line);
	}

	let rows_bottom = config.margin + lines.len() as f64 * config.line_height;
	let (width, height) = rendered
		.iter()
		.filter(|l| !l.is_blank())
		.fold((config.margin, rows_bottom), |(w, h), l| (w.max(l.bounds.x1), h.max(l.bounds.y1)));

	Ok(Drawing { lines: rendered, width: width + config.margin, height: height + config.margin })
}

/// Turns one line of offsets into placed pen-down polylines.
fn layout_line(offsets: &[StrokePoint], row_top: f64, config: &DrawingConfig) -> Vec<Vec<Point>> {
	let mut segments = split_strokes(offsets, config.offset_scale);

	if config.denoise {
		segments.iter_mut().for_each(|s| smooth(s));
	}
	if config.align {
		deslant(&mut segments);
	}

	apply(&mut segments, Affine::FLIP_Y);

	let bounds = bounding_box(&segments);
	if let Some(target) = config.stroke_height {
		if bounds.height() > f64::EPSILON {
			let k = target / bounds.height();
			apply(&mut segments, Affine::scale(k) * Affine::translate((-bounds.x0, -bounds.y0)));
		}
	}

	let bounds = bounding_box(&segments);
	let top = row_top + ((config.line_height - bounds.height()).max(0.0) / 2.0);
	apply(&mut segments, Affine::translate((config.margin - bounds.x0, top - bounds.y0)));
	segments
}

/// Accumulates offsets into absolute points and starts a new polyline after
/// every pen lift.
pub fn split_strokes(offsets: &[StrokePoint], scale: f64) -> Vec<Vec<Point>> {
	let mut segments = Vec::new();
	let mut current = Vec::new();
	let mut cursor = Point::ORIGIN;

	for p in offsets {
		cursor += Vec2::new(p.dx as f64 * scale, p.dy as f64 * scale);
		current.push(cursor);
		if p.pen.is_lift() {
			segments.push(std::mem::take(&mut current));
		}
	}
	if !current.is_empty() {
		segments.push(current);
	}
	segments
}

/// Savitzky-Golay smoothing of one polyline, edges padded with their nearest point.
fn smooth(stroke: &mut [Point]) {
	if stroke.len() < 3 {
		return;
	}
	let last = stroke.len() as isize - 1;
	let source = stroke.to_vec();
	for (i, point) in stroke.iter_mut().enumerate() {
		let (mut x, mut y) = (0.0, 0.0);
		for (k, w) in SMOOTHING.iter().enumerate() {
			let j = (i as isize + k as isize - 3).clamp(0, last) as usize;
			x += w * source[j].x;
			y += w * source[j].y;
		}
		*point = Point::new(x / SMOOTHING_NORM, y / SMOOTHING_NORM);
	}
}

/// Rotates the line so that its least-squares fit becomes horizontal.
fn deslant(segments: &mut [Vec<Point>]) {
	let points = segments.iter().flatten();
	let n = points.clone().count() as f64;
	if n < 2.0 {
		return;
	}
	let mean_x = points.clone().map(|p| p.x).sum::<f64>() / n;
	let mean_y = points.clone().map(|p| p.y).sum::<f64>() / n;
	let var_x: f64 = points.clone().map(|p| (p.x - mean_x).powi(2)).sum();
	let cov: f64 = points.map(|p| (p.x - mean_x) * (p.y - mean_y)).sum();
	if var_x <= f64::EPSILON {
		return;
	}
	let theta = (cov / var_x).atan();
	apply(segments, Affine::rotate(-theta));
}

fn apply(segments: &mut [Vec<Point>], transform: Affine) {
	for point in segments.iter_mut().flatten() {
		*point = transform * *point;
	}
}

fn bounding_box(segments: &[Vec<Point>]) -> Rect {
	let mut points = segments.iter().flatten();
	let Some(first) = points.next() else {
		return Rect::ZERO;
	};
	points.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
}
