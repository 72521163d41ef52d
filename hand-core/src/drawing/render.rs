use std::path::Path;

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Path as SvgPath, Rectangle};

use super::compose::{Drawing, RenderedLine};
use crate::error::HandResult;

/// Builds the SVG document of a drawing: a white background and one path per
/// written line. Blank rows emit nothing.
pub fn render(drawing: &Drawing) -> Document {
	let (width, height) = drawing.size();

	let background = Rectangle::new()
		.set("x", 0)
		.set("y", 0)
		.set("width", width)
		.set("height", height)
		.set("fill", "white");

	let mut document = Document::new().add(background);
	for line in drawing.lines().iter().filter(|l| !l.is_blank()) {
		document = document.add(line_path(line));
	}

	document
		.set("viewBox", (0, 0, width, height))
		.set("width", format!("{width}px"))
		.set("height", format!("{height}px"))
}

/// Writes a rendered document to `path`.
pub fn save<P: AsRef<Path>>(path: P, document: &Document) -> HandResult<()> {
	svg::save(path, document)?;
	Ok(())
}

fn line_path(line: &RenderedLine) -> SvgPath {
	let mut data = Data::new();
	for segment in &line.segments {
		let Some(first) = segment.first() else {
			continue;
		};
		data = data.move_to((first.x as f32, first.y as f32));
		if segment.len() == 1 {
			// a lone point still leaves a dot thanks to the round caps
			data = data.line_to((first.x as f32, first.y as f32));
		}
		for p in &segment[1..] {
			data = data.line_to((p.x as f32, p.y as f32));
		}
	}

	SvgPath::new()
		.set("fill", "none")
		.set("stroke", line.style.color.as_str())
		.set("stroke-width", line.style.width)
		.set("stroke-linecap", "round")
		.set("stroke-linejoin", "round")
		.set("d", data)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::DrawingConfig;
	use crate::drawing::compose::{LineStyle, compose};
	use crate::stroke::{PenState, StrokePoint};

	fn drawing() -> Drawing {
		let strokes = vec![
			StrokePoint::new(1.0, 1.0, PenState::Down),
			StrokePoint::new(4.0, 2.0, PenState::Lift),
			StrokePoint::new(3.0, -1.0, PenState::Lift),
			StrokePoint::new(2.0, 0.0, PenState::Down),
			StrokePoint::new(2.0, 3.0, PenState::Down),
		];
		let styles = vec![
			LineStyle { color: "red".to_owned(), width: 1.0 },
			LineStyle { color: "blue".to_owned(), width: 3.0 },
		];
		compose(&[Some(strokes), None], &styles, &DrawingConfig::default()).unwrap()
	}

	#[test]
	fn one_path_per_written_line() {
		let svg = render(&drawing()).to_string();
		assert_eq!(svg.matches("<path").count(), 1);
		assert!(svg.contains(r#"stroke="red""#));
		assert!(!svg.contains(r#"stroke="blue""#));
		assert!(svg.contains(r#"fill="white""#));
	}

	#[test]
	fn every_segment_starts_with_a_move() {
		let drawing = drawing();
		let svg = render(&drawing).to_string();
		let segments = drawing.lines()[0].segments.len();
		assert_eq!(segments, 3);
		let d = svg.split(r#" d=""#).nth(1).unwrap();
		assert_eq!(d.matches('M').count(), segments);
	}

	#[test]
	fn saves_to_disk() {
		let path = std::env::temp_dir().join(format!("hand-render-{}.svg", std::process::id()));
		save(&path, &render(&drawing())).unwrap();
		let written = std::fs::read_to_string(&path).unwrap();
		assert!(written.starts_with("<svg"));
		std::fs::remove_file(path).unwrap();
	}
}
