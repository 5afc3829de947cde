use crate::layout::{CORNER_RADIUS, Geometry, NodeBox};
use crate::model::Category;
use crate::palette::category_color;
use crate::theme::Theme;
use std::fmt::Write as _;
use thiserror::Error;

/// Internal inconsistency between geometry and drawable output. Fatal for the
/// affected entity only.
#[derive(Debug, Error)]
#[error("render failed: {0}")]
pub struct RenderError(pub String);

const LEGEND_X: f32 = 10.0;
const LEGEND_Y: f32 = 30.0;
const LEGEND_HEIGHT: f32 = 40.0;
const LEGEND_SLOT_WIDTH: f32 = 120.0;
const LEGEND_SWATCH_WIDTH: f32 = 100.0;
const LEGEND_SWATCH_HEIGHT: f32 = 20.0;

/// Produces one self-contained SVG artifact: title, legend band, then the
/// tree body. No external asset references beyond the named font family.
pub fn render_svg(geometry: &Geometry, theme: &Theme) -> Result<String, RenderError> {
    check_geometry(geometry)?;

    let mut svg = String::new();
    let width = geometry.width;
    let height = geometry.height;

    let _ = write!(
        svg,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );

    // Title, top-left, underlined.
    let _ = write!(
        svg,
        "<text x=\"10\" y=\"20\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" text-decoration=\"underline\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.title_font_size,
        theme.text_color,
        escape_xml(&geometry.title)
    );

    render_legend(&mut svg, geometry, theme);

    for connector in &geometry.connectors {
        let _ = write!(
            svg,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
            points_to_path(&connector.points),
            theme.line_color
        );
    }

    render_node(&mut svg, &geometry.entity, theme, theme.font_size + 1.0);
    for node in &geometry.column1 {
        render_node(&mut svg, node, theme, theme.font_size);
    }
    for node in &geometry.column2 {
        render_node(&mut svg, node, theme, theme.sub_font_size);
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn check_geometry(geometry: &Geometry) -> Result<(), RenderError> {
    if !geometry.width.is_finite() || !geometry.height.is_finite() || geometry.width <= 0.0 || geometry.height <= 0.0 {
        return Err(RenderError(format!(
            "canvas {}x{} is not drawable",
            geometry.width, geometry.height
        )));
    }
    if let Some(connector) = geometry
        .connectors
        .iter()
        .find(|connector| connector.points.len() < 2)
    {
        return Err(RenderError(format!(
            "connector {:?} has fewer than two points",
            connector.kind
        )));
    }
    Ok(())
}

fn render_legend(svg: &mut String, geometry: &Geometry, theme: &Theme) {
    if geometry.legend.is_empty() {
        return;
    }
    let band_width = 90.0 + geometry.legend.len() as f32 * LEGEND_SLOT_WIDTH;
    let _ = write!(
        svg,
        "<rect x=\"{LEGEND_X}\" y=\"{LEGEND_Y}\" width=\"{band_width}\" height=\"{LEGEND_HEIGHT}\" rx=\"5\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        theme.legend_background, theme.box_border_color
    );
    let _ = write!(
        svg,
        "<text x=\"20\" y=\"50\" font-family=\"{}\" font-size=\"11\" font-weight=\"bold\" fill=\"{}\">Legend:</text>",
        theme.font_family, theme.text_color
    );
    for (index, entry) in geometry.legend.iter().enumerate() {
        let slot_x = 100.0 + index as f32 * LEGEND_SLOT_WIDTH;
        let _ = write!(
            svg,
            "<rect x=\"{slot_x}\" y=\"40\" width=\"{LEGEND_SWATCH_WIDTH}\" height=\"{LEGEND_SWATCH_HEIGHT}\" rx=\"3\" fill=\"{}\" stroke=\"{}\"/>",
            entry.color, theme.box_border_color
        );
        let label_x = slot_x + 5.0;
        let _ = write!(
            svg,
            "<text x=\"{label_x}\" y=\"53\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            theme.font_family, theme.legend_font_size, theme.text_color, entry.label
        );
    }
}

fn render_node(svg: &mut String, node: &NodeBox, theme: &Theme, font_size: f32) {
    let _ = write!(
        svg,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{CORNER_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        node.x,
        node.y,
        node.width,
        node.height,
        category_color(node.category),
        theme.box_border_color
    );

    let center_x = node.x + node.width / 2.0;
    let baseline_y = node.y + 18.0;
    let (fill, weight) = if node.category == Category::Entity {
        (theme.entity_text_color.as_str(), " font-weight=\"bold\"")
    } else {
        (theme.text_color.as_str(), "")
    };
    let _ = write!(
        svg,
        "<text x=\"{center_x}\" y=\"{baseline_y}\" font-family=\"{}\" font-size=\"{font_size}\" text-anchor=\"middle\"{weight} fill=\"{fill}\">{}</text>",
        theme.font_family,
        escape_xml(&node.label)
    );

    if node.has_selector {
        let glyph_x = node.x + node.width - 15.0;
        let glyph_y = node.y + 12.0;
        let glyph_size = (font_size - 2.0).max(6.0);
        let _ = write!(
            svg,
            "<text x=\"{glyph_x}\" y=\"{glyph_y}\" font-family=\"{}\" font-size=\"{glyph_size}\" fill=\"{}\">\u{25BC}</text>",
            theme.font_family, theme.glyph_color
        );
    }
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    let mut d = String::new();
    if let Some((first, rest)) = points.split_first() {
        let _ = write!(d, "M {} {}", first.0, first.1);
        for point in rest {
            let _ = write!(d, " L {} {}", point.0, point.1);
        }
    }
    d
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Rasterizes a rendered SVG to PNG bytes. The caller owns the (atomic)
/// write, so a rasterization failure leaves nothing on disk.
#[cfg(feature = "png")]
pub fn rasterize_png(svg: &str, theme: &Theme) -> Result<Vec<u8>, RenderError> {
    let mut options = usvg::Options::default();
    options.font_family = theme
        .font_family
        .split(',')
        .next()
        .unwrap_or("Arial")
        .trim()
        .to_string();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|err| RenderError(format!("svg parse: {err}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RenderError("failed to allocate pixmap".to_string()))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|err| RenderError(format!("png encode: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::{Connector, ConnectorKind, compute_layout};
    use crate::model::{Attribute, EntityDescription, FieldGroup, Identifier};

    fn person() -> EntityDescription {
        EntityDescription {
            name: "Person".to_string(),
            identifiers: vec![Identifier::new("PersonId")],
            attributes: vec![Attribute::with_selector("Gender")],
            field_groups: vec![FieldGroup::new("Address", vec![Attribute::new("City")])],
        }
    }

    fn render(entity: &EntityDescription) -> String {
        let theme = Theme::classic();
        let geometry = compute_layout(entity, &theme, &LayoutConfig::default());
        render_svg(&geometry, &theme).expect("render should succeed")
    }

    #[test]
    fn svg_is_well_formed_and_self_contained() {
        let svg = render(&person());
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(!svg.contains("href"));
    }

    #[test]
    fn title_is_underlined() {
        let svg = render(&person());
        assert!(svg.contains("Person Entity Hierarchy"));
        assert!(svg.contains("text-decoration=\"underline\""));
    }

    #[test]
    fn selector_glyph_appears_iff_flagged() {
        let svg = render(&person());
        assert_eq!(svg.matches('\u{25BC}').count(), 1);

        let mut plain = person();
        plain.attributes = vec![Attribute::new("Gender")];
        plain.field_groups = Vec::new();
        assert_eq!(render(&plain).matches('\u{25BC}').count(), 0);
    }

    #[test]
    fn labels_are_xml_escaped() {
        let mut entity = person();
        entity.attributes = vec![Attribute::new("A&B <C>")];
        let svg = render(&entity);
        assert!(svg.contains("A&amp;B &lt;C&gt;"));
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let theme = Theme::classic();
        let mut geometry =
            compute_layout(&person(), &theme, &LayoutConfig::default());
        geometry.width = f32::NAN;
        assert!(render_svg(&geometry, &theme).is_err());

        let mut broken = compute_layout(&person(), &theme, &LayoutConfig::default());
        broken.connectors.push(Connector {
            kind: ConnectorKind::Branch,
            points: vec![(0.0, 0.0)],
        });
        assert!(render_svg(&broken, &theme).is_err());
    }
}
