use crate::config::LayoutConfig;
use crate::model::{Category, EntityDescription};
use crate::palette::{self, LegendEntry};
use crate::text_metrics::truncate_to_width;
use crate::theme::Theme;
use thiserror::Error;

// Process-wide geometry constants. Box size and pitch are part of the diagram
// contract, not per-entity configuration.
pub const BOX_WIDTH: f32 = 145.0;
pub const BOX_HEIGHT: f32 = 26.0;
pub const CORNER_RADIUS: f32 = 12.0;
pub const ROW_PITCH: f32 = 29.0;

pub const ENTITY_X: f32 = 20.0;
pub const COLUMN1_X: f32 = 220.0;
pub const COLUMN2_X: f32 = 380.0;
/// First row of the tree body, below the title line and legend band.
pub const BODY_TOP: f32 = 80.0;
pub const CANVAS_MARGIN: f32 = 20.0;
pub const BOTTOM_MARGIN: f32 = 40.0;
/// Horizontal gap before a sub-branch turns down toward its sub-attribute.
pub const SUB_BRANCH_ELBOW: f32 = 10.0;
pub const LABEL_PADDING: f32 = 8.0;

/// X of the vertical trunk, midway between the entity box and column 1.
pub const TRUNK_X: f32 = (ENTITY_X + BOX_WIDTH + COLUMN1_X) / 2.0;

#[derive(Debug, Clone)]
pub struct NodeBox {
    pub label: String,
    pub category: Category,
    pub has_selector: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBox {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Trunk,
    Branch,
    SubBranch,
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub points: Vec<(f32, f32)>,
}

/// Non-fatal: a label did not fit the fixed box width and was truncated.
#[derive(Debug, Clone, Error)]
#[error("label `{original}` exceeds the box width; truncated to `{shown}`")]
pub struct LayoutOverflowWarning {
    pub original: String,
    pub shown: String,
}

/// Derived geometry for one entity. Discarded after the artifact is written;
/// nothing here persists across runs.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub title: String,
    pub entity: NodeBox,
    pub column1: Vec<NodeBox>,
    pub column2: Vec<NodeBox>,
    pub connectors: Vec<Connector>,
    pub legend: Vec<LegendEntry>,
    pub width: f32,
    pub height: f32,
    pub warnings: Vec<LayoutOverflowWarning>,
}

impl Geometry {
    pub fn connector_count(&self, kind: ConnectorKind) -> usize {
        self.connectors.iter().filter(|c| c.kind == kind).count()
    }

    pub fn has_category(&self, category: Category) -> bool {
        if category == Category::Entity {
            return true;
        }
        self.column1
            .iter()
            .chain(self.column2.iter())
            .any(|node| node.category == category)
    }
}

/// Computes the tree geometry for one validated entity. Pure: identical
/// metadata always yields identical geometry, with insertion order as the
/// only ordering source.
pub fn compute_layout(entity: &EntityDescription, theme: &Theme, config: &LayoutConfig) -> Geometry {
    let mut warnings = Vec::new();
    let max_label_width = BOX_WIDTH - LABEL_PADDING * 2.0;
    let fit = |label: &str, font_size: f32, warnings: &mut Vec<LayoutOverflowWarning>| {
        let (shown, truncated) =
            truncate_to_width(label, max_label_width, font_size, &theme.font_family);
        if truncated {
            warnings.push(LayoutOverflowWarning {
                original: label.to_string(),
                shown: shown.clone(),
            });
        }
        shown
    };

    // Column 1: identifiers, then attributes, then field groups, at fixed
    // pitch from the top margin.
    let mut column1 = Vec::with_capacity(entity.column1_len());
    let mut row_y = BODY_TOP;
    for identifier in &entity.identifiers {
        column1.push(NodeBox {
            label: fit(&identifier.label, theme.font_size, &mut warnings),
            category: Category::Identifier,
            has_selector: false,
            x: COLUMN1_X,
            y: row_y,
            width: BOX_WIDTH,
            height: BOX_HEIGHT,
        });
        row_y += ROW_PITCH;
    }
    for attribute in &entity.attributes {
        column1.push(NodeBox {
            label: fit(&attribute.label, theme.font_size, &mut warnings),
            category: Category::Attribute,
            has_selector: attribute.has_selector,
            x: COLUMN1_X,
            y: row_y,
            width: BOX_WIDTH,
            height: BOX_HEIGHT,
        });
        row_y += ROW_PITCH;
    }
    let first_group_row = column1.len();
    for group in &entity.field_groups {
        column1.push(NodeBox {
            label: fit(&group.label, theme.font_size, &mut warnings),
            category: Category::FieldGroup,
            has_selector: false,
            x: COLUMN1_X,
            y: row_y,
            width: BOX_WIDTH,
            height: BOX_HEIGHT,
        });
        row_y += ROW_PITCH;
    }

    // Column 2: each group's block starts level with its owning row, pushed
    // down only far enough to clear the previous group's block.
    let mut column2 = Vec::with_capacity(entity.column2_len());
    let mut connectors = Vec::new();
    let mut cursor_y = BODY_TOP;
    for (index, group) in entity.field_groups.iter().enumerate() {
        let group_box = &column1[first_group_row + index];
        let start_y = group_box.y.max(cursor_y);
        for (offset, sub) in group.sub_attributes.iter().enumerate() {
            let sub_y = start_y + offset as f32 * ROW_PITCH;
            let sub_mid = sub_y + BOX_HEIGHT / 2.0;
            let elbow_x = COLUMN1_X + BOX_WIDTH + SUB_BRANCH_ELBOW;
            connectors.push(Connector {
                kind: ConnectorKind::SubBranch,
                points: vec![
                    (COLUMN1_X + BOX_WIDTH, group_box.center_y()),
                    (elbow_x, group_box.center_y()),
                    (elbow_x, sub_mid),
                    (COLUMN2_X, sub_mid),
                ],
            });
            column2.push(NodeBox {
                label: fit(&sub.label, theme.sub_font_size, &mut warnings),
                category: Category::Attribute,
                has_selector: sub.has_selector,
                x: COLUMN2_X,
                y: sub_y,
                width: BOX_WIDTH,
                height: BOX_HEIGHT,
            });
        }
        if !group.sub_attributes.is_empty() {
            cursor_y = start_y + group.sub_attributes.len() as f32 * ROW_PITCH;
        }
    }

    // Column 0: the entity, vertically centered against column 1's extent.
    let entity_y = match (column1.first(), column1.last()) {
        (Some(first), Some(last)) => (first.y + last.y) / 2.0,
        _ => BODY_TOP,
    };
    let entity_box = NodeBox {
        label: fit(&entity.name, theme.font_size, &mut warnings),
        category: Category::Entity,
        has_selector: false,
        x: ENTITY_X,
        y: entity_y,
        width: BOX_WIDTH,
        height: BOX_HEIGHT,
    };

    // Trunk and branches. The trunk is one path: a stub from the entity's
    // right edge, then the vertical spine over column 1's full extent.
    if let (Some(first), Some(last)) = (column1.first(), column1.last()) {
        let entity_mid = entity_box.center_y();
        connectors.insert(
            0,
            Connector {
                kind: ConnectorKind::Trunk,
                points: vec![
                    (ENTITY_X + BOX_WIDTH, entity_mid),
                    (TRUNK_X, entity_mid),
                    (TRUNK_X, first.center_y()),
                    (TRUNK_X, last.center_y()),
                ],
            },
        );
    }
    for (index, node) in column1.iter().enumerate() {
        connectors.insert(
            1 + index,
            Connector {
                kind: ConnectorKind::Branch,
                points: vec![(TRUNK_X, node.center_y()), (COLUMN1_X, node.center_y())],
            },
        );
    }

    // Canvas: height follows the deeper column; width is clamped to the
    // recommended range (overflowing labels were already truncated above).
    let bottom = column1
        .iter()
        .chain(column2.iter())
        .map(|node| node.y + node.height)
        .fold(entity_box.y + entity_box.height, f32::max);
    let height = (bottom + BOTTOM_MARGIN).max(config.min_canvas_height);
    let rightmost = if !column2.is_empty() {
        COLUMN2_X
    } else if !column1.is_empty() {
        COLUMN1_X
    } else {
        ENTITY_X
    } + BOX_WIDTH;
    let width = (rightmost + CANVAS_MARGIN).clamp(config.min_canvas_width, config.max_canvas_width);

    let legend = palette::compose_legend(|category| match category {
        Category::Entity => true,
        Category::Identifier => !entity.identifiers.is_empty(),
        Category::Attribute => !entity.attributes.is_empty() || !column2.is_empty(),
        Category::FieldGroup => !entity.field_groups.is_empty(),
    });

    Geometry {
        title: format!("{} Entity Hierarchy", entity.name),
        entity: entity_box,
        column1,
        column2,
        connectors,
        legend,
        width,
        height,
        warnings,
    }
}
