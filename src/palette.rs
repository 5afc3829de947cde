use crate::model::Category;

/// Fixed category colors. These are policy, not theme: the mapping is total
/// over the closed [`Category`] set and is not configurable.
pub fn category_color(category: Category) -> &'static str {
    match category {
        Category::Entity => "#2196F3",
        Category::Attribute => "#C5E1A5",
        Category::Identifier => "#F8BBD9",
        Category::FieldGroup => "#FFD54F",
    }
}

/// Display name used in the legend band.
pub fn legend_label(category: Category) -> &'static str {
    match category {
        Category::Entity => "Business Entity",
        Category::Identifier => "Identifiers",
        Category::Attribute => "General Attributes",
        Category::FieldGroup => "Field Groups",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub category: Category,
    pub label: &'static str,
    pub color: &'static str,
}

/// Composes the legend for one diagram: exactly the categories that appear in
/// the geometry, in the stable order Entity, Identifier, Attribute, FieldGroup.
pub fn compose_legend(present: impl Fn(Category) -> bool) -> Vec<LegendEntry> {
    Category::ALL
        .iter()
        .copied()
        .filter(|category| present(*category))
        .map(|category| LegendEntry {
            category,
            label: legend_label(category),
            color: category_color(category),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legend_keeps_stable_order() {
        let legend = compose_legend(|_| true);
        let categories: Vec<Category> = legend.iter().map(|entry| entry.category).collect();
        assert_eq!(categories, Category::ALL);
    }

    #[test]
    fn legend_omits_absent_categories() {
        let legend = compose_legend(|category| category != Category::FieldGroup);
        assert_eq!(legend.len(), 3);
        assert!(legend.iter().all(|entry| entry.category != Category::FieldGroup));
    }
}
