//! Filter dimensions and categorical value extraction.

use std::collections::BTreeSet;

use tf_config::{Combinator, DimensionConfig, ValueSource};

use crate::document::RowNode;
use crate::engine::menu::{self, OptionIds};

/// Maps a row to its categorical value(s) for one dimension.
pub trait ValueExtractor: Send + Sync {
    fn values(&self, row: &RowNode) -> Vec<String>;
}

impl ValueExtractor for ValueSource {
    fn values(&self, row: &RowNode) -> Vec<String> {
        match self {
            ValueSource::Badge => first_badge(row).map(|b| vec![b.to_string()]).unwrap_or_default(),
            ValueSource::BadgeKeyword { keywords } => first_badge(row)
                .and_then(|badge| keywords.iter().find(|k| badge.contains(k.as_str())))
                .map(|k| vec![k.clone()])
                .unwrap_or_default(),
            ValueSource::Attribute { name } => row
                .attr(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| vec![v.to_string()])
                .unwrap_or_default(),
            ValueSource::AttributeList { name, separator } => {
                let mut out: Vec<String> = Vec::new();
                for part in row.attr(name).unwrap_or("").split(separator.as_str()) {
                    let part = part.trim();
                    if !part.is_empty() && !out.iter().any(|v| v == part) {
                        out.push(part.to_string());
                    }
                }
                out
            }
            ValueSource::Cell { selector } => row
                .cell(selector)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| vec![v.to_string()])
                .unwrap_or_default(),
        }
    }
}

fn first_badge(row: &RowNode) -> Option<&str> {
    row.badges
        .first()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
}

/// Adapts a closure into a [`ValueExtractor`].
pub struct FnExtractor<F>(pub F);

impl<F> ValueExtractor for FnExtractor<F>
where
    F: Fn(&RowNode) -> Vec<String> + Send + Sync,
{
    fn values(&self, row: &RowNode) -> Vec<String> {
        (self.0)(row)
    }
}

/// A named categorical filter axis.
pub struct FilterDimension {
    pub name: String,
    pub label: String,
    pub combinator: Combinator,
    extractor: Box<dyn ValueExtractor>,
    display: Option<Box<dyn ValueExtractor>>,
    active: BTreeSet<String>,
    option_ids: OptionIds,
}

impl std::fmt::Debug for FilterDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDimension")
            .field("name", &self.name)
            .field("combinator", &self.combinator)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl FilterDimension {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        combinator: Combinator,
        extractor: Box<dyn ValueExtractor>,
    ) -> Self {
        let name = name.into();
        FilterDimension {
            option_ids: OptionIds::new(&name),
            name,
            label: label.into(),
            combinator,
            extractor,
            display: None,
            active: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &DimensionConfig) -> Self {
        let mut dim = FilterDimension::new(
            &config.name,
            &config.label,
            config.combinator,
            Box::new(config.source.clone()),
        );
        if let Some(display) = &config.display {
            dim.display = Some(Box::new(display.clone()));
        }
        dim
    }

    pub fn with_display(mut self, display: Box<dyn ValueExtractor>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn values(&self, row: &RowNode) -> Vec<String> {
        self.extractor.values(row)
    }

    /// Display labels aligned with [`values`](Self::values); falls back to the value.
    pub fn labels(&self, row: &RowNode, values: &[String]) -> Vec<String> {
        let shown = self
            .display
            .as_ref()
            .map(|d| d.values(row))
            .unwrap_or_default();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| shown.get(i).cloned().unwrap_or_else(|| v.clone()))
            .collect()
    }

    pub fn active(&self) -> &BTreeSet<String> {
        &self.active
    }

    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Add or remove a value; returns whether the set changed.
    pub fn set_value(&mut self, value: &str, is_active: bool) -> bool {
        if is_active {
            self.active.insert(value.to_string())
        } else {
            self.active.remove(value)
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Checkbox id of `value`, assigned on first sight.
    pub fn register_value(&mut self, value: &str) -> String {
        self.option_ids.assign(value)
    }

    /// Checkbox id of a registered value; unregistered values get the base id.
    pub fn option_id(&self, value: &str) -> String {
        self.option_ids
            .get(value)
            .map(str::to_string)
            .unwrap_or_else(|| menu::option_id(&self.name, value))
    }

    /// Whether a row with `values` passes this dimension.
    ///
    /// An empty active set imposes no constraint.
    pub fn matches(&self, values: &[String]) -> bool {
        if self.active.is_empty() {
            return true;
        }
        match self.combinator {
            Combinator::Any => values.iter().any(|v| self.active.contains(v)),
            Combinator::All => self
                .active
                .iter()
                .all(|a| values.iter().any(|v| v == a)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowNode {
        RowNode::new("1")
            .with_badge("  Composite role ")
            .with_attr("data-role", "Admin")
            .with_attr("data-modules", "users, roles,,users")
            .with_cell(".role", " Viewer ")
    }

    #[test]
    fn extracts_from_each_source() {
        let r = row();
        assert_eq!(ValueSource::Badge.values(&r), vec!["Composite role"]);
        assert_eq!(
            ValueSource::BadgeKeyword {
                keywords: vec!["Simple".into(), "Composite".into()]
            }
            .values(&r),
            vec!["Composite"]
        );
        assert_eq!(
            ValueSource::Attribute { name: "data-role".into() }.values(&r),
            vec!["Admin"]
        );
        assert_eq!(
            ValueSource::AttributeList {
                name: "data-modules".into(),
                separator: ",".into()
            }
            .values(&r),
            vec!["users", "roles"]
        );
        assert_eq!(
            ValueSource::Cell { selector: ".role".into() }.values(&r),
            vec!["Viewer"]
        );
        assert!(ValueSource::Attribute { name: "data-missing".into() }
            .values(&r)
            .is_empty());
    }

    #[test]
    fn any_combinator_is_or() {
        let mut dim = FilterDimension::new("role", "Role", Combinator::Any, Box::new(ValueSource::Badge));
        assert!(dim.matches(&[]));
        dim.set_value("Admin", true);
        dim.set_value("Viewer", true);
        assert!(dim.matches(&["Viewer".into()]));
        assert!(!dim.matches(&["Editor".into()]));
        assert!(!dim.matches(&[]));
    }

    #[test]
    fn all_combinator_is_and() {
        let mut dim = FilterDimension::new(
            "modules",
            "Modules",
            Combinator::All,
            Box::new(FnExtractor(|_: &RowNode| Vec::<String>::new())),
        );
        dim.set_value("users", true);
        dim.set_value("roles", true);
        assert!(dim.matches(&["roles".into(), "users".into(), "audit".into()]));
        assert!(!dim.matches(&["users".into()]));
    }

    #[test]
    fn set_value_reports_change() {
        let mut dim = FilterDimension::new("t", "T", Combinator::Any, Box::new(ValueSource::Badge));
        assert!(dim.set_value("a", true));
        assert!(!dim.set_value("a", true));
        assert!(dim.set_value("a", false));
        assert!(!dim.is_active());
    }

    #[test]
    fn registered_values_keep_distinct_ids() {
        let mut dim = FilterDimension::new("role", "Role", Combinator::Any, Box::new(ValueSource::Badge));
        assert_eq!(dim.register_value("Ops Lead"), "filter-role-Ops-Lead");
        assert_eq!(dim.register_value("Ops-Lead"), "filter-role-Ops-Lead-2");
        assert_eq!(dim.option_id("Ops-Lead"), "filter-role-Ops-Lead-2");
        assert_eq!(dim.option_id("Unseen"), "filter-role-Unseen");
    }

    #[test]
    fn display_labels_fall_back_to_values() {
        let dim = FilterDimension::new(
            "role",
            "Role",
            Combinator::Any,
            Box::new(ValueSource::Attribute { name: "data-role".into() }),
        )
        .with_display(Box::new(FnExtractor(|_: &RowNode| vec!["Administrator".to_string()])));
        let r = row();
        let values = dim.values(&r);
        assert_eq!(dim.labels(&r, &values), vec!["Administrator"]);

        let plain = FilterDimension::new("b", "B", Combinator::Any, Box::new(ValueSource::Badge));
        let values = plain.values(&r);
        assert_eq!(plain.labels(&r, &values), values);
    }
}
