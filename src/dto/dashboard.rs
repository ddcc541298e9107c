//! View models handed to the Tera templates.

use serde::Serialize;

use crate::domain::category::{Category, FieldInput, FieldRule};
use crate::domain::score::{ScoreSnapshot, Urgency};
use crate::domain::trainer_data::TrainerDataRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLinkDto {
    pub slug: &'static str,
    pub name: &'static str,
}

impl From<Category> for CategoryLinkDto {
    fn from(value: Category) -> Self {
        Self {
            slug: value.slug(),
            name: value.display_name(),
        }
    }
}

/// All categories in declaration order, for navigation.
pub fn category_links() -> Vec<CategoryLinkDto> {
    Category::ALL.into_iter().map(CategoryLinkDto::from).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScoreDto {
    pub slug: &'static str,
    pub name: &'static str,
    pub count: usize,
    pub target: usize,
    /// Weight as a percentage of the total score.
    pub max_score: f64,
    pub achievement: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortfallDto {
    pub slug: &'static str,
    pub name: &'static str,
    pub needed: usize,
    pub urgency: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextGoalDto {
    pub tier: &'static str,
    pub threshold: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewDto {
    pub total_score: f64,
    pub tier: &'static str,
    pub total_count: usize,
    pub total_target: usize,
    pub next_goal: Option<NextGoalDto>,
    pub categories: Vec<CategoryScoreDto>,
    pub shortfalls: Vec<ShortfallDto>,
}

impl From<&ScoreSnapshot> for OverviewDto {
    fn from(value: &ScoreSnapshot) -> Self {
        Self {
            total_score: value.total_score,
            tier: value.tier.as_str(),
            total_count: value.total_count,
            total_target: value.total_target,
            next_goal: value.next_goal().map(|(tier, threshold)| NextGoalDto {
                tier: tier.as_str(),
                threshold,
                remaining: threshold - value.total_score,
            }),
            categories: value
                .details
                .iter()
                .map(|d| CategoryScoreDto {
                    slug: d.category.slug(),
                    name: d.category.display_name(),
                    count: d.count,
                    target: d.target,
                    max_score: d.weight * 100.0,
                    achievement: d.achievement,
                    score: d.score,
                })
                .collect(),
            shortfalls: value
                .surfaced()
                .iter()
                .map(|s| ShortfallDto {
                    slug: s.category.slug(),
                    name: s.category.display_name(),
                    needed: s.needed,
                    urgency: match s.urgency {
                        Some(Urgency::Urgent) => "urgent",
                        Some(Urgency::Important) => "important",
                        None => "",
                    },
                })
                .collect(),
        }
    }
}

/// One input of an add or edit form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormFieldDto {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    pub required: bool,
    pub multiline: bool,
    /// Selectable values. A stored value outside the rule's choices is kept
    /// as the first option so an edit does not drop it.
    pub choices: Vec<String>,
}

impl FormFieldDto {
    fn new(rule: &FieldRule, value: String) -> Self {
        let mut choices: Vec<String> = rule.choices.iter().map(|c| c.to_string()).collect();
        if !choices.is_empty() && !value.is_empty() && !choices.contains(&value) {
            choices.insert(0, value.clone());
        }
        Self {
            name: rule.input,
            label: rule.label,
            value,
            required: rule.required,
            multiline: rule.multiline,
            choices,
        }
    }
}

/// Blank add form of `category`, with defaults preselected.
pub fn add_form_fields(category: Category) -> Vec<FormFieldDto> {
    category
        .spec()
        .fields
        .iter()
        .map(|rule| FormFieldDto::new(rule, rule.default.unwrap_or_default().to_string()))
        .collect()
}

fn edit_form_fields(category: Category, values: &FieldInput) -> Vec<FormFieldDto> {
    category
        .spec()
        .fields
        .iter()
        .map(|rule| {
            let value = values.get(rule.input).cloned().unwrap_or_default();
            FormFieldDto::new(rule, value)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnValueDto {
    pub column: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDto {
    pub id: i32,
    pub headline: String,
    pub created_at: String,
    pub columns: Vec<ColumnValueDto>,
    pub fields: Vec<FormFieldDto>,
}

impl From<&TrainerDataRow> for RowDto {
    fn from(value: &TrainerDataRow) -> Self {
        Self {
            id: value.id.get(),
            headline: value.headline(),
            created_at: value.created_at.format("%Y-%m-%d %H:%M").to_string(),
            columns: value
                .category
                .spec()
                .columns
                .iter()
                .map(|column| ColumnValueDto {
                    column: column.name,
                    value: value
                        .field(column.name)
                        .map(|v| v.display())
                        .unwrap_or_default(),
                })
                .collect(),
            fields: edit_form_fields(value.category, &value.input_values()),
        }
    }
}
