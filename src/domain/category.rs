//! Category registry.
//!
//! Every content category a trainer's knowledge base is split into is a
//! variant of [`Category`]. Each variant carries a static [`CategorySpec`]
//! describing its storage table, retrievable columns and the declarative rules
//! that turn dashboard input into stored values (and back again for editing).
//! Storage code never branches on the category itself; it only reads the `CategorySpec`.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content language written alongside every knowledge row.
pub const CONTENT_LANGUAGE: &str = "ko";

const RISK_LEVELS: &[&str] = &["low", "medium", "high"];
const USER_LEVELS: &[&str] = &["beginner", "intermediate", "advanced"];
const BODY_PARTS: &[&str] = &["무릎", "어깨", "허리", "손목", "발목", "팔꿈치", "기타"];
const USER_GOALS: &[&str] = &[
    "체중 감량",
    "근육 증가",
    "체력 향상",
    "건강 유지",
    "재활/회복",
    "체형 교정",
];
const FEEDBACK_TYPES: &[&str] = &["diet", "workout", "lifestyle"];
const MEAL_TYPES: &[&str] = &["아침", "점심", "저녁", "간식"];
const WORKOUT_TYPES: &[&str] = &["상체", "하체", "전신", "유산소", "스트레칭"];

/// Raw dashboard input keyed by input field name.
pub type FieldInput = BTreeMap<String, String>;

/// Raised when a caller names a category outside the fixed set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Errors produced while mapping dashboard input onto storage columns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("required fields are empty: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{category} has no field named '{field}'")]
    UnknownField {
        category: &'static str,
        field: String,
    },
    #[error("{field} must be one of: {allowed} (got '{value}')")]
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: String,
    },
    #[error("no fields to update")]
    NoChanges,
}

/// The nine fixed content categories, in declaration order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Qna,
    WorkoutGuideline,
    DietGuideline,
    Philosophy,
    Injury,
    Feedback,
    MealExample,
    WorkoutExample,
    Tone,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Qna,
        Category::WorkoutGuideline,
        Category::DietGuideline,
        Category::Philosophy,
        Category::Injury,
        Category::Feedback,
        Category::MealExample,
        Category::WorkoutExample,
        Category::Tone,
    ];

    /// URL-safe identifier.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Qna => "qna",
            Self::WorkoutGuideline => "workout_guideline",
            Self::DietGuideline => "diet_guideline",
            Self::Philosophy => "philosophy",
            Self::Injury => "injury",
            Self::Feedback => "feedback",
            Self::MealExample => "meal_example",
            Self::WorkoutExample => "workout_example",
            Self::Tone => "tone",
        }
    }

    /// Unique display key shown on the dashboard.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Qna => "QnA",
            Self::WorkoutGuideline => "Workout guidelines",
            Self::DietGuideline => "Diet guidelines",
            Self::Philosophy => "Philosophy / mindset",
            Self::Injury => "Injury care",
            Self::Feedback => "Feedback",
            Self::MealExample => "Meal examples",
            Self::WorkoutExample => "Workout examples",
            Self::Tone => "Tone / style",
        }
    }

    /// Static schema and transform rules of the category.
    pub fn spec(self) -> &'static CategorySpec {
        match self {
            Self::Qna => &QNA,
            Self::WorkoutGuideline => &WORKOUT_GUIDELINE,
            Self::DietGuideline => &DIET_GUIDELINE,
            Self::Philosophy => &PHILOSOPHY,
            Self::Injury => &INJURY,
            Self::Feedback => &FEEDBACK,
            Self::MealExample => &MEAL_EXAMPLE,
            Self::WorkoutExample => &WORKOUT_EXAMPLE,
            Self::Tone => &TONE,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts either the slug or the display name.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == value || c.display_name() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

impl TryFrom<&str> for Category {
    type Error = UnknownCategory;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Storage shape of a payload column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Plain scalar text.
    Text,
    /// Tag list, persisted as a JSON array.
    Tags,
}

/// A retrievable payload column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    const fn tags(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Tags,
        }
    }
}

/// Shape conversion applied to an input value before it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transform {
    /// Stored as the trimmed text.
    Identity,
    /// Wrapped into a one-element tag list.
    Singleton,
    /// Split on commas, trimmed, empty tokens dropped.
    SplitComma,
}

impl Transform {
    /// Converts raw input into the stored representation.
    pub fn apply(self, raw: &str) -> FieldValue {
        let raw = raw.trim();
        match self {
            Self::Identity => FieldValue::Text(raw.to_string()),
            Self::Singleton if raw.is_empty() => FieldValue::Tags(Vec::new()),
            Self::Singleton => FieldValue::Tags(vec![raw.to_string()]),
            Self::SplitComma => FieldValue::Tags(
                raw.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    /// Converts a stored value back into the text an edit form shows.
    pub fn invert(self, value: &FieldValue) -> String {
        match (self, value) {
            (_, FieldValue::Text(text)) => text.clone(),
            (Self::Singleton, FieldValue::Tags(tags)) => tags.first().cloned().unwrap_or_default(),
            (_, FieldValue::Tags(tags)) => tags.join(","),
        }
    }
}

/// A stored payload value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
}

impl FieldValue {
    /// Human-readable rendering used in listings.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Tags(tags) => tags.join(", "),
        }
    }
}

/// A value bound to a storage column, ready to be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredField {
    pub column: &'static str,
    pub value: FieldValue,
}

/// Declarative rule mapping one input field onto one storage column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    /// Name of the field on the dashboard form.
    pub input: &'static str,
    /// Storage column the field is written to (rename target).
    pub column: &'static str,
    pub label: &'static str,
    pub transform: Transform,
    pub required: bool,
    /// Value used on create when the input is left blank.
    pub default: Option<&'static str>,
    /// Closed set of accepted values; empty means free text.
    pub choices: &'static [&'static str],
    pub multiline: bool,
}

impl FieldRule {
    const fn new(input: &'static str, label: &'static str) -> Self {
        Self {
            input,
            column: input,
            label,
            transform: Transform::Identity,
            required: false,
            default: None,
            choices: &[],
            multiline: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    const fn renamed_to(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    const fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    fn check_choice(&self, value: &str) -> Result<(), RegistryError> {
        if self.choices.is_empty() || value.is_empty() || self.choices.contains(&value) {
            return Ok(());
        }
        Err(RegistryError::InvalidChoice {
            field: self.input,
            value: value.to_string(),
            allowed: self.choices.join(", "),
        })
    }
}

/// Fixed value written on create and never edited through the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstantValue {
    Text(&'static str),
    Tags(&'static [&'static str]),
}

impl From<ConstantValue> for FieldValue {
    fn from(value: ConstantValue) -> Self {
        match value {
            ConstantValue::Text(text) => FieldValue::Text(text.to_string()),
            ConstantValue::Tags(tags) => {
                FieldValue::Tags(tags.iter().map(|t| t.to_string()).collect())
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConstantColumn {
    pub column: &'static str,
    pub value: ConstantValue,
}

const LANGUAGE: ConstantColumn = ConstantColumn {
    column: "language",
    value: ConstantValue::Text(CONTENT_LANGUAGE),
};

const fn fixed_tag(tags: &'static [&'static str]) -> ConstantColumn {
    ConstantColumn {
        column: "category",
        value: ConstantValue::Tags(tags),
    }
}

/// Storage schema and transform rules of one category.
#[derive(Debug)]
pub struct CategorySpec {
    pub table: &'static str,
    /// Payload columns in display order; `id` and `created_at` come on top.
    pub columns: &'static [Column],
    pub fields: &'static [FieldRule],
    pub constants: &'static [ConstantColumn],
}

impl CategorySpec {
    /// Looks up the rule for an input field name.
    pub fn rule(&self, input: &str) -> Option<&'static FieldRule> {
        self.fields.iter().find(|rule| rule.input == input)
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Required input fields that are missing or blank, in declaration order.
    pub fn missing_required(&self, input: &FieldInput) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|rule| rule.required)
            .filter(|rule| is_blank(input.get(rule.input)))
            .map(|rule| rule.input)
            .collect()
    }

    /// Maps a complete create request onto storage columns.
    ///
    /// Blank optional fields fall back to their default; constants are
    /// appended after the user-supplied columns.
    pub fn insert_values(&self, input: &FieldInput) -> Result<Vec<StoredField>, RegistryError> {
        self.reject_unknown(input)?;

        let missing = self.missing_required(input);
        if !missing.is_empty() {
            return Err(RegistryError::MissingFields(missing));
        }

        let mut values = Vec::with_capacity(self.fields.len() + self.constants.len());
        for rule in self.fields {
            let raw = input
                .get(rule.input)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .or(rule.default)
                .unwrap_or_default();
            rule.check_choice(raw)?;
            values.push(StoredField {
                column: rule.column,
                value: rule.transform.apply(raw),
            });
        }
        values.extend(self.constants.iter().map(|constant| StoredField {
            column: constant.column,
            value: constant.value.into(),
        }));

        Ok(values)
    }

    /// Maps a partial edit onto storage columns, touching only supplied fields.
    ///
    /// `current` holds the row's present form values. A choice field keeps
    /// whatever value it already stores, even one outside today's choices;
    /// only a changed value is checked. Blanking an optional field with a
    /// default stores the default, as on create.
    pub fn update_values(
        &self,
        input: &FieldInput,
        current: &FieldInput,
    ) -> Result<Vec<StoredField>, RegistryError> {
        self.reject_unknown(input)?;

        let blanked: Vec<&'static str> = self
            .fields
            .iter()
            .filter(|rule| rule.required && input.contains_key(rule.input))
            .filter(|rule| is_blank(input.get(rule.input)))
            .map(|rule| rule.input)
            .collect();
        if !blanked.is_empty() {
            return Err(RegistryError::MissingFields(blanked));
        }

        let mut values = Vec::new();
        for rule in self.fields {
            let Some(raw) = input.get(rule.input) else {
                continue;
            };
            let raw = match raw.trim() {
                "" => rule.default.unwrap_or_default(),
                trimmed => trimmed,
            };
            if current.get(rule.input).map(|v| v.trim()) != Some(raw) {
                rule.check_choice(raw)?;
            }
            values.push(StoredField {
                column: rule.column,
                value: rule.transform.apply(raw),
            });
        }

        if values.is_empty() {
            return Err(RegistryError::NoChanges);
        }
        Ok(values)
    }

    /// Inverse of the write transforms: stored columns back to form input.
    pub fn input_values(&self, stored: &BTreeMap<String, FieldValue>) -> FieldInput {
        self.fields
            .iter()
            .map(|rule| {
                let value = stored
                    .get(rule.column)
                    .map(|v| rule.transform.invert(v))
                    .unwrap_or_default();
                (rule.input.to_string(), value)
            })
            .collect()
    }

    fn reject_unknown(&self, input: &FieldInput) -> Result<(), RegistryError> {
        match input.keys().find(|key| self.rule(key).is_none()) {
            Some(field) => Err(RegistryError::UnknownField {
                category: self.table,
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

static QNA: CategorySpec = CategorySpec {
    table: "data_trainer_qna",
    columns: &[
        Column::text("question"),
        Column::text("answer"),
        Column::tags("category"),
        Column::text("risk_level"),
    ],
    fields: &[
        FieldRule::new("question", "Question").required(),
        FieldRule::new("answer", "Answer").required().multiline(),
        FieldRule::new("risk_level", "Risk level")
            .default_value("low")
            .choices(RISK_LEVELS),
    ],
    constants: &[fixed_tag(&["general"]), LANGUAGE],
};

static WORKOUT_GUIDELINE: CategorySpec = CategorySpec {
    table: "data_trainer_workout_guideline",
    columns: &[
        Column::text("title"),
        Column::text("content"),
        Column::tags("category"),
    ],
    fields: &[
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Content").required().multiline(),
    ],
    constants: &[fixed_tag(&["exercise"]), LANGUAGE],
};

static DIET_GUIDELINE: CategorySpec = CategorySpec {
    table: "data_trainer_diet_guideline",
    columns: &[
        Column::text("title"),
        Column::text("content"),
        Column::tags("category"),
    ],
    fields: &[
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Content").required().multiline(),
    ],
    constants: &[fixed_tag(&["diet"]), LANGUAGE],
};

static PHILOSOPHY: CategorySpec = CategorySpec {
    table: "data_trainer_philosophy",
    columns: &[Column::text("content"), Column::tags("category")],
    fields: &[FieldRule::new("content", "Content").required().multiline()],
    constants: &[fixed_tag(&["mindset"]), LANGUAGE],
};

static INJURY: CategorySpec = CategorySpec {
    table: "data_trainer_injury",
    columns: &[
        Column::text("title"),
        Column::text("content"),
        Column::tags("body_part"),
        Column::text("risk_level"),
        Column::tags("keywords"),
    ],
    fields: &[
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Content").required().multiline(),
        FieldRule::new("body_part", "Body part")
            .required()
            .transform(Transform::Singleton)
            .choices(BODY_PARTS),
        FieldRule::new("risk_level", "Risk level")
            .default_value("medium")
            .choices(RISK_LEVELS),
        FieldRule::new("keywords", "Keywords (comma separated)").transform(Transform::SplitComma),
    ],
    constants: &[LANGUAGE],
};

static FEEDBACK: CategorySpec = CategorySpec {
    table: "data_trainer_feedback",
    columns: &[
        Column::text("user_goal"),
        Column::text("title"),
        Column::text("content"),
        Column::tags("category"),
        Column::tags("keywords"),
    ],
    fields: &[
        FieldRule::new("user_goal", "User goal").choices(USER_GOALS),
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Feedback").required().multiline(),
        FieldRule::new("feedback_type", "Feedback type")
            .required()
            .renamed_to("category")
            .transform(Transform::Singleton)
            .choices(FEEDBACK_TYPES),
        FieldRule::new("keywords", "Keywords (comma separated)").transform(Transform::SplitComma),
    ],
    constants: &[LANGUAGE],
};

static MEAL_EXAMPLE: CategorySpec = CategorySpec {
    table: "data_trainer_meal_examples",
    columns: &[
        Column::text("title"),
        Column::text("content"),
        Column::tags("category"),
        Column::text("user_level"),
    ],
    fields: &[
        FieldRule::new("meal_type", "Meal type")
            .required()
            .renamed_to("category")
            .transform(Transform::Singleton)
            .choices(MEAL_TYPES),
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Meal (foods, calories, nutrients)")
            .required()
            .multiline(),
        FieldRule::new("user_level", "Level")
            .default_value("beginner")
            .choices(USER_LEVELS),
    ],
    constants: &[LANGUAGE],
};

static WORKOUT_EXAMPLE: CategorySpec = CategorySpec {
    table: "data_trainer_workout_examples",
    columns: &[
        Column::text("title"),
        Column::text("content"),
        Column::tags("category"),
        Column::text("user_level"),
    ],
    fields: &[
        FieldRule::new("workout_type", "Workout type")
            .required()
            .renamed_to("category")
            .transform(Transform::Singleton)
            .choices(WORKOUT_TYPES),
        FieldRule::new("title", "Title").required(),
        FieldRule::new("content", "Workout (exercises, durations)")
            .required()
            .multiline(),
        FieldRule::new("user_level", "Level")
            .default_value("beginner")
            .choices(USER_LEVELS),
    ],
    constants: &[LANGUAGE],
};

static TONE: CategorySpec = CategorySpec {
    table: "data_trainer_tones_raw",
    columns: &[Column::text("trainer_name"), Column::text("raw_data")],
    fields: &[
        FieldRule::new("trainer_name", "Trainer name (optional)"),
        FieldRule::new("raw_data", "Tone / style samples")
            .required()
            .multiline(),
    ],
    constants: &[],
};
