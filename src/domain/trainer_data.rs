use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, FieldInput, FieldValue, RegistryError, StoredField};
use crate::domain::types::{RowId, TrainerId};

/// Columns tried, in order, when picking a one-line summary of a row.
const HEADLINE_COLUMNS: [&str; 4] = ["title", "question", "raw_data", "content"];
const HEADLINE_MAX_CHARS: usize = 50;

/// A stored knowledge row owned by one trainer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainerDataRow {
    pub id: RowId,
    pub trainer_id: TrainerId,
    pub category: Category,
    pub created_at: NaiveDateTime,
    /// Payload keyed by storage column.
    pub fields: BTreeMap<String, FieldValue>,
}

impl TrainerDataRow {
    pub fn field(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Short label for listings: the first non-empty headline column.
    pub fn headline(&self) -> String {
        let text = HEADLINE_COLUMNS
            .iter()
            .filter_map(|column| self.field(column))
            .map(FieldValue::display)
            .find(|text| !text.trim().is_empty())
            .unwrap_or_else(|| format!("#{}", self.id));
        text.chars().take(HEADLINE_MAX_CHARS).collect()
    }

    /// Form values to prefill an edit form with.
    pub fn input_values(&self) -> FieldInput {
        self.category.spec().input_values(&self.fields)
    }
}

/// Data required to insert a new [`TrainerDataRow`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrainerDataRow {
    pub trainer_id: TrainerId,
    pub category: Category,
    pub fields: Vec<StoredField>,
    pub created_at: NaiveDateTime,
}

impl NewTrainerDataRow {
    /// Validates dashboard input and applies the category's write transforms.
    pub fn from_input(
        trainer_id: TrainerId,
        category: Category,
        input: &FieldInput,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            trainer_id,
            category,
            fields: category.spec().insert_values(input)?,
            created_at: Utc::now().naive_utc(),
        })
    }
}

/// A partial in-place edit of an existing row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerDataChanges {
    pub category: Category,
    pub id: RowId,
    pub fields: Vec<StoredField>,
}

impl TrainerDataChanges {
    /// Maps edited form fields onto their storage columns.
    pub fn from_input(
        category: Category,
        id: RowId,
        input: &FieldInput,
    ) -> Result<Self, RegistryError> {
        Ok(Self {
            category,
            id,
            fields: category.spec().update_values(input, &FieldInput::new())?,
        })
    }

    /// Like [`TrainerDataChanges::from_input`], but values the row already
    /// stores are accepted unchanged even if they fall outside the choices.
    pub fn for_row(row: &TrainerDataRow, input: &FieldInput) -> Result<Self, RegistryError> {
        Ok(Self {
            category: row.category,
            id: row.id,
            fields: row.category.spec().update_values(input, &row.input_values())?,
        })
    }
}
