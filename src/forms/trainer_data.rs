use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{Category, FieldInput, RegistryError};
use crate::domain::trainer_data::{NewTrainerDataRow, TrainerDataChanges, TrainerDataRow};
use crate::domain::types::{TrainerId, TypeConstraintError};

/// Add form. Every field other than `trainer_id` is a category input field.
#[derive(Deserialize, Validate)]
pub struct AddRowForm {
    #[validate(length(min = 1))]
    pub trainer_id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddRowFormPayload {
    pub trainer_id: TrainerId,
    pub fields: FieldInput,
}

impl AddRowFormPayload {
    pub fn into_new_row(self, category: Category) -> Result<NewTrainerDataRow, RegistryError> {
        NewTrainerDataRow::from_input(self.trainer_id, category, &self.fields)
    }
}

#[derive(Debug, Error)]
pub enum AddRowFormError {
    #[error("Add form validation failed: {0}")]
    Validation(String),
    #[error("Add form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddRowFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddRowFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddRowForm> for AddRowFormPayload {
    type Error = AddRowFormError;

    fn try_from(value: AddRowForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            trainer_id: TrainerId::new(value.trainer_id)?,
            fields: value.fields,
        })
    }
}

/// Inline edit form. Only the fields present in the submission are changed.
#[derive(Deserialize, Validate)]
pub struct UpdateRowForm {
    #[validate(length(min = 1))]
    pub trainer_id: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRowFormPayload {
    pub trainer_id: TrainerId,
    pub fields: FieldInput,
}

impl UpdateRowFormPayload {
    /// Changes against the row as currently stored.
    pub fn into_row_changes(
        self,
        row: &TrainerDataRow,
    ) -> Result<TrainerDataChanges, RegistryError> {
        TrainerDataChanges::for_row(row, &self.fields)
    }
}

#[derive(Debug, Error)]
pub enum UpdateRowFormError {
    #[error("Update form validation failed: {0}")]
    Validation(String),
    #[error("Update form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for UpdateRowFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for UpdateRowFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<UpdateRowForm> for UpdateRowFormPayload {
    type Error = UpdateRowFormError;

    fn try_from(value: UpdateRowForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            trainer_id: TrainerId::new(value.trainer_id)?,
            fields: value.fields,
        })
    }
}

/// Delete form. Deletion is permanent, so the user must tick `confirm`.
#[derive(Deserialize, Validate)]
pub struct DeleteRowForm {
    #[validate(length(min = 1))]
    pub trainer_id: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRowFormPayload {
    pub trainer_id: TrainerId,
}

#[derive(Debug, Error)]
pub enum DeleteRowFormError {
    #[error("Delete form validation failed: {0}")]
    Validation(String),
    #[error("Delete form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Deletion is permanent; tick the confirmation box to proceed")]
    NotConfirmed,
}

impl From<ValidationErrors> for DeleteRowFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for DeleteRowFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<DeleteRowForm> for DeleteRowFormPayload {
    type Error = DeleteRowFormError;

    fn try_from(value: DeleteRowForm) -> Result<Self, Self::Error> {
        value.validate()?;
        if !value.confirm {
            return Err(DeleteRowFormError::NotConfirmed);
        }
        Ok(Self {
            trainer_id: TrainerId::new(value.trainer_id)?,
        })
    }
}

/// Forms that only name the trainer they act on (tone trigger, refresh).
#[derive(Deserialize, Validate)]
pub struct TrainerForm {
    #[validate(length(min = 1))]
    pub trainer_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerFormPayload {
    pub trainer_id: TrainerId,
}

#[derive(Debug, Error)]
pub enum TrainerFormError {
    #[error("Trainer form validation failed: {0}")]
    Validation(String),
    #[error("Trainer form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for TrainerFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for TrainerFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<TrainerForm> for TrainerFormPayload {
    type Error = TrainerFormError;

    fn try_from(value: TrainerForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            trainer_id: TrainerId::new(value.trainer_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RowId;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn add_form_deserializes_dynamic_fields() {
        let form: AddRowForm =
            serde_json::from_str(r#"{"trainer_id":"tr_001","question":"Q","answer":"A"}"#)
                .unwrap();
        let payload = AddRowFormPayload::try_from(form).unwrap();
        assert_eq!(payload.trainer_id, "tr_001");
        assert_eq!(payload.fields, fields(&[("answer", "A"), ("question", "Q")]));

        let row = payload.into_new_row(Category::Qna).unwrap();
        assert_eq!(row.category, Category::Qna);
    }

    #[test]
    fn add_form_rejects_blank_trainer() {
        let form = AddRowForm {
            trainer_id: "   ".into(),
            fields: fields(&[("raw_data", "hi")]),
        };
        assert!(matches!(
            AddRowFormPayload::try_from(form),
            Err(AddRowFormError::TypeConstraint(_))
        ));

        let form = AddRowForm {
            trainer_id: String::new(),
            fields: BTreeMap::new(),
        };
        assert!(matches!(
            AddRowFormPayload::try_from(form),
            Err(AddRowFormError::Validation(_))
        ));
    }

    #[test]
    fn update_form_maps_to_changes() {
        let row = TrainerDataRow {
            id: RowId::new(4).unwrap(),
            trainer_id: TrainerId::new("tr_001").unwrap(),
            category: Category::WorkoutExample,
            created_at: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
            fields: BTreeMap::new(),
        };
        let form = UpdateRowForm {
            trainer_id: "tr_001".into(),
            fields: fields(&[("workout_type", "유산소")]),
        };
        let changes = UpdateRowFormPayload::try_from(form)
            .unwrap()
            .into_row_changes(&row)
            .unwrap();
        assert_eq!(changes.id, row.id);
        assert_eq!(changes.fields.len(), 1);
        assert_eq!(changes.fields[0].column, "category");
    }

    #[test]
    fn delete_requires_confirmation() {
        let form = DeleteRowForm {
            trainer_id: "tr_001".into(),
            confirm: false,
        };
        assert!(matches!(
            DeleteRowFormPayload::try_from(form),
            Err(DeleteRowFormError::NotConfirmed)
        ));

        let form = DeleteRowForm {
            trainer_id: "tr_001".into(),
            confirm: true,
        };
        assert!(DeleteRowFormPayload::try_from(form).is_ok());
    }

    #[test]
    fn trainer_form_trims_identifier() {
        let form = TrainerForm {
            trainer_id: " tr_002 ".into(),
        };
        let payload = TrainerFormPayload::try_from(form).unwrap();
        assert_eq!(payload.trainer_id, "tr_002");
    }
}
