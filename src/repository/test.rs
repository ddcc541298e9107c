use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDateTime};
use diesel::result::Error as DieselError;

use crate::domain::category::{Category, FieldInput, FieldValue};
use crate::domain::trainer_data::{NewTrainerDataRow, TrainerDataChanges, TrainerDataRow};
use crate::domain::types::{RowId, TrainerId};
use crate::repository::{RepositoryError, RepositoryResult, TrainerDataReader, TrainerDataWriter};

#[derive(Default)]
struct State {
    rows: Vec<TrainerDataRow>,
    next_id: i32,
    failing: HashSet<Category>,
}

/// Simple in-memory repository used for unit tests.
///
/// Rows get strictly increasing ids and creation times so listings have a
/// deterministic newest-first order.
#[derive(Default)]
pub struct TestRepository {
    state: Mutex<State>,
}

impl TestRepository {
    /// Insert a row through the registry's write path, bypassing failures.
    pub fn seed(&self, trainer_id: &TrainerId, category: Category, input: &FieldInput) -> RowId {
        let row = NewTrainerDataRow::from_input(trainer_id.clone(), category, input).unwrap();
        self.store(&row)
    }

    /// Make every subsequent call touching `category` fail.
    pub fn fail_category(&self, category: Category) {
        self.state.lock().unwrap().failing.insert(category);
    }

    pub fn rows(&self) -> Vec<TrainerDataRow> {
        self.state.lock().unwrap().rows.clone()
    }

    /// Store columns verbatim, bypassing the registry's input rules, the way
    /// another writer of the shared tables would.
    pub fn seed_stored(
        &self,
        trainer_id: &TrainerId,
        category: Category,
        fields: &[(&str, FieldValue)],
    ) -> RowId {
        self.push(
            trainer_id,
            category,
            fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        )
    }

    fn store(&self, row: &NewTrainerDataRow) -> RowId {
        let fields = row
            .fields
            .iter()
            .filter(|f| row.category.spec().column(f.column).is_some())
            .map(|f| (f.column.to_string(), f.value.clone()))
            .collect();
        self.push(&row.trainer_id, row.category, fields)
    }

    fn push(
        &self,
        trainer_id: &TrainerId,
        category: Category,
        fields: BTreeMap<String, FieldValue>,
    ) -> RowId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let sequence = state.next_id;
        let id = RowId::new(sequence).unwrap();
        state.rows.push(TrainerDataRow {
            id,
            trainer_id: trainer_id.clone(),
            category,
            created_at: created_at(sequence),
            fields,
        });
        id
    }

    fn check(&self, category: Category) -> RepositoryResult<()> {
        if self.state.lock().unwrap().failing.contains(&category) {
            return Err(RepositoryError::DatabaseError(DieselError::NotFound));
        }
        Ok(())
    }
}

fn created_at(sequence: i32) -> NaiveDateTime {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc()
        + Duration::seconds(sequence.into())
}

impl TrainerDataReader for TestRepository {
    fn count_rows(&self, trainer_id: &TrainerId, category: Category) -> RepositoryResult<usize> {
        self.check(category)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|r| r.category == category && &r.trainer_id == trainer_id)
            .count())
    }

    fn list_rows(
        &self,
        trainer_id: &TrainerId,
        category: Category,
    ) -> RepositoryResult<Vec<TrainerDataRow>> {
        self.check(category)?;
        let mut rows: Vec<TrainerDataRow> = self
            .state
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|r| r.category == category && &r.trainer_id == trainer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn get_row(&self, category: Category, id: RowId) -> RepositoryResult<Option<TrainerDataRow>> {
        self.check(category)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|r| r.category == category && r.id == id)
            .cloned())
    }
}

impl TrainerDataWriter for TestRepository {
    fn create_row(&self, row: &NewTrainerDataRow) -> RepositoryResult<RowId> {
        self.check(row.category)?;
        Ok(self.store(row))
    }

    fn update_row(&self, changes: &TrainerDataChanges) -> RepositoryResult<usize> {
        self.check(changes.category)?;
        let mut state = self.state.lock().unwrap();
        let Some(row) = state
            .rows
            .iter_mut()
            .find(|r| r.category == changes.category && r.id == changes.id)
        else {
            return Ok(0);
        };
        for field in &changes.fields {
            row.fields
                .insert(field.column.to_string(), field.value.clone());
        }
        Ok(1)
    }

    fn delete_row(&self, category: Category, id: RowId) -> RepositoryResult<usize> {
        self.check(category)?;
        let mut state = self.state.lock().unwrap();
        let before = state.rows.len();
        state
            .rows
            .retain(|r| !(r.category == category && r.id == id));
        Ok(before - state.rows.len())
    }
}
