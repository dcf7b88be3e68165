use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use anyhow::{anyhow, Result};

use crate::model::{Form, Response};

/// The latest fetched snapshot of every tracked form.
///
/// Snapshots are replaced wholesale on each fetch; readers get owned copies.
#[derive(Clone, Default)]
pub struct Database {
    inner: Arc<RwLock<Snapshots>>,
}

#[derive(Default)]
struct Snapshots {
    forms: BTreeMap<i64, Form>,
    responses: BTreeMap<i64, Vec<Response>>,
}

impl Database {
    pub fn insert_form(&self, form_id: i64, form: Form) -> Result<()> {
        self.write()?.forms.insert(form_id, form);
        Ok(())
    }

    pub fn insert_responses(&self, form_id: i64, responses: Vec<Response>) -> Result<()> {
        self.write()?.responses.insert(form_id, responses);
        Ok(())
    }

    /// Replaces a form and its responses together, so readers never see one
    /// without the other.
    pub fn insert_snapshot(&self, form_id: i64, form: Form, responses: Vec<Response>) -> Result<()> {
        let mut snapshots = self.write()?;
        snapshots.forms.insert(form_id, form);
        snapshots.responses.insert(form_id, responses);
        Ok(())
    }

    pub fn form(&self, form_id: i64) -> Result<Option<Form>> {
        Ok(self.read()?.forms.get(&form_id).cloned())
    }

    /// Responses of `form_id`; empty if none were fetched yet.
    pub fn responses(&self, form_id: i64) -> Result<Vec<Response>> {
        Ok(self
            .read()?
            .responses
            .get(&form_id)
            .cloned()
            .unwrap_or_default())
    }

    pub fn form_ids(&self) -> Result<Vec<i64>> {
        Ok(self.read()?.forms.keys().copied().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Snapshots>> {
        self.inner
            .read()
            .map_err(|_| anyhow!("database lock is poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Snapshots>> {
        self.inner
            .write()
            .map_err(|_| anyhow!("database lock is poisoned"))
    }
}
