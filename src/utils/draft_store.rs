use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::extraction::ExtractionOutcome;
use crate::form::{DocumentSlot, EmployeeForm};
use crate::model::employee::EmployeeProfile;
use crate::utils::document::DocumentUpload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DraftMode {
    /// Add-employee form.
    New,
    /// Profile editor for an existing employee.
    #[serde(rename_all = "camelCase")]
    Edit { sr_no: u64 },
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub id: Uuid,
    pub mode: DraftMode,
    pub form: EmployeeForm,
    pub documents: BTreeMap<DocumentSlot, DocumentUpload>,
    /// Stored profile an edit draft was seeded from.
    pub base: Option<EmployeeProfile>,
    pub last_extraction: Option<ExtractionOutcome>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    pub fn new_employee() -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: DraftMode::New,
            form: EmployeeForm::new(),
            documents: BTreeMap::new(),
            base: None,
            last_extraction: None,
            updated_at: Utc::now(),
        }
    }

    pub fn edit(sr_no: u64, profile: EmployeeProfile) -> Self {
        Self {
            mode: DraftMode::Edit { sr_no },
            form: EmployeeForm::from_profile(&profile),
            base: Some(profile),
            ..Self::new_employee()
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// In-memory form drafts, expiring after a period without writes.
#[derive(Clone)]
pub struct DraftStore {
    cache: Cache<Uuid, Draft>,
}

impl DraftStore {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn insert(&self, draft: Draft) -> Draft {
        log::info!("Draft {} opened ({:?})", draft.id, draft.mode);
        self.cache.insert(draft.id, draft.clone()).await;
        draft
    }

    pub async fn get(&self, id: &Uuid) -> Option<Draft> {
        self.cache.get(id).await
    }

    /// Read-modify-write of one draft; last write wins.
    pub async fn update<F, T>(&self, id: &Uuid, change: F) -> Option<(Draft, T)>
    where
        F: FnOnce(&mut Draft) -> T,
    {
        let mut draft = self.cache.get(id).await?;
        let result = change(&mut draft);
        draft.touch();
        self.cache.insert(*id, draft.clone()).await;
        Some((draft, result))
    }

    pub async fn remove(&self, id: &Uuid) -> Option<Draft> {
        let removed = self.cache.remove(id).await;
        if removed.is_some() {
            log::info!("Draft {id} discarded");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;

    fn store() -> DraftStore {
        DraftStore::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn drafts_are_stored_and_updated() {
        let store = store();
        let draft = store.insert(Draft::new_employee()).await;

        let (updated, _) = store
            .update(&draft.id, |d| d.form.apply(Field::FirstName, "Asha"))
            .await
            .unwrap();
        assert_eq!(updated.form.first_name, "Asha");
        assert!(updated.updated_at >= draft.updated_at);

        let fetched = store.get(&draft.id).await.unwrap();
        assert_eq!(fetched.form.first_name, "Asha");
    }

    #[tokio::test]
    async fn missing_drafts_are_none() {
        let store = store();
        let id = Uuid::new_v4();
        assert!(store.get(&id).await.is_none());
        assert!(store.update(&id, |_| ()).await.is_none());
        assert!(store.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn removed_drafts_are_gone() {
        let store = store();
        let draft = store.insert(Draft::new_employee()).await;
        assert!(store.remove(&draft.id).await.is_some());
        assert!(store.get(&draft.id).await.is_none());
    }

    #[test]
    fn edit_drafts_keep_their_base_profile() {
        let profile = EmployeeProfile {
            sr_no: Some(4),
            employee_name: Some("Ravi".into()),
            ..Default::default()
        };
        let draft = Draft::edit(4, profile);
        assert_eq!(draft.mode, DraftMode::Edit { sr_no: 4 });
        assert_eq!(draft.form.employee_name, "Ravi");
        assert!(draft.base.is_some());
    }

    #[test]
    fn mode_serializes_with_a_kind_tag() {
        let json = serde_json::to_value(DraftMode::Edit { sr_no: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "edit", "srNo": 4}));
    }
}
