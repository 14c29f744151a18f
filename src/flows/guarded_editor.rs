use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::organization::OrganizationContext;
use crate::db::Repositories;
use crate::errors::AppError;
use crate::models::donation::{Donation, DonationCategory, DonationUpdate, NewDonation};
use crate::models::expense::{Expense, ExpenseUpdate, NewExpense};
use crate::models::festival::{Festival, FestivalUpdate, NewFestival};
use crate::models::image::{ImageRecord, NewImageRecord};
use crate::models::organization::{Organization, OrganizationUpdate};
use crate::models::setting::Setting;
use crate::services::storage::{content_type_for, upload_path, ObjectStorage};
use crate::services::translation::Translator;

/// The passcode dialog. `None` means the user dismissed it.
#[async_trait]
pub trait PasscodePrompt: Send + Sync {
    async fn request_passcode(&self, organization: &Organization) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct DonationInput {
    pub name: String,
    pub name_telugu: Option<String>,
    pub amount: f64,
    pub donation_type: String,
    pub category: DonationCategory,
    pub received_amount: f64,
}

#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub expense_type: String,
    pub amount: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub description: Option<String>,
}

fn require_amount(label: &str, amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation(format!("{label} must be greater than zero")));
    }
    Ok(())
}

fn require_received(received: f64) -> Result<(), AppError> {
    if !received.is_finite() || received < 0.0 {
        return Err(AppError::Validation(
            "Received amount cannot be negative".into(),
        ));
    }
    Ok(())
}

fn require_text(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{label} is required")));
    }
    Ok(())
}

fn festival_id(festival: &Festival) -> Result<Uuid, AppError> {
    festival.id.ok_or(AppError::NoFestival)
}

/// Every write on financial or organizational data goes through here. A
/// locked device is asked for the passcode once before the write proceeds.
pub struct GuardedEditor {
    organization: Arc<OrganizationContext>,
    prompt: Arc<dyn PasscodePrompt>,
    repos: Repositories,
    storage: Arc<dyn ObjectStorage>,
    translator: Option<Arc<dyn Translator>>,
}

impl GuardedEditor {
    pub fn new(
        organization: Arc<OrganizationContext>,
        prompt: Arc<dyn PasscodePrompt>,
        repos: Repositories,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            organization,
            prompt,
            repos,
            storage,
            translator: None,
        }
    }

    /// Fills in missing Telugu names on new donations.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// The unlocked organization, prompting for the passcode when needed.
    pub async fn unlock(&self) -> Result<Organization, AppError> {
        match self.organization.require_unlocked().await {
            Err(AppError::Locked) => {}
            other => return other,
        }
        let org = self
            .organization
            .current_organization()
            .await
            .ok_or(AppError::NoOrganization)?;
        let Some(passcode) = self.prompt.request_passcode(&org).await else {
            info!(org_id = %org.id, "passcode prompt dismissed");
            return Err(AppError::Locked);
        };
        if self.organization.authenticate(&passcode).await {
            Ok(org)
        } else {
            Err(AppError::WrongPasscode)
        }
    }

    pub async fn add_donation(
        &self,
        festival: &Festival,
        input: DonationInput,
    ) -> Result<Donation, AppError> {
        require_text("Name", &input.name)?;
        require_amount("Amount", input.amount)?;
        require_received(input.received_amount)?;
        let festival_id = festival_id(festival)?;
        let org = self.unlock().await?;

        let name = input.name.trim().to_string();
        let name_telugu = match (input.name_telugu, &self.translator) {
            (Some(telugu), _) if !telugu.trim().is_empty() => Some(telugu.trim().to_string()),
            (_, Some(translator)) => {
                let telugu = translator.translate_name(&name).await;
                (telugu != name).then_some(telugu)
            }
            _ => None,
        };

        let donation = self
            .repos
            .donations
            .create_donation(&NewDonation {
                organization_id: org.id,
                festival_id,
                name,
                name_telugu,
                amount: input.amount,
                donation_type: input.donation_type,
                category: input.category,
                received_amount: input.received_amount,
            })
            .await?;
        info!(donation_id = %donation.id, category = donation.category.as_str(), "donation added");
        Ok(donation)
    }

    pub async fn update_donation(
        &self,
        donation_id: Uuid,
        update: DonationUpdate,
    ) -> Result<Donation, AppError> {
        if let Some(amount) = update.amount {
            require_amount("Amount", amount)?;
        }
        if let Some(received) = update.received_amount {
            require_received(received)?;
        }
        self.unlock().await?;
        Ok(self
            .repos
            .donations
            .update_donation(donation_id, &update)
            .await?)
    }

    /// Partial payments just move `received_amount`.
    pub async fn record_payment(
        &self,
        donation_id: Uuid,
        received_amount: f64,
    ) -> Result<Donation, AppError> {
        require_received(received_amount)?;
        self.unlock().await?;
        let donation = self
            .repos
            .donations
            .update_received_amount(donation_id, received_amount)
            .await?;
        info!(%donation_id, received_amount, "payment recorded");
        Ok(donation)
    }

    pub async fn delete_donation(&self, donation_id: Uuid) -> Result<(), AppError> {
        self.unlock().await?;
        self.repos.donations.delete_donation(donation_id).await?;
        info!(%donation_id, "donation deleted");
        Ok(())
    }

    pub async fn add_expense(
        &self,
        festival: &Festival,
        input: ExpenseInput,
    ) -> Result<Expense, AppError> {
        require_text("Expense type", &input.expense_type)?;
        require_amount("Amount", input.amount)?;
        let org = self.unlock().await?;
        Ok(self
            .repos
            .expenses
            .create_expense(&NewExpense {
                organization_id: org.id,
                festival_name: festival.name.clone(),
                festival_year: festival.year,
                expense_type: input.expense_type.trim().to_string(),
                amount: input.amount,
                description: input.description.filter(|d| !d.trim().is_empty()),
            })
            .await?)
    }

    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        update: ExpenseUpdate,
    ) -> Result<Expense, AppError> {
        if let Some(amount) = update.amount {
            require_amount("Amount", amount)?;
        }
        self.unlock().await?;
        Ok(self.repos.expenses.update_expense(expense_id, &update).await?)
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> Result<(), AppError> {
        self.unlock().await?;
        self.repos.expenses.delete_expense(expense_id).await?;
        Ok(())
    }

    /// Uploads the file, then records it. A failed insert leaves the object
    /// in storage.
    pub async fn upload_image(
        &self,
        festival: &Festival,
        upload: ImageUpload,
    ) -> Result<ImageRecord, AppError> {
        require_text("Title", &upload.title)?;
        let festival_id = festival_id(festival)?;
        let path = upload_path(&upload.file_name)?;
        let org = self.unlock().await?;

        self.storage
            .upload(&path, upload.bytes, content_type_for(&path))
            .await?;
        let record = self
            .repos
            .images
            .insert_image(&NewImageRecord {
                organization_id: org.id,
                festival_id,
                title: upload.title.trim().to_string(),
                description: upload.description.filter(|d| !d.trim().is_empty()),
                image_url: self.storage.public_url(&path),
                storage_path: path,
            })
            .await?;
        info!(image_id = %record.id, path = %record.storage_path, "image uploaded");
        Ok(record)
    }

    /// Removes the stored object, then the row. Not transactional: if the
    /// row delete fails the row outlives its object.
    pub async fn delete_image(&self, image: &ImageRecord) -> Result<(), AppError> {
        self.unlock().await?;
        self.storage.remove(&image.storage_path).await?;
        if let Err(err) = self.repos.images.delete_image(image.id).await {
            warn!(image_id = %image.id, %err, "image row delete failed after object removal");
            return Err(err.into());
        }
        Ok(())
    }

    pub async fn create_festival(&self, mut festival: NewFestival) -> Result<Festival, AppError> {
        require_text("Festival name", &festival.name)?;
        let org = self.unlock().await?;
        festival.organization_id = org.id;
        festival.name = festival.name.trim().to_string();
        Ok(self.repos.festivals.create_festival(&festival).await?)
    }

    pub async fn update_festival(
        &self,
        festival_id: Uuid,
        update: FestivalUpdate,
    ) -> Result<Festival, AppError> {
        self.unlock().await?;
        Ok(self
            .repos
            .festivals
            .update_festival(festival_id, &update)
            .await?)
    }

    pub async fn delete_festival(&self, festival_id: Uuid) -> Result<(), AppError> {
        self.unlock().await?;
        self.repos.festivals.delete_festival(festival_id).await?;
        Ok(())
    }

    pub async fn set_setting(&self, key: &str, value: Value) -> Result<Setting, AppError> {
        require_text("Setting", key)?;
        let org = self.unlock().await?;
        Ok(self.repos.settings.upsert_setting(org.id, key, value).await?)
    }

    /// Saves the change and refreshes the selected organization with the
    /// stored row.
    pub async fn update_organization(
        &self,
        update: OrganizationUpdate,
    ) -> Result<Organization, AppError> {
        let org = self.unlock().await?;
        let updated = self
            .repos
            .organizations
            .update_organization(org.id, &update)
            .await?;
        self.organization
            .set_current_organization(updated.clone())
            .await?;
        Ok(updated.sanitized())
    }

    pub async fn delete_organization(&self) -> Result<(), AppError> {
        let org = self.unlock().await?;
        self.repos.organizations.delete_organization(org.id).await?;
        self.organization.clear_organization().await?;
        info!(org_id = %org.id, "organization deleted");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mock::ScriptedPrompt;
    use super::*;
    use crate::context::local_store::MemoryLocalStore;
    use crate::db::mock_db::MockDb;
    use crate::models::organization::sample_organization;
    use crate::services::storage::mock::MockStorage;
    use crate::services::translation::mock::PrefixTranslator;
    use serde_json::json;

    const PASSCODE: &str = "7777";

    struct Harness {
        db: Arc<MockDb>,
        storage: Arc<MockStorage>,
        prompt: Arc<ScriptedPrompt>,
        editor: GuardedEditor,
        festival: Festival,
    }

    async fn harness(prompt: ScriptedPrompt) -> Harness {
        let org = sample_organization("ganesh");
        let db = Arc::new(MockDb::default().with_organization(org.clone(), PASSCODE));
        let organization = Arc::new(OrganizationContext::new(
            db.clone(),
            Arc::new(MemoryLocalStore::new()),
        ));
        organization.set_current_organization(org.clone()).await.unwrap();
        let storage = Arc::new(MockStorage::default());
        let prompt = Arc::new(prompt);
        let editor = GuardedEditor::new(
            organization,
            prompt.clone(),
            Repositories::mock(db.clone()),
            storage.clone(),
        );
        let festival: Festival = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "organization_id": org.id,
            "name": "Vinayaka Chavithi",
            "year": 2025
        }))
        .unwrap();
        Harness {
            db,
            storage,
            prompt,
            editor,
            festival,
        }
    }

    fn chanda(name: &str) -> DonationInput {
        DonationInput {
            name: name.into(),
            name_telugu: None,
            amount: 5000.0,
            donation_type: "cash".into(),
            category: DonationCategory::Chanda,
            received_amount: 0.0,
        }
    }

    #[tokio::test]
    async fn locked_write_prompts_once_then_proceeds() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;

        h.editor.add_donation(&h.festival, chanda("Ravi")).await.unwrap();
        h.editor.add_donation(&h.festival, chanda("Sita")).await.unwrap();

        assert_eq!(*h.prompt.asked.lock().unwrap(), 1);
        assert_eq!(h.db.donations.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn dismissed_prompt_blocks_the_write() {
        let h = harness(ScriptedPrompt::default()).await;
        let err = h
            .editor
            .add_donation(&h.festival, chanda("Ravi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Locked));
        assert!(h.db.donations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_passcode_blocks_the_write() {
        let h = harness(ScriptedPrompt::answering("0000")).await;
        let err = h.editor.delete_festival(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::WrongPasscode));
        assert_eq!(*h.db.verify_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn validation_happens_before_prompting() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let mut bad = chanda("Ravi");
        bad.amount = 0.0;
        assert!(matches!(
            h.editor.add_donation(&h.festival, bad).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(*h.prompt.asked.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn donations_get_telugu_names_from_translator() {
        let mut h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        h.editor = h.editor.with_translator(Arc::new(PrefixTranslator("te:")));

        let donation = h.editor.add_donation(&h.festival, chanda("Ravi")).await.unwrap();
        assert_eq!(donation.name_telugu.as_deref(), Some("te:Ravi"));

        let mut given = chanda("Sita");
        given.name_telugu = Some("సీత".into());
        let donation = h.editor.add_donation(&h.festival, given).await.unwrap();
        assert_eq!(donation.name_telugu.as_deref(), Some("సీత"));
    }

    #[tokio::test]
    async fn record_payment_updates_received_amount() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let donation = h.editor.add_donation(&h.festival, chanda("Ravi")).await.unwrap();

        let paid = h.editor.record_payment(donation.id, 2500.0).await.unwrap();
        assert_eq!(paid.received_amount, Some(2500.0));
        assert!(matches!(
            h.editor.record_payment(donation.id, -1.0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn expenses_link_by_festival_name_and_year() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let expense = h
            .editor
            .add_expense(
                &h.festival,
                ExpenseInput {
                    expense_type: "Decoration".into(),
                    amount: 1200.0,
                    description: Some(" ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(expense.festival_name, "Vinayaka Chavithi");
        assert_eq!(expense.festival_year, 2025);
        assert_eq!(expense.description, None);
    }

    #[tokio::test]
    async fn image_upload_and_delete_touch_storage_and_rows() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let image = h
            .editor
            .upload_image(
                &h.festival,
                ImageUpload {
                    file_name: "pandal.png".into(),
                    bytes: vec![1, 2, 3],
                    title: "Pandal".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert!(image.image_url.starts_with("https://cdn.test/"));
        assert_eq!(h.storage.objects.lock().unwrap().len(), 1);

        h.editor.delete_image(&image).await.unwrap();
        assert!(h.storage.objects.lock().unwrap().is_empty());
        assert!(h.db.images.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_object_removal_keeps_the_row() {
        let org = sample_organization("ganesh");
        let db = Arc::new(MockDb::default().with_organization(org.clone(), PASSCODE));
        let organization = Arc::new(OrganizationContext::new(
            db.clone(),
            Arc::new(MemoryLocalStore::new()),
        ));
        organization.set_current_organization(org).await.unwrap();
        let editor = GuardedEditor::new(
            organization,
            Arc::new(ScriptedPrompt::answering(PASSCODE)),
            Repositories::mock(db.clone()),
            Arc::new(MockStorage {
                fail_remove: true,
                ..Default::default()
            }),
        );
        let festival: Festival = serde_json::from_value(json!({
            "id": Uuid::new_v4(), "name": "Dasara", "year": 2025
        }))
        .unwrap();
        let image = editor
            .upload_image(
                &festival,
                ImageUpload {
                    file_name: "a.jpg".into(),
                    bytes: vec![],
                    title: "A".into(),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            editor.delete_image(&image).await,
            Err(AppError::Storage(_))
        ));
        assert_eq!(db.images.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn festival_without_id_cannot_take_donations() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let mut incomplete = h.festival.clone();
        incomplete.id = None;
        assert!(matches!(
            h.editor.add_donation(&incomplete, chanda("Ravi")).await,
            Err(AppError::NoFestival)
        ));
    }

    #[tokio::test]
    async fn organization_update_refreshes_context() {
        let h = harness(ScriptedPrompt::answering(PASSCODE)).await;
        let updated = h
            .editor
            .update_organization(OrganizationUpdate {
                enabled_pages: Some(vec!["dashboard".into()]),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.enabled_pages, Some(vec!["dashboard".to_string()]));
        let setting = h.editor.set_setting("voting_enabled", json!(true)).await.unwrap();
        assert_eq!(setting.value, json!(true));

        h.editor.delete_organization().await.unwrap();
        assert!(h.db.organizations.lock().unwrap().is_empty());
    }
}
