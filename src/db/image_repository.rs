use async_trait::async_trait;
use uuid::Uuid;

use crate::db::rest_client::BackendError;
use crate::models::image::{ImageRecord, NewImageRecord};

#[async_trait]
pub trait ImageRepository: Send + Sync {
    async fn list_images(&self, festival_id: Uuid) -> Result<Vec<ImageRecord>, BackendError>;

    async fn insert_image(&self, image: &NewImageRecord) -> Result<ImageRecord, BackendError>;

    async fn delete_image(&self, image_id: Uuid) -> Result<(), BackendError>;
}
