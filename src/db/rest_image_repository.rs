use async_trait::async_trait;
use uuid::Uuid;

use crate::db::image_repository::ImageRepository;
use crate::db::rest_client::{BackendClient, BackendError};
use crate::models::image::{ImageRecord, NewImageRecord};

pub struct RestImageRepository {
    pub client: BackendClient,
}

#[async_trait]
impl ImageRepository for RestImageRepository {
    async fn list_images(&self, festival_id: Uuid) -> Result<Vec<ImageRecord>, BackendError> {
        self.client
            .from("images")
            .select("*")
            .eq("festival_id", festival_id)
            .order("created_at", false)
            .fetch()
            .await
    }

    async fn insert_image(&self, image: &NewImageRecord) -> Result<ImageRecord, BackendError> {
        self.client.from("images").insert(image).await
    }

    async fn delete_image(&self, image_id: Uuid) -> Result<(), BackendError> {
        self.client.from("images").eq("id", image_id).delete().await
    }
}
