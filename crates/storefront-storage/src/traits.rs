use bytes::Bytes;
use serde::{Deserialize, Serialize};
use storefront_core::{NewProduct, Product, ProductUpdate, Result};

/// Seller dashboard listing: newest first, optional text search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerListRequest {
    /// 1-based.
    pub page: u32,
    pub par_page: usize,
    #[serde(default)]
    pub search_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPage {
    pub total_product: usize,
    pub products: Vec<Product>,
}

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync + 'static {
    async fn create(&self, seller_id: &str, req: NewProduct, images: Vec<String>)
        -> Result<Product>;
    async fn get(&self, id: &str) -> Result<Product>;
    async fn list_for_seller(&self, seller_id: &str, req: SellerListRequest) -> Result<SellerPage>;
    async fn update(&self, seller_id: &str, id: &str, update: ProductUpdate) -> Result<Product>;
    async fn delete(&self, seller_id: &str, id: &str) -> Result<Product>;
    async fn replace_image(
        &self,
        seller_id: &str,
        id: &str,
        old_url: &str,
        new_url: String,
    ) -> Result<Product>;

    // Candidate list for catalogue queries
    async fn all(&self) -> Result<Vec<Product>>;
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait::async_trait]
pub trait ImageHost: Send + Sync + 'static {
    /// Stores the image under `folder` and returns its public URL.
    async fn upload(&self, folder: &str, image: ImageUpload) -> Result<String>;
}
