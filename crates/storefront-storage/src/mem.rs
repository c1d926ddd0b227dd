use crate::traits::{ProductStore, SellerListRequest, SellerPage};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use storefront_core::{NewProduct, Product, ProductId, ProductUpdate, Result, SellerId, StoreError};
use tracing::{debug, info};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: HashMap<ProductId, Product>,
    // insertion order, oldest first
    order: Vec<ProductId>,
    by_seller: HashMap<SellerId, Vec<ProductId>>,
}

impl Inner {
    fn owned_mut(&mut self, seller_id: &str, id: &str) -> Result<&mut Product> {
        let p = self
            .data
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))?;
        if p.seller_id != seller_id {
            return Err(StoreError::Forbidden(format!("product {id} belongs to another seller")));
        }
        Ok(p)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads products as-is, keeping their ids and timestamps.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for p in products {
                inner.order.push(p.id.clone());
                inner
                    .by_seller
                    .entry(p.seller_id.clone())
                    .or_default()
                    .push(p.id.clone());
                inner.data.insert(p.id.clone(), p);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.inner.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn words(p: &Product) -> HashSet<String> {
    [&p.name, &p.category, &p.brand, &p.description]
        .into_iter()
        .flat_map(|s| s.split(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whole-word match: any search term equals some word of the product text.
fn text_match(p: &Product, terms: &[String]) -> bool {
    let ws = words(p);
    terms.iter().any(|t| ws.contains(t))
}

#[async_trait::async_trait]
impl ProductStore for InMemoryStore {
    async fn create(
        &self,
        seller_id: &str,
        req: NewProduct,
        images: Vec<String>,
    ) -> Result<Product> {
        let product = Product::create(seller_id, req, images)?;
        let mut inner = self.inner.write();
        inner.order.push(product.id.clone());
        inner
            .by_seller
            .entry(product.seller_id.clone())
            .or_default()
            .push(product.id.clone());
        inner.data.insert(product.id.clone(), product.clone());
        info!(id = %product.id, seller = %seller_id, "product created");
        Ok(product)
    }

    async fn get(&self, id: &str) -> Result<Product> {
        self.inner
            .read()
            .data
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))
    }

    async fn list_for_seller(&self, seller_id: &str, req: SellerListRequest) -> Result<SellerPage> {
        if req.page == 0 || req.par_page == 0 {
            return Err(StoreError::Invalid("page and parPage must be at least 1".into()));
        }
        let terms: Vec<String> = req
            .search_value
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default();
        let inner = self.inner.read();
        let mut matched: Vec<&Product> = inner
            .by_seller
            .get(seller_id)
            .map(|ids| ids.iter().rev().filter_map(|id| inner.data.get(id)).collect())
            .unwrap_or_default();
        if !terms.is_empty() {
            matched.retain(|p| text_match(p, &terms));
        }
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total_product = matched.len();
        let skip = (req.page as usize - 1).saturating_mul(req.par_page);
        let products = matched
            .into_iter()
            .skip(skip)
            .take(req.par_page)
            .cloned()
            .collect();
        debug!(seller = %seller_id, total_product, "seller listing");
        Ok(SellerPage {
            total_product,
            products,
        })
    }

    async fn update(&self, seller_id: &str, id: &str, update: ProductUpdate) -> Result<Product> {
        let mut inner = self.inner.write();
        let p = inner.owned_mut(seller_id, id)?;
        p.apply_update(update)?;
        Ok(p.clone())
    }

    async fn delete(&self, seller_id: &str, id: &str) -> Result<Product> {
        let mut inner = self.inner.write();
        inner.owned_mut(seller_id, id)?;
        let removed = inner
            .data
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))?;
        inner.order.retain(|x| x != id);
        if let Some(ids) = inner.by_seller.get_mut(seller_id) {
            ids.retain(|x| x != id);
        }
        info!(id = %id, seller = %seller_id, "product deleted");
        Ok(removed)
    }

    async fn replace_image(
        &self,
        seller_id: &str,
        id: &str,
        old_url: &str,
        new_url: String,
    ) -> Result<Product> {
        let mut inner = self.inner.write();
        let p = inner.owned_mut(seller_id, id)?;
        p.replace_image(old_url, new_url)?;
        Ok(p.clone())
    }

    async fn all(&self) -> Result<Vec<Product>> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.data.get(id).cloned())
            .collect())
    }
}
