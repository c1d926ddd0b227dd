use crate::errors::{Result, StoreError};
use crate::util::slugify;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

pub type ProductId = String; // ULID string
pub type SellerId = String;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Location {
    fn trimmed(city: &str, state: &str, country: &str) -> Self {
        Self {
            city: city.trim().to_string(),
            state: state.trim().to_string(),
            country: country.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: SellerId,
    pub name: String,
    pub slug: String,
    pub shop_name: String,
    pub category: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub discount: u32,
    #[serde(default)]
    pub rating: f64,
    pub brand: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub location: Location,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Form fields of the seller "add product" form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: u32,
    pub price: f64,
    #[serde(default)]
    pub discount: u32,
    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount: u32,
    pub price: f64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
}

fn checked_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid("product name is required".into()));
    }
    Ok(name.to_string())
}

fn checked_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(StoreError::Invalid(format!("invalid price: {price}")));
    }
    Ok(price)
}

impl NewProduct {
    /// Checks the fields `Product::create` would reject, without building anything.
    pub fn validate(&self) -> Result<()> {
        checked_name(&self.name)?;
        checked_price(self.price)?;
        Ok(())
    }
}

impl Product {
    pub fn create(seller_id: &str, req: NewProduct, images: Vec<String>) -> Result<Self> {
        req.validate()?;
        let name = checked_name(&req.name)?;
        let price = req.price;
        let now = Utc::now();
        Ok(Self {
            id: Ulid::new().to_string(),
            seller_id: seller_id.to_string(),
            slug: slugify(&name),
            name,
            shop_name: req.shop_name,
            category: req.category.trim().to_string(),
            description: req.description.trim().to_string(),
            stock: req.stock,
            price,
            discount: req.discount,
            rating: 0.0,
            brand: req.brand.trim().to_string(),
            images,
            location: Location::trimmed(&req.city, &req.state, &req.country),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_update(&mut self, update: ProductUpdate) -> Result<()> {
        let name = checked_name(&update.name)?;
        self.price = checked_price(update.price)?;
        self.slug = slugify(&name);
        self.name = name;
        self.description = update.description;
        self.discount = update.discount;
        self.brand = update.brand;
        self.stock = update.stock;
        self.location = Location::trimmed(&update.city, &update.state, &update.country);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Swaps `old` for `new` in place; errors when `old` is not one of the images.
    pub fn replace_image(&mut self, old: &str, new: String) -> Result<()> {
        let slot = self
            .images
            .iter_mut()
            .find(|img| img.as_str() == old)
            .ok_or_else(|| StoreError::NotFound(format!("image {old}")))?;
        *slot = new;
        self.updated_at = Utc::now();
        Ok(())
    }
}
