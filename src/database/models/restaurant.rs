use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a restaurant
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRestaurant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
}

/// Fields accepted on PATCH; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl RestaurantChanges {
    pub fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(address) = self.address {
            restaurant.address = address;
        }
        if let Some(phone) = self.phone {
            restaurant.phone = phone;
        }
        if let Some(is_active) = self.is_active {
            restaurant.is_active = is_active;
        }
    }
}

/// Name filter plus the raw paging parameters from the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantSearch {
    #[serde(default)]
    pub name: String,
    pub page: Option<String>,
    pub page_size: Option<String>,
}
