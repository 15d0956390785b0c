//! Restaurant domain types and form parsing.
//!
//! Restaurant create and update requests arrive as `multipart/form-data`
//! built by the web frontend's `FormData`: plain scalar fields, list entries
//! keyed by index (`cuisines[0]`), and menu items keyed by index and member
//! (`menuItems[0][name]`, `menuItems[0][price]`). [`RestaurantDetails::from_fields`]
//! turns those text fields into a validated value.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dinehub_core::{Price, RestaurantId, UserId};

/// A restaurant owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: RestaurantId,
    /// Owning user.
    #[serde(rename = "user")]
    pub owner: UserId,
    pub restaurant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub delivery_price: Price,
    /// Estimated delivery time in minutes.
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    #[sqlx(json)]
    pub menu_items: Vec<MenuItem>,
    pub image_url: String,
    pub last_updated: DateTime<Utc>,
}

impl Restaurant {
    /// Overwrite every owner-editable field and stamp `last_updated`.
    ///
    /// The image URL and owner are left untouched.
    pub fn apply_details(&mut self, details: RestaurantDetails, now: DateTime<Utc>) {
        let RestaurantDetails {
            restaurant_name,
            address,
            city,
            country,
            delivery_price,
            estimated_delivery_time,
            cuisines,
            menu_items,
        } = details;
        self.restaurant_name = restaurant_name;
        self.address = address;
        self.city = city;
        self.country = country;
        self.delivery_price = delivery_price;
        self.estimated_delivery_time = estimated_delivery_time;
        self.cuisines = cuisines;
        self.menu_items = menu_items;
        self.last_updated = now;
    }
}

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: String,
    pub price: Price,
}

/// The owner-editable fields of a restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantDetails {
    pub restaurant_name: String,
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub delivery_price: Price,
    pub estimated_delivery_time: i32,
    pub cuisines: Vec<String>,
    pub menu_items: Vec<MenuItem>,
}

/// Parameters for creating a restaurant.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub owner: UserId,
    pub details: RestaurantDetails,
    pub image_url: String,
    pub last_updated: DateTime<Utc>,
}

/// Errors found while reading a restaurant form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unrecognized form field: {0}")]
    UnknownField(String),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be a non-negative whole number (got {value:?})")]
    InvalidNumber { field: String, value: String },

    #[error("at least one cuisine is required")]
    NoCuisines,

    #[error("menu item {0} needs a name and a price")]
    IncompleteMenuItem(usize),

    #[error("image file is required")]
    MissingImage,

    #[error("image file must be an image (got {0})")]
    NotAnImage(String),
}

#[derive(Default)]
struct MenuItemFields {
    name: Option<String>,
    price: Option<String>,
}

impl RestaurantDetails {
    /// Build validated details from the text fields of a restaurant form.
    ///
    /// Empty values count as absent. `address` is optional; every other
    /// scalar is required. Cuisine and menu item order follows the indices in
    /// the field names, and un-indexed `cuisines` entries are appended in the
    /// order they were sent.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] encountered.
    pub fn from_fields<I>(fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut scalars: BTreeMap<&'static str, String> = BTreeMap::new();
        let mut indexed_cuisines: BTreeMap<usize, String> = BTreeMap::new();
        let mut appended_cuisines: Vec<String> = Vec::new();
        let mut menu_items: BTreeMap<usize, MenuItemFields> = BTreeMap::new();

        for (name, value) in fields {
            let value = value.trim().to_owned();

            if let Some(key) = scalar_key(&name) {
                scalars.insert(key, value);
            } else if name == "cuisines" || name == "cuisines[]" {
                appended_cuisines.push(value);
            } else if let Some(index) = index_of(&name, "cuisines") {
                indexed_cuisines.insert(index, value);
            } else if let Some((index, member)) = menu_item_key(&name) {
                let entry = menu_items.entry(index).or_default();
                match member {
                    "name" => entry.name = Some(value),
                    _ => entry.price = Some(value),
                }
            } else {
                return Err(FormError::UnknownField(name));
            }
        }

        let mut take = |key: &'static str| scalars.remove(key).filter(|v| !v.is_empty());

        let restaurant_name = take("restaurantName").ok_or(FormError::Missing("restaurantName"))?;
        let address = take("address");
        let city = take("city").ok_or(FormError::Missing("city"))?;
        let country = take("country").ok_or(FormError::Missing("country"))?;
        let delivery_price = take("deliveryPrice")
            .ok_or(FormError::Missing("deliveryPrice"))
            .and_then(|raw| parse_price("deliveryPrice", &raw))?;
        let estimated_delivery_time = take("estimatedDeliveryTime")
            .ok_or(FormError::Missing("estimatedDeliveryTime"))
            .and_then(|raw| parse_minutes(&raw))?;

        let cuisines: Vec<String> = indexed_cuisines
            .into_values()
            .chain(appended_cuisines)
            .filter(|c| !c.is_empty())
            .collect();
        if cuisines.is_empty() {
            return Err(FormError::NoCuisines);
        }

        let menu_items = menu_items
            .into_iter()
            .map(|(index, item)| {
                let name = item.name.filter(|n| !n.is_empty());
                let price = item.price.filter(|p| !p.is_empty());
                match (name, price) {
                    (Some(name), Some(price)) => Ok(MenuItem {
                        name,
                        price: parse_price(&format!("menuItems[{index}][price]"), &price)?,
                    }),
                    _ => Err(FormError::IncompleteMenuItem(index)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            restaurant_name,
            address,
            city,
            country,
            delivery_price,
            estimated_delivery_time,
            cuisines,
            menu_items,
        })
    }
}

fn scalar_key(name: &str) -> Option<&'static str> {
    [
        "restaurantName",
        "address",
        "city",
        "country",
        "deliveryPrice",
        "estimatedDeliveryTime",
    ]
    .into_iter()
    .find(|key| *key == name)
}

/// Parse `prefix[<index>]` into the index.
fn index_of(name: &str, prefix: &str) -> Option<usize> {
    name.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')?
        .parse()
        .ok()
}

/// Parse `menuItems[<index>][name|price]` into the index and member.
fn menu_item_key(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("menuItems[")?;
    let (index, member) = rest.split_once("][")?;
    let member = member.strip_suffix(']')?;
    if member != "name" && member != "price" {
        return None;
    }
    Some((index.parse().ok()?, member))
}

fn parse_price(field: &str, raw: &str) -> Result<Price, FormError> {
    raw.parse::<Price>().map_err(|_| FormError::InvalidNumber {
        field: field.to_owned(),
        value: raw.to_owned(),
    })
}

fn parse_minutes(raw: &str) -> Result<i32, FormError> {
    raw.parse::<i32>()
        .ok()
        .filter(|minutes| *minutes >= 0)
        .ok_or_else(|| FormError::InvalidNumber {
            field: "estimatedDeliveryTime".to_owned(),
            value: raw.to_owned(),
        })
}
