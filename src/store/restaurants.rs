use chrono::NaiveTime;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::Coordinate;
use crate::models::restaurant::{MenuItem, Restaurant};

#[derive(Default)]
pub struct RestaurantStore {
    restaurants: DashMap<Uuid, Restaurant>,
    menu_items: DashMap<Uuid, MenuItem>,
}

impl RestaurantStore {
    pub fn new() -> Self {
        Self {
            restaurants: DashMap::new(),
            menu_items: DashMap::new(),
        }
    }

    pub fn insert(&self, restaurant: Restaurant) {
        self.restaurants.insert(restaurant.id, restaurant);
    }

    pub fn get(&self, id: Uuid) -> Option<Restaurant> {
        self.restaurants.get(&id).map(|entry| entry.value().clone())
    }

    pub fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        phone: Option<String>,
        location: Option<Coordinate>,
        opening_time: Option<NaiveTime>,
        closing_time: Option<NaiveTime>,
    ) -> Option<Restaurant> {
        let mut restaurant = self.restaurants.get_mut(&id)?;
        if let Some(name) = name {
            restaurant.name = name;
        }
        if let Some(phone) = phone {
            restaurant.phone = phone;
        }
        if let Some(location) = location {
            restaurant.location = location;
        }
        if let Some(opening_time) = opening_time {
            restaurant.opening_time = opening_time;
        }
        if let Some(closing_time) = closing_time {
            restaurant.closing_time = closing_time;
        }
        Some(restaurant.clone())
    }

    /// Tags the restaurant with a cuisine. Duplicate tags are rejected,
    /// compared case-insensitively.
    pub fn add_cuisine(
        &self,
        restaurant_id: Uuid,
        cuisine: String,
    ) -> Result<Restaurant, AppError> {
        let Some(mut restaurant) = self.restaurants.get_mut(&restaurant_id) else {
            return Err(AppError::NotFound(format!(
                "restaurant {} not found",
                restaurant_id
            )));
        };

        if restaurant.serves(&cuisine) {
            return Err(AppError::BadRequest(format!(
                "cuisine '{}' already exists for this restaurant",
                cuisine
            )));
        }

        restaurant.cuisines.push(cuisine);
        Ok(restaurant.clone())
    }

    /// Restaurants serving `kind_of_food` that are open at
    /// `desired_time`.
    pub fn suggest(&self, kind_of_food: &str, desired_time: NaiveTime) -> Vec<Restaurant> {
        self.restaurants
            .iter()
            .filter(|entry| {
                let restaurant = entry.value();
                restaurant.serves(kind_of_food) && restaurant.open_at(desired_time)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Adding an item that already exists on the menu updates its price
    /// instead of creating a duplicate entry.
    pub fn upsert_menu_item(&self, restaurant_id: Uuid, item: String, price: u32) -> MenuItem {
        let existing = self.menu_items.iter().find_map(|entry| {
            let menu_item = entry.value();
            (menu_item.restaurant_id == restaurant_id && menu_item.item == item)
                .then_some(menu_item.id)
        });

        if let Some(id) = existing {
            if let Some(mut menu_item) = self.menu_items.get_mut(&id) {
                menu_item.price = price;
                return menu_item.clone();
            }
        }

        let menu_item = MenuItem {
            id: Uuid::new_v4(),
            restaurant_id,
            item,
            price,
        };
        self.menu_items.insert(menu_item.id, menu_item.clone());
        menu_item
    }

    pub fn menu_for(&self, restaurant_id: Uuid) -> Vec<MenuItem> {
        self.menu_items
            .iter()
            .filter(|entry| entry.value().restaurant_id == restaurant_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_menu_item(&self, restaurant_id: Uuid, item: &str) -> Option<MenuItem> {
        self.menu_items.iter().find_map(|entry| {
            let menu_item = entry.value();
            (menu_item.restaurant_id == restaurant_id && menu_item.item == item)
                .then(|| menu_item.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    use super::RestaurantStore;
    use crate::geo::Coordinate;
    use crate::models::restaurant::Restaurant;

    fn restaurant(id_seed: u128) -> Restaurant {
        Restaurant {
            id: Uuid::from_u128(id_seed),
            manager_id: Uuid::new_v4(),
            name: "Trattoria".to_string(),
            phone: "5551234567".to_string(),
            location: Coordinate {
                latitude: 52.52,
                longitude: 13.405,
            },
            cuisines: Vec::new(),
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_updates_price_for_existing_item() {
        let store = RestaurantStore::new();
        store.insert(restaurant(1));
        let id = Uuid::from_u128(1);

        let created = store.upsert_menu_item(id, "Margherita".to_string(), 9);
        let updated = store.upsert_menu_item(id, "Margherita".to_string(), 11);

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.price, 11);
        assert_eq!(store.menu_for(id).len(), 1);
    }

    #[test]
    fn menu_is_scoped_per_restaurant() {
        let store = RestaurantStore::new();
        store.insert(restaurant(1));
        store.insert(restaurant(2));

        store.upsert_menu_item(Uuid::from_u128(1), "Ramen".to_string(), 12);
        store.upsert_menu_item(Uuid::from_u128(2), "Ramen".to_string(), 14);

        let first = store.menu_for(Uuid::from_u128(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].price, 12);
        assert!(store.find_menu_item(Uuid::from_u128(2), "Ramen").is_some());
        assert!(store.find_menu_item(Uuid::from_u128(2), "Udon").is_none());
    }

    #[test]
    fn duplicate_cuisine_is_rejected_case_insensitively() {
        let store = RestaurantStore::new();
        store.insert(restaurant(1));
        let id = Uuid::from_u128(1);

        let tagged = store.add_cuisine(id, "Italian".to_string()).unwrap();
        assert_eq!(tagged.cuisines, vec!["Italian".to_string()]);

        assert!(store.add_cuisine(id, "italian".to_string()).is_err());
        assert!(store.add_cuisine(id, "Japanese".to_string()).is_ok());
        assert_eq!(store.get(id).unwrap().cuisines.len(), 2);
    }

    #[test]
    fn suggestions_match_cuisine_and_opening_hours() {
        let store = RestaurantStore::new();
        store.insert(restaurant(1));
        store.insert(restaurant(2));
        store.add_cuisine(Uuid::from_u128(1), "Italian".to_string()).unwrap();
        store.add_cuisine(Uuid::from_u128(2), "Japanese".to_string()).unwrap();

        let lunch = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let suggested = store.suggest("italian", lunch);
        assert_eq!(suggested.len(), 1);
        assert_eq!(suggested[0].id, Uuid::from_u128(1));

        // Outside opening hours nothing matches.
        let midnight = NaiveTime::from_hms_opt(3, 0, 0).unwrap();
        assert!(store.suggest("italian", midnight).is_empty());

        assert!(store.suggest("mexican", lunch).is_empty());
    }
}
