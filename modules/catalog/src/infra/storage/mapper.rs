use chrono::{DateTime, Utc};
use sea_orm::{NotSet, Set};

use crate::contract::model::{Category, NewCategory, NewProduct, Product};
use crate::infra::storage::entity::{category, product};

impl From<product::Model> for Product {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            stock: m.stock,
            category_id: m.category_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<category::Model> for Category {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

/// Full row for a live product; the engine writes every column on update.
pub fn product_to_model(p: Product) -> product::Model {
    product::Model {
        id: p.id,
        name: p.name,
        description: p.description,
        price: p.price,
        stock: p.stock,
        category_id: p.category_id,
        is_deleted: false,
        created_at: p.created_at,
        updated_at: p.updated_at,
    }
}

pub fn new_product_am(p: NewProduct, at: DateTime<Utc>) -> product::ActiveModel {
    product::ActiveModel {
        id: NotSet,
        name: Set(p.name),
        description: Set(p.description),
        price: Set(p.price),
        stock: Set(p.stock),
        category_id: Set(p.category_id),
        is_deleted: Set(false),
        created_at: Set(at),
        updated_at: Set(at),
    }
}

pub fn new_category_am(c: NewCategory) -> category::ActiveModel {
    category::ActiveModel {
        id: NotSet,
        name: Set(c.name),
        description: Set(c.description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_product_roundtrip_through_model() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let p = Product {
            id: 7,
            name: "Espresso".into(),
            description: None,
            price: 2.5,
            stock: 40,
            category_id: 1,
            created_at: at,
            updated_at: at,
        };
        let m = product_to_model(p.clone());
        assert!(!m.is_deleted);
        assert_eq!(Product::from(m), p);
    }

    #[test]
    fn test_new_product_leaves_id_unset() {
        let at = Utc::now();
        let am = new_product_am(
            NewProduct {
                name: "Tiramisu".into(),
                description: Some("house special".into()),
                price: 6.0,
                stock: 3,
                category_id: 2,
            },
            at,
        );
        assert!(am.id.is_not_set());
        assert_eq!(am.created_at, Set(at));
        assert_eq!(am.updated_at, Set(at));
        assert_eq!(am.is_deleted, Set(false));
    }
}
