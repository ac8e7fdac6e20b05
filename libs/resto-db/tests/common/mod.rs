#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use resto_db::{ConnectOpts, DbHandle};
use sea_orm::{ConnectionTrait, EntityTrait, Schema, Set};

pub mod category {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub category_name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::product::Entity")]
        Products,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Products.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod product {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub product_name: String,
        pub description: Option<String>,
        pub product_price: f64,
        pub in_stock: bool,
        pub category_id: i64,
        pub created_at: DateTimeUtc,
        pub released_on: Date,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::category::Entity",
            from = "Column::CategoryId",
            to = "super::category::Column::Id"
        )]
        Category,
    }

    impl Related<super::category::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub const PRODUCT_COUNT: i64 = 25;

/// Fresh in-memory database with both tables created.
pub async fn setup() -> Result<DbHandle> {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
    let backend = db.conn().get_database_backend();
    let schema = Schema::new(backend);
    db.conn()
        .execute(backend.build(&schema.create_table_from_entity(category::Entity)))
        .await?;
    db.conn()
        .execute(backend.build(&schema.create_table_from_entity(product::Entity)))
        .await?;
    Ok(db)
}

/// Product names containing "Cola"; every other product is "Item NN".
pub fn product_name(i: i64) -> String {
    match i {
        3 => "Coca Cola".to_string(),
        7 => "Pepsi Cola".to_string(),
        12 => "Cola Zero".to_string(),
        _ => format!("Item {i:02}"),
    }
}

pub fn product_am(i: i64) -> product::ActiveModel {
    const PRICES: [f64; 5] = [5.0, 2.5, 7.0, 2.5, 9.0];
    product::ActiveModel {
        id: Set(i),
        product_name: Set(product_name(i)),
        description: Set((i % 4 == 0).then(|| "house special".to_string())),
        product_price: Set(PRICES[(i % 5) as usize]),
        in_stock: Set(i % 2 == 0),
        category_id: Set(if i % 3 == 0 { 1 } else { 2 }),
        created_at: Set(Utc
            .with_ymd_and_hms(2024, 1, 1 + (i % 5) as u32, 10, 30, 0)
            .unwrap()),
        released_on: Set(NaiveDate::from_ymd_opt(2024, 2, 1 + (i % 3) as u32).unwrap()),
    }
}

/// Two categories and `PRODUCT_COUNT` products.
pub async fn seed(db: &DbHandle) -> Result<()> {
    let cats = vec![
        category::ActiveModel {
            id: Set(1),
            category_name: Set("Drinks".into()),
        },
        category::ActiveModel {
            id: Set(2),
            category_name: Set("Mains".into()),
        },
    ];
    category::Entity::insert_many(cats).exec(db.conn()).await?;

    let n = db
        .repo::<product::Entity>()
        .add_range((1..=PRODUCT_COUNT).map(product_am).collect())
        .await?;
    assert_eq!(n, PRODUCT_COUNT as u64);
    Ok(())
}

pub async fn seeded() -> Result<DbHandle> {
    let db = setup().await?;
    seed(&db).await?;
    Ok(db)
}
