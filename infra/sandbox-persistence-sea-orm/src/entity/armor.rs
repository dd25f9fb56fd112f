use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "armor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub armor_id: i64,
    #[sea_orm(unique)]
    pub bng_armor_id: i64,
    pub armor_name: String,
    pub slot: String,
    pub rarity: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
