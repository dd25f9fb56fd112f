use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "weapon")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub weapon_id: i64,
    /// Unsigned item hash as issued upstream.
    #[sea_orm(unique)]
    pub bng_weapon_id: i64,
    pub weapon_name: String,
    pub weapon_type: String,
    pub ammo_type: String,
    pub slot: String,
    pub damage_type: String,
    pub rarity: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
