use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "player")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub player_id: i64,
    #[sea_orm(unique)]
    pub destiny_id: i64,
    pub bng_id: i64,
    pub bng_username: String,
    pub date_created: Date,
    pub date_last_played: Date,
    pub platform: String,
    /// Owned character ids as a JSON array of decimal strings.
    pub character_ids: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::character::Entity")]
    Character,
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Character.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
