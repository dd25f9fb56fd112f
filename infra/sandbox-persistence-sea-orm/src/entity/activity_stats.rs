use sea_orm::entity::prelude::*;

/// One weapon's performance for one character in one match. Unique on
/// (character_id, instance_id, weapon_id), see `schema::create_schema`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub activity_stats_id: i64,
    pub character_id: i64,
    pub activity_id: i64,
    pub weapon_id: i64,
    pub instance_id: i64,
    pub kills: i64,
    pub precision_kills: i64,
    pub precision_kills_percent: f64,
    pub weapon_name: String,
    pub activity_name: String,
    pub character_class: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::character::Entity",
        from = "Column::CharacterId",
        to = "super::character::Column::CharacterId"
    )]
    Character,
    #[sea_orm(
        belongs_to = "super::activity::Entity",
        from = "Column::ActivityId",
        to = "super::activity::Column::ActivityId"
    )]
    Activity,
    #[sea_orm(
        belongs_to = "super::weapon::Entity",
        from = "Column::WeaponId",
        to = "super::weapon::Column::WeaponId"
    )]
    Weapon,
}

impl ActiveModelBehavior for ActiveModel {}
