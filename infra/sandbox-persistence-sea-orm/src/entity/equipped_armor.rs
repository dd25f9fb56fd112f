use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "equipped_armor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub equipped_armor_id: i64,
    pub character_id: i64,
    pub armor_id: i64,
    pub slot_type: String,
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
        belongs_to = "super::armor::Entity",
        from = "Column::ArmorId",
        to = "super::armor::Column::ArmorId"
    )]
    Armor,
}

impl Related<super::armor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Armor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
