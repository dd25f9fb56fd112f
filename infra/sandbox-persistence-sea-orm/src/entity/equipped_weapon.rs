use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "equipped_weapons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub equipped_weapon_id: i64,
    pub character_id: i64,
    pub weapon_id: i64,
    pub slot_type: String,
    pub main_stat: String,
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
        belongs_to = "super::weapon::Entity",
        from = "Column::WeaponId",
        to = "super::weapon::Column::WeaponId"
    )]
    Weapon,
}

impl Related<super::weapon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Weapon.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
