use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub activity_id: i64,
    #[sea_orm(unique)]
    pub bng_activity_id: i64,
    pub activity_name: String,
    #[sea_orm(column_name = "type")]
    pub activity_type: String,
    pub max_fireteam_size: i32,
    pub modifiers: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
