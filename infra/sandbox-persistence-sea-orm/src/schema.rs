use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};

use crate::entity::{
    activity, activity_stats, armor, character, equipped_armor, equipped_weapon, player, weapon,
};

async fn create_table<C: ConnectionTrait, E: EntityTrait>(db: &C, entity: E) -> Result<(), DbErr> {
    let table_name = entity.table_name().to_string();
    let schema = Schema::new(db.get_database_backend());
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(&stmt).await?;
    log::debug!("Ensured table {}", table_name);
    Ok(())
}

fn unique_index<E: EntityTrait>(
    name: &str,
    entity: E,
    columns: impl IntoIterator<Item = E::Column>,
) -> IndexCreateStatement {
    let mut index = Index::create();
    index.name(name).table(entity).unique().if_not_exists();
    for column in columns {
        index.col(column);
    }
    index
}

/// Creates every table and composite unique key that does not exist yet.
/// Referenced tables are created before the tables pointing at them.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_table(db, player::Entity).await?;
    create_table(db, character::Entity).await?;
    create_table(db, weapon::Entity).await?;
    create_table(db, armor::Entity).await?;
    create_table(db, activity::Entity).await?;
    create_table(db, activity_stats::Entity).await?;
    create_table(db, equipped_weapon::Entity).await?;
    create_table(db, equipped_armor::Entity).await?;

    let indexes = [
        unique_index(
            "uq_activity_stats_character_instance_weapon",
            activity_stats::Entity,
            [
                activity_stats::Column::CharacterId,
                activity_stats::Column::InstanceId,
                activity_stats::Column::WeaponId,
            ],
        ),
        unique_index(
            "uq_equipped_weapons_character_weapon",
            equipped_weapon::Entity,
            [
                equipped_weapon::Column::CharacterId,
                equipped_weapon::Column::WeaponId,
            ],
        ),
        unique_index(
            "uq_equipped_armor_character_armor",
            equipped_armor::Entity,
            [
                equipped_armor::Column::CharacterId,
                equipped_armor::Column::ArmorId,
            ],
        ),
    ];
    for index in &indexes {
        db.execute(index).await?;
    }
    Ok(())
}
