//! Parameterized statements shared by every repository. Values are always
//! bound, never spliced into SQL text.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, Insert,
    QueryFilter, Value,
    sea_query::{Expr, OnConflict},
};

/// Inserts one row, doing nothing when a row with the same unique key exists.
pub struct InsertCommand<A: ActiveModelTrait> {
    model: A,
    unique_key: Vec<<A::Entity as EntityTrait>::Column>,
}

impl<A> InsertCommand<A>
where
    A: ActiveModelTrait + Send,
{
    pub fn new(model: A) -> Self {
        Self {
            model,
            unique_key: Vec::new(),
        }
    }

    pub fn unique_on(
        mut self,
        columns: impl IntoIterator<Item = <A::Entity as EntityTrait>::Column>,
    ) -> Self {
        self.unique_key.extend(columns);
        self
    }

    /// Returns `false` when the unique key already existed and nothing was written.
    pub async fn execute<C: ConnectionTrait>(self, db: &C) -> Result<bool, DbErr> {
        let mut insert = Insert::one(self.model);
        if !self.unique_key.is_empty() {
            let on_conflict = OnConflict::columns(self.unique_key.clone())
                .do_nothing_on(self.unique_key)
                .to_owned();
            insert = insert.on_conflict(on_conflict);
        }
        match insert.exec_without_returning(db).await {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Equality filters over one entity.
pub struct SelectCommand<E: EntityTrait> {
    condition: Condition,
    entity: PhantomData<E>,
}

impl<E: EntityTrait> SelectCommand<E> {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            entity: PhantomData,
        }
    }

    pub fn filter_eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.condition = self.condition.add(column.eq(value));
        self
    }

    pub async fn first<C: ConnectionTrait>(self, db: &C) -> Result<Option<E::Model>, DbErr> {
        E::find().filter(self.condition).one(db).await
    }

    pub async fn execute<C: ConnectionTrait>(self, db: &C) -> Result<Vec<E::Model>, DbErr> {
        E::find().filter(self.condition).all(db).await
    }
}

pub struct UpdateCommand<E: EntityTrait> {
    condition: Condition,
    values: Vec<(E::Column, Value)>,
}

impl<E: EntityTrait> UpdateCommand<E> {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            values: Vec::new(),
        }
    }

    pub fn set(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn filter_eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.condition = self.condition.add(column.eq(value));
        self
    }

    /// Rows affected. Some backends do not count rows whose values were unchanged.
    pub async fn execute<C: ConnectionTrait>(self, db: &C) -> Result<u64, DbErr> {
        if self.values.is_empty() {
            return Ok(0);
        }
        let mut update = E::update_many();
        for (column, value) in self.values {
            update = update.col_expr(column, Expr::value(value));
        }
        let result = update.filter(self.condition).exec(db).await?;
        Ok(result.rows_affected)
    }
}

pub struct DeleteCommand<E: EntityTrait> {
    condition: Condition,
    entity: PhantomData<E>,
}

impl<E: EntityTrait> DeleteCommand<E> {
    pub fn new() -> Self {
        Self {
            condition: Condition::all(),
            entity: PhantomData,
        }
    }

    pub fn filter_eq(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.condition = self.condition.add(column.eq(value));
        self
    }

    pub async fn execute<C: ConnectionTrait>(self, db: &C) -> Result<u64, DbErr> {
        let result = E::delete_many().filter(self.condition).exec(db).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Set;

    use super::*;
    use crate::{entity::weapon, testing::memory_db};

    fn weapon_model(hash: i64, name: &str) -> weapon::ActiveModel {
        weapon::ActiveModel {
            bng_weapon_id: Set(hash),
            weapon_name: Set(name.to_string()),
            weapon_type: Set("HAND_CANNON".to_string()),
            ammo_type: Set("PRIMARY".to_string()),
            slot: Set("KINETIC".to_string()),
            damage_type: Set("KINETIC".to_string()),
            rarity: Set("EXOTIC".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_ignores_existing_unique_key() {
        let db = memory_db().await;
        let first = InsertCommand::new(weapon_model(1666, "Ace of Spades"))
            .unique_on([weapon::Column::BngWeaponId])
            .execute(&db)
            .await
            .unwrap();
        let second = InsertCommand::new(weapon_model(1666, "Renamed"))
            .unique_on([weapon::Column::BngWeaponId])
            .execute(&db)
            .await
            .unwrap();
        assert!(first);
        assert!(!second);

        let rows = SelectCommand::<weapon::Entity>::new()
            .filter_eq(weapon::Column::BngWeaponId, 1666i64)
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weapon_name, "Ace of Spades");
    }

    #[tokio::test]
    async fn test_update_and_delete_respect_filters() {
        let db = memory_db().await;
        for (hash, name) in [(1, "One"), (2, "Two")] {
            InsertCommand::new(weapon_model(hash, name))
                .execute(&db)
                .await
                .unwrap();
        }

        let updated = UpdateCommand::<weapon::Entity>::new()
            .set(weapon::Column::Rarity, "LEGENDARY")
            .filter_eq(weapon::Column::BngWeaponId, 2i64)
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(updated, 1);
        let two = SelectCommand::<weapon::Entity>::new()
            .filter_eq(weapon::Column::BngWeaponId, 2i64)
            .first(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(two.rarity, "LEGENDARY");

        let deleted = DeleteCommand::<weapon::Entity>::new()
            .filter_eq(weapon::Column::BngWeaponId, 1i64)
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(deleted, 1);
        let remaining = SelectCommand::<weapon::Entity>::new()
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn test_update_without_values_is_a_no_op() {
        let db = memory_db().await;
        let updated = UpdateCommand::<weapon::Entity>::new()
            .filter_eq(weapon::Column::BngWeaponId, 1i64)
            .execute(&db)
            .await
            .unwrap();
        assert_eq!(updated, 0);
    }
}
