use chrono::NaiveDate;
use sandbox_app::domain::{
    AccountRowId, ActivityHash, CharacterId, DestinyId, ItemHash,
    account::{Account, AccountRepository},
    activity::{Activity, ActivityRepository},
    character::{Character, CharacterRepository},
    stats::StatRowKeys,
    weapon::{Weapon, WeaponRepository},
};
use sandbox_manifest::catalog::{
    AmmoType, ClassType, DamageType, Platform, Rarity, WeaponSlot, WeaponType,
};
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::{
    accounts::AccountRepositoryImpl, activities::ActivityRepositoryImpl,
    characters::CharacterRepositoryImpl, connect, schema::create_schema,
    weapons::WeaponRepositoryImpl,
};

/// Fresh in-memory SQLite database with the full schema. A single pooled
/// connection keeps every statement on the same database.
pub async fn memory_db() -> DatabaseConnection {
    let db = connect("sqlite::memory:", 1).await.unwrap();
    db.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();
    create_schema(&db).await.unwrap();
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn account(destiny_id: i64) -> Account {
    Account {
        destiny_id: DestinyId(destiny_id),
        platform: Platform::Steam,
        bng_id: 9001,
        bng_username: format!("Guardian#{destiny_id}"),
        date_created: date(2017, 9, 6),
        date_last_played: date(2024, 3, 1),
        character_ids: vec![CharacterId(destiny_id * 10 + 1)],
    }
}

pub fn character(character_id: i64, destiny_id: i64, account_row_id: AccountRowId) -> Character {
    Character {
        character_id: CharacterId(character_id),
        destiny_id: DestinyId(destiny_id),
        platform: Platform::Steam,
        account_row_id,
        class: ClassType::Hunter,
        date_last_played: date(2024, 3, 1),
    }
}

/// Player 4611 with character 46111, Ace of Spades (1666) and The Corrupted
/// (2693136600), returning the row ids a stat row points at.
pub async fn seed_stat_keys(db: &DatabaseConnection) -> StatRowKeys {
    let accounts = AccountRepositoryImpl::new(db.clone());
    accounts.insert_account(&account(4611)).await.unwrap();
    let owner = accounts
        .find_by_destiny_id(DestinyId(4611))
        .await
        .unwrap()
        .unwrap();

    let characters = CharacterRepositoryImpl::new(db.clone());
    characters
        .insert_character(&character(46111, 4611, owner.row_id))
        .await
        .unwrap();
    let character = characters
        .find_by_character_id(CharacterId(46111))
        .await
        .unwrap()
        .unwrap();

    let weapons = WeaponRepositoryImpl::new(db.clone());
    weapons
        .insert_weapon(&Weapon {
            item_hash: ItemHash(1666),
            name: "Ace of Spades".to_string(),
            weapon_type: WeaponType::HandCannon,
            ammo_type: AmmoType::Primary,
            slot: WeaponSlot::Kinetic,
            damage_type: DamageType::Kinetic,
            rarity: Rarity::Exotic,
        })
        .await
        .unwrap();
    let weapon = weapons.find_by_hash(ItemHash(1666)).await.unwrap().unwrap();

    let activities = ActivityRepositoryImpl::new(db.clone());
    activities
        .insert_activity(&Activity {
            activity_hash: ActivityHash(2693136600),
            name: "The Corrupted".to_string(),
            activity_type: "Nightfall".to_string(),
            max_fireteam_size: 3,
            modifiers: String::new(),
        })
        .await
        .unwrap();
    let activity = activities
        .find_by_hash(ActivityHash(2693136600))
        .await
        .unwrap()
        .unwrap();

    StatRowKeys {
        character: character.row_id,
        activity: activity.row_id,
        weapon: weapon.row_id,
    }
}
