use std::sync::Arc;

use chrono::NaiveDate;
use sandbox_manifest::catalog::{ClassType, Platform};

use crate::{
    domain::{
        AccountRowId, CharacterId, CharacterRowId, DestinyId, ItemHash, RepoCreateError,
        RepoError, RepoUpdateError,
        builder::EntityBuilder,
        parse_api_date,
        payload::{CharacterPayload, EquipmentPayload, decode},
    },
    ports::bungie::{BungieApiPort, endpoints},
};

/// Number of equipment entries the character endpoint lists for the
/// weapon and armor slots; anything past these is cosmetic.
pub const EQUIPPED_ITEM_COUNT: usize = 8;
pub const EQUIPPED_WEAPON_COUNT: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub character_id: CharacterId,
    pub destiny_id: DestinyId,
    pub platform: Platform,
    pub account_row_id: AccountRowId,
    pub class: ClassType,
    pub date_last_played: NaiveDate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredCharacter {
    pub row_id: CharacterRowId,
    pub character: Character,
}

/// Items a character had equipped when it was built. Not persisted on the
/// character itself.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Equipment {
    pub weapons: Vec<ItemHash>,
    pub armor: Vec<ItemHash>,
}

impl Equipment {
    /// Keeps the first eight entries and splits them into weapons and armor.
    /// A short list means the response was incomplete, so nothing is kept.
    pub fn from_item_hashes(hashes: &[u32]) -> Self {
        if hashes.len() < EQUIPPED_ITEM_COUNT {
            return Equipment::default();
        }
        let slots = &hashes[..EQUIPPED_ITEM_COUNT];
        Equipment {
            weapons: slots[..EQUIPPED_WEAPON_COUNT]
                .iter()
                .copied()
                .map(ItemHash)
                .collect(),
            armor: slots[EQUIPPED_WEAPON_COUNT..]
                .iter()
                .copied()
                .map(ItemHash)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty() && self.armor.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuiltCharacter {
    pub character: Character,
    pub equipment: Equipment,
}

#[async_trait::async_trait]
pub trait CharacterRepository {
    async fn find_by_character_id(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<StoredCharacter>, RepoError>;
    async fn insert_character(&self, character: &Character) -> Result<(), RepoCreateError>;
    async fn update_last_played(
        &self,
        character_id: CharacterId,
        date_last_played: NaiveDate,
    ) -> Result<(), RepoUpdateError>;
}

pub struct CharacterBuilder<A: BungieApiPort> {
    api: Arc<A>,
    destiny_id: DestinyId,
    platform: Platform,
    character_id: CharacterId,
    account_row_id: AccountRowId,
}

impl<A: BungieApiPort> CharacterBuilder<A> {
    pub fn new(
        api: Arc<A>,
        destiny_id: DestinyId,
        platform: Platform,
        character_id: CharacterId,
        account_row_id: AccountRowId,
    ) -> Self {
        Self {
            api,
            destiny_id,
            platform,
            character_id,
            account_row_id,
        }
    }

    async fn fetch_equipment(&self) -> Equipment {
        let request = endpoints::equipment(self.destiny_id, self.platform, self.character_id);
        let Some(payload) = self.api.fetch_json(request).await else {
            return Equipment::default();
        };
        decode::<EquipmentPayload>(payload, "equipment")
            .map(|p| Equipment::from_item_hashes(&p.equipment.data.item_hashes()))
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl<A: BungieApiPort + Send + Sync> EntityBuilder for CharacterBuilder<A> {
    type Output = BuiltCharacter;

    async fn build(&self) -> Option<BuiltCharacter> {
        let request = endpoints::character(self.destiny_id, self.platform, self.character_id);
        let payload = self.api.fetch_json(request).await;
        let equipment = self.fetch_equipment().await;

        let data = decode::<CharacterPayload>(payload?, "character")?
            .character
            .data;
        let Some(class) = ClassType::from_code(data.class_type) else {
            log::warn!(
                "Character {} has unknown class type {}",
                self.character_id,
                data.class_type
            );
            return None;
        };

        Some(BuiltCharacter {
            character: Character {
                character_id: self.character_id,
                destiny_id: self.destiny_id,
                platform: self.platform,
                account_row_id: self.account_row_id,
                class,
                date_last_played: parse_api_date(&data.date_last_played)?,
            },
            equipment,
        })
    }
}
