//! Fakes for the ports, shared by the unit tests of this crate.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use sandbox_manifest::{
    DefinitionHash, DefinitionResolver, DefinitionTable, DefinitionTables, catalog::Platform,
};
use serde_json::{Value, json};

use crate::{
    domain::{
        AccountRowId, ActivityHash, ActivityRowId, ArmorRowId, CharacterId, CharacterRowId,
        DestinyId, InstanceId, ItemHash, RepoCreateError, RepoError, RepoUpdateError, WeaponRowId,
        account::{Account, AccountRepository, StoredAccount},
        activity::{Activity, ActivityRepository, StoredActivity},
        armor::{Armor, ArmorRepository, StoredArmor},
        character::{Character, CharacterRepository, StoredCharacter},
        equipment::{EquipmentRepository, EquippedArmor, EquippedWeapon},
        stats::{MatchStatRecord, StatRowKeys, StatsRepository, StoredStat},
        weapon::{StoredWeapon, Weapon, WeaponRepository},
    },
    ports::bungie::{BungieApiPort, BungieRequest, endpoints},
    services::{
        account::AccountManagerImpl, activity::ActivityManagerImpl, armor::ArmorManagerImpl,
        character::CharacterManagerImpl, equipment::EquipmentManagerImpl,
        stat_cache::StatBlockCacheImpl, weapon::WeaponManagerImpl,
    },
    workflow::{
        account::sync::SyncAccountWorkflowImpl,
        stats::{
            add_stat_block::AddStatBlockWorkflowImpl,
            delete_stat_block::DeleteStatBlockWorkflowImpl,
        },
    },
};

/// Answers requests from canned payloads keyed by path and records every
/// request it receives. Unknown paths behave like an unreachable API.
#[derive(Default)]
pub struct FakeBungieApi {
    responses: Mutex<HashMap<String, Option<Value>>>,
    requests: Arc<Mutex<Vec<BungieRequest>>>,
}

#[allow(unused)]
impl FakeBungieApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, request: BungieRequest, payload: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(request.path().to_string(), Some(payload));
    }

    pub fn fail(&self, request: BungieRequest) {
        self.responses
            .lock()
            .unwrap()
            .insert(request.path().to_string(), None);
    }

    pub fn requests(&self) -> Vec<BungieRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl BungieApiPort for FakeBungieApi {
    async fn fetch_json(&self, request: BungieRequest) -> Option<Value> {
        let response = self
            .responses
            .lock()
            .unwrap()
            .get(request.path())
            .cloned()
            .flatten();
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub fn account_fixture(
    api: &FakeBungieApi,
    destiny_id: DestinyId,
    platform: Platform,
    character_ids: &[i64],
) {
    api.respond(
        endpoints::memberships(destiny_id, platform),
        json!({"bungieNetUser": {
            "membershipId": "9001",
            "uniqueName": format!("Guardian#{}", destiny_id),
            "firstAccess": "2017-09-06T18:00:00.000Z"
        }}),
    );
    let character_ids: Vec<String> = character_ids.iter().map(|id| id.to_string()).collect();
    api.respond(
        endpoints::profile(destiny_id, platform),
        json!({"profile": {"data": {
            "dateLastPlayed": "2024-03-01T12:00:00Z",
            "characterIds": character_ids
        }}}),
    );
}

/// A hunter last played on 2024-03-01, wearing `items` in slot order.
pub fn character_fixture(
    api: &FakeBungieApi,
    destiny_id: DestinyId,
    platform: Platform,
    character_id: CharacterId,
    items: &[u32],
) {
    api.respond(
        endpoints::character(destiny_id, platform, character_id),
        json!({"character": {"data": {
            "classType": 1,
            "dateLastPlayed": "2024-03-01T11:00:00Z"
        }}}),
    );
    let items: Vec<Value> = items.iter().map(|h| json!({"itemHash": h})).collect();
    api.respond(
        endpoints::equipment(destiny_id, platform, character_id),
        json!({"equipment": {"data": {"items": items}}}),
    );
}

pub struct ResolverFixture {
    tables: DefinitionTables,
}

#[allow(unused)]
impl ResolverFixture {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    fn insert(mut self, table: DefinitionTable, hash: u32, definition: Value) -> Self {
        self.tables
            .entry(table)
            .or_default()
            .insert(DefinitionHash::from(hash), definition);
        self
    }

    pub fn item(self, hash: u32, definition: Value) -> Self {
        self.insert(DefinitionTable::InventoryItem, hash, definition)
    }

    pub fn activity(self, hash: u32, definition: Value) -> Self {
        self.insert(DefinitionTable::Activity, hash, definition)
    }

    pub fn activity_type(self, hash: u32, name: &str) -> Self {
        self.insert(
            DefinitionTable::ActivityType,
            hash,
            json!({"displayProperties": {"name": name}}),
        )
    }

    pub fn modifier(self, hash: u32, name: &str) -> Self {
        self.insert(
            DefinitionTable::ActivityModifier,
            hash,
            json!({"displayProperties": {"name": name}}),
        )
    }

    pub fn class(self, hash: u32, name: &str) -> Self {
        self.insert(
            DefinitionTable::Class,
            hash,
            json!({"displayProperties": {"name": name}, "classType": 1}),
        )
    }

    pub fn build(self) -> Arc<DefinitionResolver> {
        Arc::new(DefinitionResolver::new(self.tables))
    }
}

/// An inventory item definition of a weapon. The item type is the tier
/// string without its first word.
pub fn weapon_definition(
    name: &str,
    type_and_tier: &str,
    ammo: u32,
    slot: u32,
    damage: u32,
) -> Value {
    let item_type = type_and_tier
        .split_once(' ')
        .map_or(type_and_tier, |(_, item_type)| item_type);
    json!({
        "displayProperties": {"name": name, "description": ""},
        "itemTypeDisplayName": item_type,
        "itemTypeAndTierDisplayName": type_and_tier,
        "equippingBlock": {"ammoType": ammo, "equipmentSlotTypeHash": slot},
        "damageTypes": [damage],
        "stats": {"stats": {
            "2961396640": {"value": 460},
            "2837207746": {"value": 55},
            "4284893193": {"value": 140}
        }}
    })
}

pub fn armor_definition(name: &str, type_and_tier: &str, slot: u32) -> Value {
    json!({
        "displayProperties": {"name": name},
        "itemTypeAndTierDisplayName": type_and_tier,
        "equippingBlock": {"equipmentSlotTypeHash": slot}
    })
}

/// Definitions referenced by the match reports of the tests: two weapons,
/// one helmet, a nightfall and the hunter class.
pub fn report_resolver() -> Arc<DefinitionResolver> {
    ResolverFixture::new()
        .item(1666, weapon_definition("Ace of Spades", "Exotic Hand Cannon", 1, 1498876634, 1))
        .item(
            1777,
            weapon_definition("Lorentz Driver", "Exotic Linear Fusion Rifle", 3, 953998645, 4),
        )
        .item(7, armor_definition("Mask", "Legendary Helmet", 3448274439))
        .activity(
            2693136600,
            json!({
                "displayProperties": {"name": "The Corrupted"},
                "activityTypeHash": 575572995u32,
                "matchmaking": {"maxPlayers": 3},
                "modifiers": []
            }),
        )
        .activity_type(575572995, "Nightfall")
        .class(671679327, "Hunter")
        .build()
}

struct ReportParticipant {
    character_id: i64,
    destiny_id: i64,
    membership_type: u32,
    class_hash: u32,
    weapons: Vec<Value>,
}

/// Builds a carnage report payload and installs it on a [`FakeBungieApi`].
pub struct ReportFixture {
    instance_id: i64,
    director_activity_hash: u32,
    participants: Vec<ReportParticipant>,
}

impl ReportFixture {
    pub fn new(instance_id: i64, director_activity_hash: u32) -> Self {
        Self {
            instance_id,
            director_activity_hash,
            participants: Vec::new(),
        }
    }

    pub fn participant(
        mut self,
        character_id: i64,
        destiny_id: i64,
        membership_type: u32,
        class_hash: u32,
    ) -> Self {
        self.participants.push(ReportParticipant {
            character_id,
            destiny_id,
            membership_type,
            class_hash,
            weapons: Vec::new(),
        });
        self
    }

    pub fn weapon(
        mut self,
        character_id: i64,
        weapon_hash: u32,
        kills: f64,
        precision_kills: f64,
    ) -> Self {
        if let Some(participant) = self
            .participants
            .iter_mut()
            .find(|p| p.character_id == character_id)
        {
            participant.weapons.push(json!({
                "referenceId": weapon_hash,
                "values": {
                    "uniqueWeaponKills": {"basic": {"value": kills}},
                    "uniqueWeaponPrecisionKills": {"basic": {"value": precision_kills}}
                }
            }));
        }
        self
    }

    pub fn install(self, api: &FakeBungieApi) {
        let entries: Vec<Value> = self
            .participants
            .into_iter()
            .map(|p| {
                json!({
                    "characterId": p.character_id.to_string(),
                    "player": {
                        "destinyUserInfo": {
                            "membershipId": p.destiny_id.to_string(),
                            "membershipType": p.membership_type
                        },
                        "classHash": p.class_hash
                    },
                    "extended": {"weapons": p.weapons}
                })
            })
            .collect();
        api.respond(
            endpoints::carnage_report(InstanceId(self.instance_id)),
            json!({
                "activityDetails": {
                    "instanceId": self.instance_id.to_string(),
                    "directorActivityHash": self.director_activity_hash
                },
                "entries": entries
            }),
        );
    }
}

#[derive(Default)]
struct Tables {
    next_row_id: i64,
    accounts: Vec<StoredAccount>,
    characters: Vec<StoredCharacter>,
    weapons: Vec<StoredWeapon>,
    armor: Vec<StoredArmor>,
    activities: Vec<StoredActivity>,
    activity_insert_attempts: usize,
    equipped_weapons: Vec<(CharacterRowId, WeaponRowId, EquippedWeapon)>,
    equipped_armor: Vec<(CharacterRowId, ArmorRowId, EquippedArmor)>,
    stats: Vec<StoredStat>,
    failing_character_lookups: HashSet<CharacterId>,
    failing_stat_writes: HashSet<CharacterId>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_row_id += 1;
        self.next_row_id
    }
}

/// Every repository port over plain vectors, with the same natural-key
/// uniqueness the relational schema enforces.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

#[allow(unused)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Character lookups by this id fail with a storage error.
    pub fn fail_character_lookups_for(&self, character_id: CharacterId) {
        let mut tables = self.tables.lock().unwrap();
        tables.failing_character_lookups.insert(character_id);
    }

    /// Stat inserts for this character fail with a storage error.
    pub fn fail_stat_writes_for(&self, character_id: CharacterId) {
        let mut tables = self.tables.lock().unwrap();
        tables.failing_stat_writes.insert(character_id);
    }

    pub fn account_count(&self) -> usize {
        self.tables.lock().unwrap().accounts.len()
    }

    pub fn character_count(&self) -> usize {
        self.tables.lock().unwrap().characters.len()
    }

    pub fn weapon_count(&self) -> usize {
        self.tables.lock().unwrap().weapons.len()
    }

    pub fn armor_count(&self) -> usize {
        self.tables.lock().unwrap().armor.len()
    }

    pub fn activity_count(&self) -> usize {
        self.tables.lock().unwrap().activities.len()
    }

    pub fn activity_insert_attempts(&self) -> usize {
        self.tables.lock().unwrap().activity_insert_attempts
    }

    pub fn equipped_weapon_count(&self) -> usize {
        self.tables.lock().unwrap().equipped_weapons.len()
    }

    pub fn equipped_armor_count(&self) -> usize {
        self.tables.lock().unwrap().equipped_armor.len()
    }

    pub fn stat_count(&self) -> usize {
        self.tables.lock().unwrap().stats.len()
    }

    pub fn weapon(&self, item_hash: ItemHash) -> Option<Weapon> {
        self.tables
            .lock()
            .unwrap()
            .weapons
            .iter()
            .find(|w| w.weapon.item_hash == item_hash)
            .map(|w| w.weapon.clone())
    }

    pub fn weapon_row(&self, item_hash: ItemHash) -> Option<WeaponRowId> {
        self.tables
            .lock()
            .unwrap()
            .weapons
            .iter()
            .find(|w| w.weapon.item_hash == item_hash)
            .map(|w| w.row_id)
    }
}

#[async_trait::async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_destiny_id(
        &self,
        destiny_id: DestinyId,
    ) -> Result<Option<StoredAccount>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .accounts
            .iter()
            .find(|a| a.account.destiny_id == destiny_id)
            .cloned())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .accounts
            .iter()
            .any(|a| a.account.destiny_id == account.destiny_id)
        {
            return Err(RepoCreateError::Conflict);
        }
        let row_id = AccountRowId(tables.next_id());
        tables.accounts.push(StoredAccount {
            row_id,
            account: account.clone(),
        });
        Ok(())
    }

    async fn update_last_played(
        &self,
        destiny_id: DestinyId,
        date_last_played: NaiveDate,
        character_ids: &[CharacterId],
    ) -> Result<(), RepoUpdateError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .accounts
            .iter_mut()
            .find(|a| a.account.destiny_id == destiny_id)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.account.date_last_played = date_last_played;
        stored.account.character_ids = character_ids.to_vec();
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<StoredAccount>, RepoError> {
        Ok(self.tables.lock().unwrap().accounts.clone())
    }
}

#[async_trait::async_trait]
impl CharacterRepository for InMemoryStore {
    async fn find_by_character_id(
        &self,
        character_id: CharacterId,
    ) -> Result<Option<StoredCharacter>, RepoError> {
        let tables = self.tables.lock().unwrap();
        if tables.failing_character_lookups.contains(&character_id) {
            return Err(RepoError::StorageError("connection lost".to_string()));
        }
        Ok(tables
            .characters
            .iter()
            .find(|c| c.character.character_id == character_id)
            .cloned())
    }

    async fn insert_character(&self, character: &Character) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .characters
            .iter()
            .any(|c| c.character.character_id == character.character_id)
        {
            return Err(RepoCreateError::Conflict);
        }
        let row_id = CharacterRowId(tables.next_id());
        tables.characters.push(StoredCharacter {
            row_id,
            character: character.clone(),
        });
        Ok(())
    }

    async fn update_last_played(
        &self,
        character_id: CharacterId,
        date_last_played: NaiveDate,
    ) -> Result<(), RepoUpdateError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .characters
            .iter_mut()
            .find(|c| c.character.character_id == character_id)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.character.date_last_played = date_last_played;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WeaponRepository for InMemoryStore {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredWeapon>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .weapons
            .iter()
            .find(|w| w.weapon.item_hash == item_hash)
            .cloned())
    }

    async fn insert_weapon(&self, weapon: &Weapon) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .weapons
            .iter()
            .any(|w| w.weapon.item_hash == weapon.item_hash)
        {
            return Err(RepoCreateError::Conflict);
        }
        let row_id = WeaponRowId(tables.next_id());
        tables.weapons.push(StoredWeapon {
            row_id,
            weapon: weapon.clone(),
        });
        Ok(())
    }

    async fn update_weapon(&self, weapon: &Weapon) -> Result<(), RepoUpdateError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .weapons
            .iter_mut()
            .find(|w| w.weapon.item_hash == weapon.item_hash)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.weapon = weapon.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArmorRepository for InMemoryStore {
    async fn find_by_hash(&self, item_hash: ItemHash) -> Result<Option<StoredArmor>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .armor
            .iter()
            .find(|a| a.armor.item_hash == item_hash)
            .cloned())
    }

    async fn insert_armor(&self, armor: &Armor) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.armor.iter().any(|a| a.armor.item_hash == armor.item_hash) {
            return Err(RepoCreateError::Conflict);
        }
        let row_id = ArmorRowId(tables.next_id());
        tables.armor.push(StoredArmor {
            row_id,
            armor: armor.clone(),
        });
        Ok(())
    }

    async fn update_armor(&self, armor: &Armor) -> Result<(), RepoUpdateError> {
        let mut tables = self.tables.lock().unwrap();
        let stored = tables
            .armor
            .iter_mut()
            .find(|a| a.armor.item_hash == armor.item_hash)
            .ok_or(RepoUpdateError::NotFound)?;
        stored.armor = armor.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryStore {
    async fn find_by_hash(
        &self,
        activity_hash: ActivityHash,
    ) -> Result<Option<StoredActivity>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .activities
            .iter()
            .find(|a| a.activity.activity_hash == activity_hash)
            .cloned())
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        tables.activity_insert_attempts += 1;
        if tables
            .activities
            .iter()
            .any(|a| a.activity.activity_hash == activity.activity_hash)
        {
            return Err(RepoCreateError::Conflict);
        }
        let row_id = ActivityRowId(tables.next_id());
        tables.activities.push(StoredActivity {
            row_id,
            activity: activity.clone(),
        });
        Ok(())
    }
}

#[async_trait::async_trait]
impl EquipmentRepository for InMemoryStore {
    async fn insert_equipped_weapon(
        &self,
        character: CharacterRowId,
        weapon: WeaponRowId,
        equipped: &EquippedWeapon,
    ) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .equipped_weapons
            .iter()
            .any(|(c, w, _)| *c == character && *w == weapon)
        {
            return Err(RepoCreateError::Conflict);
        }
        tables
            .equipped_weapons
            .push((character, weapon, equipped.clone()));
        Ok(())
    }

    async fn insert_equipped_armor(
        &self,
        character: CharacterRowId,
        armor: ArmorRowId,
        equipped: &EquippedArmor,
    ) -> Result<(), RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .equipped_armor
            .iter()
            .any(|(c, a, _)| *c == character && *a == armor)
        {
            return Err(RepoCreateError::Conflict);
        }
        tables.equipped_armor.push((character, armor, equipped.clone()));
        Ok(())
    }

    async fn list_equipped_weapons(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(WeaponRowId, EquippedWeapon)>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .equipped_weapons
            .iter()
            .filter(|(c, _, _)| *c == character)
            .map(|(_, w, e)| (*w, e.clone()))
            .collect())
    }

    async fn list_equipped_armor(
        &self,
        character: CharacterRowId,
    ) -> Result<Vec<(ArmorRowId, EquippedArmor)>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .equipped_armor
            .iter()
            .filter(|(c, _, _)| *c == character)
            .map(|(_, a, e)| (*a, e.clone()))
            .collect())
    }
}

#[async_trait::async_trait]
impl StatsRepository for InMemoryStore {
    async fn insert_stat(
        &self,
        keys: StatRowKeys,
        record: &MatchStatRecord,
    ) -> Result<StoredStat, RepoCreateError> {
        let mut tables = self.tables.lock().unwrap();
        let failing = tables.characters.iter().any(|c| {
            c.row_id == keys.character
                && tables.failing_stat_writes.contains(&c.character.character_id)
        });
        if failing {
            return Err(RepoCreateError::StorageError("connection lost".to_string()));
        }
        if tables.stats.iter().any(|s| {
            s.keys.character == keys.character
                && s.keys.weapon == keys.weapon
                && s.instance_id == record.instance_id
        }) {
            return Err(RepoCreateError::Conflict);
        }
        let stored = StoredStat {
            row_id: tables.next_id(),
            keys,
            instance_id: record.instance_id,
            kills: record.kills,
            precision_kills: record.precision_kills,
            precision_kills_percent: record.precision_kills_percent,
            weapon_name: record.weapon_name.clone(),
            activity_name: record.activity_name.clone(),
            character_class: record.character_class.clone(),
        };
        tables.stats.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<Vec<StoredStat>, RepoError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .stats
            .iter()
            .filter(|s| s.keys.character == character && s.instance_id == instance_id)
            .cloned()
            .collect())
    }

    async fn delete_by_character_instance(
        &self,
        character: CharacterRowId,
        instance_id: InstanceId,
    ) -> Result<u64, RepoError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.stats.len();
        tables
            .stats
            .retain(|s| !(s.keys.character == character && s.instance_id == instance_id));
        Ok((before - tables.stats.len()) as u64)
    }
}

pub type TestAccountManager = AccountManagerImpl<FakeBungieApi, InMemoryStore>;
pub type TestCharacterManager = CharacterManagerImpl<FakeBungieApi, InMemoryStore>;
pub type TestWeaponManager = WeaponManagerImpl<InMemoryStore>;
pub type TestArmorManager = ArmorManagerImpl<InMemoryStore>;
pub type TestEquipmentManager =
    EquipmentManagerImpl<TestCharacterManager, TestWeaponManager, TestArmorManager, InMemoryStore>;
pub type TestAddStatBlock = AddStatBlockWorkflowImpl<
    FakeBungieApi,
    InMemoryStore,
    ActivityManagerImpl<InMemoryStore>,
    TestWeaponManager,
    TestAccountManager,
    TestCharacterManager,
    StatBlockCacheImpl,
>;

/// The workflows wired over one fake API and one in-memory store, resolving
/// against [`report_resolver`].
pub struct TestApp {
    pub api: Arc<FakeBungieApi>,
    pub store: Arc<InMemoryStore>,
    pub stat_cache: Arc<StatBlockCacheImpl>,
    pub add_stat_block: Arc<TestAddStatBlock>,
    pub delete_stat_block:
        DeleteStatBlockWorkflowImpl<InMemoryStore, InMemoryStore, StatBlockCacheImpl>,
    pub sync: SyncAccountWorkflowImpl<
        TestAccountManager,
        TestCharacterManager,
        TestEquipmentManager,
        TestAddStatBlock,
    >,
}

impl TestApp {
    pub fn new() -> Self {
        let api = Arc::new(FakeBungieApi::new());
        let store = Arc::new(InMemoryStore::new());
        let resolver = report_resolver();
        let stat_cache = Arc::new(StatBlockCacheImpl::new());

        let account_manager = Arc::new(AccountManagerImpl::new(api.clone(), store.clone()));
        let character_manager = Arc::new(CharacterManagerImpl::new(api.clone(), store.clone()));
        let weapon_manager = Arc::new(WeaponManagerImpl::new(resolver.clone(), store.clone()));
        let armor_manager = Arc::new(ArmorManagerImpl::new(resolver.clone(), store.clone()));
        let activity_manager = Arc::new(ActivityManagerImpl::new(resolver.clone(), store.clone()));
        let equipment_manager = Arc::new(EquipmentManagerImpl::new(
            resolver.clone(),
            character_manager.clone(),
            weapon_manager.clone(),
            armor_manager,
            store.clone(),
        ));

        let add_stat_block = Arc::new(AddStatBlockWorkflowImpl::new(
            api.clone(),
            resolver,
            store.clone(),
            activity_manager,
            weapon_manager,
            account_manager.clone(),
            character_manager.clone(),
            stat_cache.clone(),
        ));
        let delete_stat_block =
            DeleteStatBlockWorkflowImpl::new(store.clone(), store.clone(), stat_cache.clone());
        let sync = SyncAccountWorkflowImpl::new(
            account_manager,
            character_manager,
            equipment_manager,
            add_stat_block.clone(),
        );

        Self {
            api,
            store,
            stat_cache,
            add_stat_block,
            delete_stat_block,
            sync,
        }
    }
}
