use std::sync::Arc;

use chrono::NaiveDate;
use sandbox_manifest::catalog::Platform;

use crate::{
    domain::{
        AccountRowId, CharacterId, DestinyId, RepoCreateError, RepoError, RepoUpdateError,
        builder::EntityBuilder,
        parse_api_date,
        payload::{MembershipPayload, ProfilePayload, decode},
    },
    ports::bungie::{BungieApiPort, endpoints},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub destiny_id: DestinyId,
    pub platform: Platform,
    pub bng_id: i64,
    pub bng_username: String,
    pub date_created: NaiveDate,
    pub date_last_played: NaiveDate,
    pub character_ids: Vec<CharacterId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredAccount {
    pub row_id: AccountRowId,
    pub account: Account,
}

#[async_trait::async_trait]
pub trait AccountRepository {
    async fn find_by_destiny_id(
        &self,
        destiny_id: DestinyId,
    ) -> Result<Option<StoredAccount>, RepoError>;
    async fn insert_account(&self, account: &Account) -> Result<(), RepoCreateError>;
    async fn update_last_played(
        &self,
        destiny_id: DestinyId,
        date_last_played: NaiveDate,
        character_ids: &[CharacterId],
    ) -> Result<(), RepoUpdateError>;
    async fn list_accounts(&self) -> Result<Vec<StoredAccount>, RepoError>;
}

/// The parts of an account that change between plays.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileSnapshot {
    pub date_last_played: NaiveDate,
    pub character_ids: Vec<CharacterId>,
}

pub async fn fetch_profile<A: BungieApiPort + Send + Sync>(
    api: &A,
    destiny_id: DestinyId,
    platform: Platform,
) -> Option<ProfileSnapshot> {
    let payload = api.fetch_json(endpoints::profile(destiny_id, platform)).await?;
    let profile: ProfilePayload = decode(payload, "profile")?;
    Some(ProfileSnapshot {
        date_last_played: parse_api_date(&profile.profile.data.date_last_played)?,
        character_ids: profile
            .profile
            .data
            .character_ids
            .into_iter()
            .map(CharacterId)
            .collect(),
    })
}

pub struct AccountBuilder<A: BungieApiPort> {
    api: Arc<A>,
    destiny_id: DestinyId,
    platform: Platform,
}

impl<A: BungieApiPort> AccountBuilder<A> {
    pub fn new(api: Arc<A>, destiny_id: DestinyId, platform: Platform) -> Self {
        Self {
            api,
            destiny_id,
            platform,
        }
    }
}

#[async_trait::async_trait]
impl<A: BungieApiPort + Send + Sync> EntityBuilder for AccountBuilder<A> {
    type Output = Account;

    async fn build(&self) -> Option<Account> {
        let membership = self
            .api
            .fetch_json(endpoints::memberships(self.destiny_id, self.platform))
            .await;
        let profile = fetch_profile(self.api.as_ref(), self.destiny_id, self.platform).await;

        let membership: MembershipPayload = decode(membership?, "membership")?;
        let profile = profile?;
        let user = membership.bungie_net_user;

        Some(Account {
            destiny_id: self.destiny_id,
            platform: self.platform,
            bng_id: user.membership_id,
            bng_username: user.unique_name,
            date_created: parse_api_date(&user.first_access)?,
            date_last_played: profile.date_last_played,
            character_ids: profile.character_ids,
        })
    }
}

/// Splits "Name#1234" on the last `#`.
pub fn split_bungie_name(name: &str) -> Option<(&str, u16)> {
    let (display_name, code) = name.rsplit_once('#')?;
    if display_name.is_empty() {
        return None;
    }
    Some((display_name, code.trim().parse().ok()?))
}
