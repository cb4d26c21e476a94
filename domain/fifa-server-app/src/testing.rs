use std::{collections::BTreeMap, sync::Mutex};

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    PaginatedResponse, PlayerId, RepoError, RepoRetrieveError, RepoUpdateError, SkillId, Year,
    catalog::{Skill, SkillCatalogRepository, SkillCode, SkillSeed},
    player::{NewPlayer, Player, PlayerFilter, PlayerQuery, PlayerRepository, PlayerUpdate},
    skill_value::{SkillValue, SkillValueRepository},
    version::{PlayerVersion, VersionRepository},
    yearly::{SeasonRepository, YearlyWrite},
};

#[derive(Default)]
struct MockState {
    next_player_id: i64,
    players: BTreeMap<i64, Player>,
    skills: Vec<Skill>,
    versions: BTreeMap<(i64, Year), PlayerVersion>,
    skill_values: BTreeMap<(i64, i64, Year), i32>,
    failing_player: Option<String>,
    cancel_on_create: Option<(String, CancellationToken)>,
    stalled_player: Option<String>,
}

/// In-memory stand-in for every repository port.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn seeded() -> Self {
        Self::with_skills(&SkillCode::ALL)
    }

    pub fn with_skills(codes: &[SkillCode]) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for (idx, code) in codes.iter().enumerate() {
                state.skills.push(Skill {
                    id: SkillId(idx as i64 + 1),
                    code: code.as_str().to_string(),
                    name: code.display_name().to_string(),
                });
            }
        }
        store
    }

    pub fn insert_player(&self, name: &str) -> PlayerId {
        let mut state = self.state.lock().unwrap();
        Self::insert(
            &mut state,
            &NewPlayer {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .id
    }

    /// Every write touching a player with this name fails with a storage error.
    pub fn fail_writes_for(&self, name: &str) {
        self.state.lock().unwrap().failing_player = Some(name.to_string());
    }

    pub fn cancel_when_created(&self, name: &str, token: CancellationToken) {
        self.state.lock().unwrap().cancel_on_create = Some((name.to_string(), token));
    }

    /// Season writes for this player never complete.
    pub fn stall_seasons_for(&self, name: &str) {
        self.state.lock().unwrap().stalled_player = Some(name.to_string());
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().unwrap().players.len()
    }

    pub fn skill_count(&self) -> usize {
        self.state.lock().unwrap().skills.len()
    }

    pub fn version_count(&self) -> usize {
        self.state.lock().unwrap().versions.len()
    }

    pub fn skill_value_count(&self) -> usize {
        self.state.lock().unwrap().skill_values.len()
    }

    fn insert(state: &mut MockState, player: &NewPlayer) -> Player {
        state.next_player_id += 1;
        let now = Utc::now();
        let created = Player {
            id: PlayerId(state.next_player_id),
            name: player.name.clone(),
            club: player.club.clone(),
            position: player.position.clone(),
            rating: player.rating.unwrap_or(0),
            nationality: player.nationality.clone(),
            created_at: now,
            updated_at: now,
        };
        state.players.insert(created.id.0, created.clone());
        created
    }

    fn is_failing(state: &MockState, name: &str) -> bool {
        state.failing_player.as_deref() == Some(name)
    }

    fn skill_value(state: &MockState, key: (i64, i64, Year), value: i32) -> SkillValue {
        let skill = state
            .skills
            .iter()
            .find(|s| s.id.0 == key.1)
            .cloned()
            .unwrap_or(Skill {
                id: SkillId(key.1),
                code: String::new(),
                name: String::new(),
            });
        SkillValue {
            player_id: PlayerId(key.0),
            skill_id: skill.id,
            code: skill.code,
            name: skill.name,
            year: key.2,
            value,
        }
    }

    fn matches(filter: &PlayerFilter, player: &Player) -> bool {
        fn contains(field: Option<&str>, needle: &Option<String>) -> bool {
            match needle {
                None => true,
                Some(needle) => field
                    .map(|f| f.to_lowercase().contains(&needle.to_lowercase()))
                    .unwrap_or(false),
            }
        }
        contains(Some(&player.name), &filter.name)
            && contains(player.club.as_deref(), &filter.club)
            && contains(player.position.as_deref(), &filter.position)
    }
}

#[async_trait::async_trait]
impl SkillCatalogRepository for MockStore {
    async fn insert_missing_skills(&self, seeds: &[SkillSeed]) -> Result<usize, RepoError> {
        let mut state = self.state.lock().unwrap();
        let mut created = 0;
        for seed in seeds {
            if state.skills.iter().any(|s| s.code == seed.code.as_str()) {
                continue;
            }
            let id = SkillId(state.skills.len() as i64 + 1);
            state.skills.push(Skill {
                id,
                code: seed.code.as_str().to_string(),
                name: seed.name.to_string(),
            });
            created += 1;
        }
        Ok(created)
    }

    async fn list_skills(&self) -> Result<Vec<Skill>, RepoError> {
        Ok(self.state.lock().unwrap().skills.clone())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockStore {
    async fn create_player(&self, player: &NewPlayer) -> Result<Player, RepoError> {
        let mut state = self.state.lock().unwrap();
        if Self::is_failing(&state, &player.name) {
            return Err(RepoError::StorageError("disk I/O error".to_string()));
        }
        if let Some((name, token)) = &state.cancel_on_create {
            if *name == player.name {
                token.cancel();
            }
        }
        Ok(Self::insert(&mut state, player))
    }

    async fn get_player(&self, player_id: PlayerId) -> Result<Player, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .players
            .get(&player_id.0)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn find_player_by_name(&self, name: &str) -> Result<Player, RepoRetrieveError> {
        let state = self.state.lock().unwrap();
        state
            .players
            .values()
            .find(|p| p.name == name)
            .cloned()
            .ok_or(RepoRetrieveError::NotFound)
    }

    async fn update_player(
        &self,
        player_id: PlayerId,
        update: &PlayerUpdate,
    ) -> Result<Player, RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        let failing = state.failing_player.clone();
        let player = state
            .players
            .get_mut(&player_id.0)
            .ok_or(RepoUpdateError::NotFound)?;
        if failing.as_deref() == Some(player.name.as_str()) {
            return Err(RepoUpdateError::StorageError("disk I/O error".to_string()));
        }
        if let Some(club) = &update.club {
            player.club = Some(club.clone());
        }
        if let Some(position) = &update.position {
            player.position = Some(position.clone());
        }
        if let Some(rating) = update.rating {
            player.rating = rating;
        }
        if let Some(nationality) = &update.nationality {
            player.nationality = Some(nationality.clone());
        }
        player.updated_at = Utc::now();
        Ok(player.clone())
    }

    async fn delete_player(&self, player_id: PlayerId) -> Result<(), RepoUpdateError> {
        let mut state = self.state.lock().unwrap();
        if state.players.remove(&player_id.0).is_none() {
            return Err(RepoUpdateError::NotFound);
        }
        state.versions.retain(|(p, _), _| *p != player_id.0);
        state.skill_values.retain(|(p, _, _), _| *p != player_id.0);
        Ok(())
    }

    async fn query_players(
        &self,
        query: PlayerQuery,
    ) -> Result<PaginatedResponse<Player>, RepoError> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<Player> = state
            .players
            .values()
            .filter(|p| Self::matches(&query.filter, p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        let total_count = matching.len();
        let offset = query.pagination.offset.unwrap_or(0);
        let limit = query.pagination.limit.unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok(PaginatedResponse { total_count, items })
    }
}

#[async_trait::async_trait]
impl VersionRepository for MockStore {
    async fn upsert_version(
        &self,
        player_id: PlayerId,
        year: Year,
        rating: i32,
        age: Option<i32>,
    ) -> Result<PlayerVersion, RepoError> {
        let mut state = self.state.lock().unwrap();
        let version = state
            .versions
            .entry((player_id.0, year))
            .or_insert(PlayerVersion {
                player_id,
                year,
                age: None,
                rating: None,
            });
        version.rating = Some(rating);
        if age.is_some() {
            version.age = age;
        }
        Ok(version.clone())
    }

    async fn list_versions(&self, player_id: PlayerId) -> Result<Vec<PlayerVersion>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .versions
            .values()
            .filter(|v| v.player_id == player_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl SkillValueRepository for MockStore {
    async fn upsert_skill_value(
        &self,
        player_id: PlayerId,
        skill_id: SkillId,
        year: Year,
        value: i32,
    ) -> Result<SkillValue, RepoError> {
        let mut state = self.state.lock().unwrap();
        let key = (player_id.0, skill_id.0, year);
        state.skill_values.insert(key, value);
        Ok(Self::skill_value(&state, key, value))
    }

    async fn list_skill_values(&self, player_id: PlayerId) -> Result<Vec<SkillValue>, RepoError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .skill_values
            .iter()
            .filter(|((p, _, _), _)| *p == player_id.0)
            .map(|(key, value)| Self::skill_value(&state, *key, *value))
            .collect())
    }
}

#[async_trait::async_trait]
impl SeasonRepository for MockStore {
    async fn apply_year(
        &self,
        player_id: PlayerId,
        write: &YearlyWrite,
    ) -> Result<(), RepoUpdateError> {
        let stalled = {
            let state = self.state.lock().unwrap();
            let player = state
                .players
                .get(&player_id.0)
                .ok_or(RepoUpdateError::NotFound)?;
            if Self::is_failing(&state, &player.name) {
                return Err(RepoUpdateError::StorageError("disk I/O error".to_string()));
            }
            state.stalled_player.as_deref() == Some(player.name.as_str())
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        if let Some(rating) = write.overall_rating {
            self.upsert_version(player_id, write.year, rating, None)
                .await?;
        }
        for (skill_id, value) in &write.skill_values {
            self.upsert_skill_value(player_id, *skill_id, write.year, *value)
                .await?;
        }
        Ok(())
    }
}
