use std::{collections::HashMap, str::FromStr};

use crate::domain::{RepoError, SkillId};

/// The closed set of attributes a player is rated on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkillCode {
    Pac,
    Sho,
    Pas,
    Dri,
    Def,
    Phy,
}

impl SkillCode {
    pub const ALL: [SkillCode; 6] = [
        SkillCode::Pac,
        SkillCode::Sho,
        SkillCode::Pas,
        SkillCode::Dri,
        SkillCode::Def,
        SkillCode::Phy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCode::Pac => "PAC",
            SkillCode::Sho => "SHO",
            SkillCode::Pas => "PAS",
            SkillCode::Dri => "DRI",
            SkillCode::Def => "DEF",
            SkillCode::Phy => "PHY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SkillCode::Pac => "Pace",
            SkillCode::Sho => "Shooting",
            SkillCode::Pas => "Passing",
            SkillCode::Dri => "Dribbling",
            SkillCode::Def => "Defending",
            SkillCode::Phy => "Physical",
        }
    }
}

impl std::fmt::Display for SkillCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skill {
    pub id: SkillId,
    pub code: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug)]
pub struct SkillSeed {
    pub code: SkillCode,
    pub name: &'static str,
}

pub fn base_skill_seeds() -> Vec<SkillSeed> {
    SkillCode::ALL
        .into_iter()
        .map(|code| SkillSeed {
            code,
            name: code.display_name(),
        })
        .collect()
}

#[async_trait::async_trait]
pub trait SkillCatalogRepository {
    /// Inserts every seed whose code is absent. Existing rows, names included,
    /// are left alone. Returns how many rows were created.
    async fn insert_missing_skills(&self, seeds: &[SkillSeed]) -> Result<usize, RepoError>;
    async fn list_skills(&self) -> Result<Vec<Skill>, RepoError>;
}

pub async fn ensure_seeded<S: SkillCatalogRepository + ?Sized>(
    repo: &S,
    seeds: &[SkillSeed],
) -> Result<(), RepoError> {
    let created = repo.insert_missing_skills(seeds).await?;
    if created > 0 {
        log::info!("Seeded {} skill(s) into the catalog", created);
    }
    Ok(())
}

/// Catalog rows indexed by their known code. Rows whose code is not a
/// [`SkillCode`] never take part in writes.
#[derive(Clone, Debug, Default)]
pub struct SkillCatalog {
    skills: HashMap<SkillCode, Skill>,
}

impl SkillCatalog {
    pub fn new(skills: Vec<Skill>) -> Self {
        let skills = skills
            .into_iter()
            .filter_map(|skill| {
                SkillCode::from_str(&skill.code)
                    .ok()
                    .map(|code| (code, skill))
            })
            .collect();
        Self { skills }
    }

    pub fn get(&self, code: SkillCode) -> Option<&Skill> {
        self.skills.get(&code)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
