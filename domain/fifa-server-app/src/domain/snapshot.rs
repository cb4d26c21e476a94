use std::collections::BTreeMap;

use crate::domain::{Year, skill_value::SkillValue, version::PlayerVersion};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillReading {
    pub code: String,
    pub name: String,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelinePoint {
    pub year: Year,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillTimeline {
    pub code: String,
    pub name: String,
    pub points: Vec<TimelinePoint>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PlayerSnapshot {
    pub versions: Vec<PlayerVersion>,
    /// Newest year among the skill values. The version series is not
    /// consulted, so it may cover a different range.
    pub latest_year: Option<Year>,
    pub skills_latest: Vec<SkillReading>,
    pub skills_timeline: Vec<SkillTimeline>,
}

pub fn aggregate(mut versions: Vec<PlayerVersion>, skill_values: Vec<SkillValue>) -> PlayerSnapshot {
    versions.sort_by_key(|v| v.year);

    let latest_year = skill_values.iter().map(|s| s.year).max();

    let mut skills_latest: Vec<SkillReading> = skill_values
        .iter()
        .filter(|s| Some(s.year) == latest_year)
        .map(|s| SkillReading {
            code: s.code.clone(),
            name: s.name.clone(),
            value: s.value,
        })
        .collect();
    skills_latest.sort_by(|a, b| a.code.cmp(&b.code));

    // BTreeMap keyed by the code string gives the lexicographic group order.
    let mut by_code: BTreeMap<String, SkillTimeline> = BTreeMap::new();
    for s in skill_values {
        by_code
            .entry(s.code.clone())
            .or_insert_with(|| SkillTimeline {
                code: s.code.clone(),
                name: s.name.clone(),
                points: Vec::new(),
            })
            .points
            .push(TimelinePoint {
                year: s.year,
                value: s.value,
            });
    }
    let skills_timeline = by_code
        .into_values()
        .map(|mut timeline| {
            timeline.points.sort_by_key(|p| p.year);
            timeline
        })
        .collect();

    PlayerSnapshot {
        versions,
        latest_year,
        skills_latest,
        skills_timeline,
    }
}
