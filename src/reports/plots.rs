use serde::{Deserialize, Serialize};

use crate::models::{Facility, FacilityGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatType {
    Pct,
    Float,
    Int,
    Date,
}

/// A plottable per-student statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatDef {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub stat_type: StatType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timeline: bool,
}

pub const STAT_DEFS: &[StatDef] = &[
    StatDef {
        key: "pct_mastery",
        name: "% Mastery",
        stat_type: StatType::Pct,
        description: "Percent of exercises mastered (at least 10 consecutive correct answers)",
        timeline: true,
    },
    StatDef {
        key: "effort",
        name: "% Effort",
        stat_type: StatType::Pct,
        description: "Combination of attempts on exercises and videos watched.",
        timeline: false,
    },
    StatDef {
        key: "ex:attempts",
        name: "Average attempts",
        stat_type: StatType::Float,
        description: "Average # attempts made on exercises.",
        timeline: false,
    },
    StatDef {
        key: "ex:streak_progress",
        name: "Average streak",
        stat_type: StatType::Pct,
        description: "Maximum number of consecutive correct answers on an exercise.",
        timeline: false,
    },
    StatDef {
        key: "ex:points",
        name: "Exercise points",
        stat_type: StatType::Int,
        description: "Points earned on exercises; tracks mastery linearly.",
        timeline: false,
    },
    StatDef {
        key: "ex:completion_timestamp",
        name: "Time exercise completed",
        stat_type: StatType::Date,
        description: "Day/time the exercise was completed.",
        timeline: false,
    },
    StatDef {
        key: "vid:points",
        name: "Video points",
        stat_type: StatType::Int,
        description: "Points earned while watching a video (750 max / video).",
        timeline: false,
    },
    StatDef {
        key: "vid:total_seconds_watched",
        name: "Video time",
        stat_type: StatType::Int,
        description: "Total seconds spent watching a video.",
        timeline: false,
    },
    StatDef {
        key: "vid:completion_timestamp",
        name: "Time video completed",
        stat_type: StatType::Date,
        description: "Day/time the video was completed.",
        timeline: false,
    },
];

pub fn stat_name(key: &str) -> Option<&'static str> {
    STAT_DEFS.iter().find(|s| s.key == key).map(|s| s.name)
}

pub fn timeline_title(yaxis: &str) -> String {
    match stat_name(yaxis) {
        Some(y) => format!("{y} over time"),
        None => "Timeline plot".to_string(),
    }
}

pub fn scatter_title(xaxis: &str, yaxis: &str) -> String {
    match (stat_name(xaxis), stat_name(yaxis)) {
        (Some(x), Some(y)) => format!("{y} versus {x}"),
        _ => "Scatter plot".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewerRole {
    #[default]
    Superuser,
    Teacher,
    Student,
    Anonymous,
}

/// Who is looking at the report. Authentication happens upstream; this only
/// scopes which facilities and groups are offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewer {
    pub role: ViewerRole,
    pub user_id: Option<String>,
}

/// Where a student viewer belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerHome {
    pub facility_id: String,
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityGroups {
    pub facility: String,
    pub groups: Vec<FacilityGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessScope {
    pub groups: Option<Vec<FacilityGroups>>,
    pub facilities: Option<Vec<Facility>>,
}

impl AccessScope {
    pub fn groups_for(&self, facility_id: &str) -> Vec<&FacilityGroup> {
        self.groups
            .iter()
            .flatten()
            .filter(|fg| fg.facility == facility_id)
            .flat_map(|fg| fg.groups.iter())
            .collect()
    }
}

fn groups_of(facility_id: &str, groups: &[FacilityGroup]) -> Vec<FacilityGroup> {
    groups
        .iter()
        .filter(|g| g.facility_id == facility_id)
        .cloned()
        .collect()
}

/// Facilities and per-facility groups the viewer may pick from.
pub fn accessible_scope(
    viewer: &Viewer,
    home: Option<&ViewerHome>,
    facility: Option<&Facility>,
    facilities: &[Facility],
    groups: &[FacilityGroup],
) -> AccessScope {
    let all = || AccessScope {
        groups: Some(
            facilities
                .iter()
                .map(|f| FacilityGroups {
                    facility: f.id.clone(),
                    groups: groups_of(&f.id, groups),
                })
                .collect(),
        ),
        facilities: Some(facilities.to_vec()),
    };

    match (viewer.role, home) {
        (ViewerRole::Superuser | ViewerRole::Teacher, _) => all(),
        (ViewerRole::Student, Some(home)) => {
            let own: Vec<Facility> = facilities
                .iter()
                .filter(|f| f.id == home.facility_id)
                .cloned()
                .collect();
            let own_groups = match &home.group_id {
                None => Vec::new(),
                Some(gid) => vec![FacilityGroups {
                    facility: home.facility_id.clone(),
                    groups: groups.iter().filter(|g| g.id == *gid).cloned().collect(),
                }],
            };
            AccessScope {
                groups: Some(own_groups),
                facilities: Some(own),
            }
        }
        (_, _) => match facility {
            Some(f) => AccessScope {
                groups: Some(vec![FacilityGroups {
                    facility: f.id.clone(),
                    groups: groups_of(&f.id, groups),
                }]),
                facilities: Some(vec![f.clone()]),
            },
            None => AccessScope::default(),
        },
    }
}
