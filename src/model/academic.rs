//! Academic reference data: years, lecturers and units.

use crate::gateway::{Embed, Select};
use crate::model::{
    default_true, is_blank, Draft, LecturerId, MissingFields, Record, UnitId, YearId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An academic year. Reference data, ordered by `year_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Year {
    pub id: YearId,
    pub year_number: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearDraft {
    pub name: String,
    pub year_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct YearPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
}

impl Draft for YearDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        MissingFields::check(&[
            ("name", !is_blank(&self.name)),
            ("year_number", self.year_number > 0),
        ])
    }
}

impl Record for Year {
    type Id = YearId;
    type Draft = YearDraft;
    type Patch = YearPatch;
    const TABLE: &'static str = "years";

    fn id(&self) -> &YearId {
        &self.id
    }

    fn listing() -> Select {
        Select::from(Self::TABLE).order_by("year_number", false)
    }
}

/// Teaching staff. `is_active` controls visibility in listings, not existence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: LecturerId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LecturerDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LecturerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Draft for LecturerDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        MissingFields::check(&[("name", !is_blank(&self.name))])
    }
}

impl Record for Lecturer {
    type Id = LecturerId;
    type Draft = LecturerDraft;
    type Patch = LecturerPatch;
    const TABLE: &'static str = "lecturers";

    fn id(&self) -> &LecturerId {
        &self.id
    }

    fn listing() -> Select {
        Select::from(Self::TABLE).order_by("name", false)
    }
}

/// A course unit, owned by a year and optionally taught by a lecturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub code: String,
    pub year_id: YearId,
    #[serde(default)]
    pub lecturer_id: Option<LecturerId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credit_hours: Option<i32>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lecturer: Option<Lecturer>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitDraft {
    pub name: String,
    pub code: String,
    pub year_id: YearId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<LecturerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_id: Option<YearId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecturer_id: Option<Option<LecturerId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_hours: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Draft for UnitDraft {
    fn prepare(&mut self) -> Result<(), MissingFields> {
        MissingFields::check(&[
            ("name", !is_blank(&self.name)),
            ("code", !is_blank(&self.code)),
            ("year_id", !is_blank(self.year_id.as_str())),
        ])
    }
}

impl Record for Unit {
    type Id = UnitId;
    type Draft = UnitDraft;
    type Patch = UnitPatch;
    const TABLE: &'static str = "units";

    fn id(&self) -> &UnitId {
        &self.id
    }

    fn embeds() -> Vec<Embed> {
        vec![
            Embed::one("year", "years", "year_id"),
            Embed::one("lecturer", "lecturers", "lecturer_id"),
        ]
    }

    fn listing() -> Select {
        Select::from(Self::TABLE)
            .embed_all(Self::embeds())
            .order_by("code", false)
    }
}
