use serde::{Deserialize, Serialize};

/// Publication state codes used by the articles table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleState {
    #[default]
    Unpublished,
    Published,
    Archived,
    Trashed,
}

impl ArticleState {
    pub fn code(self) -> i64 {
        match self {
            ArticleState::Unpublished => 0,
            ArticleState::Published => 1,
            ArticleState::Archived => 2,
            ArticleState::Trashed => -2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ArticleState::Unpublished),
            1 => Some(ArticleState::Published),
            2 => Some(ArticleState::Archived),
            -2 => Some(ArticleState::Trashed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleState::Unpublished => "unpublished",
            ArticleState::Published => "published",
            ArticleState::Archived => "archived",
            ArticleState::Trashed => "trashed",
        }
    }
}

/// An article as the selector sees it: the five columns that matter for
/// housekeeping. The date columns only appear in query predicates and are
/// never read back.
#[derive(Debug, Clone)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub catid: i64,
    pub state: ArticleState,
    pub access: i64,
}

/// A content category with its nested-set bounds. Read-only to this tool.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub lft: i64,
    pub rgt: i64,
    pub extension: String,
}

/// Which date column drives the age cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    Created,
    Modified,
    #[default]
    PublishUp,
}

impl DateField {
    /// Column name in the articles table
    pub fn column(self) -> &'static str {
        match self {
            DateField::Created => "created",
            DateField::Modified => "modified",
            DateField::PublishUp => "publish_up",
        }
    }
}

impl std::str::FromStr for DateField {
    type Err = std::convert::Infallible;

    /// Unrecognized names fall back to `publish_up`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "created" => DateField::Created,
            "modified" => DateField::Modified,
            _ => DateField::PublishUp,
        })
    }
}

impl<'de> Deserialize<'de> for DateField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or_default())
    }
}

/// State predicate for the selector: match one publication state exactly,
/// or no state filtering at all (spelled `"*"` in config and CLI)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
    Any,
    State(ArticleState),
}

impl Default for StateFilter {
    fn default() -> Self {
        StateFilter::State(ArticleState::Published)
    }
}

impl StateFilter {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value == "*" {
            return Some(StateFilter::Any);
        }
        let code: i64 = value.parse().ok()?;
        ArticleState::from_code(code).map(StateFilter::State)
    }
}

impl Serialize for StateFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            StateFilter::Any => serializer.serialize_str("*"),
            StateFilter::State(state) => serializer.serialize_i64(state.code()),
        }
    }
}

// Accept either "*" / "1" style strings or a bare state code
impl<'de> Deserialize<'de> for StateFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};
        use std::fmt;

        struct StateFilterVisitor;

        impl<'de> Visitor<'de> for StateFilterVisitor {
            type Value = StateFilter;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"*\" or a publication state code")
            }

            fn visit_str<E>(self, value: &str) -> Result<StateFilter, E>
            where
                E: de::Error,
            {
                StateFilter::parse(value)
                    .ok_or_else(|| E::custom(format!("invalid state filter: {}", value)))
            }

            fn visit_i64<E>(self, value: i64) -> Result<StateFilter, E>
            where
                E: de::Error,
            {
                ArticleState::from_code(value)
                    .map(StateFilter::State)
                    .ok_or_else(|| E::custom(format!("unknown publication state: {}", value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<StateFilter, E>
            where
                E: de::Error,
            {
                let value = i64::try_from(value)
                    .map_err(|_| E::custom(format!("unknown publication state: {}", value)))?;
                self.visit_i64(value)
            }
        }

        deserializer.deserialize_any(StateFilterVisitor)
    }
}

/// Filter settings for the stale-article query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Restrict to this category (0 = all categories)
    #[serde(default)]
    pub source_category: i64,
    /// Also match articles in descendant categories
    #[serde(default)]
    pub include_subcategories: bool,
    /// Minimum age in days
    #[serde(default = "default_age_days")]
    pub age_days: u32,
    /// Date column the age cutoff applies to
    #[serde(default)]
    pub date_field: DateField,
    #[serde(default)]
    pub state_filter: StateFilter,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            source_category: 0,
            include_subcategories: false,
            age_days: default_age_days(),
            date_field: DateField::default(),
            state_filter: StateFilter::default(),
        }
    }
}

fn default_age_days() -> u32 {
    30
}
