//! Suggestion data model

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

/// Boost applied to records that do not carry one
pub const DEFAULT_BOOST: i32 = 10;

/// Catalog attribute fields harvested through faceting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr, EnumIter)]
pub enum AttributeField {
    #[strum(serialize = "category")]
    Category,
    #[strum(serialize = "subCategory")]
    SubCategory,
    #[strum(serialize = "searchTags")]
    SearchTags,
    #[strum(serialize = "metalType")]
    Metal,
    #[strum(serialize = "style")]
    Style,
    #[strum(serialize = "occasion")]
    Occasion,
    #[strum(serialize = "collection")]
    Collection,
}

impl AttributeField {
    /// Field name in the source collection
    pub fn field_name(&self) -> &'static str {
        self.into()
    }

    /// Field holding the internal identifier for this attribute, if any
    pub fn id_field(&self) -> Option<&'static str> {
        match self {
            AttributeField::Category => Some("cId"),
            AttributeField::SubCategory => Some("scId"),
            AttributeField::Occasion => Some("oId"),
            AttributeField::Style => Some("styleIds"),
            AttributeField::Collection => Some("collectionSlug"),
            AttributeField::SearchTags | AttributeField::Metal => None,
        }
    }

    /// Comma-separated list of every facet field
    pub fn facet_list() -> String {
        AttributeField::iter()
            .map(|f| f.field_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Distinct attribute values found in the catalog.
///
/// Every list is sorted and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub search_tags: Vec<String>,
    pub metals: Vec<String>,
    pub styles: Vec<String>,
    pub occasions: Vec<String>,
    pub collections: Vec<String>,
}

impl AttributeSet {
    /// Values of one field
    pub fn values(&self, field: AttributeField) -> &[String] {
        match field {
            AttributeField::Category => &self.categories,
            AttributeField::SubCategory => &self.sub_categories,
            AttributeField::SearchTags => &self.search_tags,
            AttributeField::Metal => &self.metals,
            AttributeField::Style => &self.styles,
            AttributeField::Occasion => &self.occasions,
            AttributeField::Collection => &self.collections,
        }
    }

    /// Replace the values of one field, sorting and deduplicating them
    pub fn set_values<I, S>(&mut self, field: AttributeField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let normalized = normalize_values(values);
        match field {
            AttributeField::Category => self.categories = normalized,
            AttributeField::SubCategory => self.sub_categories = normalized,
            AttributeField::SearchTags => self.search_tags = normalized,
            AttributeField::Metal => self.metals = normalized,
            AttributeField::Style => self.styles = normalized,
            AttributeField::Occasion => self.occasions = normalized,
            AttributeField::Collection => self.collections = normalized,
        }
    }

    /// Builder-style variant of [`AttributeSet::set_values`]
    pub fn with_values<I, S>(mut self, field: AttributeField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_values(field, values);
        self
    }

    pub fn total_values(&self) -> usize {
        AttributeField::iter().map(|f| self.values(f).len()).sum()
    }
}

/// Sort lexicographically and drop duplicates
pub fn normalize_values<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Best-effort map from attribute values to internal identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMapping {
    /// category -> cId
    pub categories: BTreeMap<String, i64>,
    /// subCategory -> scId
    pub sub_categories: BTreeMap<String, i64>,
    /// occasion -> oId
    pub occasions: BTreeMap<String, i64>,
    /// style -> styleIds entry
    pub styles: BTreeMap<String, String>,
    /// collection -> collectionSlug
    pub collections: BTreeMap<String, String>,
}

impl AttributeMapping {
    /// Resolved identifier for a value, rendered for a target expression
    pub fn identifier(&self, field: AttributeField, value: &str) -> Option<String> {
        match field {
            AttributeField::Category => self.categories.get(value).map(i64::to_string),
            AttributeField::SubCategory => self.sub_categories.get(value).map(i64::to_string),
            AttributeField::Occasion => self.occasions.get(value).map(i64::to_string),
            AttributeField::Style => self.styles.get(value).cloned(),
            AttributeField::Collection => self.collections.get(value).cloned(),
            AttributeField::SearchTags | AttributeField::Metal => None,
        }
    }

    /// `field:value` target part, preferring the resolved identifier
    pub fn target_part(&self, field: AttributeField, value: &str) -> String {
        match (field.id_field(), self.identifier(field, value)) {
            (Some(id_field), Some(id)) => format!("{}:{}", id_field, id),
            _ => format!("{}:{}", field.field_name(), value),
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.categories.len()
            + self.sub_categories.len()
            + self.occasions.len()
            + self.styles.len()
            + self.collections.len()
    }
}

/// Kind of autocomplete entry.
///
/// [`SuggestionType::as_str`] is the only place the wire names are spelled
/// out; parsing goes through it, and unknown names become [`SuggestionType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter)]
pub enum SuggestionType {
    Category,
    OccasionCategory,
    StyleCategory,
    SubcategoryCategory,
    Style,
    Collection,
    SearchTag,
    Displayname,
    /// Free-form tag carried by manual overrides
    Custom(String),
}

impl SuggestionType {
    pub fn as_str(&self) -> &str {
        match self {
            SuggestionType::Category => "category",
            SuggestionType::OccasionCategory => "occasion_category",
            SuggestionType::StyleCategory => "style_category",
            SuggestionType::SubcategoryCategory => "subcategory_category",
            SuggestionType::Style => "style",
            SuggestionType::Collection => "collection",
            SuggestionType::SearchTag => "search_tag",
            SuggestionType::Displayname => "displayname",
            SuggestionType::Custom(tag) => tag,
        }
    }

    /// Autocomplete ranking weight; higher ranks first
    pub fn boost(&self) -> i32 {
        match self {
            SuggestionType::Category => 10,
            SuggestionType::OccasionCategory => 5,
            SuggestionType::StyleCategory => 5,
            SuggestionType::SubcategoryCategory => 8,
            SuggestionType::Style => 6,
            SuggestionType::Collection => 4,
            SuggestionType::SearchTag => 8,
            SuggestionType::Displayname => 10,
            SuggestionType::Custom(_) => DEFAULT_BOOST,
        }
    }
}

impl FromStr for SuggestionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SuggestionType::iter()
            .filter(|kind| !matches!(kind, SuggestionType::Custom(_)))
            .find(|kind| kind.as_str() == s)
            .unwrap_or_else(|| SuggestionType::Custom(s.to_string())))
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SuggestionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SuggestionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// An autocomplete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text shown to the user
    pub term: String,

    #[serde(rename = "type")]
    pub kind: SuggestionType,

    #[serde(default = "default_boost")]
    pub boost: i32,

    /// Filter expression to jump straight to matching results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Suggestion {
    /// Create a suggestion whose boost comes from its type
    pub fn new(kind: SuggestionType, term: impl Into<String>, target: Option<String>) -> Self {
        Self {
            term: term.into(),
            boost: kind.boost(),
            kind,
            target,
        }
    }
}

fn default_boost() -> i32 {
    DEFAULT_BOOST
}

/// Record shape stored in the output collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionDocument {
    pub id: String,
    pub term: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub boost: i32,
    pub target: String,
}

impl SuggestionDocument {
    /// Build the document for the suggestion at 1-based `position`
    pub fn from_suggestion(position: usize, suggestion: &Suggestion) -> Self {
        Self {
            id: position.to_string(),
            term: suggestion.term.clone(),
            kind: suggestion.kind.to_string(),
            boost: suggestion.boost,
            target: suggestion.target.clone().unwrap_or_default(),
        }
    }
}
