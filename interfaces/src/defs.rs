use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form property bag attached to a stage instance.
pub type Props = Map<String, Value>;

/// The unit of work flowing through the pipeline.
///
/// A single article is owned by one pipeline pass at a time; filters mutate it
/// in place and outputs only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default = "new_article_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta: Map<String, Value>,
}

fn new_article_id() -> String {
    Uuid::new_v4().to_string()
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: new_article_id(),
            title: title.into(),
            text: String::new(),
            content: String::new(),
            link: link.into(),
            guid: None,
            published: None,
            updated: None,
            tags: Vec::new(),
            meta: Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tags(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Tag scoping: a stage without tags matches every article, otherwise the
    /// article must carry at least one of the stage tags.
    pub fn matches(&self, tags: &[String]) -> bool {
        tags.is_empty() || tags.iter().any(|tag| self.tags.contains(tag))
    }
}

/// Split a comma separated tag list, dropping blanks and duplicates.
pub fn parse_tags(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(',').map(str::to_string))
}

fn normalize_tags(tags: impl Iterator<Item = String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !result.iter().any(|t| t == tag) {
            result.push(tag.to_string());
        }
    }
    result
}

/// Accepts either `["a", "b"]` or `"a,b"`.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<RawTags>::deserialize(deserializer)? {
        Some(RawTags::List(list)) => normalize_tags(list.into_iter()),
        Some(RawTags::Joined(joined)) => parse_tags(&joined),
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    String,
    Text,
    Url,
    Number,
    Boolean,
}

/// Description of one configurable property of a stage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropSpec {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: PropKind,
}

impl PropSpec {
    pub fn new(name: &str, desc: &str, kind: PropKind) -> Self {
        Self {
            name: name.to_string(),
            desc: desc.to_string(),
            kind,
        }
    }
}

/// Static description of a stage type, independent of any instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub name: String,
    pub desc: String,
    #[serde(default)]
    pub props: Vec<PropSpec>,
}

/// Per-instance configuration of a filter or an output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub props: Props,
}

pub type FilterDef = StageDef;
pub type OutputDef = StageDef;

impl StageDef {
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Numbers may also be given as strings, e.g. `timeout = "30"`.
    pub fn prop_u64(&self, key: &str) -> Option<u64> {
        match self.props.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        match self.props.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Request shape used by the configuration API to create or update a stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub props: Props,
}

impl StageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }

    pub fn into_def(self, id: u32) -> StageDef {
        StageDef {
            id,
            name: self.name,
            desc: String::new(),
            enabled: self.enabled,
            tags: self.tags,
            props: self.props,
        }
    }
}
