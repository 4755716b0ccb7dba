use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Upstream model used when a relay request names none.
pub const FALLBACK_MODEL_ID: &str = "openai/gpt-4o-mini";

/// Fast, cheap upstream model used for conversation titles.
pub const TITLE_MODEL_ID: &str = "openai/gpt-3.5-turbo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    DeepSeek,
    Google,
    Anthropic,
    Other,
}

impl Provider {
    /// Short badge shown next to a model name.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Provider::OpenAI => "GPT",
            Provider::DeepSeek => "DS",
            Provider::Google => "GEM",
            Provider::Anthropic => "CLD",
            Provider::Other => "AI",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::DeepSeek => "DeepSeek",
            Provider::Google => "Google",
            Provider::Anthropic => "Anthropic",
            Provider::Other => "Other",
        }
    }
}

/// Serialized with its display strings so the UI needs no mapping of its own:
/// `{"key":"OpenAI","label":"OpenAI","abbreviation":"GPT"}`.
impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = match self {
            Provider::OpenAI => "OpenAI",
            Provider::DeepSeek => "DeepSeek",
            Provider::Google => "Google",
            Provider::Anthropic => "Anthropic",
            Provider::Other => "Other",
        };
        let mut s = serializer.serialize_struct("Provider", 3)?;
        s.serialize_field("key", key)?;
        s.serialize_field("label", self.label())?;
        s.serialize_field("abbreviation", self.abbreviation())?;
        s.end()
    }
}

/// Models of one provider, for a grouped model picker.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderGroup {
    pub provider: Provider,
    pub models: Vec<&'static Model>,
}

/// A selectable model from the static catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Local key, persisted as the last selection
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    /// Provider-qualified identifier sent upstream
    pub model_id: &'static str,
    pub description: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Model {
    pub fn all() -> &'static [Model] {
        &MODELS
    }

    pub fn find(id: &str) -> Option<&'static Model> {
        MODELS.iter().find(|m| m.id == id)
    }

    /// Look up a model by local key, falling back to the first catalog entry.
    pub fn resolve(id: &str) -> &'static Model {
        Self::find(id).unwrap_or_else(Self::default_model)
    }

    pub fn default_model() -> &'static Model {
        &MODELS[0]
    }

    pub fn by_provider(provider: Provider) -> Vec<&'static Model> {
        MODELS.iter().filter(|m| m.provider == provider).collect()
    }

    /// Providers present in the catalog, in catalog order.
    pub fn providers() -> Vec<Provider> {
        let mut seen = Vec::new();
        for m in MODELS.iter() {
            if !seen.contains(&m.provider) {
                seen.push(m.provider);
            }
        }
        seen
    }

    /// The catalog grouped by provider, in catalog order.
    pub fn grouped() -> Vec<ProviderGroup> {
        Self::providers()
            .into_iter()
            .map(|provider| ProviderGroup {
                provider,
                models: Self::by_provider(provider),
            })
            .collect()
    }
}

static MODELS: [Model; 2] = [
    Model {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        provider: Provider::OpenAI,
        model_id: FALLBACK_MODEL_ID,
        description: "Fast and efficient, great for most tasks",
        max_tokens: 4000,
        temperature: 0.7,
    },
    Model {
        id: "gpt-3.5-turbo",
        name: "GPT-3.5 Turbo",
        provider: Provider::OpenAI,
        model_id: TITLE_MODEL_ID,
        description: "Fast and cost-effective",
        max_tokens: 4000,
        temperature: 0.7,
    },
];
