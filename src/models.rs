use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in the visible transcript.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    /// Synthetic placeholder appended when a turn failed.
    #[serde(default)]
    pub is_error: bool,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            products: None,
            is_error: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>, products: Vec<Product>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        if !products.is_empty() {
            msg.products = Some(products);
        }
        msg
    }

    pub fn error(content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.is_error = true;
        msg
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub store_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            store_url: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    pub fn is_completion_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn is_store_configured(&self) -> bool {
        !self.store_url.trim().is_empty()
            && !self.consumer_key.trim().is_empty()
            && !self.consumer_secret.trim().is_empty()
    }
}

// Commerce API DTOs

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
pub struct ProductImage {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug, Default)]
#[serde(default)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub price: String,
    pub regular_price: String,
    pub sale_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_sale: Option<bool>,
    pub stock_status: String,
    pub stock_quantity: Option<i64>,
    pub categories: Vec<Category>,
    pub images: Vec<ProductImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

impl Product {
    /// The API's `on_sale` flag wins when present; otherwise a product is on
    /// sale when its regular price differs from the current price.
    pub fn is_on_sale(&self) -> bool {
        match self.on_sale {
            Some(flag) => flag,
            None => !self.regular_price.is_empty() && self.regular_price != self.price,
        }
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_status == "instock"
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CommerceErrorData {
    pub status: Option<u16>,
}

#[derive(Deserialize, Debug)]
pub struct CommerceError {
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub data: CommerceErrorData,
}

// Completion API DTOs

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Deserialize, Debug)]
pub struct CompletionErrorResponse {
    pub error: CompletionErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct CompletionErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
