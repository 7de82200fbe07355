use serde::{Deserialize, Serialize};

/// Category-specific specifications; actual keys vary by category.
pub type PartSpecs = serde_json::Map<String, serde_json::Value>;

/// A published wiki article with full content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
  pub id: String,
  pub title: String,
  pub slug: String,
  /// Markdown body
  pub content: String,
  pub excerpt: Option<String>,
  pub cover_image: Option<String>,
  pub topic_id: String,
  pub published_at: String,
  pub created_at: String,
  pub updated_at: String,
  pub view_count: u32,
  /// Shown in the home featured section
  pub is_featured: bool,
}

/// Article card for list/grid views, with denormalized topic info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleCard {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub excerpt: Option<String>,
  pub cover_image: Option<String>,
  pub published_at: String,
  pub topic_name: String,
  pub topic_slug: String,
}

/// Reference used in the article detail "You may also like" section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedArticle {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub excerpt: Option<String>,
  pub cover_image: Option<String>,
  pub order: u32,
}

/// Valid computer part categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
  Cpu,
  Gpu,
  Ram,
  Storage,
  Motherboard,
  Psu,
  Cooling,
  Case,
  Peripherals,
}

impl PartCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cpu => "cpu",
      Self::Gpu => "gpu",
      Self::Ram => "ram",
      Self::Storage => "storage",
      Self::Motherboard => "motherboard",
      Self::Psu => "psu",
      Self::Cooling => "cooling",
      Self::Case => "case",
      Self::Peripherals => "peripherals",
    }
  }
}

impl std::fmt::Display for PartCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A catalog entry for a computer part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerPart {
  pub id: String,
  pub name: String,
  pub slug: String,
  pub category: PartCategory,
  pub description: String,
  pub image_url: Option<String>,
  pub specifications: PartSpecs,
  pub manufacturer: Option<String>,
  pub model_number: Option<String>,
  pub created_at: String,
  pub updated_at: String,
}
