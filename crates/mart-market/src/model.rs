//! Model listings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mart_core::{Amount, ContentRef, ModelId, Principal, RatingAggregate};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Closed set of model categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Text and chat models.
    TextGeneration,
    /// Image synthesis models.
    ImageGeneration,
    /// Speech and audio models.
    AudioProcessing,
    /// Video models.
    VideoProcessing,
    /// Tabular and analytics models.
    DataAnalysis,
    /// Code models.
    CodeGeneration,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::TextGeneration,
        Self::ImageGeneration,
        Self::AudioProcessing,
        Self::VideoProcessing,
        Self::DataAnalysis,
        Self::CodeGeneration,
        Self::Other,
    ];

    /// Returns the snake_case name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TextGeneration => "text_generation",
            Self::ImageGeneration => "image_generation",
            Self::AudioProcessing => "audio_processing",
            Self::VideoProcessing => "video_processing",
            Self::DataAnalysis => "data_analysis",
            Self::CodeGeneration => "code_generation",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| MarketError::invalid_input(format!("unknown category: {s}")))
    }
}

/// Caller-supplied fields of a new model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelListing {
    /// Display name (required).
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Where the model itself lives (required).
    pub content_ref: ContentRef,
    /// Price of one execution; must be positive.
    pub price_per_execution: Amount,
    /// Listing category.
    pub category: Category,
}

impl ModelListing {
    /// Creates a listing with an empty description.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content_ref: ContentRef,
        price_per_execution: Amount,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            content_ref,
            price_per_execution,
            category,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` on an empty name or content
    /// reference, or a zero price.
    pub fn validate(&self) -> Result<(), MarketError> {
        if self.name.is_empty() {
            return Err(MarketError::invalid_input("model name must not be empty"));
        }
        if self.content_ref.is_empty() {
            return Err(MarketError::invalid_input("content reference must not be empty"));
        }
        if self.price_per_execution.is_zero() {
            return Err(MarketError::invalid_input("price per execution must be positive"));
        }
        Ok(())
    }
}

/// A registered model.
///
/// Identity fields never change after registration. `total_executions` is
/// written only by settlement, `rating` only by the rating aggregator, and
/// `is_active` only by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIModel {
    /// Model id.
    pub id: ModelId,
    /// Creator, paid on every completed execution.
    pub creator: Principal,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Where the model itself lives.
    pub content_ref: ContentRef,
    /// Price of one execution.
    pub price_per_execution: Amount,
    /// Number of executions settled as completed.
    pub total_executions: u64,
    /// Running rating (mean × 100) and number of ratings.
    pub rating: RatingAggregate,
    /// Whether new executions may be requested.
    pub is_active: bool,
    /// Listing category.
    pub category: Category,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl AIModel {
    pub(crate) fn from_listing(id: ModelId, creator: Principal, listing: ModelListing) -> Self {
        Self {
            id,
            creator,
            name: listing.name,
            description: listing.description,
            content_ref: listing.content_ref,
            price_per_execution: listing.price_per_execution,
            total_executions: 0,
            rating: RatingAggregate::new(),
            is_active: true,
            category: listing.category,
            created_at: Utc::now(),
        }
    }

    /// Mean rating scaled by 100.
    #[must_use]
    pub const fn rating_scaled(&self) -> u64 {
        self.rating.scaled()
    }

    /// Number of ratings received.
    #[must_use]
    pub const fn rating_count(&self) -> u64 {
        self.rating.count()
    }
}
