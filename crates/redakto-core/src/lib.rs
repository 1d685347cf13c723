//! Core domain models and logic for redakto
//!
//! This crate contains:
//! - Domain models (EntityItem, TaggedSentence, requests and responses)
//! - Entity alignment (tagger output -> character offsets)
//! - Coarse label mapping and merging
//! - The shared error type

pub mod alignment;
pub mod entity;
pub mod error;
pub mod info;
pub mod labels;
pub mod request;
pub mod text;
pub mod validate;

pub use alignment::align_entities;
pub use entity::{EntityItem, TaggedSentence, TaggedSpan};
pub use error::{Error, Result};
pub use labels::{EntityTracking, LabelMapping, TrackedEntity, map_to_coarse_labels};
pub use request::{
    DetectEntitiesRequest, DetectEntitiesResponse, RedactTextsRequest, RedactTextsResponse,
    RedactedText, RedactionCount, RedactionStyle,
};
pub use text::CharIndex;
pub use validate::{FieldError, Validate};
pub use info::{
    EntitySetDetails, EntitySetLabelInfo, EntitySetQuery, FineGrainedLabelInfo, ModelQuery,
    SupportedModelDetails, SupportedModelSummary,
};
