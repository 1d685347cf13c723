pub mod inference;
pub mod loader;
pub mod pattern;
pub mod registry;
pub mod remote;
pub mod requirements;
pub mod tagger;

pub use inference::InferenceMaker;
pub use loader::{CachedModelLoader, ModelLoader};
pub use pattern::{PatternTagger, PatternTaggerLoader};
pub use registry::{ModelRegistry, RegistrySettings};
pub use remote::{RemoteSequenceTagger, RemoteTaggerLoader};
pub use requirements::{Requirement, check_requirements};
pub use tagger::EntityTagger;
