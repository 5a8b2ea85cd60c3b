//! The typed BEL domain model.

pub mod citation;
pub mod concept;
pub mod edge;
pub mod entity;
pub mod fusion;
pub mod modifier;
pub mod relation;
pub mod variant;

pub use citation::{Citation, CitationType};
pub use concept::{Concept, Function};
pub use edge::{Annotations, EdgeData};
pub use entity::Entity;
pub use fusion::{Fusion, FusionPosition, FusionRange};
pub use modifier::{Modifier, Participant};
pub use relation::Relation;
pub use variant::{AminoAcid, FragmentBound, Variant};
