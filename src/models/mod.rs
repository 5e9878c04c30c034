pub mod artifact;
pub mod common;
pub mod response;

pub use artifact::{
    ArtifactQuery, ArtifactUpload, FilePart, FormValue, RequestContext, UpdateArtifactMeta,
};
pub use common::{FileContent, FlagResponse, Schema, SchemaError};
pub use response::ApiResponse;
