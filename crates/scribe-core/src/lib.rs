//! # scribe-core
//!
//! Shared vocabulary for the scribe crates:
//!
//! - **Branded IDs**: [`ObjectName`] for staged audio objects, [`JobId`] for
//!   speech operations
//! - **Uploads**: [`AudioUpload`] (transient request payload) and
//!   [`StoredObject`] (the durable copy in the blob store)
//! - **Speech wire types**: [`RecognitionConfig`], [`RecognizeRequest`],
//!   [`Operation`] and the derived [`JobStatus`]
//! - **Logging**: [`logging::init_subscriber`]

#![deny(unsafe_code)]

pub mod audio;
pub mod ids;
pub mod logging;
pub mod operation;

pub use audio::{AudioUpload, StoredObject, content_type_for_path, extension_for_content_type};
pub use ids::{JobId, ObjectName};
pub use operation::{
    AudioEncoding, JobStatus, Operation, OperationError, RecognitionConfig, RecognizeRequest,
};
