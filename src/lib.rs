//! ImageFX prompt-to-image adapter.
//!
//! [`Adapter::generate`] resolves a bearer token, makes one `runImageFx`
//! call and always hands back exactly four RGBA images, padding with
//! placeholders when the provider returns fewer or a payload fails to decode.

pub mod adapter;
pub mod adapters;
pub mod cassette;
pub mod config;
pub mod context;
pub mod credential;
pub mod debug_log;
pub mod error;
pub mod model;
pub mod normalize;
pub mod output;
pub mod params;
pub mod ports;

pub use adapter::{Adapter, GenerationFailure, GenerationOutput};
pub use error::ImageFxError;
pub use normalize::{GenerationResult, HostTensor, ImageSlot, PlaceholderPolicy};
pub use ports::GenerationRequest;
