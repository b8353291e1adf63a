//! Tools for the planar RGB video container: decode frames to JPEG, compare
//! files byte for byte, and apply whole-container edits.

pub mod compare;
pub mod container;
pub mod edit;
pub mod error;
pub mod export;
pub mod pipeline;

pub use container::decoder::{decode, decode_file, ContainerDecoder};
pub use container::frame::{DecodedFrame, PlanarFrame, Plane};
pub use container::header::{ContainerHeader, HEADER_LEN, RGB_CHANNELS};
pub use error::ContainerError;
