//! Managed-image classification.
//!
//! A managed (CLR) container carries a runtime header pointed to by data
//! directory slot 14. Its mere presence is enough to exclude the image
//! from native dependency reporting; nothing past the directory table is
//! ever read.

use crate::headers::ImageHeaders;
use crate::types::DIRECTORY_ENTRY_CLR;

/// Header-only heuristic: non-zero runtime-header RVA means managed.
///
/// Advisory, never fails; an unreadable or missing directory slot
/// classifies as native.
pub fn is_managed_image(headers: &ImageHeaders) -> bool {
    headers
        .data_directory(DIRECTORY_ENTRY_CLR)
        .virtual_address
        != 0
}
