//! Cover art download over HTTP
//!
//! Fetches cover art images from whatever reference a song carries: video
//! thumbnails, recognition service artwork, or the Cover Art Archive.

mod client;

pub use client::HttpCoverArtFetcher;
