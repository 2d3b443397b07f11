pub mod background;
pub mod catalog;
pub mod covert_channel;
pub mod domain;
pub mod features;
pub mod matcher;
pub mod palette;
pub mod patterns;
pub mod pixel;
pub mod raster;
pub mod result;
pub mod text_region;
pub mod utils;
