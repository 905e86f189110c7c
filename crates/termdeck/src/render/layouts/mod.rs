pub mod columns;
pub mod content;
pub mod heading;
pub mod image_slide;
