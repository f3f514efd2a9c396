pub mod capability;
pub mod classify;
pub mod flows;
pub mod gateway;
pub mod media;
pub mod pipeline;
pub mod stages;
