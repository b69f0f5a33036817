pub mod feedback;
pub mod health;
pub mod posts;
pub mod seo;
