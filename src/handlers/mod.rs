pub mod files;
pub mod google_oauth;
pub mod pages;
