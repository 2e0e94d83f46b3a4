pub mod challenge;
pub mod image;
pub mod member;
pub mod member_challenge;
