pub mod extractor;
pub mod gateway;

pub use extractor::AuthenticatedUser;
pub use gateway::{AuthGateway, JwtAuthGateway, UserId};
