//! Authentication: tokens, passwords, reset tokens, cookies

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset_token;

pub use cookie::{extract_refresh_token, RefreshCookie};
pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use middleware::{extract_token, jwt_auth_middleware, AuthContext};
pub use password::PasswordHasher;
