pub mod password;
pub mod token;

pub use password::{
    hash_password, needs_rehash, verify_password, verify_unknown_account, HashScheme,
    PasswordError,
};
pub use token::{AuthError, IdentityClaims, TokenClaims, TokenService};
