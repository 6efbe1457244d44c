pub mod classify;
pub mod credential;
pub mod engine;
pub mod error;
pub mod export;
pub mod hashfile;
pub mod history;
pub mod io;
pub mod pot;
pub mod report;
pub mod repository;
pub mod stats;

pub mod prelude {
    pub use crate::classify::{
        Composition, LengthBucket, classify_composition, classify_length, compute_mask,
        extract_basewords,
    };
    pub use crate::credential::{Account, Credential};
    pub use crate::engine::{Analysis, Engine};
    pub use crate::error::{Error, Result};
    pub use crate::hashfile::HashFormat;
    pub use crate::pot::{CredentialIndex, PotConvention};
    pub use crate::repository::{AccountRepository, RepositoryConfig};
}
