//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod hs256_session_token_codec;
mod in_memory_access_repository;
mod password_identity_provider;
mod postgres_access_registry_repository;
mod postgres_member_repository;
mod postgres_organization_repository;
mod postgres_rows;

pub use hs256_session_token_codec::{Hs256SessionTokenCodec, MIN_SECRET_LENGTH};
pub use in_memory_access_repository::InMemoryAccessRepository;
pub use password_identity_provider::{DisabledIdentityProvider, PasswordIdentityProvider};
pub use postgres_access_registry_repository::PostgresAccessRegistryRepository;
pub use postgres_member_repository::PostgresMemberRepository;
pub use postgres_organization_repository::PostgresOrganizationRepository;
