mod builder;
mod guard;
mod identity;
mod repository;

pub use builder::RepositoryBuilder;
pub use guard::ShapeGuard;
pub use identity::IdentityGenerator;
pub use repository::Repository;
