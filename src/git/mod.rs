mod blame;
mod chunk;
mod remote;
mod repository;
mod runner;

pub use blame::{parse as parse_blame, Blame};
pub use chunk::{short_id, Chunk, NOT_COMMITTED_ID};
pub use remote::RemoteInfo;
pub use repository::Repository;
pub use runner::{BlameRunner, CancelToken};
