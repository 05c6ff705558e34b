pub mod node;
pub mod sample;
pub mod session;

pub use node::{NodeStore, Upsert};
pub use sample::{Channel, Sample};
pub use session::{Reconcile, Session, SessionSnapshot};
