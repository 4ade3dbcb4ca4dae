mod context;
pub use context::Context;

pub mod db;
pub use db::MemoryStore;

pub mod guard;
pub use guard::{AccessControl, AccessGuard, AccessRegistry};

pub mod record;
pub use record::{CollectionTracker, Input, Record};

pub use tally_core::{
    driver::Store,
    err,
    schema::{self, Schema},
    stmt::{self, Change, ChangeSet, CollectionDiff, Id, Reference, Value, ValueMap},
    values, Error, GroupId, Permission, Principal, Result,
};
