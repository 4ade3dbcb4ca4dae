mod change_set;
pub use change_set::{Added, Change, ChangeSet, CollectionDiff, Updated};

mod id;
pub use id::Id;

mod reference;
pub use reference::Reference;

mod ty;
pub use ty::Type;

mod value;
pub use value::Value;

mod value_map;
pub use value_map::ValueMap;
