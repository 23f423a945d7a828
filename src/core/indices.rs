//! Index alias helpers shared by the store.

use hashbrown::HashMap;

use crate::types::ResultId;

/// Secondary index from a key to the result ids carrying that key.
pub type VecIndex<K> = HashMap<K, Vec<ResultId>>;
