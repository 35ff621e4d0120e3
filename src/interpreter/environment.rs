use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::value::Value;

/// Read-only name to value lookup that references resolve against.
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<Value>;

    fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl<S: BuildHasher> Environment for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl Environment for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

/// An environment without any names.
#[derive(Clone, Copy, Debug, Default)]
pub struct Empty;

impl Environment for Empty {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}
