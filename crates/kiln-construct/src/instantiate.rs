//! Constructor resolution and instance synthesis.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use kiln_model::{
    ConstructorDecl, ContainerShape, Object, TypeId, TypeKind, TypeStore, Value, Visibility,
};

use crate::{coerce, security, ConstructError};

/// The cached outcome of constructor search for one type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    /// Invoke the constructor at `index`, synthesizing arguments under the
    /// recorded policy.
    Constructor { index: usize, use_null_args: bool },
    /// Bare allocation without running any constructor.
    RawAlloc,
}

/// Synthesizes live instances of registered types for the deserializer.
///
/// Resolution tries, in order: the security gate, the known read-only
/// container shapes, a public zero-argument constructor, a brute-force
/// search over every declared constructor (null-preferring arguments first,
/// then populated placeholders), and finally raw allocation when the
/// capability is enabled. The winning strategy is cached per type; repeat
/// calls replay it directly, re-synthesizing arguments so mutable values
/// stay fresh.
///
/// Safe to share across threads. Duplicate first-time resolution for the
/// same type is tolerated: both threads compute an equally valid strategy
/// and one overwrite wins.
pub struct Instantiator {
    resolved: RwLock<HashMap<TypeId, Strategy>>,
    allow_raw_alloc: AtomicBool,
}

impl Instantiator {
    pub fn new() -> Self {
        Instantiator {
            resolved: RwLock::new(HashMap::new()),
            allow_raw_alloc: AtomicBool::new(false),
        }
    }

    /// Toggle the raw-allocation fallback. Off by default. Toggling is not
    /// transactional with in-flight calls; either state may be observed.
    pub fn set_allow_raw_alloc(&self, enabled: bool) {
        self.allow_raw_alloc
            .store(enabled, AtomicOrdering::Relaxed);
    }

    pub fn allow_raw_alloc(&self) -> bool {
        self.allow_raw_alloc.load(AtomicOrdering::Relaxed)
    }

    /// Build an instance of `ty`, intended to have its fields stuffed by
    /// direct assignment afterwards. Returns a type-correct value or a
    /// classified error; never a typeless placeholder.
    pub fn instantiate(&self, store: &TypeStore, ty: TypeId) -> Result<Value, ConstructError> {
        security::check(store, ty)?;

        if let Some(shape) = store.container_shape(ty) {
            return Ok(container_value(shape));
        }

        let desc = store.get(ty).ok_or_else(|| no_constructor(store, ty))?;
        if desc.kind == TypeKind::Interface {
            return Err(ConstructError::UnsupportedInterface {
                type_path: desc.path.clone(),
            });
        }

        let cached = self.resolved.read().get(&ty).copied();
        if let Some(strategy) = cached {
            return self.replay(store, ty, strategy);
        }

        let (value, strategy) = self.resolve(store, ty)?;
        self.resolved.write().insert(ty, strategy);
        Ok(value)
    }

    /// Re-run a previously resolved strategy. Arguments are synthesized
    /// fresh on every call; the values may be mutable.
    fn replay(
        &self,
        store: &TypeStore,
        ty: TypeId,
        strategy: Strategy,
    ) -> Result<Value, ConstructError> {
        let desc = store.get(ty).ok_or_else(|| no_constructor(store, ty))?;
        match strategy {
            Strategy::RawAlloc => {
                if !self.allow_raw_alloc() {
                    return Err(no_constructor(store, ty));
                }
                let alloc = desc.alloc.as_ref().ok_or_else(|| no_constructor(store, ty))?;
                Ok(Value::Object(Object::new(ty, alloc())))
            }
            Strategy::Constructor {
                index,
                use_null_args,
            } => {
                let ctor = desc
                    .constructors
                    .get(index)
                    .ok_or_else(|| no_constructor(store, ty))?;
                let args = synthesize_args(store, ctor, use_null_args);
                match (ctor.invoke)(&args) {
                    Ok(data) => Ok(Value::Object(Object::new(ty, data))),
                    Err(err) => {
                        // Should never happen: this constructor already
                        // succeeded once when the strategy was resolved.
                        debug!(
                            ty = store.path(ty),
                            ctor = index,
                            %err,
                            "cached constructor failed on replay"
                        );
                        Err(no_constructor(store, ty))
                    }
                }
            }
        }
    }

    fn resolve(
        &self,
        store: &TypeStore,
        ty: TypeId,
    ) -> Result<(Value, Strategy), ConstructError> {
        let desc = store.get(ty).ok_or_else(|| no_constructor(store, ty))?;

        // Fast path: a public zero-argument constructor. An invocation
        // failure here is not terminal; the brute-force search below retries
        // it along with everything else.
        if let Some((index, ctor)) = desc
            .constructors
            .iter()
            .enumerate()
            .find(|(_, c)| c.params.is_empty() && c.visibility == Visibility::Public)
        {
            match (ctor.invoke)(&[]) {
                Ok(data) => {
                    return Ok((
                        Value::Object(Object::new(ty, data)),
                        Strategy::Constructor {
                            index,
                            use_null_args: true,
                        },
                    ));
                }
                Err(err) => {
                    trace!(ty = store.path(ty), %err, "zero-argument constructor failed");
                }
            }
        }

        // Brute force over every declared constructor, any visibility.
        // The order is deterministic: visibility rank, then parameter count,
        // then the parameter type-path sequence. Declaration order carries no
        // meaning.
        let mut order: Vec<usize> = (0..desc.constructors.len()).collect();
        order.sort_by(|&a, &b| {
            constructor_order(store, &desc.constructors[a], &desc.constructors[b])
        });

        // Two full passes: null-preferring arguments for every candidate
        // first, populated placeholders only after the first pass exhausts
        // all of them. Policies are never mixed per candidate.
        for use_null_args in [true, false] {
            if !use_null_args {
                debug!(ty = store.path(ty), "retrying constructors with populated arguments");
            }
            for &index in &order {
                let ctor = &desc.constructors[index];
                let args = synthesize_args(store, ctor, use_null_args);
                match (ctor.invoke)(&args) {
                    Ok(data) => {
                        return Ok((
                            Value::Object(Object::new(ty, data)),
                            Strategy::Constructor {
                                index,
                                use_null_args,
                            },
                        ));
                    }
                    Err(err) => {
                        // Expected during search; advance to the next
                        // candidate.
                        trace!(ty = store.path(ty), ctor = index, %err, "constructor attempt failed");
                    }
                }
            }
        }

        if self.allow_raw_alloc() {
            if let Some(alloc) = desc.alloc.as_ref() {
                // Skips constructor-established invariants; known risk of the
                // capability, not a bug.
                debug!(ty = store.path(ty), "falling back to raw allocation");
                return Ok((Value::Object(Object::new(ty, alloc())), Strategy::RawAlloc));
            }
        }

        Err(no_constructor(store, ty))
    }
}

impl Default for Instantiator {
    fn default() -> Self {
        Self::new()
    }
}

fn synthesize_args(store: &TypeStore, ctor: &ConstructorDecl, use_null_args: bool) -> Vec<Value> {
    ctor.params
        .iter()
        .map(|param| coerce::default_for(store, *param, use_null_args))
        .collect()
}

fn constructor_order(store: &TypeStore, a: &ConstructorDecl, b: &ConstructorDecl) -> Ordering {
    a.visibility
        .rank()
        .cmp(&b.visibility.rank())
        .then_with(|| a.params.len().cmp(&b.params.len()))
        .then_with(|| {
            for (pa, pb) in a.params.iter().zip(b.params.iter()) {
                let ord = store.path(*pa).cmp(store.path(*pb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
}

fn container_value(shape: ContainerShape) -> Value {
    match shape {
        ContainerShape::Map => Value::Map(IndexMap::new()),
        ContainerShape::SortedMap => Value::SortedMap(BTreeMap::new()),
        ContainerShape::Set => Value::Set(Vec::new()),
        ContainerShape::SortedSet => Value::SortedSet(Vec::new()),
        ContainerShape::Collection | ContainerShape::EmptyList => Value::List(Vec::new()),
    }
}

fn no_constructor(store: &TypeStore, ty: TypeId) -> ConstructError {
    ConstructError::NoConstructorFound {
        type_path: store.path(ty).to_string(),
    }
}
