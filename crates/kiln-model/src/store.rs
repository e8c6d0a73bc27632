use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::well_known::{ContainerShape, WellKnownTypes};
use crate::{AllocFn, FieldStoreFn, InvokeError, InvokeFn, Value};

/// Name of the scripting-engine metadata field excluded from field catalogs.
pub const SCRIPT_META_FIELD: &str = "metaClass";
/// Declared type path of [`SCRIPT_META_FIELD`].
pub const SCRIPT_META_TYPE: &str = "script.MetaClass";

/// Identity of a registered type, valid within the [`TypeStore`] that minted
/// it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// The primitive kinds the coercion layer can parse into. Wrapper types
/// collapse into their primitive kind in this model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }

    /// The designated zero value for this kind (`false`, `0`, `'\0'`, …).
    pub fn zero(self) -> Value {
        match self {
            PrimitiveKind::Bool => Value::Bool(false),
            PrimitiveKind::Char => Value::Char('\0'),
            PrimitiveKind::I8 => Value::I8(0),
            PrimitiveKind::I16 => Value::I16(0),
            PrimitiveKind::I32 => Value::I32(0),
            PrimitiveKind::I64 => Value::I64(0),
            PrimitiveKind::F32 => Value::F32(0.0),
            PrimitiveKind::F64 => Value::F64(0.0),
        }
    }
}

/// Declared visibility of a constructor.
///
/// Package-level and private visibility share a rank: constructor search
/// treats them as equally last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn rank(self) -> u8 {
        match self {
            Visibility::Public => 0,
            Visibility::Protected => 1,
            Visibility::Package | Visibility::Private => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Primitive(PrimitiveKind),
    Array { element: TypeId },
}

/// One declared field of a registered type, in declaration order.
#[derive(Clone)]
pub struct FieldDecl {
    pub name: String,
    /// Declared field type.
    pub ty: TypeId,
    pub is_static: bool,
    pub public: bool,
    /// Direct store thunk. Absent when the host cannot (or will not) open the
    /// field for direct writes; the catalog degrades rather than erroring.
    pub store: Option<FieldStoreFn>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            is_static: false,
            public: true,
            store: None,
        }
    }

    pub fn non_public(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_store<F>(mut self, store: F) -> Self
    where
        F: Fn(&mut (dyn Any + Send), Value) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        self.store = Some(Arc::new(store));
        self
    }
}

impl fmt::Debug for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDecl")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("is_static", &self.is_static)
            .field("public", &self.public)
            .field("store", &self.store.is_some())
            .finish()
    }
}

/// One declared constructor: its ordered parameter types, visibility, and the
/// host thunk that invokes it.
#[derive(Clone)]
pub struct ConstructorDecl {
    pub params: Vec<TypeId>,
    pub visibility: Visibility,
    pub invoke: InvokeFn,
}

impl ConstructorDecl {
    pub fn new<F>(params: Vec<TypeId>, visibility: Visibility, invoke: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn Any + Send>, InvokeError> + Send + Sync + 'static,
    {
        ConstructorDecl {
            params,
            visibility,
            invoke: Arc::new(invoke),
        }
    }
}

impl fmt::Debug for ConstructorDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorDecl")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Everything the construction layer may ask about one registered type.
///
/// Descriptors are write-once: hosts build them, [`TypeStore::register`]
/// stores them, and nothing mutates them afterwards.
pub struct TypeDescriptor {
    pub path: String,
    pub simple_name: String,
    pub kind: TypeKind,
    pub public: bool,
    pub superclass: Option<TypeId>,
    pub interfaces: Vec<TypeId>,
    /// Read-only container shape mark, if this type is one of the known
    /// unmodifiable wrapper shapes.
    pub shape: Option<ContainerShape>,
    pub fields: Vec<FieldDecl>,
    pub constructors: Vec<ConstructorDecl>,
    /// Bare allocation thunk; see [`crate::AllocFn`].
    pub alloc: Option<AllocFn>,
}

impl TypeDescriptor {
    fn with_kind(path: impl Into<String>, kind: TypeKind) -> Self {
        let path = path.into();
        let simple_name = path.rsplit('.').next().unwrap_or(path.as_str()).to_string();
        TypeDescriptor {
            path,
            simple_name,
            kind,
            public: true,
            superclass: None,
            interfaces: Vec::new(),
            shape: None,
            fields: Vec::new(),
            constructors: Vec::new(),
            alloc: None,
        }
    }

    pub fn class(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Class)
    }

    pub fn interface(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Interface)
    }

    pub fn enumeration(path: impl Into<String>) -> Self {
        Self::with_kind(path, TypeKind::Enum)
    }

    pub fn non_public(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn extends(mut self, superclass: TypeId) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_shape(mut self, shape: ContainerShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_constructor(mut self, ctor: ConstructorDecl) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn with_alloc<F>(mut self, alloc: F) -> Self
    where
        F: Fn() -> Box<dyn Any + Send> + Send + Sync + 'static,
    {
        self.alloc = Some(Arc::new(alloc));
        self
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("public", &self.public)
            .field("superclass", &self.superclass)
            .field("interfaces", &self.interfaces)
            .field("shape", &self.shape)
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .finish_non_exhaustive()
    }
}

/// The registration table the construction layer works against.
///
/// A fresh store carries the fixed built-in universe (primitives, the
/// placeholder catalog, collection interfaces and their read-only wrapper
/// shapes, and the security deny-list); hosts register their own types on
/// top. Type ids are dense indices and are only meaningful within the store
/// that minted them.
pub struct TypeStore {
    types: Vec<TypeDescriptor>,
    path_to_id: HashMap<String, TypeId>,
    /// Short-name aliases (`"int"`, `"string"`, `"date"`, …).
    aliases: HashMap<&'static str, TypeId>,
    primitives: [TypeId; 8],
    well_known: WellKnownTypes,
}

impl TypeStore {
    pub fn new() -> Self {
        let mut types: Vec<TypeDescriptor> = Vec::new();
        let mut path_to_id: HashMap<String, TypeId> = HashMap::new();

        let mut reg = |desc: TypeDescriptor| -> TypeId {
            let id = TypeId::from_raw(types.len() as u32);
            path_to_id.insert(desc.path.clone(), id);
            types.push(desc);
            id
        };

        let object = reg(TypeDescriptor::class("core.Object"));
        let class_type = reg(TypeDescriptor::class("core.Type").extends(object));
        let string = reg(TypeDescriptor::class("core.String").extends(object));
        let number = reg(TypeDescriptor::class("core.Number").extends(object));

        let mut primitives = [object; 8];
        for kind in PrimitiveKind::ALL {
            let id = reg(TypeDescriptor::with_kind(
                kind.name(),
                TypeKind::Primitive(kind),
            ));
            primitives[kind as usize] = id;
        }

        let date = reg(TypeDescriptor::class("time.Instant").extends(object));
        let timestamp = reg(TypeDescriptor::class("time.Timestamp").extends(date));
        let local_date = reg(TypeDescriptor::class("time.LocalDate").extends(object));
        let local_date_time = reg(TypeDescriptor::class("time.LocalDateTime").extends(object));
        let zoned_date_time = reg(TypeDescriptor::class("time.ZonedDateTime").extends(object));
        let zone_id = reg(TypeDescriptor::class("time.ZoneId").extends(object));
        let calendar = reg(TypeDescriptor::class("time.Calendar").extends(object));
        let time_zone = reg(TypeDescriptor::class("time.TimeZone").extends(object));

        let big_integer = reg(TypeDescriptor::class("math.BigInt").extends(number));
        let big_decimal = reg(TypeDescriptor::class("math.BigDecimal").extends(number));
        let string_builder = reg(TypeDescriptor::class("text.StringBuilder").extends(object));
        let string_buffer = reg(TypeDescriptor::class("text.StringBuffer").extends(object));
        let locale = reg(TypeDescriptor::class("util.Locale").extends(object));
        let url = reg(TypeDescriptor::class("net.Url").extends(object));
        let atomic_bool = reg(TypeDescriptor::class("sync.AtomicBool").extends(object));
        let atomic_int = reg(TypeDescriptor::class("sync.AtomicI32").extends(number));
        let atomic_long = reg(TypeDescriptor::class("sync.AtomicI64").extends(number));

        let collection = reg(TypeDescriptor::interface("collections.Collection"));
        let list = reg(TypeDescriptor::interface("collections.List").implements(collection));
        let set = reg(TypeDescriptor::interface("collections.Set").implements(collection));
        let sorted_set = reg(TypeDescriptor::interface("collections.SortedSet").implements(set));
        let map = reg(TypeDescriptor::interface("collections.Map"));
        let sorted_map = reg(TypeDescriptor::interface("collections.SortedMap").implements(map));

        // Read-only wrapper shapes the resolver shortcuts to fresh mutable
        // containers.
        reg(TypeDescriptor::class("collections.ReadOnlyCollection")
            .extends(object)
            .implements(collection)
            .with_shape(ContainerShape::Collection));
        reg(TypeDescriptor::class("collections.ReadOnlySet")
            .extends(object)
            .implements(set)
            .with_shape(ContainerShape::Set));
        reg(TypeDescriptor::class("collections.ReadOnlySortedSet")
            .extends(object)
            .implements(sorted_set)
            .with_shape(ContainerShape::SortedSet));
        reg(TypeDescriptor::class("collections.ReadOnlyMap")
            .extends(object)
            .implements(map)
            .with_shape(ContainerShape::Map));
        reg(TypeDescriptor::class("collections.ReadOnlySortedMap")
            .extends(object)
            .implements(sorted_map)
            .with_shape(ContainerShape::SortedMap));
        reg(TypeDescriptor::class("collections.EmptyList")
            .extends(object)
            .implements(list)
            .with_shape(ContainerShape::EmptyList));

        let process_builder = reg(TypeDescriptor::class("process.Command").extends(object));
        let process = reg(TypeDescriptor::class("process.Child").extends(object));
        reg(TypeDescriptor::class("process.ChildImpl")
            .extends(process)
            .non_public());
        let class_loader = reg(TypeDescriptor::class("runtime.Loader").extends(object));
        let constructor_handle =
            reg(TypeDescriptor::class("reflect.ConstructorHandle").extends(object));
        let method_handle = reg(TypeDescriptor::class("reflect.MethodHandle").extends(object));
        let field_handle = reg(TypeDescriptor::class("reflect.FieldHandle").extends(object));

        let well_known = WellKnownTypes {
            object,
            class_type,
            string,
            number,
            date,
            timestamp,
            local_date,
            local_date_time,
            zoned_date_time,
            zone_id,
            calendar,
            time_zone,
            big_integer,
            big_decimal,
            string_builder,
            string_buffer,
            locale,
            url,
            atomic_bool,
            atomic_int,
            atomic_long,
            collection,
            list,
            set,
            sorted_set,
            map,
            sorted_map,
            process,
            process_builder,
            class_loader,
            constructor_handle,
            method_handle,
            field_handle,
        };

        let mut aliases: HashMap<&'static str, TypeId> = HashMap::new();
        aliases.insert("string", string);
        aliases.insert("boolean", primitives[PrimitiveKind::Bool as usize]);
        aliases.insert("char", primitives[PrimitiveKind::Char as usize]);
        aliases.insert("byte", primitives[PrimitiveKind::I8 as usize]);
        aliases.insert("short", primitives[PrimitiveKind::I16 as usize]);
        aliases.insert("int", primitives[PrimitiveKind::I32 as usize]);
        aliases.insert("long", primitives[PrimitiveKind::I64 as usize]);
        aliases.insert("float", primitives[PrimitiveKind::F32 as usize]);
        aliases.insert("double", primitives[PrimitiveKind::F64 as usize]);
        aliases.insert("date", date);
        aliases.insert("class", class_type);

        TypeStore {
            types,
            path_to_id,
            aliases,
            primitives,
            well_known,
        }
    }

    /// Register a host type.
    ///
    /// # Panics
    ///
    /// Panics when the descriptor's path is already registered; duplicate
    /// registration is a host bug.
    pub fn register(&mut self, desc: TypeDescriptor) -> TypeId {
        if self.path_to_id.contains_key(&desc.path) {
            panic!("type `{}` is already registered", desc.path);
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.path_to_id.insert(desc.path.clone(), id);
        self.types.push(id_checked(desc, &self.types));
        id
    }

    /// Register (or look up) the array type of `element`.
    pub fn array_of(&mut self, element: TypeId) -> TypeId {
        let path = format!("{}[]", self.path(element));
        if let Some(id) = self.path_to_id.get(path.as_str()) {
            return *id;
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.path_to_id.insert(path.clone(), id);
        self.types
            .push(TypeDescriptor::with_kind(path, TypeKind::Array { element }));
        id
    }

    pub fn get(&self, ty: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(ty.idx())
    }

    /// Fully qualified path of `ty`; `"<unknown>"` for a foreign id.
    pub fn path(&self, ty: TypeId) -> &str {
        self.get(ty).map_or("<unknown>", |d| d.path.as_str())
    }

    pub fn simple_name(&self, ty: TypeId) -> &str {
        self.get(ty).map_or("<unknown>", |d| d.simple_name.as_str())
    }

    /// Resolve a type by name: short-name aliases first, then fully
    /// qualified paths (including registered `Elem[]` array paths).
    pub fn find(&self, name: &str) -> Option<TypeId> {
        if name.is_empty() {
            return None;
        }
        if let Some(id) = self.aliases.get(name) {
            return Some(*id);
        }
        self.path_to_id.get(name).copied()
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        self.primitives[kind as usize]
    }

    pub fn primitive_kind(&self, ty: TypeId) -> Option<PrimitiveKind> {
        match self.get(ty)?.kind {
            TypeKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// True for the primitive kinds (wrapper types collapse into them here).
    pub fn is_primitive(&self, ty: TypeId) -> bool {
        self.primitive_kind(ty).is_some()
    }

    /// True for types treated as immutable/self-describing by the codec:
    /// primitives, text, the numeric tower, the instant-based date family,
    /// enums, and the type-of-types value. These are written without
    /// reference ids, so graph shape is preserved even without `@id`/`@ref`.
    pub fn is_logical_primitive(&self, ty: TypeId) -> bool {
        if self.is_primitive(ty) {
            return true;
        }
        let Some(desc) = self.get(ty) else {
            return false;
        };
        if desc.kind == TypeKind::Enum {
            return true;
        }
        let wk = &self.well_known;
        ty == wk.class_type
            || self.is_assignable(wk.string, ty)
            || self.is_assignable(wk.number, ty)
            || self.is_assignable(wk.date, ty)
    }

    /// The enum type a constant-body subclass belongs to, or `ty` itself when
    /// it is an enum.
    pub fn enum_type_of(&self, ty: TypeId) -> Option<TypeId> {
        let desc = self.get(ty)?;
        if desc.kind == TypeKind::Enum {
            return Some(ty);
        }
        let superclass = desc.superclass?;
        match self.get(superclass)?.kind {
            TypeKind::Enum => Some(superclass),
            _ => None,
        }
    }

    /// Whether `ty` is `ancestor` or reaches it through the superclass /
    /// interface lattice. Explicit graph query; no shortcuts.
    pub fn is_assignable(&self, ancestor: TypeId, ty: TypeId) -> bool {
        if ancestor == ty {
            return true;
        }
        let mut queue = vec![ty];
        let mut seen = vec![ty];
        while let Some(current) = queue.pop() {
            let Some(desc) = self.get(current) else {
                continue;
            };
            for parent in desc.superclass.iter().chain(desc.interfaces.iter()) {
                if *parent == ancestor {
                    return true;
                }
                if !seen.contains(parent) {
                    seen.push(*parent);
                    queue.push(*parent);
                }
            }
        }
        false
    }

    /// The read-only container shape of `ty`, inherited through the
    /// superclass chain.
    pub fn container_shape(&self, ty: TypeId) -> Option<ContainerShape> {
        let mut current = Some(ty);
        while let Some(id) = current {
            let desc = self.get(id)?;
            if let Some(shape) = desc.shape {
                return Some(shape);
            }
            current = desc.superclass;
        }
        None
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

// Registration sanity check: parent links must point at already-registered
// types (ids are dense indices, so anything else is a host bug).
fn id_checked(desc: TypeDescriptor, types: &[TypeDescriptor]) -> TypeDescriptor {
    let bound = types.len();
    for parent in desc.superclass.iter().chain(desc.interfaces.iter()) {
        if parent.idx() >= bound {
            panic!(
                "type `{}` references unregistered parent {:?}",
                desc.path, parent
            );
        }
    }
    desc
}
