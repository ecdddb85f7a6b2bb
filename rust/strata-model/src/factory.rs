//! Object factory: decides, per named logical type, whether values are
//! materialized as instances of a statically-known class or as dynamic values.
//!
//! The factory is consulted once per record, enum and fixed node when a
//! converter tree is bound, never while decoding.

use std::sync::Arc;

use ahash::AHashMap;

use crate::{
    record::IndexedRecord,
    schema::{EnumSchema, FixedSchema, RecordSchema},
    value::Value,
};

/// A statically-known record class.
pub trait RecordClass: Send + Sync {
    fn name(&self) -> &str;

    /// Creates a blank instance to be populated field by field.
    fn new_instance(&self, schema: &Arc<RecordSchema>) -> Box<dyn IndexedRecord>;
}

/// A statically-known enum class.
pub trait EnumClass: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the constant for the symbol, or `None` if the class declares no
    /// such constant.
    fn constant(&self, symbol: &str) -> Option<Value>;
}

/// Builds a fixed class instance from its bytes.
pub type FixedConstructor = Arc<dyn Fn(Vec<u8>) -> Value + Send + Sync>;

/// A statically-known fixed class.
pub trait FixedClass: Send + Sync {
    fn name(&self) -> &str;

    /// The constructor taking the raw bytes, if the class has one.
    fn byte_array_constructor(&self) -> Option<FixedConstructor>;
}

/// Resolves logical schemas to statically-known classes.
///
/// Every method defaults to `None`, meaning "materialize a dynamic value".
pub trait ObjectFactory: Send + Sync {
    fn record_class(&self, _schema: &RecordSchema) -> Option<Arc<dyn RecordClass>> {
        None
    }

    fn enum_class(&self, _schema: &EnumSchema) -> Option<Arc<dyn EnumClass>> {
        None
    }

    fn fixed_class(&self, _schema: &FixedSchema) -> Option<Arc<dyn FixedClass>> {
        None
    }
}

/// A factory that never resolves a class: everything is materialized dynamically.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericFactory;

impl ObjectFactory for GenericFactory {}

/// A factory backed by classes registered under the full name of the logical
/// type they represent.
#[derive(Default, Clone)]
pub struct ClassRegistry {
    records: AHashMap<String, Arc<dyn RecordClass>>,
    enums: AHashMap<String, Arc<dyn EnumClass>>,
    fixed: AHashMap<String, Arc<dyn FixedClass>>,
}

impl ClassRegistry {
    pub fn new() -> ClassRegistry {
        ClassRegistry::default()
    }

    /// Registers a record class, replacing any class previously registered
    /// under the same name.
    pub fn register_record(&mut self, class: Arc<dyn RecordClass>) -> &mut Self {
        self.records.insert(class.name().to_string(), class);
        self
    }

    pub fn register_enum(&mut self, class: Arc<dyn EnumClass>) -> &mut Self {
        self.enums.insert(class.name().to_string(), class);
        self
    }

    pub fn register_fixed(&mut self, class: Arc<dyn FixedClass>) -> &mut Self {
        self.fixed.insert(class.name().to_string(), class);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len() + self.enums.len() + self.fixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectFactory for ClassRegistry {
    fn record_class(&self, schema: &RecordSchema) -> Option<Arc<dyn RecordClass>> {
        self.records.get(schema.name()).cloned()
    }

    fn enum_class(&self, schema: &EnumSchema) -> Option<Arc<dyn EnumClass>> {
        self.enums.get(schema.name()).cloned()
    }

    fn fixed_class(&self, schema: &FixedSchema) -> Option<Arc<dyn FixedClass>> {
        self.fixed.get(schema.name()).cloned()
    }
}
