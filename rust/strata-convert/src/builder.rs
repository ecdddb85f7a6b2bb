//! Materializer Builder Module
//!
//! Provides a builder for configuring and binding a [`RecordMaterializer`]:
//! the object factory deciding between dynamic and class instances, the
//! converter options, and the physical layout of the data.

use std::sync::Arc;

use strata_common::Result;
use strata_format::schema::GroupType;
use strata_model::{GenericFactory, ObjectFactory, schema::RecordSchema};

use crate::{
    converter::BindContext, materializer::RecordMaterializer, options::ConverterOptions,
    schema_converter::SchemaConverter,
};

/// Builder for binding record materializers against a logical record schema.
#[derive(Clone)]
pub struct MaterializerBuilder {
    schema: Arc<RecordSchema>,
    physical: Option<GroupType>,
    factory: Arc<dyn ObjectFactory>,
    options: ConverterOptions,
}

impl MaterializerBuilder {
    /// Creates a builder for the given logical record schema.
    ///
    /// By default values are materialized dynamically and the physical layout
    /// is derived from the logical schema.
    pub fn new(schema: Arc<RecordSchema>) -> MaterializerBuilder {
        MaterializerBuilder {
            schema,
            physical: None,
            factory: Arc::new(GenericFactory),
            options: ConverterOptions::default(),
        }
    }

    /// Sets the physical layout of the data being read.
    /// If not set, the layout derived from the logical schema is used.
    pub fn with_physical_schema(self, physical: GroupType) -> Self {
        Self {
            physical: Some(physical),
            ..self
        }
    }

    /// Sets the object factory that resolves statically-known classes.
    pub fn with_factory(self, factory: Arc<dyn ObjectFactory>) -> Self {
        Self { factory, ..self }
    }

    pub fn with_options(self, options: ConverterOptions) -> Self {
        Self { options, ..self }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Returns the physical layout the materializer will bind against.
    ///
    /// # Errors
    ///
    /// Returns an error if no layout was set and the logical schema has no
    /// physical representation.
    pub fn physical_schema(&self) -> Result<GroupType> {
        match &self.physical {
            Some(physical) => Ok(physical.clone()),
            None => SchemaConverter::from_options(&self.options).convert(&self.schema),
        }
    }

    /// Binds a new materializer.
    ///
    /// # Errors
    ///
    /// Returns a bind error if the logical and physical schemas cannot be
    /// paired.
    pub fn build(&self) -> Result<RecordMaterializer> {
        let physical = self.physical_schema()?;
        let ctx = BindContext::new(self.factory.as_ref(), &self.options);
        RecordMaterializer::new(&physical, &self.schema, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use strata_format::{schema::PrimitiveKind, schema_builder};
    use strata_model::{Schema, Value, schema::Field};

    use super::*;

    #[test]
    fn test_build_with_derived_layout() {
        let schema = RecordSchema::new(
            "Pair",
            vec![
                Field::new("a", Schema::Int),
                Field::new("b", Schema::nullable(Schema::String)),
            ],
        )
        .unwrap();
        let builder = MaterializerBuilder::new(schema);
        assert_eq!(builder.physical_schema().unwrap().field_count(), 2);

        let mut materializer = builder.build().unwrap();
        materializer.start_record().unwrap();
        materializer.add_int(0, 4).unwrap();
        let value = materializer.end_record().unwrap();
        assert_eq!(
            value.as_record().unwrap().values(),
            &[Value::Int(4), Value::Null]
        );
    }

    #[test]
    fn test_build_with_explicit_layout() {
        let schema = RecordSchema::new("Pair", vec![Field::new("a", Schema::Int)]).unwrap();
        let physical = schema_builder::MessageBuilder::new("pair")
            .field(schema_builder::required(PrimitiveKind::Int64, "a"))
            .build();
        let err = MaterializerBuilder::new(schema)
            .with_physical_schema(physical)
            .build()
            .err()
            .unwrap();
        assert!(err.is_bind_error());
    }
}
