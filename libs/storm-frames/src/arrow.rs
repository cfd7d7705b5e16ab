use std::{collections::HashMap, sync::Arc};

use arrow::{
    array::{
        ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, RecordBatchOptions,
        StringArray, TimestampMillisecondArray,
    },
    datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit},
    error::ArrowError,
};

use crate::table::{Column, ColumnValues, Table};

pub const TIME_ZONE: &str = "UTC";

impl Column {
    pub fn data_type(&self) -> DataType {
        match &self.values {
            ColumnValues::String(_) => DataType::Utf8,
            ColumnValues::Int(_) => DataType::Int64,
            ColumnValues::Float(_) => DataType::Float64,
            ColumnValues::Bool(_) => DataType::Boolean,
            ColumnValues::Time(_) => {
                DataType::Timestamp(TimeUnit::Millisecond, Some(TIME_ZONE.into()))
            }
        }
    }

    pub fn field(&self) -> Field {
        Field::new(self.name.clone(), self.data_type(), true)
    }

    pub fn to_array(&self) -> ArrayRef {
        match &self.values {
            ColumnValues::String(v) => Arc::new(StringArray::from(v.clone())),
            ColumnValues::Int(v) => Arc::new(Int64Array::from(v.clone())),
            ColumnValues::Float(v) => Arc::new(Float64Array::from(v.clone())),
            ColumnValues::Bool(v) => Arc::new(BooleanArray::from(v.clone())),
            ColumnValues::Time(v) => {
                let millis: Vec<Option<i64>> =
                    v.iter().map(|t| t.map(|t| t.as_millisecond())).collect();
                Arc::new(TimestampMillisecondArray::from(millis).with_timezone(TIME_ZONE))
            }
        }
    }
}

impl Table {
    /// Arrow schema with the table name and ref id as metadata.
    pub fn schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self.columns.iter().map(Column::field).collect();
        let metadata = HashMap::from([
            ("name".to_string(), self.name.clone()),
            ("ref_id".to_string(), self.ref_id.clone()),
        ]);
        Arc::new(Schema::new_with_metadata(fields, metadata))
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let arrays: Vec<ArrayRef> = self.columns.iter().map(Column::to_array).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows()));
        RecordBatch::try_new_with_options(self.schema(), arrays, &options)
    }
}
